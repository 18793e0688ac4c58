//! OAI-PMH `ListRecords` client with resumption-token pagination.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::error::Result;
use crate::http::{QueryParams, Transport};
use crate::types::{HarvestQuery, Record, ResumptionToken};

use super::page::{parse_page, Page};

/// OAI-PMH verb used for harvesting.
const LIST_RECORDS: &str = "ListRecords";

/// Harvest client for one [`HarvestQuery`].
///
/// Holds the only mutable state of a harvest: the last resumption token and
/// the memoized total record count. Create one per query and drop it after
/// the run.
pub struct OaiClient<T> {
    query: HarvestQuery,
    transport: T,
    resumption_token: Option<ResumptionToken>,
    total: Option<u64>,
}

impl<T: Transport> OaiClient<T> {
    pub fn new(query: HarvestQuery, transport: T) -> Self {
        Self {
            query,
            transport,
            resumption_token: None,
            total: None,
        }
    }

    pub fn query(&self) -> &HarvestQuery {
        &self.query
    }

    /// Token of the most recently fetched page.
    pub fn resumption_token(&self) -> Option<&ResumptionToken> {
        self.resumption_token.as_ref()
    }

    /// Total number of records the repository reports for the query.
    ///
    /// Issues one `ListRecords` request the first time; later calls return
    /// the cached value. A failed request is not cached.
    pub fn count_total(&mut self) -> Result<u64> {
        if let Some(total) = self.total {
            return Ok(total);
        }

        let page = self.fetch_page(&self.build_params(None))?;
        let total = page.total()?;

        tracing::debug!(endpoint = %self.query.endpoint, total, mode = ?page.mode, "Counted records");
        self.total = Some(total);
        Ok(total)
    }

    /// Lazily stream every record of the result set, page by page.
    ///
    /// The first request carries the full query, every following request
    /// only the resumption token. The stream cannot be rewound; calling this
    /// again starts a fresh traversal and overwrites the token state.
    pub fn stream_records(&mut self) -> RecordStream<'_, T> {
        let params = self.build_params(None);
        self.resumption_token = None;
        RecordStream {
            client: self,
            state: StreamState::Fetching(params),
            buffer: VecDeque::new(),
            pages: 0,
        }
    }

    /// Request parameters: the resumption token alone, or the full query.
    fn build_params(&self, resumption_token: Option<&str>) -> QueryParams {
        let mut params: QueryParams = vec![("verb", LIST_RECORDS.to_string())];

        if let Some(token) = resumption_token {
            params.push(("resumptionToken", token.to_string()));
            return params;
        }

        params.push(("metadataPrefix", self.query.metadata_prefix.clone()));

        let optional = [
            ("from", &self.query.from),
            ("until", &self.query.until),
            ("set", &self.query.set),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push((name, value.to_string()));
            }
        }

        params
    }

    fn fetch_page(&self, params: &[(&'static str, String)]) -> Result<Page> {
        let body = self.transport.fetch(&self.query.endpoint, params)?;
        Ok(parse_page(&body))
    }
}

/// Pagination state of a [`RecordStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    /// Next request to issue.
    Fetching(QueryParams),
    /// Current page is drained; inspect the token.
    Deciding,
    /// No more pages. Terminal.
    Done,
}

/// Pull-based iterator over harvested records.
///
/// Yields `Err` once if a request fails and is exhausted afterwards.
pub struct RecordStream<'a, T> {
    client: &'a mut OaiClient<T>,
    state: StreamState,
    buffer: VecDeque<Record>,
    pages: usize,
}

impl<T: Transport> RecordStream<'_, T> {
    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Number of pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }
}

impl<T: Transport> Iterator for RecordStream<'_, T> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }

            match std::mem::replace(&mut self.state, StreamState::Done) {
                StreamState::Fetching(params) => match self.client.fetch_page(&params) {
                    Ok(page) => {
                        self.pages += 1;
                        tracing::debug!(
                            page = self.pages,
                            records = page.records.len(),
                            mode = ?page.mode,
                            "Fetched page"
                        );
                        self.buffer.extend(page.records);
                        self.client.resumption_token = page.token;
                        self.state = StreamState::Deciding;
                    }
                    Err(e) => return Some(Err(e)),
                },
                StreamState::Deciding => {
                    let next = self
                        .client
                        .resumption_token
                        .as_ref()
                        .and_then(ResumptionToken::next_value)
                        .map(|token| self.client.build_params(Some(token)));
                    if let Some(params) = next {
                        self.state = StreamState::Fetching(params);
                    }
                }
                StreamState::Done => return None,
            }
        }
    }
}

impl<T: Transport> FusedIterator for RecordStream<'_, T> {}
