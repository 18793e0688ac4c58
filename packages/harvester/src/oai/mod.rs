//! OAI-PMH harvest client.
//!
//! [`OaiClient`] drives `ListRecords` requests through a
//! [`Transport`](crate::http::Transport), following resumption tokens until
//! the repository signals the end of the result set.

mod client;
mod page;

pub use client::{OaiClient, RecordStream, StreamState};
pub use page::{parse_lenient, parse_page, parse_strict, Page, ParseMode};
