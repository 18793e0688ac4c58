//! Command-line interface for the harvester.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{validate_endpoint, DEFAULT_MAX_FILES_IN_ARCHIVE, DEFAULT_METADATA_PREFIX};
use crate::error::Result;
use crate::harvester::harvest_to_archives;
use crate::http::HttpTransport;
use crate::oai::OaiClient;
use crate::types::{ArchiveOptions, HarvestOutcome, HarvestQuery, HarvestResult};

/// OAI Harvester - snapshot OAI-PMH repository metadata into zip archives.
#[derive(Parser)]
#[command(name = "oai-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log progress (info level) unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Query options shared by all commands.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct QueryArgs {
    /// Base URL of the OAI-PMH endpoint
    pub url: String,

    /// Metadata format to request
    #[arg(short, long, default_value = DEFAULT_METADATA_PREFIX)]
    pub metadata_prefix: String,

    /// Only records changed on or after this datestamp
    #[arg(long)]
    pub from: Option<String>,

    /// Only records changed on or before this datestamp
    #[arg(long)]
    pub until: Option<String>,

    /// Restrict the harvest to this set
    #[arg(short, long)]
    pub set: Option<String>,
}

impl QueryArgs {
    fn to_query(&self) -> HarvestQuery {
        HarvestQuery {
            endpoint: self.url.clone(),
            metadata_prefix: self.metadata_prefix.clone(),
            from: self.from.clone(),
            until: self.until.clone(),
            set: self.set.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest all records into zip archives of XML files.
    Harvest {
        #[command(flatten)]
        query: QueryArgs,

        /// Directory the archives are written to (created if missing)
        destination: PathBuf,

        /// Maximum number of records per archive
        #[arg(long, default_value_t = DEFAULT_MAX_FILES_IN_ARCHIVE)]
        max_files: usize,

        /// Archive name prefix (default: current date and time)
        #[arg(long)]
        prefix: Option<String>,

        /// Print the result as YAML instead of a summary
        #[arg(long)]
        yaml: bool,
    },

    /// Print the number of records the repository reports for a query.
    Count {
        #[command(flatten)]
        query: QueryArgs,
    },
}

/// Run the CLI.
pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Harvest {
            query,
            destination,
            max_files,
            prefix,
            yaml,
        } => {
            let options = ArchiveOptions {
                max_files_in_archive: max_files,
                filename_prefix: prefix,
            };
            harvest_command(&query.to_query(), &destination, &options, yaml)
        }
        Commands::Count { query } => count_command(&query.to_query()),
    }
}

/// Execute the harvest command.
fn harvest_command(
    query: &HarvestQuery,
    destination: &Path,
    options: &ArchiveOptions,
    yaml: bool,
) -> Result<ExitCode> {
    let pb = spinner(yaml);
    pb.set_message(format!("Harvesting {}...", query.endpoint));

    let result = harvest_to_archives(query, destination, options);
    pb.finish_and_clear();
    let result = result?;

    if yaml {
        print!("{}", serde_yaml::to_string(&result)?);
    } else {
        print_summary(&result, destination);
    }

    Ok(if result.outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Execute the count command.
fn count_command(query: &HarvestQuery) -> Result<ExitCode> {
    validate_endpoint(&query.endpoint)?;

    let pb = spinner(false);
    pb.set_message(format!("Counting records at {}...", query.endpoint));

    let mut client = OaiClient::new(query.clone(), HttpTransport::new()?);
    let total = client.count_total();
    pb.finish_and_clear();

    println!("{}", total?);
    Ok(ExitCode::SUCCESS)
}

fn spinner(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn print_summary(result: &HarvestResult, destination: &Path) {
    println!("  Found: {}", result.num_found);
    println!("  Received: {}", result.num_received);

    match &result.outcome {
        HarvestOutcome::Complete => {
            println!(
                "{} {} archive(s) in {}",
                style("Saved").green().bold(),
                result.filenames.len(),
                destination.display()
            );
            for name in &result.filenames {
                println!("    {name}");
            }
        }
        HarvestOutcome::Empty => {
            println!("{}", style("Repository returned no records").yellow());
        }
        HarvestOutcome::CountFailed { error } => {
            println!("{} {error}", style("Could not count records:").red().bold());
        }
        HarvestOutcome::RolledBack { error } => {
            println!(
                "{} {error}",
                style("Harvest failed, archives removed:").red().bold()
            );
        }
    }
}
