mod cli;
mod config;
mod db;
mod embedding;
mod error;
mod knowledge;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use knowledge::brief::BriefPeriod;
use knowledge::capture::CaptureRequest;
use knowledge::types::Category;

#[derive(Parser)]
#[command(name = "coeus", version, about = "Capture notes, auto-link them by tag, and search them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (transport from config: stdio or http)
    Serve,
    /// Capture a note
    Capture {
        /// Note text; #hashtags become tags
        #[arg(required = true)]
        text: Vec<String>,
        /// Block type (work_log, journal, idea, research); inferred when omitted
        #[arg(long = "type")]
        category: Option<Category>,
        /// Explicit tag, repeatable; replaces hashtag extraction
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Person mentioned, repeatable
        #[arg(long = "person")]
        people: Vec<String>,
        /// Project, repeatable
        #[arg(long = "project")]
        projects: Vec<String>,
    },
    /// Hybrid keyword + semantic search
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Blocks related to a block
    Related {
        id: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one block in full
    Show { id: String },
    /// Summarize captures for a period
    Brief {
        #[arg(value_enum, default_value_t = PeriodArg::Today)]
        period: PeriodArg,
    },
    /// Knowledge base statistics
    Stats,
    /// Start a batch capture session
    Start,
    /// Stop the batch capture session
    Stop,
    /// Manage tag aliases
    Alias {
        #[command(subcommand)]
        action: AliasAction,
    },
    /// Run database diagnostics
    Doctor,
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Today,
    Yesterday,
    Week,
}

impl From<PeriodArg> for BriefPeriod {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Today => BriefPeriod::Today,
            PeriodArg::Yesterday => BriefPeriod::Yesterday,
            PeriodArg::Week => BriefPeriod::Week,
        }
    }
}

#[derive(Subcommand)]
enum AliasAction {
    /// Map an alias to a canonical tag
    Set { alias: String, canonical: String },
    /// List all aliases
    List,
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.coeus/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::CoeusConfig::load()?;

    // Log to stderr so stdout stays clean for CLI output and MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let default_limit = config.retrieval.default_limit;

    match cli.command {
        Command::Serve => match config.server.transport.as_str() {
            "http" => server::serve_http(config).await?,
            _ => server::serve_stdio(config).await?,
        },
        Command::Capture {
            text,
            category,
            tags,
            people,
            projects,
        } => {
            let request = CaptureRequest {
                content: text.join(" "),
                category,
                tags: (!tags.is_empty()).then_some(tags),
                people,
                projects,
            };
            cli::capture::capture(&config, request)?;
        }
        Command::Search { query, limit } => {
            cli::search::search(&config, &query.join(" "), limit.unwrap_or(default_limit))?;
        }
        Command::Related { id, limit } => {
            cli::search::related(&config, &id, limit.unwrap_or(default_limit))?;
        }
        Command::Show { id } => cli::show::show(&config, &id)?,
        Command::Brief { period } => cli::brief::brief(&config, period.into())?,
        Command::Stats => cli::stats::stats(&config)?,
        Command::Start => cli::session::start(&config)?,
        Command::Stop => cli::session::stop(&config)?,
        Command::Alias { action } => match action {
            AliasAction::Set { alias, canonical } => cli::alias::set(&config, &alias, &canonical)?,
            AliasAction::List => cli::alias::list(&config)?,
        },
        Command::Doctor => cli::doctor::doctor(&config)?,
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
    }

    Ok(())
}
