use anyhow::Result;
use clap::{Parser, ValueEnum};
use ibmtag::config::{Config, Overrides};
use ibmtag::driver::{reconcile, Invocation, Session};
use ibmtag::ibm::auth::{self, IbmCredentials};
use ibmtag::ibm::client::IbmClient;
use ibmtag::ibm::http::{format_api_error, IbmHttpClient};
use ibmtag::ibm::search::GlobalSearch;
use ibmtag::ibm::service::TaggingService;
use ibmtag::ibm::tagging::{DryRunTagging, GlobalTagging};
use ibmtag::ops::Outcome;
use ibmtag::output::print_outcome;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Attach, detach, rename and audit tags across IBM Cloud resources
///
/// Usage: ibmtag [OPTIONS] <OPERATION> [TAG]... -- [SELECTOR]... -- [API_KEY]
#[derive(Parser, Debug)]
#[command(name = "ibmtag", version = ibmtag::VERSION, about, long_about = None)]
struct Args {
    /// attach-tag, attach-unique-tag, detach-tag, detach-tag-by-name, replace-tag,
    /// replace-tag-name, duplicate-tag, clean-unused-tags, report-present-tags,
    /// report-absent-tags
    operation: String,

    /// Tag arguments for the operation
    tags: Vec<String>,

    /// `<selector...> -- <api key>`: `all`, exact names or `substr:<pattern>`
    #[arg(last = true, allow_hyphen_values = true)]
    rest: Vec<String>,

    /// API key (or bearer token with --bearer); defaults to IBMCLOUD_API_KEY / IC_API_KEY
    #[arg(long)]
    token: Option<String>,

    /// Treat the token as an already-issued bearer token
    #[arg(long)]
    bearer: bool,

    /// Log mutations instead of performing them
    #[arg(long)]
    dry_run: bool,

    /// Search query used to load the inventory
    #[arg(long)]
    query: Option<String>,

    /// Search page size
    #[arg(long)]
    page_limit: Option<u32>,

    /// Account to scope search and tagging calls to
    #[arg(long)]
    account_id: Option<String>,

    /// Tag type: user, access or service
    #[arg(long)]
    tag_type: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Log level
    #[arg(long, value_enum, env = "LOG_LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    // RUST_LOG can still narrow or widen individual targets
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(tracing_level).into())
        .from_env_lossy();

    let Some(log_path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        return None;
    };

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_deref());

    match run(&args).await {
        Ok(outcome) => {
            print_outcome(&outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {}", format_api_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<Outcome> {
    let invocation = Invocation::from_parts(&args.operation, &args.tags, &args.rest)?;

    let settings = Config::load().resolve(&Overrides {
        account_id: args.account_id.clone(),
        tag_type: args.tag_type.clone(),
        query: args.query.clone(),
        page_limit: args.page_limit,
    })?;

    let token = invocation
        .token
        .clone()
        .or_else(|| args.token.clone())
        .or_else(auth::api_key_from_env)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No API key given: pass it after the second '--', with --token, or set IBMCLOUD_API_KEY"
            )
        })?;

    let http = IbmHttpClient::new(Duration::from_secs(args.timeout_secs))?;
    let credentials = if args.bearer {
        IbmCredentials::bearer(&token)
    } else {
        IbmCredentials::api_key(&token, &settings.iam_url, http.clone())
    };

    let client = IbmClient::new(credentials, http, settings.endpoints.clone())
        .with_account(settings.account_id.clone())
        .with_tag_type(settings.tag_type.clone());

    let tagging: Box<dyn TaggingService> = if args.dry_run {
        tracing::info!("Dry run: no tag will be attached, detached or deleted");
        Box::new(DryRunTagging::new(GlobalTagging::new(client.clone())))
    } else {
        Box::new(GlobalTagging::new(client.clone()))
    };

    let session = Session::new(Box::new(GlobalSearch::new(client)), tagging)
        .with_search_options(settings.search);

    reconcile(&session, &invocation).await
}
