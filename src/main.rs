use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use plecost::{
    config::Config,
    error::{ReportError, RunError, ScanError},
    index::VulnerabilityIndex,
    output::{print_cli_table, ReportFormat},
    wordlist::load_candidates,
    HttpFetcher, ScanRequest, Target,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Exit codes for scripting
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const TARGET_UNAVAILABLE: u8 = 2;
    pub const NOT_WORDPRESS: u8 = 3;
    pub const UNSUPPORTED_REPORT: u8 = 4;
}

#[derive(Parser)]
#[command(name = "plecost")]
#[command(
    author,
    version,
    about = "Fingerprint WordPress core and plugin versions and match them against known CVEs"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a WordPress site
    Scan {
        /// Target URL; http:// is assumed when no scheme is given
        target: String,

        /// Plugins to probe (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        plugins: Vec<String>,

        /// File with one plugin name per line
        #[arg(short, long)]
        wordlist: Option<PathBuf>,

        /// Only probe the first N plugins of the wordlist
        #[arg(short = 'n', long)]
        max_plugins: Option<usize>,

        /// Vulnerability dataset (JSON)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Write a report; the extension selects the format (.json, .xml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Per-request timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Maximum concurrent plugin probes
        #[arg(short, long)]
        concurrency: Option<usize>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

struct ScanArgs {
    target: String,
    plugins: Vec<String>,
    wordlist: Option<PathBuf>,
    max_plugins: Option<usize>,
    data: Option<PathBuf>,
    output: Option<PathBuf>,
    timeout: Option<u64>,
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("plecost={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable config file");
        Config::default()
    });

    match cli.command {
        Commands::Scan {
            target,
            plugins,
            wordlist,
            max_plugins,
            data,
            output,
            timeout,
            concurrency,
        } => {
            let args = ScanArgs {
                target,
                plugins,
                wordlist,
                max_plugins,
                data,
                output,
                timeout,
                concurrency,
            };
            run_scan(args, &config).await
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_scan(args: ScanArgs, config: &Config) -> Result<u8> {
    // Reject a bad report name before anything else happens.
    if let Some(path) = &args.output {
        if let Err(e) = ReportFormat::from_path(path) {
            eprintln!("Error: {}", e);
            return Ok(exit_codes::UNSUPPORTED_REPORT);
        }
    }

    let target = Target::parse(&args.target)?;

    let mut candidates: Vec<String> = args
        .plugins
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if let Some(wordlist) = args.wordlist.as_ref().or(config.wordlist.as_ref()) {
        let limit = args.max_plugins.or(config.max_plugins);
        candidates.extend(load_candidates(wordlist, limit)?);
    }

    let index = match args.data.as_ref().or(config.data_path.as_ref()) {
        Some(path) => VulnerabilityIndex::load(path)
            .with_context(|| format!("failed to load vulnerability data {}", path.display()))?,
        None => {
            warn!("no vulnerability data configured; versions will not be correlated");
            VulnerabilityIndex::empty()
        }
    };

    let mut options = config.scan_options();
    if let Some(secs) = args.timeout {
        options.timeout = Duration::from_secs(secs);
    }
    if let Some(concurrency) = args.concurrency {
        options.concurrency = concurrency;
    }

    let mut request = ScanRequest::new(target, candidates).with_options(options);
    if let Some(path) = &args.output {
        request = request.with_report(path);
    }

    let fetcher = HttpFetcher::with_user_agent(&config.user_agent)
        .context("failed to build HTTP client")?;

    let spinner = if std::io::stderr().is_terminal() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!(
            "Scanning {} ({} plugin candidates)...",
            request.target,
            request.plugin_candidates.len()
        ));
        Some(pb)
    } else {
        None
    };

    let outcome = plecost::run(&request, Arc::new(fetcher), Arc::new(index)).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match outcome {
        Ok(result) => {
            print_cli_table(&result);
            if let Some(path) = &request.report_path {
                println!("Report written to: {}", path.display());
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(RunError::Scan(e)) => {
            eprintln!("Error: {}", e);
            Ok(match e {
                ScanError::TargetUnavailable { .. } => exit_codes::TARGET_UNAVAILABLE,
                ScanError::NotRecognizedPlatform(_) => exit_codes::NOT_WORDPRESS,
            })
        }
        Err(RunError::Report(e)) => {
            eprintln!("Error: {}", e);
            Ok(match e {
                ReportError::UnsupportedFormat(_) => exit_codes::UNSUPPORTED_REPORT,
                _ => exit_codes::ERROR,
            })
        }
        Err(RunError::ReportWrite { source, result }) => {
            print_cli_table(&result);
            eprintln!("Error: {}", source);
            Ok(exit_codes::ERROR)
        }
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        Config::default().save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'plecost config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
