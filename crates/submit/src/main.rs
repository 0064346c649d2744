use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smells_submit::config::SubmitConfig;
use smells_submit::controller::{
    Completion, ResponseMode, SubmissionController, SubmitError, SubmitEvent,
};
use smells_submit::form::FormInput;
use smells_submit::page::TerminalPage;
use smells_submit::report::download_report;
use smells_submit::storage::{FileSessionStore, RESULT_DATA_KEY};
use smells_submit::transport::HttpTransport;

#[derive(Debug, Parser)]
#[command(name = "smells-submit")]
#[command(about = "Submit a GitHub repository to the community smells detector")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the form values and submit them for analysis
    Submit(SubmitArgs),
    /// Download the PDF report of the last analysis
    Report(ReportArgs),
}

#[derive(Debug, Args)]
struct SubmitArgs {
    #[arg(long)]
    repo_url: String,

    #[arg(long)]
    access_token: String,

    #[arg(long)]
    email: String,

    /// Expected shape of a successful response
    #[arg(long, value_enum)]
    mode: Option<ResponseMode>,

    /// Skip client-side validation
    #[arg(long)]
    no_validate: bool,

    /// Where an HTML result page is written
    #[arg(long)]
    html_out: Option<PathBuf>,

    /// Session storage file for JSON results
    #[arg(long)]
    session_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ReportArgs {
    #[arg(long, default_value = "smell_report.pdf")]
    out: PathBuf,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = SubmitConfig::load()?;
    let base_url = cli.base_url.unwrap_or_else(|| config.base_url());
    let transport = HttpTransport::new(&base_url, config.request_timeout())?;
    debug!(%base_url, "backend configured");

    match cli.command {
        Command::Submit(args) => submit(&config, transport, args).await,
        Command::Report(args) => {
            let written = download_report(&transport, &config.report_path(), &args.out).await?;
            println!("Report saved to {} ({written} bytes)", args.out.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn submit(
    config: &SubmitConfig,
    transport: HttpTransport,
    args: SubmitArgs,
) -> Result<ExitCode> {
    let mut options = config.controller_options();
    if let Some(mode) = args.mode {
        options.response_mode = mode;
    }
    if args.no_validate {
        options.validate = false;
    }

    let page = TerminalPage::new(
        args.html_out
            .unwrap_or_else(|| PathBuf::from(config.html_output_path())),
    );
    let store = FileSessionStore::new(
        args.session_file
            .unwrap_or_else(|| PathBuf::from(config.session_file())),
    );

    let controller = SubmissionController::new(transport, page, store, options);
    let mut event = SubmitEvent::new(FormInput::new(
        args.repo_url,
        args.access_token,
        args.email,
    ));

    let accepted = settle_submission(
        controller.handle_submit(&mut event).await,
        controller.store().path(),
    )?;
    Ok(if accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Returns whether the submission went through. A validation rejection is not an
/// error here because the page has already listed each invalid field.
fn settle_submission(
    outcome: Result<Completion, SubmitError>,
    session_file: &Path,
) -> Result<bool> {
    match outcome {
        Ok(Completion::Stored { status }) => {
            println!(
                "Status: {}; result stored under {RESULT_DATA_KEY} in {}",
                status.as_deref().unwrap_or("-"),
                session_file.display()
            );
            Ok(true)
        }
        Ok(Completion::Acknowledged { .. } | Completion::Rendered) => Ok(true),
        Err(SubmitError::Validation(_)) => Ok(false),
        Err(error) => Err(error.into()),
    }
}
