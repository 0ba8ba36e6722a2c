use anyhow::{Context, Result};
use clap::Parser;
use jira_sprint::cli::{Action, Cli};
use jira_sprint::error::user_friendly_error;
use jira_sprint::flows::{self, Outcome};
use jira_sprint::jira::JiraClient;
use jira_sprint::prompt::Console;
use jira_sprint::{Config, Credentials};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{:#}", e);
            user_friendly_error(&e).display();
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let action = cli.action()?;

    info!("Loading configuration");
    let config = Config::load(cli.config.as_deref())?;
    let credentials = Credentials::resolve(&config.jira)?;
    info!("Using Jira at {}", credentials.base_url);

    let client = JiraClient::new(credentials, &config)?;

    match action {
        Action::Report => {
            flows::show_report(&client, &mut std::io::stdout())
                .context("Failed to list assigned issues")?;
        }
        Action::Interactive => {
            let mut console = Console::stdio();
            let outcome = flows::interactive_flow(&client, &mut console, &config.workflow.statuses)?;
            log_outcome(outcome);
        }
        Action::Move(key) => {
            let mut console = Console::stdio();
            let outcome = flows::move_flow(&client, &mut console, key.as_deref())?;
            log_outcome(outcome);
        }
        Action::Transition { key, status } => {
            flows::transition_flow(&client, &mut std::io::stdout(), &key, &status)
                .with_context(|| format!("Failed to transition {}", key))?;
        }
    }

    Ok(())
}

fn log_outcome(outcome: Outcome) {
    match outcome {
        Outcome::Completed => info!("Done"),
        Outcome::Cancelled => info!("Nothing changed"),
    }
}
