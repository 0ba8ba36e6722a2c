use clap::Parser;
use std::path::PathBuf;

use crate::error::{Error, Result};

#[derive(Parser, Debug)]
#[command(
    name = "jira-sprint",
    about = "List, transition and sprint-move your assigned Jira issues",
    version
)]
pub struct Cli {
    /// Pick an issue and a new status; issues without a sprint also join the active sprint
    #[arg(short, long, conflicts_with_all = ["move_issue", "key"])]
    pub interactive: bool,

    /// Add an issue to the active sprint (prompts for one when KEY is omitted)
    #[arg(
        short = 'm',
        long = "move",
        value_name = "KEY",
        num_args = 0..=1,
        conflicts_with = "key"
    )]
    pub move_issue: Option<Option<String>>,

    /// Path to configuration file
    #[arg(short, long, env = "JIRA_SPRINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Issue to transition
    #[arg(value_name = "KEY")]
    pub key: Option<String>,

    /// Target status; several words are joined with spaces
    #[arg(value_name = "STATUS")]
    pub status: Vec<String>,
}

/// What the invocation asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Report,
    Interactive,
    Move(Option<String>),
    Transition { key: String, status: String },
}

impl Cli {
    pub fn action(&self) -> Result<Action> {
        if self.interactive {
            return Ok(Action::Interactive);
        }
        if let Some(key) = &self.move_issue {
            let key = key.clone().filter(|k| !k.trim().is_empty());
            return Ok(Action::Move(key));
        }

        let Some(key) = &self.key else {
            return Ok(Action::Report);
        };

        let status = self.status.join(" ").trim().to_string();
        if status.is_empty() {
            return Err(Error::Usage("missing target status".to_string()));
        }

        Ok(Action::Transition {
            key: key.clone(),
            status,
        })
    }
}
