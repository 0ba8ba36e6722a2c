pub mod cli;
pub mod config;
pub mod error;
pub mod flows;
pub mod jira;
pub mod prompt;
pub mod report;
pub mod sprint;

#[cfg(test)]
mod test_utils;

pub use config::{Config, Credentials};
pub use error::{Error, Result};
