//! User-facing flows composed from client calls and prompts.
//!
//! Every step is one blocking round trip and nothing is cached between
//! steps, so a later fetch may see different remote state than an earlier one.

use std::io::{BufRead, Write};
use tracing::info;

use crate::error::Result;
use crate::jira::{Issue, JiraClient};
use crate::prompt::{Console, Pick};
use crate::report::{group_by_sprint, issue_label, render_report};
use crate::sprint::move_issue_to_current_sprint;

/// How a flow ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The user backed out, or there was nothing to choose from
    Cancelled,
}

#[derive(Debug)]
pub enum IssueSelection {
    Selected(Issue),
    /// No issue passed the filter; no prompt was shown
    NoMatches,
    Cancelled,
}

/// Fetch assigned issues and print the grouped report
pub fn show_report<W: Write>(client: &JiraClient, out: &mut W) -> Result<()> {
    let issues = client.fetch_assigned_issues()?;
    writeln!(out, "{}", render_report(&group_by_sprint(&issues)))?;
    Ok(())
}

/// Print the report, then let the user pick one issue matching `filter`
pub fn select_issue<R: BufRead, W: Write>(
    client: &JiraClient,
    console: &mut Console<R, W>,
    filter: Option<&dyn Fn(&Issue) -> bool>,
    prompt: &str,
) -> Result<IssueSelection> {
    let issues = client.fetch_assigned_issues()?;
    writeln!(console.output(), "{}", render_report(&group_by_sprint(&issues)))?;

    let mut candidates: Vec<Issue> = issues
        .into_iter()
        .filter(|issue| filter.map_or(true, |f| f(issue)))
        .collect();

    if candidates.is_empty() {
        info!("No issues to choose from");
        return Ok(IssueSelection::NoMatches);
    }

    let labels: Vec<String> = candidates.iter().map(issue_label).collect();
    match console.pick_one(prompt, &labels)? {
        Pick::Chosen(index) => Ok(IssueSelection::Selected(candidates.swap_remove(index))),
        Pick::Cancelled => Ok(IssueSelection::Cancelled),
    }
}

/// Pick an issue, pick a status, transition it, and pull it into the active
/// sprint if it was not in any sprint.
pub fn interactive_flow<R: BufRead, W: Write>(
    client: &JiraClient,
    console: &mut Console<R, W>,
    statuses: &[String],
) -> Result<Outcome> {
    let issue = match select_issue(client, console, None, "Select issue")? {
        IssueSelection::Selected(issue) => issue,
        IssueSelection::NoMatches | IssueSelection::Cancelled => return Ok(Outcome::Cancelled),
    };

    let status = match console.pick_one("Select new status", statuses)? {
        Pick::Chosen(index) => &statuses[index],
        Pick::Cancelled => {
            info!("Status selection cancelled, leaving {} unchanged", issue.key);
            return Ok(Outcome::Cancelled);
        }
    };

    client.apply_transition(&issue.key, status)?;
    writeln!(console.output(), "Transitioned {} to {:?}", issue.key, status)?;

    if !issue.has_sprint() {
        move_issue_to_current_sprint(client, &issue.key)?;
        writeln!(console.output(), "Added {} to active sprint", issue.key)?;
    }

    Ok(Outcome::Completed)
}

/// Move `issue_key`, or an issue picked from those without a sprint, into the active sprint
pub fn move_flow<R: BufRead, W: Write>(
    client: &JiraClient,
    console: &mut Console<R, W>,
    issue_key: Option<&str>,
) -> Result<Outcome> {
    let key = match issue_key {
        Some(key) => key.to_string(),
        None => {
            let unplanned: &dyn Fn(&Issue) -> bool = &|issue| !issue.has_sprint();
            match select_issue(client, console, Some(unplanned), "Select issue to move")? {
                IssueSelection::Selected(issue) => issue.key,
                IssueSelection::NoMatches | IssueSelection::Cancelled => {
                    return Ok(Outcome::Cancelled)
                }
            }
        }
    };

    move_issue_to_current_sprint(client, &key)?;
    // Upper-cased for display only; the request used the key as given.
    writeln!(console.output(), "Added {} to active sprint", key.to_uppercase())?;
    Ok(Outcome::Completed)
}

/// Transition one issue without prompting
pub fn transition_flow<W: Write>(
    client: &JiraClient,
    out: &mut W,
    issue_key: &str,
    status: &str,
) -> Result<()> {
    client.apply_transition(issue_key, status)?;
    writeln!(out, "Transitioned {} to {:?}", issue_key, status)?;
    Ok(())
}
