//! Active sprint discovery.
//!
//! There is no configured board: the active sprint is whatever active sprint
//! shows up on the user's own assigned issues. If none of them carries one,
//! resolution fails even when the board has an active sprint.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::jira::{Issue, JiraClient, Sprint};

/// First active sprint found scanning issues in order, then each issue's sprints in order
pub fn find_active_sprint(issues: &[Issue]) -> Result<&Sprint> {
    issues
        .iter()
        .flat_map(|issue| issue.fields.sprints.iter())
        .find(|sprint| sprint.state.is_active())
        .ok_or(Error::NoActiveSprint)
}

/// Add `issue_key` to the active sprint seen on the user's assigned issues.
///
/// The key does not need to be among the fetched issues. Returns the sprint used.
pub fn move_issue_to_current_sprint(client: &JiraClient, issue_key: &str) -> Result<Sprint> {
    let issues = client.fetch_assigned_issues()?;
    let sprint = find_active_sprint(&issues)?;
    debug!("Resolved active sprint {} ({})", sprint.name, sprint.id);

    client.add_issue_to_sprint(sprint.id, issue_key)?;
    info!("Moved {} into sprint {}", issue_key, sprint.name);
    Ok(sprint.clone())
}
