//! Test utilities for jira-sprint
#![cfg(test)]

use crate::jira::{Issue, IssueFields, JiraClient, MockJira, NamedRef, Sprint, SprintState, Transition};

/// Create a mock Jira client holding `issues`
pub fn create_test_jira_client(issues: Vec<Issue>) -> JiraClient {
    let mut mock = MockJira::new();
    mock.issues = issues;
    JiraClient::Mock(mock)
}

/// Borrow the mock behind a test client
pub fn mock_of(client: &JiraClient) -> &MockJira {
    match client {
        JiraClient::Mock(mock) => mock,
        JiraClient::Real(_) => panic!("Expected a mock Jira client"),
    }
}

/// Create a test issue
pub fn create_test_issue(key: &str, points: f64, sprints: Vec<Sprint>) -> Issue {
    Issue {
        key: key.to_string(),
        fields: IssueFields {
            summary: format!("Summary of {}", key),
            issue_type: "Story".to_string(),
            status: "Open".to_string(),
            points,
            sprints,
        },
    }
}

pub fn sprint(id: u64, name: &str, state: &str) -> Sprint {
    Sprint {
        id,
        name: name.to_string(),
        state: SprintState::from(state.to_string()),
    }
}

pub fn transition(id: &str, target: &str) -> Transition {
    Transition {
        id: id.to_string(),
        target: NamedRef {
            name: target.to_string(),
        },
    }
}
