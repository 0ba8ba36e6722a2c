use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::FieldConfig;

/// Label used for issues that belong to no sprint
pub const BACKLOG: &str = "Backlog";

/// Sprint lifecycle state as reported by Jira
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SprintState {
    Active,
    Closed,
    Future,
    Other(String),
}

impl From<String> for SprintState {
    fn from(state: String) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "active" => SprintState::Active,
            "closed" => SprintState::Closed,
            "future" => SprintState::Future,
            _ => SprintState::Other(state),
        }
    }
}

impl SprintState {
    pub fn is_active(&self) -> bool {
        matches!(self, SprintState::Active)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sprint {
    pub id: u64,
    pub name: String,
    pub state: SprintState,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IssueFields {
    pub summary: String,
    pub issue_type: String,
    pub status: String,
    /// Story points, zero when unestimated
    pub points: f64,
    pub sprints: Vec<Sprint>,
}

/// A Jira issue snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
}

impl Issue {
    /// The sprint this issue is shown under.
    ///
    /// An active sprint wins regardless of position, then the last listed
    /// sprint, then [`BACKLOG`].
    pub fn sprint_label(&self) -> &str {
        let sprints = &self.fields.sprints;
        sprints
            .iter()
            .find(|s| s.state.is_active())
            .or_else(|| sprints.last())
            .map(|s| s.name.as_str())
            .unwrap_or(BACKLOG)
    }

    pub fn has_sprint(&self) -> bool {
        !self.fields.sprints.is_empty()
    }
}

/// An available workflow move for one issue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transition {
    pub id: String,
    #[serde(rename = "to")]
    pub target: NamedRef,
}

impl Transition {
    pub fn target_name(&self) -> &str {
        &self.target.name
    }
}

/// Any `{"name": ...}` object (status, issue type, transition target)
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: String,
}

/// Body of `POST /rest/api/3/search/jql`
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub jql: &'a str,
    pub fields: Vec<&'a str>,
}

impl<'a> SearchRequest<'a> {
    pub fn new(jql: &'a str, fields: &'a FieldConfig) -> Self {
        SearchRequest {
            jql,
            fields: vec![
                "summary",
                fields.story_points.as_str(),
                "issuetype",
                "status",
                fields.sprints.as_str(),
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<RestIssue>,
}

/// Issue as returned by the search endpoint, before custom fields are resolved
#[derive(Debug, Deserialize)]
pub struct RestIssue {
    pub key: String,
    pub fields: RestFields,
}

#[derive(Debug, Deserialize)]
pub struct RestFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub issuetype: Option<NamedRef>,
    #[serde(default)]
    pub status: Option<NamedRef>,
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl RestIssue {
    /// Resolve the instance-specific custom fields into an [`Issue`]
    pub fn into_issue(mut self, field_ids: &FieldConfig) -> Result<Issue, serde_json::Error> {
        let points: Option<f64> = take_custom(&mut self.fields.custom, &field_ids.story_points)?;
        let sprints: Option<Vec<Sprint>> = take_custom(&mut self.fields.custom, &field_ids.sprints)?;

        Ok(Issue {
            key: self.key,
            fields: IssueFields {
                summary: self.fields.summary.unwrap_or_default(),
                issue_type: self.fields.issuetype.unwrap_or_default().name,
                status: self.fields.status.unwrap_or_default().name,
                points: points.unwrap_or(0.0),
                sprints: sprints.unwrap_or_default(),
            },
        })
    }
}

fn take_custom<T: serde::de::DeserializeOwned>(
    custom: &mut HashMap<String, serde_json::Value>,
    id: &str,
) -> Result<Option<T>, serde_json::Error> {
    match custom.remove(id) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some),
    }
}

#[derive(Debug, Deserialize)]
pub struct TransitionsResponse {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// Body of `POST /rest/api/3/issue/{key}/transitions`
#[derive(Debug, Serialize)]
pub struct TransitionRequest<'a> {
    pub transition: TransitionId<'a>,
}

#[derive(Debug, Serialize)]
pub struct TransitionId<'a> {
    pub id: &'a str,
}

/// Body of `POST /rest/agile/1.0/sprint/{id}/issue`
#[derive(Debug, Serialize)]
pub struct SprintIssuesRequest<'a> {
    pub issues: Vec<&'a str>,
}
