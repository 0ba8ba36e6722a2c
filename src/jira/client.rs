use base64::Engine;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Config, Credentials, FieldConfig};
use crate::error::{Error, Result};
use crate::jira::find_transition;
use crate::jira::models::*;

/// Jira client abstraction
pub enum JiraClient {
    Real(RealJira),
    #[cfg(test)]
    Mock(MockJira),
}

impl JiraClient {
    /// Create a client talking to the Jira instance named by `credentials`
    pub fn new(credentials: Credentials, config: &Config) -> Result<Self> {
        Ok(JiraClient::Real(RealJira::new(credentials, config)?))
    }

    /// Create a mock client for testing
    #[cfg(test)]
    pub fn mock() -> Self {
        JiraClient::Mock(MockJira::new())
    }

    /// Fetch the open, non-epic issues assigned to the current user, in server order
    pub fn fetch_assigned_issues(&self) -> Result<Vec<Issue>> {
        match self {
            JiraClient::Real(client) => client.fetch_assigned_issues(),
            #[cfg(test)]
            JiraClient::Mock(client) => client.fetch_assigned_issues(),
        }
    }

    /// Fetch the transitions currently available for an issue
    pub fn fetch_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        match self {
            JiraClient::Real(client) => client.fetch_transitions(issue_key),
            #[cfg(test)]
            JiraClient::Mock(client) => client.fetch_transitions(issue_key),
        }
    }

    /// Move an issue to the status named `target_status`.
    ///
    /// Returns the transition that was submitted.
    pub fn apply_transition(&self, issue_key: &str, target_status: &str) -> Result<Transition> {
        let transitions = self.fetch_transitions(issue_key)?;

        let Some(transition) = find_transition(&transitions, target_status) else {
            return Err(Error::NoSuchTransition {
                issue: issue_key.to_string(),
                target: target_status.to_string(),
                available: transitions.iter().map(|t| t.target_name().to_string()).collect(),
            });
        };

        info!(
            "Applying transition {} ({}) to {}",
            transition.id,
            transition.target_name(),
            issue_key
        );
        self.submit_transition(issue_key, &transition.id)?;
        Ok(transition.clone())
    }

    /// Add an issue to a sprint's membership
    pub fn add_issue_to_sprint(&self, sprint_id: u64, issue_key: &str) -> Result<()> {
        match self {
            JiraClient::Real(client) => client.add_issue_to_sprint(sprint_id, issue_key),
            #[cfg(test)]
            JiraClient::Mock(client) => client.add_issue_to_sprint(sprint_id, issue_key),
        }
    }

    fn submit_transition(&self, issue_key: &str, transition_id: &str) -> Result<()> {
        match self {
            JiraClient::Real(client) => client.submit_transition(issue_key, transition_id),
            #[cfg(test)]
            JiraClient::Mock(client) => client.submit_transition(issue_key, transition_id),
        }
    }
}

/// Real Jira client over the REST API
pub struct RealJira {
    client: HttpClient,
    base_url: String,
    auth_header: String,
    jql: String,
    fields: FieldConfig,
}

impl RealJira {
    pub fn new(credentials: Credentials, config: &Config) -> Result<Self> {
        let client = HttpClient::builder().build()?;

        Ok(RealJira {
            client,
            auth_header: basic_auth_header(&credentials),
            base_url: credentials.base_url,
            jql: config.search.jql.clone(),
            fields: config.fields.clone(),
        })
    }

    /// Execute one request and return the raw response body
    fn execute<B: Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header(AUTHORIZATION, &self.auth_header);

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(body)?);
        }

        let response = request.send()?;
        let status = response.status();
        debug!("{} -> {}", url, status);

        check_status(status)?;
        Ok(response.text()?)
    }

    /// Execute a request and decode the JSON response into `T`
    fn execute_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let text = self.execute(method, path, body)?;
        decode_body(&text)
    }

    pub fn fetch_assigned_issues(&self) -> Result<Vec<Issue>> {
        let request = SearchRequest::new(&self.jql, &self.fields);
        let response: SearchResponse =
            self.execute_json(Method::POST, "/rest/api/3/search/jql", Some(&request))?;

        let issues = response
            .issues
            .into_iter()
            .map(|raw| raw.into_issue(&self.fields))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        info!("Fetched {} assigned issues", issues.len());
        Ok(issues)
    }

    pub fn fetch_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        let path = transitions_path(issue_key);
        let response: TransitionsResponse = self.execute_json(Method::GET, &path, None::<&()>)?;

        debug!(
            "{} has {} available transitions",
            issue_key,
            response.transitions.len()
        );
        Ok(response.transitions)
    }

    pub fn submit_transition(&self, issue_key: &str, transition_id: &str) -> Result<()> {
        let body = TransitionRequest {
            transition: TransitionId { id: transition_id },
        };
        self.execute(Method::POST, &transitions_path(issue_key), Some(&body))?;
        Ok(())
    }

    pub fn add_issue_to_sprint(&self, sprint_id: u64, issue_key: &str) -> Result<()> {
        let body = SprintIssuesRequest {
            issues: vec![issue_key],
        };
        let path = format!("/rest/agile/1.0/sprint/{}/issue", sprint_id);
        self.execute(Method::POST, &path, Some(&body))?;

        info!("Added {} to sprint {}", issue_key, sprint_id);
        Ok(())
    }
}

/// `Basic base64(email:token)`
pub fn basic_auth_header(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.email, credentials.api_token);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(raw)
    )
}

/// Reject any status outside 2xx
pub fn check_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    Err(Error::Remote {
        status: status.as_u16(),
        text: status.canonical_reason().unwrap_or("unknown status").to_string(),
    })
}

pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

fn transitions_path(issue_key: &str) -> String {
    format!("/rest/api/3/issue/{}/transitions", issue_key)
}

/// Mock Jira client for testing
#[cfg(test)]
pub struct MockJira {
    pub issues: Vec<Issue>,
    pub transitions: Vec<Transition>,
    pub fetch_count: std::cell::Cell<usize>,
    /// (issue key, transition id)
    pub submitted: std::cell::RefCell<Vec<(String, String)>>,
    /// (sprint id, issue key)
    pub sprint_additions: std::cell::RefCell<Vec<(u64, String)>>,
}

#[cfg(test)]
impl MockJira {
    pub fn new() -> Self {
        MockJira {
            issues: vec![],
            transitions: vec![],
            fetch_count: std::cell::Cell::new(0),
            submitted: std::cell::RefCell::new(vec![]),
            sprint_additions: std::cell::RefCell::new(vec![]),
        }
    }

    pub fn fetch_assigned_issues(&self) -> Result<Vec<Issue>> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        Ok(self.issues.clone())
    }

    pub fn fetch_transitions(&self, _issue_key: &str) -> Result<Vec<Transition>> {
        Ok(self.transitions.clone())
    }

    pub fn submit_transition(&self, issue_key: &str, transition_id: &str) -> Result<()> {
        self.submitted
            .borrow_mut()
            .push((issue_key.to_string(), transition_id.to_string()));
        Ok(())
    }

    pub fn add_issue_to_sprint(&self, sprint_id: u64, issue_key: &str) -> Result<()> {
        self.sprint_additions
            .borrow_mut()
            .push((sprint_id, issue_key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_of, transition};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Credentials {
        Credentials {
            email: "me@example.com".to_string(),
            api_token: "secret".to_string(),
            base_url: "https://example.atlassian.net".to_string(),
        }
    }

    #[test]
    fn test_basic_auth_header() {
        // base64("me@example.com:secret")
        assert_eq!(
            basic_auth_header(&credentials()),
            "Basic bWVAZXhhbXBsZS5jb206c2VjcmV0"
        );
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(check_status(StatusCode::NO_CONTENT).is_ok());

        match check_status(StatusCode::NOT_FOUND) {
            Err(Error::Remote { status, text }) => {
                assert_eq!(status, 404);
                assert_eq!(text, "Not Found");
            }
            other => panic!("Expected Remote error, got {:?}", other),
        }

        assert!(matches!(
            check_status(StatusCode::MOVED_PERMANENTLY),
            Err(Error::Remote { status: 301, .. })
        ));
    }

    #[test]
    fn test_check_status_nonstandard_code() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = check_status(status).unwrap_err();
        assert_eq!(err.to_string(), "jira error: 599 unknown status");
    }

    #[test]
    fn test_decode_body_shape_mismatch() {
        let result: Result<TransitionsResponse> = decode_body(r#"{"transitions": "nope"}"#);
        assert!(matches!(result, Err(Error::Decode(_))));

        let ok: TransitionsResponse =
            decode_body(r#"{"transitions": [{"id": "11", "to": {"name": "Done"}}]}"#).unwrap();
        assert_eq!(ok.transitions[0].target_name(), "Done");
    }

    #[test]
    fn test_real_client_settings() {
        let client = RealJira::new(credentials(), &Config::default()).unwrap();
        assert_eq!(client.base_url, "https://example.atlassian.net");
        assert_eq!(client.fields.story_points, "customfield_10004");
        assert_eq!(
            transitions_path("PROJ-7"),
            "/rest/api/3/issue/PROJ-7/transitions"
        );
    }

    #[test]
    fn test_apply_transition_submits_matching_id() {
        let mut mock = MockJira::new();
        mock.transitions = vec![transition("11", "In Progress"), transition("21", "Done")];
        let client = JiraClient::Mock(mock);

        let applied = client.apply_transition("PROJ-1", "done").unwrap();
        assert_eq!(applied.id, "21");

        let mock = mock_of(&client);
        assert_eq!(
            *mock.submitted.borrow(),
            vec![("PROJ-1".to_string(), "21".to_string())]
        );
    }

    #[test]
    fn test_apply_transition_without_match() {
        let mut mock = MockJira::new();
        mock.transitions = vec![transition("11", "In Progress"), transition("21", "Done")];
        let client = JiraClient::Mock(mock);

        let err = client.apply_transition("PROJ-1", "In Review").unwrap_err();
        match err {
            Error::NoSuchTransition {
                issue,
                target,
                available,
            } => {
                assert_eq!(issue, "PROJ-1");
                assert_eq!(target, "In Review");
                assert_eq!(available, vec!["In Progress", "Done"]);
            }
            other => panic!("Expected NoSuchTransition, got {:?}", other),
        }

        assert!(mock_of(&client).submitted.borrow().is_empty());
    }

    #[test]
    fn test_add_issue_to_sprint_mock() {
        let client = JiraClient::mock();
        client.add_issue_to_sprint(42, "proj-3").unwrap();

        assert_eq!(
            *mock_of(&client).sprint_additions.borrow(),
            vec![(42, "proj-3".to_string())]
        );
    }

    fn loopback_client(base_url: String) -> JiraClient {
        let credentials = Credentials {
            email: "a@b".to_string(),
            api_token: "t".to_string(),
            base_url,
        };
        let config = Config::default();
        JiraClient::Real(RealJira {
            client: HttpClient::builder().no_proxy().build().unwrap(),
            auth_header: basic_auth_header(&credentials),
            base_url: credentials.base_url,
            jql: config.search.jql.clone(),
            fields: config.fields.clone(),
        })
    }

    /// Run blocking client calls against `server` off the async runtime
    async fn against<T, F>(server: &MockServer, calls: F) -> T
    where
        F: FnOnce(JiraClient) -> T + Send + 'static,
        T: Send + 'static,
    {
        let base_url = server.uri();
        tokio::task::spawn_blocking(move || calls(loopback_client(base_url)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_transition_and_sprint_requests_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/P-1/transitions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(include_str!("../../fixtures/jira/transitions.json")),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/api/3/issue/P-1/transitions"))
            .and(body_json(json!({"transition": {"id": "21"}})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/agile/1.0/sprint/3/issue"))
            .and(body_json(json!({"issues": ["P-1"]})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let applied = against(&server, |client| {
            let applied = client.apply_transition("P-1", "done")?;
            client.add_issue_to_sprint(3, "P-1")?;
            Ok::<_, Error>(applied)
        })
        .await
        .unwrap();
        assert_eq!(applied.id, "21");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
        for request in &requests {
            // base64("a@b:t")
            assert_eq!(request.headers.get("authorization").unwrap(), "Basic YUBiOnQ=");
        }
        assert!(requests[0].headers.get("content-type").is_none());
        assert!(requests[0].body.is_empty());
        for request in &requests[1..] {
            assert_eq!(request.headers.get("content-type").unwrap(), "application/json");
        }
        assert_eq!(
            String::from_utf8_lossy(&requests[1].body),
            r#"{"transition":{"id":"21"}}"#
        );
    }

    #[tokio::test]
    async fn test_search_request_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "jql": "assignee = currentUser() AND statusCategory != Done AND issuetype != Epic",
                "fields": ["summary", "customfield_10004", "issuetype", "status", "customfield_10007"],
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(include_str!("../../fixtures/jira/search.json")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let issues = against(&server, |client| client.fetch_assigned_issues())
            .await
            .unwrap();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].key, "PROJ-101");
    }

    #[tokio::test]
    async fn test_error_status_from_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"errorMessages":["nope"]}"#))
            .mount(&server)
            .await;

        let err = against(&server, |client| client.fetch_transitions("P-404"))
            .await
            .unwrap_err();
        match err {
            Error::Remote { status, text } => {
                assert_eq!(status, 404);
                assert_eq!(text, "Not Found");
            }
            other => panic!("Expected Remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = against(&server, |client| client.fetch_transitions("P-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
