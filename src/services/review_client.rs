use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::proposal::Proposal;
use crate::services::release_client::{
    describe_request_error, ensure_success, user_agent, GITHUB_ACCEPT, GITHUB_API_VERSION,
};
use crate::utils::config::UpdaterConfig;
use crate::utils::error::{Result, UpdateError};

/// Pull request as returned by the proposal service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    #[serde(default)]
    pub state: String,
    pub title: Option<String>,
    pub head: Option<PullRequestRef>,
}

/// Branch reference of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    #[serde(rename = "ref")]
    pub branch: String,
}

/// Creation payload
#[derive(Debug, Serialize)]
struct NewPullRequest<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

/// Proposal service client for the repository proposals are opened against
#[derive(Debug, Clone)]
pub struct ReviewClient {
    client: Client,
    api_url: String,
    repository: String,
    /// Identity owning proposal branches, used in the `head` filter
    owner: String,
    user_agent: String,
}

impl ReviewClient {
    pub fn new(config: &UpdaterConfig) -> Result<Self> {
        Self::with_api_url(
            config.api_url.clone(),
            config.proposal_repository.clone(),
            config.proposal_owner.clone(),
            config.http_timeout(),
        )
    }

    /// Create a client against a custom API URL (for testing)
    pub fn with_api_url(
        api_url: String,
        repository: String,
        owner: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpdateError::Publish(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            repository,
            owner,
            user_agent: user_agent(),
        })
    }

    fn pulls_url(&self) -> String {
        format!("{}/repos/{}/pulls", self.api_url, self.repository)
    }

    fn request(&self, builder: RequestBuilder, credential: Option<&str>) -> RequestBuilder {
        let builder = builder
            .header("User-Agent", &self.user_agent)
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
        match credential {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Open proposal whose source branch is `branch`, if any
    pub async fn find_open(&self, branch: &str, credential: Option<&str>) -> Result<Option<PullRequest>> {
        let url = self.pulls_url();
        let head = format!("{}:{}", self.owner, branch);
        debug!("GET {url}?head={head}&state=open");

        let response = self
            .request(self.client.get(&url), credential)
            .query(&[("head", head.as_str()), ("state", "open")])
            .send()
            .await
            .map_err(|e| UpdateError::Publish(describe_request_error("GET", &url, &e)))?;

        let response = ensure_success("GET", &url, response)
            .await
            .map_err(UpdateError::Publish)?;

        let pulls: Vec<PullRequest> = response
            .json()
            .await
            .map_err(|e| UpdateError::Publish(format!("Failed to parse pull requests from {url}: {e}")))?;

        Ok(pulls.into_iter().next())
    }

    /// Open a new proposal
    pub async fn create(&self, proposal: &Proposal, credential: &str) -> Result<PullRequest> {
        let url = self.pulls_url();
        let payload = NewPullRequest {
            title: &proposal.title,
            body: &proposal.body,
            head: &proposal.branch,
            base: &proposal.base,
        };
        debug!("POST {url} head={} base={}", proposal.branch, proposal.base);

        let response = self
            .request(self.client.post(&url), Some(credential))
            .json(&payload)
            .send()
            .await
            .map_err(|e| UpdateError::Publish(describe_request_error("POST", &url, &e)))?;

        let response = ensure_success("POST", &url, response)
            .await
            .map_err(UpdateError::Publish)?;

        response
            .json()
            .await
            .map_err(|e| UpdateError::Publish(format!("Failed to parse created pull request: {e}")))
    }
}
