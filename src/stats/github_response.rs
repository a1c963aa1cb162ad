//! Shapes of the GitHub REST payloads, reduced to the fields the dashboard reads.
//!
//! Every field defaults, so missing or null values never fail a whole response.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubUser {
    pub login: String,
    pub public_repos: u32,
    pub followers: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubRepo {
    pub name: String,
    pub full_name: String,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: GithubEventRepo,
    pub created_at: String,
    pub payload: GithubEventPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubEventRepo {
    /// `owner/name`
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubEventPayload {
    pub commits: Option<Vec<serde_json::Value>>,
    pub ref_type: Option<String>,
    pub action: Option<String>,
}

impl GithubEvent {
    pub fn commit_count(&self) -> Option<usize> {
        self.payload.commits.as_ref().map(Vec::len)
    }

    /// Repository name without the owner.
    pub fn repo_short_name(&self) -> &str {
        match self.repo.name.split_once('/') {
            Some((_, name)) => name,
            None => self.repo.name.as_str(),
        }
    }
}
