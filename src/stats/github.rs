use std::time::Duration;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use spdlog::{debug, error};

use crate::config::GithubSettings;
use crate::stats::github_response::{GithubEvent, GithubRepo, GithubUser};
use crate::stats::{StatsError, StatsResult};

const ACTIVITY_LIMIT: usize = 3;
const LANGUAGE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubStats {
    pub total_commits: u64,
    pub public_repos: u32,
    pub total_stars: u64,
    pub recent_activity: Vec<Activity>,
    pub top_languages: Vec<LanguageShare>,
    pub contributions_this_year: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: String,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub name: String,
    pub percentage: u32,
}

#[derive(Clone, Debug)]
pub struct GithubClient {
    base_url: String,
    username: String,
    headers: HeaderMap,
    timeout: Duration,
    http: reqwest::Client,
}

impl GithubClient {
    pub fn new(settings: &GithubSettings) -> StatsResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(concat!("folio/", env!("CARGO_PKG_VERSION"))));
        if let Some(ref token) = settings.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| StatsError::Header("Authorization"))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(GithubClient {
            base_url: settings.api_base.trim_end_matches('/').to_string(),
            username: settings.username.clone(),
            headers,
            timeout: Duration::from_millis(settings.timeout_ms),
            http: reqwest::Client::new(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> StatsResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|source| StatsError::Http { message: format!("Failed to request {}", url), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::Status { url, status });
        }

        let text = response
            .text()
            .await
            .map_err(|source| StatsError::Http { message: format!("Failed to read {}", url), source })?;

        serde_json::from_str(&text)
            .map_err(|source| StatsError::Decode { message: format!("Unexpected payload from {}", url), source })
    }

    /// Profile, recently updated repositories and recent public events, fetched together.
    pub async fn fetch(&self) -> StatsResult<(GithubUser, Vec<GithubRepo>, Vec<GithubEvent>)> {
        let user_path = format!("users/{}", self.username);
        let repos_path = format!("users/{}/repos?sort=updated&per_page=30", self.username);
        let events_path = format!("users/{}/events?per_page=30", self.username);

        let requests = async {
            futures::try_join!(
                self.get_json::<GithubUser>(&user_path),
                self.get_json::<Vec<GithubRepo>>(&repos_path),
                self.get_json::<Vec<GithubEvent>>(&events_path),
            )
        };

        match tokio::time::timeout(self.timeout, requests).await {
            Ok(result) => result,
            Err(_) => Err(StatsError::Timeout(self.timeout)),
        }
    }
}

/// Dashboard numbers for the configured account. Never fails: without a client, or when
/// GitHub cannot be reached in time, the fixed fallback is returned.
pub async fn github_stats(client: Option<&GithubClient>, now: DateTime<Utc>) -> GithubStats {
    let Some(client) = client else {
        debug!("No [github] section configured. Serving fallback GitHub stats");
        return fallback(now);
    };

    match client.fetch().await {
        Ok((user, repos, events)) => summarize(&user, &repos, &events, now),
        Err(e) => {
            error!("Error fetching GitHub stats for {}: {}", client.username, e);
            fallback(now)
        }
    }
}

/// Derives the dashboard numbers from raw GitHub payloads.
///
/// The API has no lifetime commit or contribution counts, so both are estimated from the
/// recent events: ten times the pushed commits (at least 100), and two per event this year.
pub fn summarize(user: &GithubUser, repos: &[GithubRepo], events: &[GithubEvent], now: DateTime<Utc>) -> GithubStats {
    let total_stars = repos.iter().map(|repo| repo.stargazers_count).sum();

    let recent_activity = events
        .iter()
        .filter_map(|event| {
            describe(event).map(|description| Activity {
                kind: event.kind.clone(),
                repo: event.repo_short_name().to_string(),
                date: event.created_at.clone(),
                description,
            })
        })
        .take(ACTIVITY_LIMIT)
        .collect();

    let pushed_commits: u64 = events
        .iter()
        .filter(|event| event.kind == "PushEvent")
        .map(|event| event.commit_count().unwrap_or(0) as u64)
        .sum();

    let events_this_year = events
        .iter()
        .filter(|event| {
            DateTime::parse_from_rfc3339(&event.created_at)
                .map(|date| date.with_timezone(&Utc).year() == now.year())
                .unwrap_or(false)
        })
        .count() as u64;

    GithubStats {
        total_commits: (pushed_commits * 10).max(100),
        public_repos: user.public_repos,
        total_stars,
        recent_activity,
        top_languages: top_languages(repos),
        contributions_this_year: events_this_year * 2,
    }
}

fn describe(event: &GithubEvent) -> Option<String> {
    let payload = &event.payload;
    let description = match event.kind.as_str() {
        "PushEvent" => {
            let commits = event.commit_count().unwrap_or(0).max(1);
            format!("Pushed {} commit{} to", commits, if commits > 1 { "s" } else { "" })
        }
        "CreateEvent" if payload.ref_type.as_deref() == Some("repository") => "Created repository".to_string(),
        "CreateEvent" => "Created branch in".to_string(),
        "PullRequestEvent" if payload.action.as_deref() == Some("opened") => "Opened PR in".to_string(),
        "PullRequestEvent" => "Updated PR in".to_string(),
        _ => return None,
    };
    Some(description)
}

/// Share of repositories per language, most used first. Ties keep first-seen order.
fn top_languages(repos: &[GithubRepo]) -> Vec<LanguageShare> {
    let mut counts: Vec<(&str, u32)> = vec![];
    for language in repos.iter().filter_map(|repo| repo.language.as_deref()) {
        match counts.iter_mut().find(|(name, _)| *name == language) {
            Some((_, count)) => *count += 1,
            None => counts.push((language, 1)),
        }
    }

    let total: u32 = counts.iter().map(|(_, count)| count).sum();
    let mut shares: Vec<LanguageShare> = counts
        .into_iter()
        .map(|(name, count)| LanguageShare {
            name: name.to_string(),
            percentage: (count as f64 * 100.0 / total as f64).round() as u32,
        })
        .collect();
    shares.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    shares.truncate(LANGUAGE_LIMIT);
    shares
}

pub fn fallback(now: DateTime<Utc>) -> GithubStats {
    let share = |name: &str, percentage| LanguageShare { name: name.to_string(), percentage };
    GithubStats {
        total_commits: 1200,
        public_repos: 25,
        total_stars: 150,
        recent_activity: vec![Activity {
            kind: "PushEvent".to_string(),
            repo: "portfolio-nextjs".to_string(),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            description: "Pushed 3 commits to".to_string(),
        }],
        top_languages: vec![
            share("TypeScript", 35),
            share("Python", 30),
            share("JavaScript", 20),
            share("CSS", 15),
        ],
        contributions_this_year: 250,
    }
}

/// Short relative age of an RFC 3339 timestamp, e.g. "5m ago". Older than a week shows the date.
///
/// Library API for front ends that print `Activity::date`. The JSON endpoint sends the raw date.
pub fn time_ago(date: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(date) else {
        return date.to_string();
    };
    let then = then.with_timezone(&Utc);
    let seconds = (now - then).num_seconds();

    match seconds {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 604_800 => format!("{}d ago", s / 86_400),
        _ => then.format("%Y-%m-%d").to_string(),
    }
}
