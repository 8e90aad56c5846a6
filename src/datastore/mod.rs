//! Typed client for the hosted data-store REST API.
//!
//! Every table lives in the managed platform; this client issues simple
//! filtered selects, inserts, and updates against it. Reads retry a couple of
//! times with jittered backoff, writes do not.

pub mod types;

use anyhow::{anyhow, Context, Result};
use rand::Rng;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use types::{
    CarouselItem, CustomerServiceSettings, Job, LocationInfo, NewJob, NewResume, Resume,
    ResumeStatus,
};

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

const READ_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_millis(200);

/// Build the `or=` filter the job search uses: title, description, and tags.
fn search_filter(keyword: &str) -> String {
    format!("(title.ilike.*{keyword}*,description.ilike.*{keyword}*,tags.cs.{{{keyword}}})")
}

fn backoff_delay(attempt: u32) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(8);
    let delay = BACKOFF_BASE.checked_mul(factor).unwrap_or(BACKOFF_BASE);
    jitter_delay(delay)
}

fn jitter_delay(delay: Duration) -> Duration {
    let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    if delay_ms < 2 {
        return delay;
    }
    let half = delay_ms / 2;
    let jitter = rand::thread_rng().gen_range(0..=half);
    Duration::from_millis(half + jitter)
}

pub struct Datastore {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl Datastore {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(backend_url: &str, api_key: SecretString) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("Failed to build datastore HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}/rest/v1", backend_url.trim_end_matches('/')),
            api_key,
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{table}", self.base_url))
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
    }

    async fn read_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut last_error = anyhow!("no attempts made");
        for attempt in 1..=READ_ATTEMPTS {
            if attempt > 1 {
                let delay = backoff_delay(attempt);
                debug!("Retrying {table} read in {}ms", delay.as_millis());
                sleep(delay).await;
            }

            let result = self
                .request(Method::GET, table)
                .query(query)
                .send()
                .await
                .context("datastore request failed");

            match result {
                Ok(response) if response.status().is_server_error() => {
                    last_error = anyhow!("datastore returned {}", response.status());
                    warn!("Read from {table} failed: {last_error}");
                }
                Ok(response) => return Self::decode(response).await,
                Err(err) => {
                    warn!("Read from {table} failed: {err}");
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<Vec<T>> {
        let status = response.status();
        if !status.is_success() {
            return Err(table_error(status, response).await);
        }
        response
            .json()
            .await
            .context("Failed to decode datastore rows")
    }

    async fn execute(request: RequestBuilder) -> Result<()> {
        let response = request.send().await.context("datastore request failed")?;
        let status = response.status();
        if !status.is_success() {
            return Err(table_error(status, response).await);
        }
        Ok(())
    }

    // --- jobs ---

    /// Newest-first job listing, optionally filtered by a search keyword over
    /// title, description, and tags.
    pub async fn list_jobs(&self, search: Option<&str>) -> Result<Vec<Job>> {
        let keyword = search.map(str::trim).filter(|kw| !kw.is_empty());
        let filter = keyword.map(search_filter);
        let mut query = vec![("select", "*"), ("order", "created_at.desc")];
        if let Some(filter) = filter.as_deref() {
            query.push(("or", filter));
        }
        self.read_rows("jobs", &query).await
    }

    pub async fn job(&self, id: Uuid) -> Result<Option<Job>> {
        let id_filter = format!("eq.{id}");
        let rows: Vec<Job> = self
            .read_rows("jobs", &[("select", "*"), ("id", &id_filter), ("limit", "1")])
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn jobs_by_location(&self, location: &str) -> Result<Vec<Job>> {
        let location_filter = format!("eq.{location}");
        self.read_rows(
            "jobs",
            &[
                ("select", "*"),
                ("location", &location_filter),
                ("order", "created_at.desc"),
            ],
        )
        .await
    }

    pub async fn create_job(&self, job: &NewJob) -> Result<Job> {
        let response = self
            .request(Method::POST, "jobs")
            .header("Prefer", "return=representation")
            .json(job)
            .send()
            .await
            .context("datastore request failed")?;
        let rows: Vec<Job> = Self::decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("insert returned no row"))
    }

    pub async fn update_job(&self, id: Uuid, job: &NewJob) -> Result<()> {
        Self::execute(
            self.request(Method::PATCH, "jobs")
                .query(&[("id", format!("eq.{id}"))])
                .json(job),
        )
        .await
    }

    pub async fn delete_job(&self, id: Uuid) -> Result<()> {
        Self::execute(
            self.request(Method::DELETE, "jobs")
                .query(&[("id", format!("eq.{id}"))]),
        )
        .await
    }

    // --- resumes ---

    pub async fn resumes(&self) -> Result<Vec<Resume>> {
        self.read_rows(
            "resumes",
            &[("select", "*"), ("order", "submitted_at.desc")],
        )
        .await
    }

    pub async fn resume_for_user(&self, user_id: &str) -> Result<Option<Resume>> {
        let user_filter = format!("eq.{user_id}");
        let rows: Vec<Resume> = self
            .read_rows(
                "resumes",
                &[("select", "*"), ("user_id", &user_filter), ("limit", "1")],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn insert_resume(&self, resume: &NewResume) -> Result<()> {
        Self::execute(self.request(Method::POST, "resumes").json(resume)).await
    }

    pub async fn update_resume_status(&self, id: i64, status: ResumeStatus) -> Result<()> {
        Self::execute(
            self.request(Method::PATCH, "resumes")
                .query(&[("id", format!("eq.{id}"))])
                .json(&json!({ "status": status })),
        )
        .await
    }

    // --- locations, settings, carousel ---

    pub async fn location_infos(&self) -> Result<Vec<LocationInfo>> {
        self.read_rows(
            "location_infos",
            &[("select", "location_key,vacancy_count")],
        )
        .await
    }

    pub async fn customer_service_settings(&self) -> Result<Option<CustomerServiceSettings>> {
        let rows: Vec<CustomerServiceSettings> = self
            .read_rows(
                "customer_service_settings",
                &[("select", "*"), ("limit", "1")],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Update the single settings row when it exists, insert it otherwise.
    pub async fn upsert_customer_service(
        &self,
        whatsapp_link: &str,
        telegram_link: &str,
    ) -> Result<()> {
        let payload = json!({
            "whatsapp_link": whatsapp_link,
            "telegram_link": telegram_link,
        });

        match self.customer_service_settings().await? {
            Some(CustomerServiceSettings { id: Some(id), .. }) => {
                Self::execute(
                    self.request(Method::PATCH, "customer_service_settings")
                        .query(&[("id", format!("eq.{id}"))])
                        .json(&payload),
                )
                .await
            }
            _ => {
                Self::execute(
                    self.request(Method::POST, "customer_service_settings")
                        .json(&payload),
                )
                .await
            }
        }
    }

    pub async fn carousel_items(&self) -> Result<Vec<CarouselItem>> {
        self.read_rows(
            "carousel_items",
            &[("select", "*"), ("order", "sort_order.asc")],
        )
        .await
    }

    /// Cheap reachability probe for /health.
    pub async fn ping(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/", self.base_url))
            .header("apikey", self.api_key.expose_secret())
            .send()
            .await;
        match result {
            Ok(response) => !response.status().is_server_error(),
            Err(err) => {
                warn!("Datastore ping failed: {err}");
                false
            }
        }
    }
}

async fn table_error(status: StatusCode, response: reqwest::Response) -> anyhow::Error {
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if message.is_empty() {
        anyhow!("datastore returned {status}")
    } else {
        anyhow!("datastore returned {status}: {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_filter_covers_title_description_and_tags() {
        let filter = search_filter("welder");
        assert_eq!(
            filter,
            "(title.ilike.*welder*,description.ilike.*welder*,tags.cs.{welder})"
        );
    }

    #[test]
    fn backoff_delay_is_bounded_and_positive() {
        for attempt in 1..=5 {
            let delay = backoff_delay(attempt);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_secs(60));
        }
    }

    #[test]
    fn base_url_is_rooted_at_rest_v1() -> Result<()> {
        let store = Datastore::new(
            "https://backend.example.com/",
            SecretString::from("service".to_string()),
        )?;
        assert_eq!(store.base_url, "https://backend.example.com/rest/v1");
        Ok(())
    }
}
