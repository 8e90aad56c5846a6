//! Row types for the hosted tables.
//!
//! Column names follow the deployed schema, including its mixed casing
//! (`fullName`, `coverLetter`); serde renames keep the Rust side idiomatic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone, Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub working_hours: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub rich_description: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Insert/update payload for a job posting.
#[derive(Clone, Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub working_hours: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub rich_description: Option<Value>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct Resume {
    pub id: i64,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub skills: String,
    #[serde(rename = "coverLetter", default)]
    pub cover_letter: String,
    pub user_id: String,
    pub status: ResumeStatus,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

/// Insert payload for a resume. `submitted_at` is stamped by the table
/// default; `status` always starts as `pending`.
#[derive(Clone, Debug, Serialize)]
pub struct NewResume {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub education: String,
    pub experience: String,
    pub skills: String,
    #[serde(rename = "coverLetter")]
    pub cover_letter: String,
    pub user_id: String,
    pub status: ResumeStatus,
}

#[derive(Clone, Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LocationInfo {
    pub location_key: String,
    #[serde(default)]
    pub vacancy_count: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CustomerServiceSettings {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub whatsapp_link: String,
    #[serde(default)]
    pub telegram_link: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CarouselItem {
    pub id: i64,
    pub image_url: String,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_columns_keep_schema_casing() -> anyhow::Result<()> {
        let resume = NewResume {
            full_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            education: "PhD".to_string(),
            experience: "10y".to_string(),
            skills: "Rust".to_string(),
            cover_letter: "Hello".to_string(),
            user_id: "uid".to_string(),
            status: ResumeStatus::Pending,
        };
        let value = serde_json::to_value(&resume)?;
        assert_eq!(value["fullName"], "Ada");
        assert_eq!(value["coverLetter"], "Hello");
        assert_eq!(value["status"], "pending");
        Ok(())
    }

    #[test]
    fn resume_status_round_trips_lowercase() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_value(ResumeStatus::Approved)?, "approved");
        let status: ResumeStatus = serde_json::from_value(serde_json::json!("rejected"))?;
        assert_eq!(status, ResumeStatus::Rejected);
        Ok(())
    }

    #[test]
    fn job_tolerates_missing_optional_columns() -> anyhow::Result<()> {
        let job: Job = serde_json::from_value(serde_json::json!({
            "id": "7a1e1b2c-0b0a-4a4e-8a3e-0a1b2c3d4e5f",
            "title": "Welder"
        }))?;
        assert_eq!(job.title, "Welder");
        assert!(job.location.is_none());
        assert_eq!(job.salary, "");
        Ok(())
    }
}
