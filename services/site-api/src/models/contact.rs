//! Contact submission models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored contact-form entry
///
/// Only `is_attended` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub is_attended: bool,
}

/// Public contact form payload
///
/// Missing fields deserialize as empty strings so they fail validation with
/// a field-specific message instead of a generic body error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Contact creation payload
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    /// Assigned at creation when absent
    pub id: Option<Uuid>,
    /// Assigned at creation when absent
    pub created_at: Option<DateTime<Utc>>,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl NewContact {
    pub fn from_submission(
        submission: ContactSubmission,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) -> Self {
        Self {
            id: None,
            created_at: None,
            name: submission.name,
            email: submission.email,
            subject: submission.subject,
            message: submission.message,
            user_agent,
            ip_address,
        }
    }
}

/// Attended flag update payload
#[derive(Debug, Clone, Deserialize)]
pub struct AttendedUpdate {
    #[serde(rename = "isAttended")]
    pub is_attended: bool,
}
