use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier assigned by the repository when an application is stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("app-{sequence:06}"))
    }

    /// Sequence number encoded in the identifier, if it follows the `app-NNNNNN` shape.
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix("app-")?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Form payload exactly as posted. Every field is optional here so that gaps surface as
/// validation errors rather than deserialization rejections.
///
/// `age` and `works_elsewhere` stay loosely typed: the web form posts the raw text of its age
/// input and the value of a yes/no select.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawApplication {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub works_elsewhere: Option<Value>,
    #[serde(default)]
    pub external_chat_id: Option<String>,
    #[serde(default)]
    pub referred_by: Option<String>,
}

/// Validated and trimmed application fields, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    pub name: String,
    pub age: u32,
    pub works_elsewhere: bool,
    pub external_chat_id: String,
    pub referred_by: String,
}

/// A stored recruitment application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub name: String,
    pub age: u32,
    pub works_elsewhere: bool,
    pub external_chat_id: String,
    pub referred_by: String,
    pub submitted_at: DateTime<Utc>,
}

impl Application {
    pub fn from_form(
        id: ApplicationId,
        form: ApplicationForm,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let ApplicationForm {
            name,
            age,
            works_elsewhere,
            external_chat_id,
            referred_by,
        } = form;

        Self {
            id,
            name,
            age,
            works_elsewhere,
            external_chat_id,
            referred_by,
            submitted_at,
        }
    }

    pub fn form(&self) -> ApplicationForm {
        ApplicationForm {
            name: self.name.clone(),
            age: self.age,
            works_elsewhere: self.works_elsewhere,
            external_chat_id: self.external_chat_id.clone(),
            referred_by: self.referred_by.clone(),
        }
    }
}

/// Success body returned to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub success: bool,
    pub application_id: ApplicationId,
}

impl SubmissionReceipt {
    pub fn accepted(application_id: ApplicationId) -> Self {
        Self {
            success: true,
            application_id,
        }
    }
}
