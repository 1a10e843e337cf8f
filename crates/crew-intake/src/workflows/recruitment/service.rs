use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use super::domain::{Application, ApplicationId, RawApplication, SubmissionReceipt};
use super::notifier::{Notifier, NotifierError, WebhookMessage};
use super::repository::{ApplicationRepository, RepositoryError};
use super::validation::{validate, ValidationError};
use crate::config::DEFAULT_WEBHOOK_TITLE;

/// Service composing validation, the application store, and the chat notifier.
///
/// Stages run in a fixed order: validate, persist, notify. A stored application is kept even
/// when the notification afterwards fails.
pub struct RecruitmentService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    title: String,
}

impl<R, N> RecruitmentService<R, N>
where
    R: ApplicationRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            notifier,
            title: DEFAULT_WEBHOOK_TITLE.to_string(),
        }
    }

    /// Override the embed title used for notifications.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub async fn submit(&self, raw: RawApplication) -> Result<SubmissionReceipt, SubmissionError> {
        let form = validate(raw)?;

        let application = self
            .repository
            .insert(form, Utc::now())
            .map_err(|err| {
                error!(error = %err, "failed to store application");
                SubmissionError::Persistence(err)
            })?;
        info!(application_id = %application.id, "application stored");

        let message = WebhookMessage::for_application(&application, &self.title);
        if let Err(err) = self.notifier.send(&message).await {
            warn!(
                application_id = %application.id,
                error = %err,
                "application stored but notification failed"
            );
            return Err(SubmissionError::from_notifier(application.id, err));
        }

        info!(application_id = %application.id, "application notification delivered");
        Ok(SubmissionReceipt::accepted(application.id))
    }

    /// Fetch a stored application.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.repository.fetch(application_id)
    }
}

/// Machine-readable failure class reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    PersistenceError,
    ConfigurationError,
    DeliveryError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::PersistenceError => "PersistenceError",
            Self::ConfigurationError => "ConfigurationError",
            Self::DeliveryError => "DeliveryError",
        }
    }

    /// Whether the submitter caused the failure (as opposed to the deployment).
    pub fn is_client_error(self) -> bool {
        matches!(self, Self::ValidationError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by the recruitment service.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to store application")]
    Persistence(#[source] RepositoryError),
    #[error("notification webhook is not configured")]
    Configuration { application_id: ApplicationId },
    #[error("failed to deliver application notification")]
    Delivery {
        application_id: ApplicationId,
        #[source]
        source: NotifierError,
    },
}

impl SubmissionError {
    fn from_notifier(application_id: ApplicationId, err: NotifierError) -> Self {
        match err {
            NotifierError::NotConfigured => Self::Configuration { application_id },
            source @ (NotifierError::Rejected { .. } | NotifierError::Transport) => {
                Self::Delivery {
                    application_id,
                    source,
                }
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Persistence(_) => ErrorKind::PersistenceError,
            Self::Configuration { .. } => ErrorKind::ConfigurationError,
            Self::Delivery { .. } => ErrorKind::DeliveryError,
        }
    }

    /// Id of the application that was stored before the failure, if any.
    pub fn stored_application(&self) -> Option<&ApplicationId> {
        match self {
            Self::Configuration { application_id } | Self::Delivery { application_id, .. } => {
                Some(application_id)
            }
            Self::Validation(_) | Self::Persistence(_) => None,
        }
    }
}
