//! Recruitment application intake: validation, storage, and chat webhook notification.

pub mod csv_store;
pub mod domain;
pub mod notifier;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use csv_store::CsvApplicationRepository;
pub use domain::{Application, ApplicationForm, ApplicationId, RawApplication, SubmissionReceipt};
pub use notifier::{Embed, EmbedField, Notifier, NotifierError, WebhookMessage, WebhookNotifier};
pub use repository::{ApplicationRepository, InMemoryApplicationRepository, RepositoryError};
pub use router::recruitment_router;
pub use service::{ErrorKind, RecruitmentService, SubmissionError};
pub use validation::{validate, FieldError, ValidationError};
