use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::workflows::recruitment::domain::{
    Application, ApplicationForm, ApplicationId, RawApplication,
};
use crate::workflows::recruitment::notifier::{Notifier, NotifierError, WebhookMessage};
use crate::workflows::recruitment::repository::{
    ApplicationRepository, InMemoryApplicationRepository, RepositoryError,
};
use crate::workflows::recruitment::{recruitment_router, RecruitmentService};

pub(super) fn valid_raw() -> RawApplication {
    serde_json::from_value(json!({
        "name": "TestUser",
        "age": 18,
        "worksElsewhere": true,
        "externalChatId": "123456789",
        "referredBy": "Recruiter",
    }))
    .expect("valid raw application")
}

pub(super) fn blank_raw() -> RawApplication {
    serde_json::from_value(json!({
        "name": "",
        "age": 0,
        "worksElsewhere": false,
        "externalChatId": "",
        "referredBy": "",
    }))
    .expect("blank raw application")
}

pub(super) fn valid_form() -> ApplicationForm {
    ApplicationForm {
        name: "TestUser".to_string(),
        age: 18,
        works_elsewhere: true,
        external_chat_id: "123456789".to_string(),
        referred_by: "Recruiter".to_string(),
    }
}

pub(super) fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 5)
        .single()
        .expect("valid timestamp")
}

pub(super) fn stored_application() -> Application {
    Application::from_form(ApplicationId::from_sequence(7), valid_form(), submitted_at())
}

/// How a scripted notifier answers `send`.
#[derive(Debug, Clone, Copy)]
pub(super) enum Delivery {
    Accept,
    NotConfigured,
    Reject(u16),
    Offline,
}

pub(super) struct ScriptedNotifier {
    delivery: Delivery,
    messages: Mutex<Vec<WebhookMessage>>,
}

impl ScriptedNotifier {
    pub(super) fn new(delivery: Delivery) -> Self {
        Self {
            delivery,
            messages: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn messages(&self) -> Vec<WebhookMessage> {
        self.messages.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl Notifier for ScriptedNotifier {
    async fn send(&self, message: &WebhookMessage) -> Result<(), NotifierError> {
        self.messages
            .lock()
            .expect("notifier mutex poisoned")
            .push(message.clone());
        match self.delivery {
            Delivery::Accept => Ok(()),
            Delivery::NotConfigured => Err(NotifierError::NotConfigured),
            Delivery::Reject(status) => Err(NotifierError::Rejected { status }),
            Delivery::Offline => Err(NotifierError::Transport),
        }
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(
        &self,
        _form: ApplicationForm,
        _submitted_at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type TestService = RecruitmentService<InMemoryApplicationRepository, ScriptedNotifier>;

pub(super) fn build_service(
    delivery: Delivery,
) -> (
    TestService,
    Arc<InMemoryApplicationRepository>,
    Arc<ScriptedNotifier>,
) {
    let repository = Arc::new(InMemoryApplicationRepository::new());
    let notifier = Arc::new(ScriptedNotifier::new(delivery));
    let service = RecruitmentService::new(repository.clone(), notifier.clone());
    (service, repository, notifier)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    recruitment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
