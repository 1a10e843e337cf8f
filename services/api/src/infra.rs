use chrono::{DateTime, Utc};
use crew_intake::config::{NotifierConfig, StorageConfig};
use crew_intake::error::AppError;
use crew_intake::workflows::recruitment::{
    Application, ApplicationForm, ApplicationId, ApplicationRepository, CsvApplicationRepository,
    InMemoryApplicationRepository, RecruitmentService, RepositoryError, WebhookNotifier,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

pub(crate) type IntakeService = RecruitmentService<ConfiguredRepository, WebhookNotifier>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store selected by `APP_STORAGE_PATH`.
pub(crate) enum ConfiguredRepository {
    Memory(InMemoryApplicationRepository),
    Csv(CsvApplicationRepository),
}

impl ConfiguredRepository {
    pub(crate) fn from_config(config: &StorageConfig) -> Result<Self, RepositoryError> {
        match &config.csv_path {
            Some(path) => CsvApplicationRepository::open(path).map(Self::Csv),
            None => Ok(Self::Memory(InMemoryApplicationRepository::new())),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Memory(_) => "in-memory".to_string(),
            Self::Csv(store) => format!("csv:{}", store.path().display()),
        }
    }
}

impl ApplicationRepository for ConfiguredRepository {
    fn insert(
        &self,
        form: ApplicationForm,
        submitted_at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        match self {
            Self::Memory(store) => store.insert(form, submitted_at),
            Self::Csv(store) => store.insert(form, submitted_at),
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        match self {
            Self::Memory(store) => store.fetch(id),
            Self::Csv(store) => store.fetch(id),
        }
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        match self {
            Self::Memory(store) => store.list(),
            Self::Csv(store) => store.list(),
        }
    }
}

pub(crate) fn build_service(
    repository: Arc<ConfiguredRepository>,
    notifier: &NotifierConfig,
) -> Result<IntakeService, AppError> {
    let webhook = WebhookNotifier::new(notifier)?;
    if !webhook.is_configured() {
        warn!("no webhook URL configured; submissions will be stored but fail to notify");
    }
    let webhook = Arc::new(webhook);
    Ok(RecruitmentService::new(repository, webhook).with_title(notifier.title.clone()))
}
