use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{Application, ApplicationForm, ApplicationId};

/// Storage abstraction so the service can be exercised in isolation.
///
/// Implementations own id assignment: every successful `insert` yields an id never handed out
/// before by that store.
pub trait ApplicationRepository: Send + Sync {
    fn insert(
        &self,
        form: ApplicationForm,
        submitted_at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn list(&self) -> Result<Vec<Application>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct MemoryState {
    last_sequence: u64,
    records: BTreeMap<u64, Application>,
}

/// Process-local store used when no storage path is configured.
#[derive(Debug, Default, Clone)]
pub struct InMemoryApplicationRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.records.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(
        &self,
        form: ApplicationForm,
        submitted_at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;
        let sequence = state.last_sequence + 1;
        let application =
            Application::from_form(ApplicationId::from_sequence(sequence), form, submitted_at);
        state.last_sequence = sequence;
        state.records.insert(sequence, application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let state = self
            .state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;
        Ok(id
            .sequence()
            .and_then(|sequence| state.records.get(&sequence))
            .filter(|application| &application.id == id)
            .cloned())
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        let state = self
            .state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;
        Ok(state.records.values().cloned().collect())
    }
}
