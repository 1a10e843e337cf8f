use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationForm, ApplicationId};
use super::repository::{ApplicationRepository, RepositoryError};

/// One line of the applications file. Kept flat so the csv crate can map it column by column.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRow {
    id: String,
    name: String,
    age: u32,
    works_elsewhere: bool,
    external_chat_id: String,
    referred_by: String,
    submitted_at: DateTime<Utc>,
}

impl From<&Application> for StoredRow {
    fn from(application: &Application) -> Self {
        Self {
            id: application.id.0.clone(),
            name: application.name.clone(),
            age: application.age,
            works_elsewhere: application.works_elsewhere,
            external_chat_id: application.external_chat_id.clone(),
            referred_by: application.referred_by.clone(),
            submitted_at: application.submitted_at,
        }
    }
}

impl From<StoredRow> for Application {
    fn from(row: StoredRow) -> Self {
        Self {
            id: ApplicationId(row.id),
            name: row.name,
            age: row.age,
            works_elsewhere: row.works_elsewhere,
            external_chat_id: row.external_chat_id,
            referred_by: row.referred_by,
            submitted_at: row.submitted_at,
        }
    }
}

/// Append-only CSV file store. Rows are never rewritten.
///
/// Ids are derived from the file itself under an exclusive file lock, so several handles (or
/// processes) may share one file.
#[derive(Debug)]
pub struct CsvApplicationRepository {
    path: PathBuf,
}

impl CsvApplicationRepository {
    /// Open (or lazily create) the store at `path`. Existing rows must parse.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let store = Self { path: path.into() };
        read_rows(&store.path)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_next(
        &self,
        file: &File,
        form: ApplicationForm,
        submitted_at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        let last_sequence = parse_rows(file, &self.path)?
            .iter()
            .filter_map(|application| application.id.sequence())
            .max()
            .unwrap_or(0);
        let application = Application::from_form(
            ApplicationId::from_sequence(last_sequence + 1),
            form,
            submitted_at,
        );

        let is_new = file
            .metadata()
            .map_err(|err| unavailable(&self.path, err))?
            .len()
            == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer
            .serialize(StoredRow::from(&application))
            .map_err(|err| unavailable(&self.path, err))?;
        writer.flush().map_err(|err| unavailable(&self.path, err))?;

        Ok(application)
    }
}

impl ApplicationRepository for CsvApplicationRepository {
    fn insert(
        &self,
        form: ApplicationForm,
        submitted_at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| unavailable(&self.path, err))?;
        // Released when `file` is dropped.
        FileExt::lock_exclusive(&file).map_err(|err| unavailable(&self.path, err))?;

        self.append_next(&file, form, submitted_at)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(read_rows(&self.path)?
            .into_iter()
            .find(|application| &application.id == id))
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        read_rows(&self.path)
    }
}

fn read_rows(path: &Path) -> Result<Vec<Application>, RepositoryError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(unavailable(path, err)),
    };
    FileExt::lock_shared(&file).map_err(|err| unavailable(path, err))?;

    parse_rows(&file, path)
}

fn parse_rows(file: &File, path: &Path) -> Result<Vec<Application>, RepositoryError> {
    let mut reader = csv::Reader::from_reader(file);
    reader
        .deserialize::<StoredRow>()
        .map(|row| row.map(Application::from).map_err(|err| unavailable(path, err)))
        .collect()
}

fn unavailable(path: &Path, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Unavailable(format!("{}: {err}", path.display()))
}
