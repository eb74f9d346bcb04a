//! Persistence Model (SPEC_FULL.md §4.3): typed per-entity repositories over
//! a MongoDB document store, each exposing static async methods returning
//! `Result<T, PipelineError>`.

mod contest_repo;
mod question_repo;
mod record_repo;
mod submission_repo;
mod user_repo;

pub use contest_repo::ContestRepo;
pub use question_repo::QuestionRepo;
pub use record_repo::{ArchiveRepo, PredictRepo};
pub use submission_repo::SubmissionRepo;
pub use user_repo::UserRepo;

use mongodb::{Client, Database};

use crate::config::Config;
use crate::error::PipelineError;

/// Handle to the document store, bundling the Mongo client/db with the
/// per-entity repositories that operate on it.
#[derive(Clone)]
pub struct Store {
    pub db: Database,
}

impl Store {
    pub async fn connect(cfg: &Config) -> Result<Self, PipelineError> {
        let client = Client::with_uri_str(cfg.mongodb.connection_string())
            .await
            .map_err(PipelineError::from)?;
        let db = client.database(&cfg.mongodb.db);
        Ok(Self { db })
    }

    pub fn contests(&self) -> ContestRepo {
        ContestRepo::new(self.db.clone())
    }

    pub fn predict_records(&self) -> PredictRepo {
        PredictRepo::new(self.db.clone())
    }

    pub fn archive_records(&self) -> ArchiveRepo {
        ArchiveRepo::new(self.db.clone())
    }

    pub fn users(&self) -> UserRepo {
        UserRepo::new(self.db.clone())
    }

    pub fn questions(&self) -> QuestionRepo {
        QuestionRepo::new(self.db.clone())
    }

    pub fn submissions(&self) -> SubmissionRepo {
        SubmissionRepo::new(self.db.clone())
    }

    /// Creates the indexes named in SPEC_FULL.md §4.3. Safe to call on every
    /// startup; `create_index` is idempotent for an unchanged definition.
    pub async fn ensure_indexes(&self) -> Result<(), PipelineError> {
        self.contests().ensure_indexes().await?;
        self.predict_records().ensure_indexes().await?;
        self.archive_records().ensure_indexes().await?;
        self.users().ensure_indexes().await?;
        self.questions().ensure_indexes().await?;
        self.submissions().ensure_indexes().await?;
        Ok(())
    }
}
