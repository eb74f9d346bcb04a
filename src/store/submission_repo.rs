use chrono::{DateTime, Utc};
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

use crate::domain::{DataRegion, Submission};
use crate::error::PipelineError;

#[derive(Clone)]
pub struct SubmissionRepo {
    coll: Collection<Submission>,
}

impl SubmissionRepo {
    pub fn new(db: Database) -> Self {
        Self {
            coll: db.collection("submissions"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), PipelineError> {
        let index = IndexModel::builder()
            .keys(doc! {
                "contest_slug": 1, "data_region": 1, "username": 1, "question_id": 1,
            })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.coll.create_index(index).await?;
        Ok(())
    }

    /// Upserts a submission, merging `fail_count`/`credit` from the latest
    /// crawl (SPEC_FULL.md §4.6 `saveSubmission`).
    pub async fn upsert(&self, row: &Submission) -> Result<(), PipelineError> {
        let filter = doc! {
            "contest_slug": &row.contest_slug,
            "data_region": row.data_region.as_str(),
            "username": &row.username,
            "question_id": row.question_id as i64,
        };
        let update = doc! { "$set": mongodb::bson::to_document(row)? };
        self.coll.update_one(filter, update).upsert(true).await?;
        Ok(())
    }

    pub async fn tombstone_sweep(
        &self,
        contest_slug: &str,
        region: DataRegion,
        before: DateTime<Utc>,
    ) -> Result<u64, PipelineError> {
        let result = self
            .coll
            .delete_many(doc! {
                "contest_slug": contest_slug,
                "data_region": region.as_str(),
                "update_time": { "$lt": mongodb::bson::to_bson(&before)? },
            })
            .await?;
        Ok(result.deleted_count)
    }

    pub async fn find_by_contest(
        &self,
        contest_slug: &str,
    ) -> Result<Vec<Submission>, PipelineError> {
        use futures_util::TryStreamExt;
        let cursor = self
            .coll
            .find(doc! { "contest_slug": contest_slug })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
