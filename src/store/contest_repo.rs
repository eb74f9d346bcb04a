use chrono::{DateTime, Utc};
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};

use crate::domain::Contest;
use crate::error::PipelineError;

#[derive(Clone)]
pub struct ContestRepo {
    coll: Collection<Contest>,
}

impl ContestRepo {
    pub fn new(db: Database) -> Self {
        Self {
            coll: db.collection("contests"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), PipelineError> {
        let index = IndexModel::builder()
            .keys(doc! { "title_slug": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.coll.create_index(index).await?;
        Ok(())
    }

    /// Upserts a contest by `title_slug` (SPEC_FULL.md §4.3).
    pub async fn upsert(&self, contest: &Contest) -> Result<(), PipelineError> {
        let filter = doc! { "title_slug": &contest.title_slug };
        let update = doc! { "$set": mongodb::bson::to_document(contest)? };
        self.coll
            .find_one_and_update(filter, update)
            .with_options(
                FindOneAndUpdateOptions::builder()
                    .upsert(true)
                    .return_document(ReturnDocument::After)
                    .build(),
            )
            .await?;
        Ok(())
    }

    pub async fn find_by_slug(&self, title_slug: &str) -> Result<Option<Contest>, PipelineError> {
        Ok(self
            .coll
            .find_one(doc! { "title_slug": title_slug })
            .await?)
    }

    /// Stamps `predict_time` exactly once. Returns `false` if the contest was
    /// already predicted (idempotence invariant, SPEC_FULL.md §3/§8).
    pub async fn mark_predicted(
        &self,
        title_slug: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, PipelineError> {
        let filter = doc! { "title_slug": title_slug, "predict_time": mongodb::bson::Bson::Null };
        let update = doc! { "$set": { "predict_time": mongodb::bson::to_bson(&at)? } };
        let result = self.coll.update_one(filter, update).await?;
        Ok(result.modified_count == 1)
    }
}
