use chrono::{DateTime, Utc};
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

use crate::domain::{ContestRecordArchive, ContestRecordPredict, DataRegion};
use crate::error::PipelineError;

#[derive(Clone)]
pub struct PredictRepo {
    coll: Collection<ContestRecordPredict>,
}

impl PredictRepo {
    pub fn new(db: Database) -> Self {
        Self {
            coll: db.collection("contest_record_predict"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), PipelineError> {
        let index = IndexModel::builder()
            .keys(doc! { "key.contest_slug": 1, "key.data_region": 1, "key.username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.coll.create_index(index).await?;
        Ok(())
    }

    /// Delete-then-insert all predict rows for a (contest, region)
    /// (SPEC_FULL.md §4.6 `savePredictContestRecords`).
    pub async fn replace_all(
        &self,
        contest_slug: &str,
        region: DataRegion,
        rows: Vec<ContestRecordPredict>,
    ) -> Result<(), PipelineError> {
        self.coll
            .delete_many(doc! {
                "key.contest_slug": contest_slug,
                "key.data_region": region.as_str(),
            })
            .await?;
        if !rows.is_empty() {
            self.coll.insert_many(rows).await?;
        }
        Ok(())
    }

    pub async fn find_by_contest(
        &self,
        contest_slug: &str,
    ) -> Result<Vec<ContestRecordPredict>, PipelineError> {
        use futures_util::TryStreamExt;
        let cursor = self
            .coll
            .find(doc! { "key.contest_slug": contest_slug })
            .sort(doc! { "rank": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Writes back `old_rating`/`attended_contests_count` resolved from the
    /// User store before the Rating Engine runs.
    pub async fn fill_prior_rating(
        &self,
        contest_slug: &str,
        region: DataRegion,
        username: &str,
        old_rating: f64,
        attended_contests_count: u32,
    ) -> Result<(), PipelineError> {
        self.coll
            .update_one(
                doc! {
                    "key.contest_slug": contest_slug,
                    "key.data_region": region.as_str(),
                    "key.username": username,
                },
                doc! { "$set": { "old_rating": old_rating, "attended_contests_count": attended_contests_count } },
            )
            .await?;
        Ok(())
    }

    /// Writes back the Rating Engine's output for one participant.
    pub async fn apply_prediction(
        &self,
        contest_slug: &str,
        region: DataRegion,
        username: &str,
        delta_rating: f64,
        new_rating: f64,
        predict_time: DateTime<Utc>,
    ) -> Result<(), PipelineError> {
        self.coll
            .update_one(
                doc! {
                    "key.contest_slug": contest_slug,
                    "key.data_region": region.as_str(),
                    "key.username": username,
                },
                doc! { "$set": {
                    "delta_rating": delta_rating,
                    "new_rating": new_rating,
                    "predict_time": mongodb::bson::to_bson(&predict_time)?,
                } },
            )
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct ArchiveRepo {
    coll: Collection<ContestRecordArchive>,
}

impl ArchiveRepo {
    pub fn new(db: Database) -> Self {
        Self {
            coll: db.collection("contest_record_archive"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), PipelineError> {
        let index = IndexModel::builder()
            .keys(doc! { "key.contest_slug": 1, "key.data_region": 1, "key.username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.coll.create_index(index).await?;
        Ok(())
    }

    /// Upserts archive rows on `(rank, score, finish_time, update_time)`
    /// (SPEC_FULL.md §4.6 `saveArchiveContestRecords`).
    pub async fn upsert(&self, row: &ContestRecordArchive) -> Result<(), PipelineError> {
        let filter = doc! {
            "key.contest_slug": &row.key.contest_slug,
            "key.data_region": row.key.data_region.as_str(),
            "key.username": &row.key.username,
        };
        let update = doc! { "$set": mongodb::bson::to_document(row)? };
        self.coll
            .update_one(filter, update)
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Tombstone sweep: deletes rows whose `update_time` predates the crawl
    /// start captured before the fetch (SPEC_FULL.md §3 invariants).
    pub async fn tombstone_sweep(
        &self,
        contest_slug: &str,
        region: DataRegion,
        before: DateTime<Utc>,
    ) -> Result<u64, PipelineError> {
        let result = self
            .coll
            .delete_many(doc! {
                "key.contest_slug": contest_slug,
                "key.data_region": region.as_str(),
                "update_time": { "$lt": mongodb::bson::to_bson(&before)? },
            })
            .await?;
        Ok(result.deleted_count)
    }

    pub async fn find_by_contest(
        &self,
        contest_slug: &str,
        region: DataRegion,
    ) -> Result<Vec<ContestRecordArchive>, PipelineError> {
        use futures_util::TryStreamExt;
        let cursor = self
            .coll
            .find(doc! {
                "key.contest_slug": contest_slug,
                "key.data_region": region.as_str(),
            })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn set_real_time_rank(
        &self,
        contest_slug: &str,
        region: DataRegion,
        username: &str,
        ranks: Vec<u32>,
    ) -> Result<(), PipelineError> {
        self.coll
            .update_one(
                doc! {
                    "key.contest_slug": contest_slug,
                    "key.data_region": region.as_str(),
                    "key.username": username,
                },
                doc! { "$set": { "real_time_rank": ranks.into_iter().map(|r| r as i64).collect::<Vec<_>>() } },
            )
            .await?;
        Ok(())
    }
}
