use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

use crate::domain::Question;
use crate::error::PipelineError;

#[derive(Clone)]
pub struct QuestionRepo {
    coll: Collection<Question>,
}

impl QuestionRepo {
    pub fn new(db: Database) -> Self {
        Self {
            coll: db.collection("questions"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), PipelineError> {
        let index = IndexModel::builder()
            .keys(doc! { "contest_slug": 1, "question_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.coll.create_index(index).await?;
        Ok(())
    }

    pub async fn upsert(&self, question: &Question) -> Result<(), PipelineError> {
        let filter = doc! {
            "contest_slug": &question.contest_slug,
            "question_id": question.question_id as i64,
        };
        let update = doc! { "$set": mongodb::bson::to_document(question)? };
        self.coll.update_one(filter, update).upsert(true).await?;
        Ok(())
    }

    pub async fn find_by_contest(
        &self,
        contest_slug: &str,
    ) -> Result<Vec<Question>, PipelineError> {
        use futures_util::TryStreamExt;
        let cursor = self
            .coll
            .find(doc! { "contest_slug": contest_slug })
            .sort(doc! { "qi": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn set_real_time_count(
        &self,
        contest_slug: &str,
        question_id: u64,
        counts: Vec<u32>,
    ) -> Result<(), PipelineError> {
        self.coll
            .update_one(
                doc! { "contest_slug": contest_slug, "question_id": question_id as i64 },
                doc! { "$set": { "real_time_count": counts.into_iter().map(|c| c as i64).collect::<Vec<_>>() } },
            )
            .await?;
        Ok(())
    }
}
