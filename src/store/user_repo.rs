use std::collections::HashMap;

use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

use crate::domain::{DataRegion, User};
use crate::error::PipelineError;

#[derive(Clone)]
pub struct UserRepo {
    coll: Collection<User>,
}

impl UserRepo {
    pub fn new(db: Database) -> Self {
        Self {
            coll: db.collection("users"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), PipelineError> {
        let index = IndexModel::builder()
            .keys(doc! { "data_region": 1, "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.coll.create_index(index).await?;
        Ok(())
    }

    pub async fn find_one(
        &self,
        region: DataRegion,
        username: &str,
    ) -> Result<Option<User>, PipelineError> {
        Ok(self
            .coll
            .find_one(doc! { "data_region": region.as_str(), "username": username })
            .await?)
    }

    /// Resolves a batch of (region, username) keys in one query, returning
    /// only the ones found; callers fall back to newcomer defaults for keys
    /// absent from the result map.
    pub async fn find_many(
        &self,
        keys: &[(DataRegion, String)],
    ) -> Result<HashMap<(DataRegion, String), User>, PipelineError> {
        use futures_util::TryStreamExt;
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let usernames: Vec<&str> = keys.iter().map(|(_, u)| u.as_str()).collect();
        let cursor = self
            .coll
            .find(doc! { "username": { "$in": usernames } })
            .await?;
        let found: Vec<User> = cursor.try_collect().await?;
        Ok(found
            .into_iter()
            .map(|u| ((u.data_region, u.username.clone()), u))
            .collect())
    }

    /// Upserts by `(data_region, username)` (SPEC_FULL.md §4.3).
    pub async fn upsert(&self, user: &User) -> Result<(), PipelineError> {
        let filter = doc! { "data_region": user.data_region.as_str(), "username": &user.username };
        let update = doc! { "$set": mongodb::bson::to_document(user)? };
        self.coll.update_one(filter, update).upsert(true).await?;
        Ok(())
    }
}
