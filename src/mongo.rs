use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Client, Collection};
use tracing::{debug, info};

use crate::config::Config;
use crate::store::{
    RecordId, SessionRecord, SessionStore, StoreError, StoreResult, UserRecord, mood_update,
    session_from_document, user_from_document,
};

pub struct MongoStore {
    client: Client,
    sessions: Collection<Document>,
    users: Collection<Document>,
}

impl MongoStore {
    /// Opens the client and pings the database, so an unreachable server fails
    /// before the first snapshot query.
    pub async fn connect(config: &Config) -> StoreResult<Self> {
        let client = Client::with_uri_str(&config.mongodb_uri)
            .await
            .map_err(StoreError::connect)?;
        let db = client.database(&config.database);

        if let Err(e) = db.run_command(doc! { "ping": 1 }).await {
            client.shutdown().await;
            return Err(StoreError::connect(e));
        }
        info!(database = %config.database, "connected to record store");

        Ok(Self {
            sessions: db.collection(&config.sessions_collection),
            users: db.collection(&config.users_collection),
            client,
        })
    }

    async fn set_fields(
        collection: &Collection<Document>,
        id: &RecordId,
        set: Document,
    ) -> StoreResult<()> {
        let result = collection
            .update_one(doc! { "_id": Bson::from(id) }, doc! { "$set": set })
            .await
            .map_err(|e| StoreError::update(id, e))?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MongoStore {
    async fn sessions_with_emotion(&self) -> StoreResult<Vec<SessionRecord>> {
        let mut cursor = self
            .sessions
            .find(doc! { "mood.emotion": { "$exists": true } })
            .await
            .map_err(StoreError::query)?;

        let mut out = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(StoreError::query)? {
            if let Some(record) = session_from_document(&doc) {
                out.push(record);
            }
        }
        debug!(count = out.len(), "session snapshot loaded");
        Ok(out)
    }

    async fn set_mood(
        &self,
        id: &RecordId,
        emotion: &str,
        color: Option<&str>,
    ) -> StoreResult<()> {
        Self::set_fields(&self.sessions, id, mood_update(emotion, color)).await
    }

    async fn users_missing_nickname(&self) -> StoreResult<Vec<UserRecord>> {
        let filter = doc! {
            "$or": [
                { "nickname": { "$exists": false } },
                { "nickname": Bson::Null },
                { "nickname": "" },
            ]
        };
        let mut cursor = self.users.find(filter).await.map_err(StoreError::query)?;

        let mut out = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(StoreError::query)? {
            out.push(user_from_document(&doc));
        }
        debug!(count = out.len(), "user snapshot loaded");
        Ok(out)
    }

    async fn set_nickname(&self, id: &RecordId, nickname: &str) -> StoreResult<()> {
        Self::set_fields(&self.users, id, doc! { "nickname": nickname }).await
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        debug!("record store connection closed");
    }
}
