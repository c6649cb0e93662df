use async_trait::async_trait;
use mongodb::bson::{Bson, Document, oid::ObjectId};
use std::fmt;
use thiserror::Error;
use tracing::warn;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to record store: {0}")]
    Connect(String),
    #[error("snapshot query failed: {0}")]
    Query(String),
    #[error("update of {id} failed: {message}")]
    Update { id: RecordId, message: String },
    #[error("no document with id {0}")]
    NotFound(RecordId),
}

impl StoreError {
    pub fn connect(message: impl fmt::Display) -> Self {
        Self::Connect(message.to_string())
    }

    pub fn query(message: impl fmt::Display) -> Self {
        Self::Query(message.to_string())
    }

    pub fn update(id: &RecordId, message: impl fmt::Display) -> Self {
        Self::Update {
            id: id.clone(),
            message: message.to_string(),
        }
    }
}

/// Document `_id`. Ids that are neither ObjectId nor string are carried as raw BSON.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordId {
    Object(ObjectId),
    Text(String),
    Other(Bson),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Object(oid) => write!(f, "{}", oid.to_hex()),
            RecordId::Text(s) => f.write_str(s),
            RecordId::Other(raw) => write!(f, "{raw}"),
        }
    }
}

impl From<&Bson> for RecordId {
    fn from(value: &Bson) -> Self {
        match value {
            Bson::ObjectId(oid) => RecordId::Object(*oid),
            Bson::String(s) => RecordId::Text(s.clone()),
            other => RecordId::Other(other.clone()),
        }
    }
}

impl From<&RecordId> for Bson {
    fn from(id: &RecordId) -> Self {
        match id {
            RecordId::Object(oid) => Bson::ObjectId(*oid),
            RecordId::Text(s) => Bson::String(s.clone()),
            RecordId::Other(raw) => raw.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: RecordId,
    pub emotion: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: RecordId,
    pub email: Option<String>,
    pub user_id: Option<String>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Snapshot of every session whose `mood.emotion` is present.
    async fn sessions_with_emotion(&self) -> StoreResult<Vec<SessionRecord>>;

    /// Sets `mood.emotion`, and `mood.color` when given, on a single session.
    async fn set_mood(&self, id: &RecordId, emotion: &str, color: Option<&str>)
    -> StoreResult<()>;

    /// Snapshot of every user whose `nickname` is absent, null or empty.
    async fn users_missing_nickname(&self) -> StoreResult<Vec<UserRecord>>;

    async fn set_nickname(&self, id: &RecordId, nickname: &str) -> StoreResult<()>;

    async fn close(&self);
}

pub(crate) fn mood_update(emotion: &str, color: Option<&str>) -> Document {
    let mut set = Document::new();
    set.insert("mood.emotion", emotion);
    if let Some(color) = color {
        set.insert("mood.color", color);
    }
    set
}

fn record_id(doc: &Document) -> RecordId {
    RecordId::from(doc.get("_id").unwrap_or(&Bson::Null))
}

pub(crate) fn session_from_document(doc: &Document) -> Option<SessionRecord> {
    let mood = doc.get_document("mood").ok()?;

    match mood.get("emotion") {
        Some(Bson::String(emotion)) => Some(SessionRecord {
            id: record_id(doc),
            emotion: emotion.clone(),
            color: mood.get_str("color").ok().map(str::to_string),
        }),
        Some(other) => {
            warn!(id = %record_id(doc), value = %other, "skipping session with non-text emotion");
            None
        }
        None => None,
    }
}

pub(crate) fn user_from_document(doc: &Document) -> UserRecord {
    UserRecord {
        id: record_id(doc),
        email: doc.get_str("email").ok().map(str::to_string),
        user_id: doc.get_str("userId").ok().map(str::to_string),
    }
}
