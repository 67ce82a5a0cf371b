use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger entry for an accepted upload.
///
/// Created once when the upload is accepted and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StoredFile {
    /// `<random token>.<extension>`; primary key within the storage namespace.
    pub name: String,
    pub user_id: i64,
    pub size: i64,
}

/// Ledger row as read back from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UploadRecord {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

impl From<UploadRecord> for StoredFile {
    fn from(record: UploadRecord) -> Self {
        StoredFile {
            name: record.name,
            user_id: record.user_id,
            size: record.size,
        }
    }
}
