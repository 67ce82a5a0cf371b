//! In-memory stand-ins for the Postgres-backed auth store and ledger.

use async_trait::async_trait;
use shoebox_core::models::{Privileges, StoredFile, User};
use shoebox_core::AppError;
use shoebox_db::{UploadLedger, UserStore};
use std::collections::HashMap;
use std::sync::Mutex;

pub const UPLOADER_TOKEN: &str = "uploader-token";
pub const DEVELOPER_TOKEN: &str = "developer-token";
pub const BANNED_TOKEN: &str = "banned-token";

pub struct MemoryUsers {
    users: HashMap<String, User>,
}

impl MemoryUsers {
    pub fn seeded() -> Self {
        let users = [
            (UPLOADER_TOKEN, 1, "alice", Privileges::ACTIVE),
            (
                DEVELOPER_TOKEN,
                2,
                "dev",
                Privileges::ACTIVE | Privileges::DEVELOPMENT,
            ),
            (BANNED_TOKEN, 3, "mallory", Privileges::empty()),
        ]
        .into_iter()
        .map(|(token, id, name, privileges)| {
            (
                token.to_string(),
                User {
                    id,
                    display_name: name.to_string(),
                    privileges,
                },
            )
        })
        .collect();

        Self { users }
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn find_active_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        // Same filter as the SQL query: only users with the ACTIVE bit.
        Ok(self
            .users
            .get(token)
            .filter(|user| user.privileges.is_active())
            .cloned())
    }
}

pub struct MemoryLedger {
    rows: Mutex<Vec<StoredFile>>,
    fails: bool,
}

impl MemoryLedger {
    pub fn new(fails: bool) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fails,
        }
    }

    pub fn rows(&self) -> Vec<StoredFile> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl UploadLedger for MemoryLedger {
    async fn record(&self, file: &StoredFile) -> Result<(), AppError> {
        if self.fails {
            return Err(AppError::Internal("ledger unavailable".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|row| row.name == file.name) {
            return Err(AppError::Internal(format!("duplicate name {}", file.name)));
        }
        rows.push(file.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.fails {
            return Err(AppError::Internal("ledger unavailable".to_string()));
        }
        Ok(())
    }
}
