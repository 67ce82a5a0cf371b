use shoebox_core::models::{Privileges, User};
use shoebox_core::AppError;
use sqlx::{FromRow, PgPool, Postgres};

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    #[sqlx(rename = "priv")]
    privileges: i32,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            display_name: row.name,
            privileges: Privileges::from_bits(row.privileges),
        }
    }
}

/// Read-only access to the external auth store.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up the user owning `token`, only if the account carries the ACTIVE bit.
    #[tracing::instrument(skip(self, token), fields(db.table = "users", db.operation = "select"))]
    pub async fn find_active_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<Postgres, UserRow>(
            "SELECT id, name, priv FROM users WHERE token = $1 AND priv & $2 <> 0",
        )
        .bind(token)
        .bind(Privileges::ACTIVE.bits())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}
