use shoebox_core::models::{StoredFile, UploadRecord};
use shoebox_core::AppError;
use sqlx::{PgPool, Postgres};

/// Repository for the upload ledger
#[derive(Clone)]
pub struct UploadRepository {
    pool: PgPool,
}

impl UploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one ledger row for an accepted upload.
    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "insert", file_name = %file.name))]
    pub async fn record(&self, file: &StoredFile) -> Result<(), AppError> {
        sqlx::query("INSERT INTO uploads (name, user_id, size) VALUES ($1, $2, $3)")
            .bind(&file.name)
            .bind(file.user_id)
            .bind(file.size)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select"))]
    pub async fn get_by_name(&self, name: &str) -> Result<Option<UploadRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, UploadRecord>(
            "SELECT id, name, user_id, size, created_at FROM uploads WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Database liveness probe.
    #[tracing::instrument(skip(self), fields(db.operation = "ping"))]
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<Postgres, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
