//! Upload pipeline
//!
//! headers → size → auth → type → body → signature → persist → record
//!
//! Every stage either advances or ends the request with an `AppError`; the
//! only failure that does not reject is the ledger insert after the file has
//! already been written, which is logged and otherwise ignored.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, HeaderName};
use bytes::Bytes;
use shoebox_core::models::{Privileges, StoredFile, User};
use shoebox_core::{format_bytes, AppError, SignatureRegistry, SignatureRule, SizeCheck};
use shoebox_db::{UploadLedger, UserStore};
use shoebox_storage::{Storage, StorageError};

use super::policy::UploadPolicy;
use crate::error::storage_error;
use crate::services::naming::NameGenerator;

const TOKEN_HEADER: &str = "token";

/// Headers every upload must carry.
#[derive(Debug, Clone)]
pub struct UploadHeaders {
    pub user_agent: String,
    pub token: String,
    pub content_type: String,
    pub content_length: Option<u64>,
}

/// Outcome of an accepted upload.
#[derive(Debug, Clone)]
pub struct AcceptedUpload {
    pub name: String,
    pub url: String,
    pub size: u64,
    pub mime_type: String,
    pub user: User,
}

pub struct UploadPipeline {
    registry: Arc<SignatureRegistry>,
    storage: Arc<dyn Storage>,
    users: Arc<dyn UserStore>,
    ledger: Arc<dyn UploadLedger>,
    policy: UploadPolicy,
    public_host: String,
}

fn required_header(headers: &HeaderMap, name: HeaderName) -> Result<String, AppError> {
    let value = headers
        .get(&name)
        .ok_or_else(|| AppError::MalformedRequest(format!("missing {} header", name)))?;

    value
        .to_str()
        .map(|v| v.trim().to_string())
        .map_err(|_| AppError::MalformedRequest(format!("invalid {} header", name)))
}

impl UploadPipeline {
    pub fn new(
        registry: Arc<SignatureRegistry>,
        storage: Arc<dyn Storage>,
        users: Arc<dyn UserStore>,
        ledger: Arc<dyn UploadLedger>,
        policy: UploadPolicy,
        public_host: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            storage,
            users,
            ledger,
            policy,
            public_host: public_host.into(),
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Run the whole pipeline for one request.
    #[tracing::instrument(skip_all, fields(operation = "upload"))]
    pub async fn run(&self, headers: &HeaderMap, body: Body) -> Result<AcceptedUpload, AppError> {
        let upload = self.validate_headers(headers)?;

        if self.policy.size_check == SizeCheck::BeforeAuth {
            self.check_size(upload.content_length)?;
        }

        let user = self.authenticate(&upload.token).await?;

        if self.policy.size_check == SizeCheck::AfterAuth {
            self.check_size(upload.content_length)?;
        }

        let rule = self.resolve_type(&upload.content_type)?;
        let body = self.read_body(body).await?;
        self.verify_content(rule, &body, &user)?;

        let size = body.len() as u64;
        let name = self.persist(rule.extension(), body).await?;

        if let Err(e) = self.record(&name, &user, size).await {
            tracing::error!(
                file_name = %name,
                user_id = user.id,
                error = %e,
                "File stored but missing from the upload ledger"
            );
        }

        let size_fmt = format_bytes(size);
        tracing::info!(
            user_id = user.id,
            user_name = %user.display_name,
            file_name = %name,
            size = %size_fmt,
            "{} uploaded a {} {} file",
            user,
            size_fmt,
            rule.extension()
        );

        Ok(AcceptedUpload {
            url: format!("https://{}/{}", self.public_host, name),
            name,
            size,
            mime_type: rule.mime_type().to_string(),
            user,
        })
    }

    /// `User-Agent`, `Token` and `Content-Type` must be present and the
    /// client must identify as a supported uploader.
    pub fn validate_headers(&self, headers: &HeaderMap) -> Result<UploadHeaders, AppError> {
        let user_agent = required_header(headers, header::USER_AGENT)?;
        let token = required_header(headers, HeaderName::from_static(TOKEN_HEADER))?;
        let content_type = required_header(headers, header::CONTENT_TYPE)?;

        if !self.policy.user_agent.is_match(&user_agent) {
            return Err(AppError::MalformedRequest(format!(
                "unsupported client: {}",
                user_agent
            )));
        }

        if token.is_empty() {
            return Err(AppError::MalformedRequest("empty Token header".to_string()));
        }

        let content_length = match headers.get(header::CONTENT_LENGTH) {
            Some(value) => Some(
                value
                    .to_str()
                    .ok()
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .ok_or_else(|| {
                        AppError::MalformedRequest("invalid Content-Length header".to_string())
                    })?,
            ),
            None => None,
        };

        Ok(UploadHeaders {
            user_agent,
            token,
            content_type,
            content_length,
        })
    }

    /// Declared size must fall within `[min_bytes, max_bytes)`.
    pub fn check_size(&self, content_length: Option<u64>) -> Result<(), AppError> {
        let size = content_length.ok_or_else(|| {
            AppError::MalformedRequest("missing Content-Length header".to_string())
        })?;

        if !self.policy.accepts_size(size) {
            return Err(AppError::MalformedRequest(format!(
                "declared size {} outside [{}, {})",
                size, self.policy.min_bytes, self.policy.max_bytes
            )));
        }

        Ok(())
    }

    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let user = self
            .users
            .find_active_by_token(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("no active user for token".to_string()))?;

        // The store filters on ACTIVE already; this keeps fakes and odd rows honest.
        if !user.can_upload() {
            return Err(AppError::Unauthorized(format!("user {} is not active", user.id)));
        }

        Ok(user)
    }

    /// The declared content type must have a registered signature rule.
    pub fn resolve_type(&self, content_type: &str) -> Result<&SignatureRule, AppError> {
        self.registry
            .lookup(content_type)
            .ok_or_else(|| AppError::UnsupportedType(content_type.to_string()))
    }

    /// The body must satisfy the rule's signature, unless the user is trusted
    /// to skip it by the developer bypass.
    pub fn verify_content(
        &self,
        rule: &SignatureRule,
        body: &[u8],
        user: &User,
    ) -> Result<(), AppError> {
        if rule.matches(body) {
            return Ok(());
        }

        if self.policy.developer_signature_bypass
            && user.privileges.contains(Privileges::DEVELOPMENT)
        {
            tracing::warn!(
                user_id = user.id,
                mime_type = %rule.mime_type(),
                "Signature check bypassed for developer upload"
            );
            return Ok(());
        }

        Err(AppError::ContentMismatch(rule.mime_type().to_string()))
    }

    /// Store the body under a fresh name and return that name.
    pub async fn persist(&self, extension: &str, body: Bytes) -> Result<String, AppError> {
        loop {
            let name = NameGenerator::generate(self.storage.as_ref(), extension)
                .await
                .map_err(storage_error)?;

            match self.storage.write(&name, body.clone()).await {
                Ok(()) => return Ok(name),
                Err(StorageError::AlreadyExists(_)) => {
                    tracing::warn!(file_name = %name, "Name taken between check and write, retrying");
                }
                Err(e) => return Err(storage_error(e)),
            }
        }
    }

    pub async fn record(&self, name: &str, user: &User, size: u64) -> Result<(), AppError> {
        let file = StoredFile {
            name: name.to_string(),
            user_id: user.id,
            size: i64::try_from(size).unwrap_or(i64::MAX),
        };
        self.ledger.record(&file).await
    }

    async fn read_body(&self, body: Body) -> Result<Bytes, AppError> {
        let body = to_bytes(body, self.policy.body_limit())
            .await
            .map_err(|e| AppError::MalformedRequest(format!("failed to read body: {}", e)))?;

        if body.is_empty() {
            return Err(AppError::MalformedRequest("empty body".to_string()));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use shoebox_core::config::{SHAREX_USER_AGENT_PATTERN, UPLOAD_MAX_BYTES, UPLOAD_MIN_BYTES};
    use shoebox_storage::LocalStorage;
    use std::sync::Mutex;

    const TOKEN: &str = "uploader-token";
    const DEV_TOKEN: &str = "developer-token";

    struct FixedUsers;

    #[async_trait]
    impl UserStore for FixedUsers {
        async fn find_active_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
            let user = match token {
                TOKEN => User {
                    id: 1,
                    display_name: "alice".to_string(),
                    privileges: Privileges::ACTIVE,
                },
                DEV_TOKEN => User {
                    id: 2,
                    display_name: "dev".to_string(),
                    privileges: Privileges::ACTIVE | Privileges::DEVELOPMENT,
                },
                _ => return Ok(None),
            };
            Ok(Some(user))
        }
    }

    #[derive(Default)]
    struct MemoryLedger {
        rows: Mutex<Vec<StoredFile>>,
        fail: bool,
    }

    #[async_trait]
    impl UploadLedger for MemoryLedger {
        async fn record(&self, file: &StoredFile) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::Internal("ledger offline".to_string()));
            }
            self.rows.lock().unwrap().push(file.clone());
            Ok(())
        }

        async fn ping(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn png(len: usize) -> Vec<u8> {
        let mut body = b"\x89PNG\r\n\x1a\n".to_vec();
        body.resize(len - 8, 0);
        body.extend_from_slice(b"IEND\xaeB`\x82");
        body
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        storage: Arc<LocalStorage>,
        ledger: Arc<MemoryLedger>,
        pipeline: UploadPipeline,
    }

    async fn fixture(size_check: SizeCheck, bypass: bool, ledger: MemoryLedger) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()).await.unwrap());
        let ledger = Arc::new(ledger);
        let policy = UploadPolicy::new(
            UPLOAD_MIN_BYTES,
            UPLOAD_MAX_BYTES,
            size_check,
            SHAREX_USER_AGENT_PATTERN,
            bypass,
        )
        .unwrap();
        let pipeline = UploadPipeline::new(
            Arc::new(SignatureRegistry::standard()),
            storage.clone(),
            Arc::new(FixedUsers),
            ledger.clone(),
            policy,
            "i.example.com",
        );
        Fixture {
            _dir: dir,
            storage,
            ledger,
            pipeline,
        }
    }

    fn headers(token: &str, content_type: &str, len: usize) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("ShareX/13.7.0"));
        headers.insert("token", HeaderValue::from_str(token).unwrap());
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
        headers
    }

    #[tokio::test]
    async fn test_accepts_valid_png() {
        let fx = fixture(SizeCheck::BeforeAuth, false, MemoryLedger::default()).await;
        let body = png(128);

        let accepted = fx
            .pipeline
            .run(&headers(TOKEN, "image/png", body.len()), Body::from(body.clone()))
            .await
            .unwrap();

        assert!(accepted.name.ends_with(".png"));
        assert_eq!(accepted.url, format!("https://i.example.com/{}", accepted.name));
        assert_eq!(accepted.size, 128);
        assert_eq!(accepted.user.id, 1);
        assert_eq!(fx.storage.read(&accepted.name).await.unwrap(), body);

        let rows = fx.ledger.rows.lock().unwrap();
        assert_eq!(
            rows.as_slice(),
            &[StoredFile {
                name: accepted.name.clone(),
                user_id: 1,
                size: 128,
            }]
        );
    }

    #[tokio::test]
    async fn test_rejects_spoofed_content() {
        let fx = fixture(SizeCheck::BeforeAuth, false, MemoryLedger::default()).await;
        let body = vec![0u8; 128];

        let err = fx
            .pipeline
            .run(&headers(TOKEN, "image/png", body.len()), Body::from(body))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ContentMismatch(_)));
        assert!(fx.ledger.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let fx = fixture(SizeCheck::BeforeAuth, false, MemoryLedger::default()).await;
        let body = png(128);

        let err = fx
            .pipeline
            .run(&headers("nope", "image/png", body.len()), Body::from(body))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_unregistered_type_is_unsupported() {
        let fx = fixture(SizeCheck::BeforeAuth, true, MemoryLedger::default()).await;
        let body = png(128);

        let err = fx
            .pipeline
            .run(&headers(DEV_TOKEN, "image/tiff", body.len()), Body::from(body))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnsupportedType(_)));
    }

    #[tokio::test]
    async fn test_size_check_order() {
        // Too small and unauthenticated: which error wins depends on the order.
        let small = png(32);

        let before = fixture(SizeCheck::BeforeAuth, false, MemoryLedger::default()).await;
        let err = before
            .pipeline
            .run(&headers("nope", "image/png", small.len()), Body::from(small.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedRequest(_)));

        let after = fixture(SizeCheck::AfterAuth, false, MemoryLedger::default()).await;
        let err = after
            .pipeline
            .run(&headers("nope", "image/png", small.len()), Body::from(small.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let off = fixture(SizeCheck::Off, false, MemoryLedger::default()).await;
        let accepted = off
            .pipeline
            .run(&headers(TOKEN, "image/png", small.len()), Body::from(small))
            .await
            .unwrap();
        assert_eq!(accepted.size, 32);
    }

    #[tokio::test]
    async fn test_validate_headers() {
        let fx = fixture(SizeCheck::BeforeAuth, false, MemoryLedger::default()).await;

        let parsed = fx
            .pipeline
            .validate_headers(&headers(TOKEN, "image/png", 100))
            .unwrap();
        assert_eq!(parsed.token, TOKEN);
        assert_eq!(parsed.content_length, Some(100));

        let mut missing_token = headers(TOKEN, "image/png", 100);
        missing_token.remove("token");
        assert!(fx.pipeline.validate_headers(&missing_token).is_err());

        let mut browser = headers(TOKEN, "image/png", 100);
        browser.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        assert!(fx.pipeline.validate_headers(&browser).is_err());

        let mut bad_length = headers(TOKEN, "image/png", 100);
        bad_length.insert(header::CONTENT_LENGTH, HeaderValue::from_static("lots"));
        assert!(fx.pipeline.validate_headers(&bad_length).is_err());
    }

    #[tokio::test]
    async fn test_check_size_requires_length() {
        let fx = fixture(SizeCheck::BeforeAuth, false, MemoryLedger::default()).await;
        assert!(fx.pipeline.check_size(None).is_err());
        assert!(fx.pipeline.check_size(Some(UPLOAD_MIN_BYTES)).is_ok());
        assert!(fx.pipeline.check_size(Some(UPLOAD_MAX_BYTES)).is_err());
    }

    #[tokio::test]
    async fn test_developer_bypass() {
        let body = vec![0u8; 128];

        let enabled = fixture(SizeCheck::BeforeAuth, true, MemoryLedger::default()).await;
        let accepted = enabled
            .pipeline
            .run(&headers(DEV_TOKEN, "image/png", body.len()), Body::from(body.clone()))
            .await
            .unwrap();
        assert!(accepted.name.ends_with(".png"));

        // Regular users never get the bypass.
        let err = enabled
            .pipeline
            .run(&headers(TOKEN, "image/png", body.len()), Body::from(body.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ContentMismatch(_)));

        let disabled = fixture(SizeCheck::BeforeAuth, false, MemoryLedger::default()).await;
        let err = disabled
            .pipeline
            .run(&headers(DEV_TOKEN, "image/png", body.len()), Body::from(body))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ContentMismatch(_)));
    }

    #[tokio::test]
    async fn test_ledger_failure_still_accepts() {
        let ledger = MemoryLedger {
            fail: true,
            ..Default::default()
        };
        let fx = fixture(SizeCheck::BeforeAuth, false, ledger).await;
        let body = png(128);

        let accepted = fx
            .pipeline
            .run(&headers(TOKEN, "image/png", body.len()), Body::from(body))
            .await
            .unwrap();

        assert!(fx.storage.exists(&accepted.name).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_body_is_malformed() {
        let fx = fixture(SizeCheck::Off, false, MemoryLedger::default()).await;

        let err = fx
            .pipeline
            .run(&headers(TOKEN, "image/png", 0), Body::empty())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MalformedRequest(_)));
    }
}
