//! Test helpers: build AppState and router for integration tests.
//!
//! The router is the production one from `setup::routes`; only the auth store
//! and the upload ledger are replaced by in-memory fakes, and storage lives in
//! a temp dir. No database is needed.

#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

use axum_test::TestServer;
use bytes::Bytes;
use fakes::{MemoryLedger, MemoryUsers};
use shoebox_api::middleware::{FallbackPayload, RetrievalRateLimiter};
use shoebox_api::services::{UploadPipeline, UploadPolicy};
use shoebox_api::setup::routes;
use shoebox_api::state::{AppState, StaticAssets};
use shoebox_core::config::{SHAREX_USER_AGENT_PATTERN, UPLOAD_MAX_BYTES, UPLOAD_MIN_BYTES};
use shoebox_core::{SignatureRegistry, SizeCheck};
use shoebox_storage::{LocalStorage, Storage};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const PUBLIC_HOST: &str = "i.example.test";
pub const SHAREX_UA: &str = "ShareX/16.1.0";

pub const FAVICON: &[u8] = b"\x00\x00\x01\x00favicon";
pub const FALLBACK_IMAGE: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00disappointed";

/// Knobs for a single test app.
#[derive(Clone, Debug)]
pub struct TestOptions {
    pub size_check: SizeCheck,
    pub developer_signature_bypass: bool,
    pub ledger_fails: bool,
    /// `None` disables retrieval rate limiting.
    pub retrieval_limit: Option<u32>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            size_check: SizeCheck::BeforeAuth,
            developer_signature_bypass: false,
            ledger_fails: false,
            retrieval_limit: None,
        }
    }
}

/// Test application: server plus handles to inspect side effects.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<LocalStorage>,
    pub ledger: Arc<MemoryLedger>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names of every file in the storage root.
    pub fn stored_files(&self) -> Vec<String> {
        std::fs::read_dir(self.storage.base_path())
            .expect("read storage dir")
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect()
    }

    /// POST / with the headers ShareX sends.
    pub async fn upload(
        &self,
        token: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> axum_test::TestResponse {
        let len = body.len();
        self.server
            .post("/")
            .add_header("User-Agent", SHAREX_UA)
            .add_header("Token", token)
            .add_header("Content-Type", content_type)
            .add_header("Content-Length", len.to_string())
            .bytes(Bytes::from(body))
            .await
    }

    /// Upload a body that must be accepted and return the stored name.
    pub async fn upload_ok(&self, content_type: &str, body: Vec<u8>) -> String {
        let response = self.upload(fakes::UPLOADER_TOKEN, content_type, body).await;
        response.assert_status_ok();
        let url = response.text();
        let prefix = format!("https://{}/", PUBLIC_HOST);
        url.strip_prefix(&prefix)
            .unwrap_or_else(|| panic!("unexpected upload url {url}"))
            .to_string()
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage = Arc::new(
        LocalStorage::new(temp_dir.path())
            .await
            .expect("Failed to create local storage"),
    );
    let ledger = Arc::new(MemoryLedger::new(options.ledger_fails));
    let registry = Arc::new(SignatureRegistry::standard());

    let policy = UploadPolicy::new(
        UPLOAD_MIN_BYTES,
        UPLOAD_MAX_BYTES,
        options.size_check,
        SHAREX_USER_AGENT_PATTERN,
        options.developer_signature_bypass,
    )
    .expect("valid upload policy");

    let storage_dyn: Arc<dyn Storage> = storage.clone();
    let upload = Arc::new(UploadPipeline::new(
        registry.clone(),
        storage_dyn.clone(),
        Arc::new(MemoryUsers::seeded()),
        ledger.clone(),
        policy,
        PUBLIC_HOST,
    ));

    let state = Arc::new(AppState {
        registry,
        storage: storage_dyn,
        ledger: ledger.clone(),
        upload,
        assets: StaticAssets {
            favicon: Bytes::from_static(FAVICON),
        },
    });

    let limiter = options.retrieval_limit.map(|max_requests| {
        Arc::new(RetrievalRateLimiter::new(
            Duration::from_secs(60),
            max_requests,
            FallbackPayload {
                body: Bytes::from_static(FALLBACK_IMAGE),
                content_type: "image/jpeg".parse().expect("header value"),
            },
        ))
    });

    let router = routes::build_router(state, limiter);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        ledger,
        _temp_dir: temp_dir,
    }
}
