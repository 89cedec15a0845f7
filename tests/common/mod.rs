//! Shared fixtures: an app wired to an in-memory database and temp directories.
#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum_test::TestServer;
use inviteroom::{app, auth::CredentialService, db::MessageStore, rooms::RoomRegistry, uploads::BlobStore, AppState, Config};
use tempfile::TempDir;

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    _upload_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_frontend(PathBuf::from("does/not/exist")).await
    }

    pub async fn with_frontend(frontend_dir: PathBuf) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let config = Config {
            secret_key: SECRET.to_owned(),
            database_url: "sqlite::memory:".to_owned(),
            upload_dir: upload_dir.path().to_owned(),
            frontend_dir,
            bind_addr: "127.0.0.1:0".to_owned(),
        };

        let state = AppState {
            store: MessageStore::in_memory().await.unwrap(),
            blobs: BlobStore::open(&config.upload_dir).await.unwrap(),
            credentials: Arc::new(CredentialService::new(SECRET)),
            registry: Arc::new(RoomRegistry::new()),
        };

        let server = TestServer::builder()
            .http_transport()
            .build(app(state.clone(), &config))
            .unwrap();

        Self { server, state, _upload_dir: upload_dir }
    }

    /// Polls until the room has `count` connected sessions.
    pub async fn wait_for_members(&self, room_id: &str, count: usize) {
        for _ in 0..100 {
            if self.state.registry.member_count(room_id) == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("room {room_id} never reached {count} members");
    }
}
