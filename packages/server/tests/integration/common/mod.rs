use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;

use ::common::catalogue::memory::MemoryCatalogueStore;
use ::common::storage::memory::MemoryBlobStore;
use ::common::storage::{BlobKey, BlobStore, HashEngine, StorageError};
use server::config::{
    AppConfig, BlobBackend, CatalogueBackend, CorsConfig, DatabaseConfig, LoggingConfig,
    ServerConfig, StorageConfig, UploadFailurePolicy,
};
use server::manager::{CatalogueManager, ManagerOptions, StoreContext};
use server::state::AppState;

pub const PUBLIC_URL: &str = "http://videos.test/";

/// Payload limit of the test server, in bytes.
pub const MAX_SIZE: usize = 1024 * 1024;

pub mod routes {
    pub const HEALTH: &str = "/v1/health";
    pub const FILES: &str = "/v1/files";
    pub const ORPHANS: &str = "/v1/admin/orphans";

    pub fn file(id: &str) -> String {
        format!("/v1/files/{id}")
    }

    pub fn locate(id: &str) -> String {
        format!("/v1/files/locate/{id}")
    }
}

/// Blob store whose uploads can be switched to fail.
#[derive(Default)]
pub struct SwitchableBlobStore {
    inner: MemoryBlobStore,
    pub fail_upload: AtomicBool,
}

#[async_trait]
impl BlobStore for SwitchableBlobStore {
    async fn upload(&self, key: &BlobKey, data: &[u8]) -> Result<u64, StorageError> {
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("blob backend unavailable".into()));
        }
        self.inner.upload(key, data).await
    }

    async fn download(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError> {
        self.inner.download(key).await
    }

    async fn delete(&self, key: &BlobKey) -> Result<bool, StorageError> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError> {
        self.inner.exists(key).await
    }
}

/// A running test server backed by in-memory stores.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub blobs: Arc<SwitchableBlobStore>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Raw response body.
    pub bytes: Vec<u8>,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let bytes = res
            .bytes()
            .await
            .expect("Failed to read response body")
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Self {
            status,
            headers,
            bytes,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn test_config(on_upload_failure: UploadFailurePolicy) -> AppConfig {
    let mut storage = StorageConfig {
        catalogue_backend: CatalogueBackend::Memory,
        on_upload_failure,
        ..Default::default()
    };
    storage.blob.backend = BlobBackend::Memory;
    storage.blob.chunk_size = 4;
    storage.blob.max_size = MAX_SIZE as u64;

    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_url: PUBLIC_URL.to_string(),
            cors: CorsConfig {
                allow_origins: vec![],
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            url: String::new(),
            pool_size: 1,
            connect_timeout_secs: 1,
        },
        storage,
        logging: LoggingConfig::default(),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_policy(UploadFailurePolicy::Report).await
    }

    pub async fn spawn_with_policy(on_upload_failure: UploadFailurePolicy) -> Self {
        let config = test_config(on_upload_failure);
        let blobs = Arc::new(SwitchableBlobStore {
            inner: MemoryBlobStore::from_config(&config.storage.blob),
            fail_upload: AtomicBool::new(false),
        });

        let context = StoreContext {
            catalogue: Arc::new(MemoryCatalogueStore::new()),
            blobs: blobs.clone(),
            hasher: HashEngine::new(config.storage.digest_algorithm),
        };
        let manager = CatalogueManager::new(context, ManagerOptions::from(&config.storage));

        let state = AppState {
            manager: Arc::new(manager),
            config,
        };
        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            blobs,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");
        TestResponse::from_response(res).await
    }

    /// Upload `bytes` as the `data` field with the given part Content-Type.
    pub async fn upload(&self, file_name: &str, bytes: &[u8], mime: &str) -> TestResponse {
        self.upload_field("data", file_name, bytes, mime).await
    }

    pub async fn upload_field(
        &self,
        field: &str,
        file_name: &str,
        bytes: &[u8],
        mime: &str,
    ) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("Failed to set MIME type");
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);

        let res = self
            .client
            .post(self.url(routes::FILES))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");
        TestResponse::from_response(res).await
    }

    /// Upload a video and return its id, asserting it was created.
    pub async fn create_video(&self, file_name: &str, bytes: &[u8]) -> String {
        let res = self.upload(file_name, bytes, "video/mp4").await;
        assert_eq!(res.status, 201, "Upload failed: {:?}", res.body);
        res.body["id"]
            .as_str()
            .expect("Upload response missing id")
            .to_string()
    }
}
