//! In-memory gateway backend for tests and local development.

use crate::error::{GatewayError, GatewayResult};
use crate::traits::{ObjectBody, ObjectGateway, ObjectMeta};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::instrument;

#[derive(Clone)]
struct StoredObject {
    content_type: Option<String>,
    data: Bytes,
}

/// In-memory object gateway.
///
/// Presigned URLs are deterministic
/// (`https://objects.test/{key}?expires={secs}`) and the backend counts body
/// reads and aborts, so tests can assert that a dispatch path never touched
/// the body.
#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<HashMap<String, StoredObject>>,
    body_reads: Arc<AtomicUsize>,
    body_aborts: Arc<AtomicUsize>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object.
    pub fn put_object(
        &self,
        key: impl Into<String>,
        content_type: Option<&str>,
        data: impl Into<Bytes>,
    ) {
        let object = StoredObject {
            content_type: content_type.map(str::to_string),
            data: data.into(),
        };
        self.objects
            .write()
            .expect("memory backend lock poisoned")
            .insert(key.into(), object);
    }

    /// How many object bodies have been fully read.
    pub fn body_reads(&self) -> usize {
        self.body_reads.load(Ordering::SeqCst)
    }

    /// How many object bodies have been explicitly aborted.
    pub fn body_aborts(&self) -> usize {
        self.body_aborts.load(Ordering::SeqCst)
    }
}

struct MemoryBody {
    key: String,
    data: Bytes,
    reads: Arc<AtomicUsize>,
    aborts: Arc<AtomicUsize>,
}

#[async_trait]
impl ObjectBody for MemoryBody {
    async fn text(self: Box<Self>) -> GatewayResult<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        String::from_utf8(self.data.to_vec())
            .map_err(|e| GatewayError::InvalidBody(format!("{}: {e}", self.key)))
    }

    async fn abort(self: Box<Self>) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectGateway for MemoryBackend {
    #[instrument(skip(self), fields(backend = "memory"))]
    async fn fetch(&self, key: &str) -> GatewayResult<(ObjectMeta, Box<dyn ObjectBody>)> {
        let object = self
            .objects
            .read()
            .expect("memory backend lock poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(key.to_string()))?;

        let meta = ObjectMeta {
            content_type: object.content_type.clone(),
            size: Some(object.data.len() as u64),
        };
        let body = MemoryBody {
            key: key.to_string(),
            data: object.data,
            reads: self.body_reads.clone(),
            aborts: self.body_aborts.clone(),
        };

        Ok((meta, Box::new(body)))
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn presign_get(&self, key: &str, expires_in: Duration) -> GatewayResult<String> {
        Ok(format!(
            "https://objects.test/{}?expires={}",
            key,
            expires_in.as_secs()
        ))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_returns_metadata_and_body() {
        let backend = MemoryBackend::new();
        backend.put_object("a/b.txt", Some("text/plain"), "hello");

        let (meta, body) = backend.fetch("a/b.txt").await.unwrap();
        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
        assert_eq!(meta.size, Some(5));
        assert_eq!(body.text().await.unwrap(), "hello");
        assert_eq!(backend.body_reads(), 1);
        assert_eq!(backend.body_aborts(), 0);
    }

    #[tokio::test]
    async fn abort_counts_without_reading() {
        let backend = MemoryBackend::new();
        backend.put_object("a/b.bin", Some("binary/octet-stream"), vec![0u8; 16]);

        let (_meta, body) = backend.fetch("a/b.bin").await.unwrap();
        body.abort().await;
        assert_eq!(backend.body_reads(), 0);
        assert_eq!(backend.body_aborts(), 1);
    }

    #[tokio::test]
    async fn fetch_missing_is_not_found() {
        let backend = MemoryBackend::new();
        match backend.fetch("nope").await {
            Err(GatewayError::NotFound(key)) => assert_eq!(key, "nope"),
            other => panic!("unexpected result: {:?}", other.map(|(m, _)| m)),
        }
    }

    #[tokio::test]
    async fn presign_is_deterministic() {
        let backend = MemoryBackend::new();
        let url = backend
            .presign_get("show/ep1/seg0.ts", Duration::from_secs(90))
            .await
            .unwrap();
        assert_eq!(url, "https://objects.test/show/ep1/seg0.ts?expires=90");
    }
}
