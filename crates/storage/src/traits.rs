//! Gateway trait definitions.

use crate::error::GatewayResult;
use async_trait::async_trait;
use std::time::Duration;

/// Metadata about a stored object, available before the body is read.
#[derive(Clone, Debug)]
pub struct ObjectMeta {
    /// Content type as reported by the store, if any.
    pub content_type: Option<String>,
    /// Object size in bytes, if reported.
    pub size: Option<u64>,
}

/// An open object body.
///
/// The body holds an underlying connection and must be either fully consumed
/// with [`text`](ObjectBody::text) or explicitly released with
/// [`abort`](ObjectBody::abort); dropping it half-read leaks the connection
/// until the transport notices.
#[async_trait]
pub trait ObjectBody: Send {
    /// Read the full body as UTF-8 text.
    async fn text(self: Box<Self>) -> GatewayResult<String>;

    /// Release the body without reading it.
    async fn abort(self: Box<Self>);
}

/// Object store gateway: metadata+body fetch and presigned GET generation.
///
/// Implementations are request-agnostic and shareable; all per-request state
/// lives in the returned [`ObjectBody`].
#[async_trait]
pub trait ObjectGateway: Send + Sync + 'static {
    /// Fetch an object's metadata together with an open body handle.
    async fn fetch(&self, key: &str) -> GatewayResult<(ObjectMeta, Box<dyn ObjectBody>)>;

    /// Generate a presigned GET URL for `key`, valid for `expires_in`.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> GatewayResult<String>;

    /// Get the name of this gateway backend ("s3", "memory"). Used for
    /// logging.
    fn backend_name(&self) -> &'static str;

    /// Verify backend connectivity.
    ///
    /// Called once during server startup so misconfiguration surfaces before
    /// the first request. The default implementation returns Ok(()).
    async fn health_check(&self) -> GatewayResult<()> {
        Ok(())
    }
}
