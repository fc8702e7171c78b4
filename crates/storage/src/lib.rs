//! Object store gateway abstraction and backends for Vitrine.
//!
//! This crate provides:
//! - The [`ObjectGateway`] trait: metadata+body fetch with an abortable body
//!   handle, and presigned GET URL generation
//! - Backends: S3-compatible (AWS SDK) and in-memory (tests, local runs)

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{memory::MemoryBackend, s3::S3Backend};
pub use error::{GatewayError, GatewayResult};
pub use traits::{ObjectBody, ObjectGateway, ObjectMeta};

use std::sync::Arc;
use vitrine_core::config::StorageConfig;

/// Create an object gateway from configuration.
pub async fn from_config(config: &StorageConfig) -> GatewayResult<Arc<dyn ObjectGateway>> {
    config.validate().map_err(GatewayError::Config)?;

    match config {
        StorageConfig::Memory => Ok(Arc::new(MemoryBackend::new())),
        StorageConfig::S3 {
            bucket,
            endpoint,
            region,
            prefix,
            access_key_id,
            secret_access_key,
            force_path_style,
        } => {
            let backend = S3Backend::new(
                bucket,
                endpoint.clone(),
                region.clone(),
                prefix.clone(),
                access_key_id.clone(),
                secret_access_key.clone(),
                *force_path_style,
            )
            .await?;
            Ok(Arc::new(backend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_config_memory_ok() {
        let gateway = from_config(&StorageConfig::Memory).await.unwrap();
        assert_eq!(gateway.backend_name(), "memory");
    }

    #[tokio::test]
    async fn from_config_s3_ok() {
        let config = StorageConfig::S3 {
            bucket: "bucket".to_string(),
            endpoint: Some("minio:9000".to_string()),
            region: Some("us-east-1".to_string()),
            prefix: Some("vitrine".to_string()),
            access_key_id: None,
            secret_access_key: None,
            force_path_style: true,
        };

        let gateway = from_config(&config).await.unwrap();
        assert_eq!(gateway.backend_name(), "s3");
    }

    #[tokio::test]
    async fn from_config_rejects_partial_credentials() {
        let config = StorageConfig::S3 {
            bucket: "bucket".to_string(),
            endpoint: None,
            region: None,
            prefix: None,
            access_key_id: Some("access".to_string()),
            secret_access_key: None,
            force_path_style: false,
        };

        match from_config(&config).await {
            Ok(_) => panic!("expected error"),
            Err(GatewayError::Config(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
}
