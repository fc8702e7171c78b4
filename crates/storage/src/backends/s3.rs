//! S3-compatible gateway backend using the AWS SDK.

use crate::error::{GatewayError, GatewayResult};
use crate::traits::{ObjectBody, ObjectGateway, ObjectMeta};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::future::ProvideCredentials as ProvideCredentialsFuture;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_smithy_http_client::Builder as SmithyHttpClientBuilder;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::instrument;

/// Marker included in lazy-credentials initialization errors so we can map
/// them to actionable config errors instead of generic S3 transport failures.
const CREDENTIALS_INIT_ERROR_MARKER: &str = "vitrine-s3-lazy-credentials-init";
const CREDENTIALS_RESOLVE_ERROR_MARKER: &str = "vitrine-s3-lazy-credentials-resolve";

/// Lazily initializes the AWS default credentials chain on first signed
/// request, so backend construction never blocks on ambient-credential
/// discovery.
#[derive(Debug)]
struct LazyDefaultCredentialsProvider {
    region: String,
    chain: OnceCell<aws_config::default_provider::credentials::DefaultCredentialsChain>,
}

impl LazyDefaultCredentialsProvider {
    fn new(region: String) -> Self {
        Self {
            region,
            chain: OnceCell::new(),
        }
    }

    async fn chain(
        &self,
    ) -> Result<&aws_config::default_provider::credentials::DefaultCredentialsChain, CredentialsError>
    {
        self.chain
            .get_or_try_init(|| async {
                Ok(
                    aws_config::default_provider::credentials::DefaultCredentialsChain::builder()
                        .region(aws_config::Region::new(self.region.clone()))
                        .build()
                        .await,
                )
            })
            .await
            .map_err(|err: CredentialsError| {
                CredentialsError::provider_error(format!(
                    "{CREDENTIALS_INIT_ERROR_MARKER}: default AWS credentials chain init failed: {err}"
                ))
            })
    }

    async fn credentials(&self) -> aws_credential_types::provider::Result {
        let chain = self.chain().await?;
        chain.provide_credentials().await.map_err(|err| {
            CredentialsError::provider_error(format!(
                "{CREDENTIALS_RESOLVE_ERROR_MARKER}: default AWS credentials resolution failed: {err}"
            ))
        })
    }
}

impl ProvideCredentials for LazyDefaultCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> ProvideCredentialsFuture<'a>
    where
        Self: 'a,
    {
        ProvideCredentialsFuture::new(self.credentials())
    }
}

fn map_s3_operation_error<E>(err: aws_sdk_s3::error::SdkError<E>) -> GatewayError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let err_text = err.to_string();
    if err_text.contains(CREDENTIALS_INIT_ERROR_MARKER)
        || err_text.contains(CREDENTIALS_RESOLVE_ERROR_MARKER)
    {
        return GatewayError::Config(
            "S3 credential initialization failed. Configure AWS credentials explicitly or \
             ensure ambient AWS credentials and trust roots are available."
                .to_string(),
        );
    }

    GatewayError::S3(Box::new(err))
}

/// S3-compatible object gateway using the AWS SDK.
pub struct S3Backend {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl std::fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl S3Backend {
    /// Create a new S3 backend.
    ///
    /// # Arguments
    /// * `force_path_style` - Use path-style URLs (`endpoint/bucket/key`)
    ///   instead of virtual-hosted style (`bucket.endpoint/key`). Required
    ///   for MinIO and some S3-compatible services; AWS S3 requires
    ///   virtual-hosted style (false).
    pub async fn new(
        bucket: &str,
        endpoint: Option<String>,
        region: Option<String>,
        prefix: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        force_path_style: bool,
    ) -> GatewayResult<Self> {
        let has_access_key_id = access_key_id.is_some();
        let has_secret_access_key = secret_access_key.is_some();
        if has_access_key_id ^ has_secret_access_key {
            return Err(GatewayError::Config(
                "s3 config requires both access_key_id and secret_access_key when either is set"
                    .to_string(),
            ));
        }

        // Build S3 client config directly and defer ambient credentials
        // chain initialization until first signed request.
        let resolved_region = region.unwrap_or_else(|| "us-east-1".to_string());
        let mut s3_config_builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_config::Region::new(resolved_region.clone()));

        // Apply credentials: explicit config or ambient AWS credential chain
        if let (Some(key_id), Some(secret)) = (access_key_id, secret_access_key) {
            let credentials = aws_sdk_s3::config::Credentials::new(
                key_id,
                secret,
                None, // session token
                None, // expiration
                "vitrine-config",
            );
            s3_config_builder = s3_config_builder.credentials_provider(credentials);
        } else {
            s3_config_builder = s3_config_builder
                .credentials_provider(LazyDefaultCredentialsProvider::new(resolved_region.clone()));
        }

        let normalized_endpoint = endpoint.as_ref().map(|endpoint_url| {
            // Handle bare host:port endpoints (e.g., "minio:9000") by prepending http://
            let endpoint_lower = endpoint_url.to_lowercase();
            if endpoint_lower.starts_with("http://") || endpoint_lower.starts_with("https://") {
                endpoint_url.clone()
            } else {
                format!("http://{}", endpoint_url)
            }
        });

        if let Some(endpoint_url) = &normalized_endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);

            // For explicit HTTP endpoints (e.g. local MinIO), use an HTTP-only
            // client so SDK initialization doesn't depend on native trust roots.
            if endpoint_url.to_ascii_lowercase().starts_with("http://") {
                s3_config_builder =
                    s3_config_builder.http_client(SmithyHttpClientBuilder::new().build_http());
            }
        }

        if force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = Client::from_conf(s3_config_builder.build());

        // Normalize prefix: strip trailing slashes to avoid double-slash keys
        let normalized_prefix = prefix.map(|p| p.trim_end_matches('/').to_string());

        Ok(Self {
            client,
            bucket: bucket.to_string(),
            prefix: normalized_prefix,
        })
    }

    /// Get the full object key for a key (applies prefix if configured).
    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, key),
            None => key.to_string(),
        }
    }

    /// Convert an AWS SDK error to GatewayError, mapping NotFound appropriately.
    fn map_sdk_error<E>(err: aws_sdk_s3::error::SdkError<E>, key: &str) -> GatewayError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        if let aws_sdk_s3::error::SdkError::ServiceError(ref service_err) = err {
            let raw = service_err.raw();
            if raw.status().as_u16() == 404 {
                return GatewayError::NotFound(key.to_string());
            }
        }
        map_s3_operation_error(err)
    }
}

/// Open body of one S3 GetObject response.
struct S3Body {
    key: String,
    body: aws_sdk_s3::primitives::ByteStream,
}

#[async_trait]
impl ObjectBody for S3Body {
    async fn text(self: Box<Self>) -> GatewayResult<String> {
        let data = self
            .body
            .collect()
            .await
            .map_err(|e| GatewayError::S3(Box::new(e)))?
            .into_bytes();
        String::from_utf8(data.to_vec())
            .map_err(|e| GatewayError::InvalidBody(format!("{}: {e}", self.key)))
    }

    async fn abort(self: Box<Self>) {
        // Dropping the ByteStream cancels the in-flight transfer and returns
        // the connection to the pool.
        tracing::trace!(key = %self.key, "aborting object body read");
        drop(self.body);
    }
}

#[async_trait]
impl ObjectGateway for S3Backend {
    #[instrument(skip(self), fields(backend = "s3"))]
    async fn fetch(&self, key: &str) -> GatewayResult<(ObjectMeta, Box<dyn ObjectBody>)> {
        let full_key = self.full_key(key);
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, key))?;

        let meta = ObjectMeta {
            content_type: output.content_type().map(str::to_string),
            size: output.content_length().and_then(|l| u64::try_from(l).ok()),
        };
        let body = S3Body {
            key: key.to_string(),
            body: output.body,
        };

        Ok((meta, Box::new(body)))
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn presign_get(&self, key: &str, expires_in: Duration) -> GatewayResult<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| GatewayError::Presign(e.to_string()))?;

        let full_key = self.full_key(key);
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .presigned(presigning)
            .await
            .map_err(|e| Self::map_sdk_error(e, key))?;

        Ok(presigned.uri().to_string())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }

    #[instrument(skip(self), fields(backend = "s3"))]
    async fn health_check(&self) -> GatewayResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(map_s3_operation_error)?;
        Ok(())
    }
}
