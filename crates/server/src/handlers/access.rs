//! Link dispatch: signed capability links and allow-listed simple links.
//!
//! Both link shapes live under the same fallback route and are told apart by
//! path shape alone:
//!
//! - `/{expiry_ms}/{digest}/{key...}` where the first segment parses as an
//!   integer and the second is 32 hex characters is a signed link.
//! - Anything else is a simple link whose first directory must be
//!   allow-listed.

use crate::error::{ApiError, ApiResult};
use crate::rewrite::{base_path, rewrite_playlist};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use std::future::Future;
use std::time::Duration;
use time::OffsetDateTime;
use vitrine_core::capability::{CapabilityToken, Verification};
use vitrine_core::DIGEST_HEX_LEN;
use vitrine_storage::GatewayResult;

/// Playlist media types that trigger rewriting.
const MEDIA_TYPE_APPLE_MPEGURL: &str = "application/vnd.apple.mpegurl";
const MEDIA_TYPE_AUDIO_MPEGURL: &str = "audio/mpegurl";

/// Opaque media types that redirect to a presigned URL.
const MEDIA_TYPE_BINARY_OCTET_STREAM: &str = "binary/octet-stream";
const MEDIA_TYPE_APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Marker header present on rewritten playlist responses.
pub const REWRITTEN_HEADER: &str = "x-vitrine-rewritten";

/// A request path classified by shape.
#[derive(Debug)]
enum Link {
    Signed(CapabilityToken),
    Simple {
        first_dir: String,
        resource_path: String,
    },
}

/// Classify a request path.
///
/// Signed shape requires all three parts; a path like `/1234/beef` with no
/// trailing key falls through to simple-link handling.
fn parse_link(path: &str) -> Option<Link> {
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return None;
    }

    let mut parts = path.splitn(3, '/');
    let first = parts.next()?;
    let second = parts.next();
    let rest = parts.next();

    if let (Ok(expiry_ms), Some(digest), Some(resource_path)) =
        (first.parse::<i64>(), second, rest)
    {
        let hex_shaped =
            digest.len() == DIGEST_HEX_LEN && digest.bytes().all(|b| b.is_ascii_hexdigit());
        if hex_shaped && !resource_path.is_empty() {
            return Some(Link::Signed(CapabilityToken {
                expiry_ms,
                digest: digest.to_string(),
                resource_path: resource_path.to_string(),
            }));
        }
    }

    Some(Link::Simple {
        first_dir: first.to_string(),
        resource_path: path.to_string(),
    })
}

/// Content type without parameters, lowercased. `Audio/Mpegurl; charset=x`
/// matches the same branch as `audio/mpegurl`.
fn media_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

fn epoch_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Run one object store round trip under the configured timeout.
async fn with_gateway_timeout<T>(
    state: &AppState,
    fut: impl Future<Output = GatewayResult<T>>,
) -> ApiResult<T> {
    tokio::time::timeout(state.gateway_timeout(), fut)
        .await
        .map_err(|_| ApiError::GatewayTimeout)?
        .map_err(ApiError::from)
}

/// Fallback handler: every non-health path is a link of one of the two
/// shapes.
pub async fn dispatch(State(state): State<AppState>, req: Request) -> Response {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return ApiError::MethodNotAllowed.into_response();
    }

    let path = req.uri().path().to_string();
    let result = match parse_link(&path) {
        Some(Link::Signed(token)) => handle_signed(&state, token).await,
        Some(Link::Simple {
            first_dir,
            resource_path,
        }) => handle_simple(&state, &first_dir, &resource_path).await,
        None => Err(ApiError::NotFound("empty request path".to_string())),
    };

    match result {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

async fn handle_signed(state: &AppState, token: CapabilityToken) -> ApiResult<Response> {
    let now_ms = epoch_ms();
    match token.verify(&state.secrets, now_ms) {
        Verification::Expired => {
            tracing::debug!(
                expiry_ms = token.expiry_ms,
                path = %token.resource_path,
                "request for expired link"
            );
            return Err(ApiError::LinkExpired);
        }
        Verification::InvalidDigest => {
            tracing::warn!(path = %token.resource_path, "digest matches no configured salt");
            return Err(ApiError::InvalidSignature);
        }
        Verification::Valid => {}
    }

    // Remaining lifetime of the link; every presigned URL issued for this
    // request expires together with it.
    let remaining = Duration::from_millis((token.expiry_ms - now_ms) as u64);

    let (meta, body) =
        with_gateway_timeout(state, state.gateway.fetch(&token.resource_path)).await?;
    let content_type = meta.content_type.unwrap_or_default();

    match media_essence(&content_type).as_str() {
        MEDIA_TYPE_APPLE_MPEGURL | MEDIA_TYPE_AUDIO_MPEGURL => {
            let original = with_gateway_timeout(state, body.text()).await?;
            let rewritten = rewrite_playlist(
                state.gateway.as_ref(),
                base_path(&token.resource_path),
                &original,
                remaining,
            )
            .await?;
            tracing::debug!(path = %token.resource_path, bytes = rewritten.len(), "rewrote playlist");
            playlist_response(rewritten)
        }
        MEDIA_TYPE_BINARY_OCTET_STREAM | MEDIA_TYPE_APPLICATION_OCTET_STREAM => {
            body.abort().await;
            let url = with_gateway_timeout(
                state,
                state.gateway.presign_get(&token.resource_path, remaining),
            )
            .await?;
            redirect_response(&url)
        }
        other => {
            body.abort().await;
            tracing::warn!(
                content_type = %content_type,
                path = %token.resource_path,
                "content type not handled by signed links"
            );
            Err(ApiError::UnsupportedContentType(other.to_string()))
        }
    }
}

async fn handle_simple(
    state: &AppState,
    first_dir: &str,
    resource_path: &str,
) -> ApiResult<Response> {
    let allowed = state
        .config
        .access
        .allowed_first_paths
        .iter()
        .any(|p| p == first_dir);
    if !allowed {
        // Indistinguishable from a missing object on purpose.
        tracing::debug!(first_dir, "first path segment not allow-listed");
        return Err(ApiError::NotFound(format!("no such object: {resource_path}")));
    }

    let url = with_gateway_timeout(
        state,
        state
            .gateway
            .presign_get(resource_path, state.config.access.presign_duration()),
    )
    .await?;
    redirect_response(&url)
}

fn playlist_response(rewritten: String) -> ApiResult<Response> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, MEDIA_TYPE_AUDIO_MPEGURL)
        .header(header::CONTENT_LENGTH, rewritten.len())
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(REWRITTEN_HEADER, "1")
        .body(Body::from(rewritten))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

fn redirect_response(url: &str) -> ApiResult<Response> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, url)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Body::empty())
        .map_err(|e| ApiError::Internal(e.to_string()))
}
