//! Core domain types and shared logic for the Vitrine gateway.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Capability tokens and the rotating secret set
//! - HLS media playlist structure, parsing and serialization
//! - Configuration types

pub mod capability;
pub mod config;
pub mod error;
pub mod playlist;

pub use capability::{CapabilityToken, SecretSet, Verification, compute_digest};
pub use error::{Error, Result};
pub use playlist::{MediaPlaylist, MediaSegment};

/// Length of a capability digest in hex characters (MD5).
pub const DIGEST_HEX_LEN: usize = 32;
