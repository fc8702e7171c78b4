//! Capability tokens and the rotating secret set.
//!
//! A link carries its own authorization: an expiry timestamp and a digest
//! over `{expiry}{path}{salt}`. Possession of a correctly formed URL proves
//! authorization; there is no server-side session state.

use md5::{Digest, Md5};

/// Outcome of verifying a capability token.
///
/// Expiry and digest mismatch are deliberately distinct: expiry is a benign
/// lifecycle event while a bad digest may indicate tampering, and the two map
/// to different HTTP statuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verification {
    /// Unexpired and the digest matches a listed salt.
    Valid,
    /// The expiry timestamp is not in the future. Checked first, regardless
    /// of digest validity.
    Expired,
    /// The digest matches no salt in the set.
    InvalidDigest,
}

/// Digest scheme binding expiry and resource path to a salt.
///
/// The default wire format is [`Md5Digest`]; keeping the scheme behind a
/// trait lets a keyed MAC replace it without touching the dispatcher or the
/// playlist rewriter.
pub trait DigestScheme: Send + Sync {
    /// Compute the digest for one `(expiry, path, salt)` triple.
    fn digest(&self, expiry_ms: i64, resource_path: &str, salt: &str) -> String;
}

/// Wire-compatible scheme: uppercase hex MD5 over the concatenation of the
/// decimal expiry, the resource path (no leading slash) and the salt.
#[derive(Clone, Copy, Debug, Default)]
pub struct Md5Digest;

impl DigestScheme for Md5Digest {
    fn digest(&self, expiry_ms: i64, resource_path: &str, salt: &str) -> String {
        compute_digest(expiry_ms, resource_path, salt)
    }
}

/// Compute the default (MD5) capability digest.
///
/// Pure and deterministic: same inputs always yield the same uppercase hex
/// string.
pub fn compute_digest(expiry_ms: i64, resource_path: &str, salt: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(expiry_ms.to_string().as_bytes());
    hasher.update(resource_path.as_bytes());
    hasher.update(salt.as_bytes());
    let result = hasher.finalize();
    result.iter().map(|b| format!("{b:02X}")).collect()
}

/// Ordered set of salts, each independently valid.
///
/// Rotation works by prepending a new salt while the old one stays listed:
/// links signed under the old salt keep verifying until they expire
/// naturally. Order only matters for first-match short-circuiting.
#[derive(Clone, Debug, Default)]
pub struct SecretSet {
    salts: Vec<String>,
}

impl SecretSet {
    /// Create a secret set from ordered salts.
    pub fn new(salts: Vec<String>) -> Self {
        Self { salts }
    }

    /// Whether the set contains no salts (signed mode disabled).
    pub fn is_empty(&self) -> bool {
        self.salts.is_empty()
    }

    /// Iterate salts in set order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.salts.iter().map(String::as_str)
    }
}

/// A capability token extracted from a request path.
#[derive(Clone, Debug)]
pub struct CapabilityToken {
    /// Expiry as epoch milliseconds.
    pub expiry_ms: i64,
    /// Claimed digest, hex (any case).
    pub digest: String,
    /// Object key the token authorizes, no leading slash.
    pub resource_path: String,
}

impl CapabilityToken {
    /// Verify against a secret set using the default digest scheme.
    pub fn verify(&self, secrets: &SecretSet, now_ms: i64) -> Verification {
        self.verify_with(&Md5Digest, secrets, now_ms)
    }

    /// Verify against a secret set using an explicit digest scheme.
    ///
    /// Expiry is checked first and independently of the digest; there is no
    /// clock-skew grace period. Otherwise the digest is compared against
    /// every salt in set order, returning on first match.
    pub fn verify_with(
        &self,
        scheme: &dyn DigestScheme,
        secrets: &SecretSet,
        now_ms: i64,
    ) -> Verification {
        if self.expiry_ms <= now_ms {
            return Verification::Expired;
        }

        let claimed = self.digest.to_ascii_uppercase();
        for salt in secrets.iter() {
            if scheme.digest(self.expiry_ms, &self.resource_path, salt) == claimed {
                return Verification::Valid;
            }
        }

        Verification::InvalidDigest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPIRY: i64 = 1_700_000_000_000;

    fn token(digest: &str) -> CapabilityToken {
        CapabilityToken {
            expiry_ms: EXPIRY,
            digest: digest.to_string(),
            resource_path: "media/a.ts".to_string(),
        }
    }

    #[test]
    fn test_digest_known_vectors() {
        // Pinned wire-format vectors: MD5("{expiry}{path}{salt}") uppercased.
        assert_eq!(
            compute_digest(EXPIRY, "media/a.ts", "alpha"),
            "02D0F822FE2996790DDE33C19D6F5423"
        );
        assert_eq!(
            compute_digest(EXPIRY, "media/a.ts", "beta"),
            "17CE409D7E2A389E59ACF6C6EBA99681"
        );
    }

    #[test]
    fn test_digest_is_deterministic() {
        let a = compute_digest(EXPIRY, "show/ep1/playlist.m3u8", "alpha");
        let b = compute_digest(EXPIRY, "show/ep1/playlist.m3u8", "alpha");
        assert_eq!(a, b);
        assert_eq!(a, a.to_ascii_uppercase());
    }

    #[test]
    fn test_verify_valid_token() {
        let secrets = SecretSet::new(vec!["alpha".to_string()]);
        let token = token(&compute_digest(EXPIRY, "media/a.ts", "alpha"));
        assert_eq!(token.verify(&secrets, EXPIRY - 3_600_000), Verification::Valid);
    }

    #[test]
    fn test_verify_accepts_lowercase_digest() {
        let secrets = SecretSet::new(vec!["alpha".to_string()]);
        let digest = compute_digest(EXPIRY, "media/a.ts", "alpha").to_ascii_lowercase();
        assert_eq!(
            token(&digest).verify(&secrets, EXPIRY - 1),
            Verification::Valid
        );
    }

    #[test]
    fn test_expired_wins_over_correct_digest() {
        let secrets = SecretSet::new(vec!["alpha".to_string()]);
        let token = token(&compute_digest(EXPIRY, "media/a.ts", "alpha"));
        assert_eq!(token.verify(&secrets, EXPIRY), Verification::Expired);
        assert_eq!(token.verify(&secrets, EXPIRY + 1), Verification::Expired);
    }

    #[test]
    fn test_expired_regardless_of_digest() {
        let secrets = SecretSet::new(vec!["alpha".to_string()]);
        assert_eq!(
            token("0000000000000000000000000000000F").verify(&secrets, EXPIRY + 1),
            Verification::Expired
        );
    }

    #[test]
    fn test_tampered_digest_is_invalid() {
        let secrets = SecretSet::new(vec!["alpha".to_string()]);
        let mut digest = compute_digest(EXPIRY, "media/a.ts", "alpha");
        // Flip one hex character.
        let last = digest.pop().unwrap();
        digest.push(if last == '3' { '4' } else { '3' });
        assert_eq!(
            token(&digest).verify(&secrets, EXPIRY - 1),
            Verification::InvalidDigest
        );
    }

    #[test]
    fn test_digest_binds_path() {
        let secrets = SecretSet::new(vec!["alpha".to_string()]);
        let mut token = token(&compute_digest(EXPIRY, "media/a.ts", "alpha"));
        token.resource_path = "media/b.ts".to_string();
        assert_eq!(
            token.verify(&secrets, EXPIRY - 1),
            Verification::InvalidDigest
        );
    }

    #[test]
    fn test_rotation_old_salt_still_verifies() {
        let token = token(&compute_digest(EXPIRY, "media/a.ts", "old-salt"));

        let before = SecretSet::new(vec!["old-salt".to_string()]);
        assert_eq!(token.verify(&before, EXPIRY - 1), Verification::Valid);

        // New salt added to the front; old links keep working.
        let after = SecretSet::new(vec!["new-salt".to_string(), "old-salt".to_string()]);
        assert_eq!(token.verify(&after, EXPIRY - 1), Verification::Valid);
    }

    #[test]
    fn test_empty_secret_set_rejects() {
        let secrets = SecretSet::new(vec![]);
        let token = token(&compute_digest(EXPIRY, "media/a.ts", "alpha"));
        assert_eq!(
            token.verify(&secrets, EXPIRY - 1),
            Verification::InvalidDigest
        );
    }
}
