//! Webhook signature header and HMAC verification.
//!
//! Header format:
//!   Signature: t=1700000000,v1=854c0994b8e4...
//!
//! `v1` is HMAC-SHA3-256 over `<t>.<raw body>` keyed with the shared secret.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use hmac::{Hmac, Mac};
use sha3::Sha3_256;
use tracing::debug;

use crate::error::SignatureError;

type HmacSha3 = Hmac<Sha3_256>;

/// Parsed `Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Unix seconds the sender signed at
    pub timestamp: i64,
    pub mac: Vec<u8>,
}

impl Signature {
    /// Parse `t=<decimal>,v1=<hex>`. Unknown keys are skipped; `t` and `v1`
    /// must each appear exactly once.
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut mac = None;

        for kv in header.split(',') {
            let (key, value) = match kv.split_once('=') {
                Some((k, v)) if !v.contains('=') => (k, v),
                _ => return Err(SignatureError::MalformedSegment(kv.to_string())),
            };

            match key {
                "t" => {
                    if timestamp.is_some() {
                        return Err(SignatureError::DuplicateKey("t"));
                    }
                    let t = value
                        .parse::<i64>()
                        .map_err(|source| SignatureError::InvalidTimestamp {
                            value: value.to_string(),
                            source,
                        })?;
                    timestamp = Some(t);
                }
                "v1" => {
                    if mac.is_some() {
                        return Err(SignatureError::DuplicateKey("v1"));
                    }
                    let bytes = hex::decode(value).map_err(|source| SignatureError::InvalidMac {
                        value: value.to_string(),
                        source,
                    })?;
                    mac = Some(bytes);
                }
                _ => debug!(segment = kv, "unknown part of signature"),
            }
        }

        match (timestamp, mac) {
            (Some(timestamp), Some(mac)) => Ok(Self { timestamp, mac }),
            _ => Err(SignatureError::Incomplete(header.to_string())),
        }
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={},v1={}", self.timestamp, hex::encode(&self.mac))
    }
}

fn keyed(secret: &[u8], timestamp: i64, body: &[u8]) -> Option<HmacSha3> {
    let mut mac = HmacSha3::new_from_slice(secret).ok()?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    Some(mac)
}

/// Sign `body` at `timestamp` the way the sender does.
pub fn sign(body: &[u8], timestamp: i64, secret: &[u8]) -> Result<Signature> {
    let mac = keyed(secret, timestamp, body).ok_or_else(|| anyhow::anyhow!("invalid HMAC key"))?;
    Ok(Signature {
        timestamp,
        mac: mac.finalize().into_bytes().to_vec(),
    })
}

/// Constant-time check of `signature.mac` against the MAC of `<t>.<body>`.
///
/// No freshness check here; see [`check_freshness`].
pub fn verify(body: &[u8], signature: &Signature, secret: &[u8]) -> bool {
    match keyed(secret, signature.timestamp, body) {
        Some(mac) => mac.verify_slice(&signature.mac).is_ok(),
        None => false,
    }
}

/// Reject signatures whose timestamp is more than `max_age_secs` away from `now`.
pub fn check_freshness(
    signature: &Signature,
    now: i64,
    max_age_secs: u64,
) -> Result<(), SignatureError> {
    let age = now.abs_diff(signature.timestamp);
    if age > max_age_secs {
        return Err(SignatureError::Stale {
            timestamp: signature.timestamp,
            age,
            max_age: max_age_secs,
        });
    }
    Ok(())
}

/// Shared-secret verifier used by the webhook endpoint.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
    max_age_secs: Option<u64>,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            max_age_secs: None,
        }
    }

    /// Enable the replay window. `None` leaves it off.
    pub fn with_max_age(mut self, max_age_secs: Option<u64>) -> Self {
        self.max_age_secs = max_age_secs;
        self
    }

    /// Parse `header`, verify it against `body`, then apply the replay window if set.
    pub fn authenticate(
        &self,
        header: &str,
        body: &[u8],
        now: i64,
    ) -> Result<Signature, SignatureError> {
        let signature = Signature::parse(header)?;
        if !verify(body, &signature, &self.secret) {
            return Err(SignatureError::Mismatch);
        }
        if let Some(max_age) = self.max_age_secs {
            check_freshness(&signature, now, max_age)?;
        }
        Ok(signature)
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"content":{}}"#;
    const KNOWN_MAC: &str = "854c0994b8e474fa7f33c56ed9e0e797109a210e07d2dc90bdb2998b1c83abcc";

    #[test]
    fn test_parse_header() {
        let sig = Signature::parse("t=1700000000,v1=0aff").unwrap();
        assert_eq!(sig.timestamp, 1_700_000_000);
        assert_eq!(sig.mac, vec![0x0a, 0xff]);
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let sig: Signature = "v0=zz,t=5,v1=00,extra=1".parse().unwrap();
        assert_eq!(sig.timestamp, 5);
        assert_eq!(sig.mac, vec![0]);
    }

    #[test]
    fn test_zero_timestamp_counts_as_present() {
        assert_eq!(Signature::parse("t=0,v1=00").unwrap().timestamp, 0);
    }

    #[test]
    fn test_parse_rejects_missing_parts() {
        assert!(matches!(Signature::parse("v1=00"), Err(SignatureError::Incomplete(_))));
        assert!(matches!(Signature::parse("t=1"), Err(SignatureError::Incomplete(_))));
        assert!(matches!(Signature::parse(""), Err(SignatureError::MalformedSegment(_))));
    }

    #[test]
    fn test_parse_rejects_duplicates() {
        assert!(matches!(
            Signature::parse("t=1,t=2,v1=00"),
            Err(SignatureError::DuplicateKey("t"))
        ));
        assert!(matches!(
            Signature::parse("t=1,v1=00,v1=01"),
            Err(SignatureError::DuplicateKey("v1"))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(matches!(
            Signature::parse("t=abc,v1=00"),
            Err(SignatureError::InvalidTimestamp { .. })
        ));
        assert!(matches!(Signature::parse("t=1,v1=xyz"), Err(SignatureError::InvalidMac { .. })));
        assert!(matches!(Signature::parse("t=1,v1=0"), Err(SignatureError::InvalidMac { .. })));
    }

    #[test]
    fn test_parse_rejects_malformed_segments() {
        assert!(matches!(
            Signature::parse("t=1,v1=00,junk"),
            Err(SignatureError::MalformedSegment(_))
        ));
        assert!(matches!(
            Signature::parse("t=1,v1=00=11"),
            Err(SignatureError::MalformedSegment(_))
        ));
    }

    #[test]
    fn test_sign_matches_known_vector() {
        let sig = sign(BODY, 1_700_000_000, b"secret").unwrap();
        assert_eq!(hex::encode(&sig.mac), KNOWN_MAC);
        assert_eq!(sig.to_string(), format!("t=1700000000,v1={KNOWN_MAC}"));
    }

    #[test]
    fn test_verify_accepts_known_vector() {
        let sig = Signature::parse(&format!("t=1700000000,v1={KNOWN_MAC}")).unwrap();
        assert!(verify(BODY, &sig, b"secret"));
    }

    #[test]
    fn test_verify_rejects_single_byte_change() {
        let sig = sign(BODY, 1_700_000_000, b"secret").unwrap();
        let mut tampered = BODY.to_vec();
        tampered[2] ^= 0x01;
        assert!(!verify(&tampered, &sig, b"secret"));
    }

    #[test]
    fn test_verify_rejects_wrong_secret_timestamp_or_length() {
        let sig = sign(BODY, 1_700_000_000, b"secret").unwrap();
        assert!(!verify(BODY, &sig, b"other"));

        let shifted = Signature { timestamp: 1_700_000_001, ..sig.clone() };
        assert!(!verify(BODY, &shifted, b"secret"));

        let truncated = Signature { mac: sig.mac[..16].to_vec(), ..sig };
        assert!(!verify(BODY, &truncated, b"secret"));
    }

    #[test]
    fn test_freshness_window() {
        let sig = Signature { timestamp: 1_000, mac: vec![] };
        assert!(check_freshness(&sig, 1_300, 300).is_ok());
        assert!(check_freshness(&sig, 700, 300).is_ok());
        assert!(matches!(
            check_freshness(&sig, 1_301, 300),
            Err(SignatureError::Stale { age: 301, .. })
        ));
    }

    #[test]
    fn test_verifier_authenticate() {
        let header = sign(BODY, 1_000, b"secret").unwrap().to_string();

        let verifier = SignatureVerifier::new("secret");
        assert!(verifier.authenticate(&header, BODY, 999_999).is_ok());
        assert!(matches!(
            verifier.authenticate(&header, b"{}", 1_000),
            Err(SignatureError::Mismatch)
        ));

        let strict = verifier.with_max_age(Some(60));
        assert!(strict.authenticate(&header, BODY, 1_030).is_ok());
        assert!(matches!(
            strict.authenticate(&header, BODY, 2_000),
            Err(SignatureError::Stale { .. })
        ));
    }

    #[test]
    fn test_verifier_debug_hides_secret() {
        let dbg = format!("{:?}", SignatureVerifier::new("hunter2"));
        assert!(!dbg.contains("hunter2"));
    }
}
