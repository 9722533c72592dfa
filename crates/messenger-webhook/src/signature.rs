//! Webhook signature handling
//!
//! The platform signs every delivery with an HMAC of the raw request body,
//! keyed by the app secret. The digest arrives in a header of the form
//! `<algorithm>=<hex>`: `X-Hub-Signature` carries `sha1=...` and
//! `X-Hub-Signature-256` carries `sha256=...`.
//!
//! Verification must run over the untouched body bytes. Re-serializing the
//! JSON before hashing changes whitespace and key order and breaks the match.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Header carrying the legacy SHA-1 digest
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

/// Header carrying the SHA-256 digest
pub const SIGNATURE_256_HEADER: &str = "X-Hub-Signature-256";

/// Signature algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// HMAC-SHA1
    HmacSha1,
    /// HMAC-SHA256
    HmacSha256,
}

impl SignatureAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HmacSha1 => "sha1",
            Self::HmacSha256 => "sha256",
        }
    }

    /// Looks up an algorithm by its header tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sha1" => Some(Self::HmacSha1),
            "sha256" => Some(Self::HmacSha256),
            _ => None,
        }
    }
}

/// Splits a signature header into its algorithm and decoded digest.
///
/// Returns `None` for a missing `=`, an unknown algorithm tag, or invalid
/// hex. Never panics.
///
/// # Examples
///
/// ```
/// use messenger_webhook::{parse_signature_header, SignatureAlgorithm};
///
/// let (alg, digest) = parse_signature_header("sha1=abcd1234").unwrap();
/// assert_eq!(alg, SignatureAlgorithm::HmacSha1);
/// assert_eq!(digest, vec![0xab, 0xcd, 0x12, 0x34]);
///
/// assert!(parse_signature_header("abcd1234").is_none());
/// assert!(parse_signature_header("md5=abcd1234").is_none());
/// assert!(parse_signature_header("sha256=xyz").is_none());
/// ```
pub fn parse_signature_header(header: &str) -> Option<(SignatureAlgorithm, Vec<u8>)> {
    let (tag, hex_sig) = header.trim().split_once('=')?;
    let algorithm = SignatureAlgorithm::from_tag(tag)?;
    let digest = hex::decode(hex_sig).ok()?;
    Some((algorithm, digest))
}

/// Computes the HMAC of a payload with the given algorithm and secret.
pub fn compute_signature(algorithm: SignatureAlgorithm, payload: &[u8], secret: &[u8]) -> Vec<u8> {
    match algorithm {
        SignatureAlgorithm::HmacSha1 => {
            let mut mac =
                HmacSha1::new_from_slice(secret).expect("HMAC can accept any key length");
            mac.update(payload);
            mac.finalize().into_bytes().to_vec()
        }
        SignatureAlgorithm::HmacSha256 => {
            let mut mac =
                HmacSha256::new_from_slice(secret).expect("HMAC can accept any key length");
            mac.update(payload);
            mac.finalize().into_bytes().to_vec()
        }
    }
}

/// Formats a digest as a header value, e.g. `sha1=<hex>`.
pub fn format_signature_header(algorithm: SignatureAlgorithm, signature: &[u8]) -> String {
    format!("{}={}", algorithm.as_str(), hex::encode(signature))
}

/// Verifies a signature header against the payload and secret.
///
/// The algorithm is taken from the header's tag. Comparison is constant-time
/// via the HMAC library.
///
/// # Examples
///
/// ```
/// use messenger_webhook::{compute_signature, format_signature_header, verify_signature, SignatureAlgorithm};
///
/// let payload = br#"{"object":"page","entry":[]}"#;
/// let secret = b"app-secret";
///
/// let sig = compute_signature(SignatureAlgorithm::HmacSha256, payload, secret);
/// let header = format_signature_header(SignatureAlgorithm::HmacSha256, &sig);
///
/// assert!(verify_signature(payload, &header, secret));
/// assert!(!verify_signature(payload, &header, b"other-secret"));
/// ```
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let (algorithm, expected) = match parse_signature_header(signature_header) {
        Some(parsed) => parsed,
        None => return false,
    };

    match algorithm {
        SignatureAlgorithm::HmacSha1 => match HmacSha1::new_from_slice(secret) {
            Ok(mut mac) => {
                mac.update(payload);
                mac.verify_slice(&expected).is_ok()
            }
            Err(_) => false,
        },
        SignatureAlgorithm::HmacSha256 => match HmacSha256::new_from_slice(secret) {
            Ok(mut mac) => {
                mac.update(payload);
                mac.verify_slice(&expected).is_ok()
            }
            Err(_) => false,
        },
    }
}
