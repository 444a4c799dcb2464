//! `X-Hub-Signature` parsing and HMAC verification.
//!
//! GitHub signs every delivery with `HMAC(secret, body)` and sends the result
//! as `<algorithm>=<hex digest>`. Only the legacy `sha1` form is accepted here;
//! any other algorithm name is rejected rather than negotiated.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the signature of the raw request body
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// Reasons a delivery fails signature verification.
///
/// Messages are safe to return to clients: none of them include the secret,
/// the presented digest or the body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("No X-Hub-Signature header")]
    MissingSignature,

    #[error("Malformed X-Hub-Signature header, expected <algorithm>=<digest>")]
    MalformedSignatureHeader,

    #[error("Unsupported digest algorithm {0}")]
    UnsupportedAlgorithm(String),

    #[error("Body digest did not match signature digest")]
    SignatureMismatch,
}

/// Digest algorithms the verifier knows how to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
}

impl DigestAlgorithm {
    /// Name used as the header prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
        }
    }

    /// Hex-encoded (lowercase) HMAC of `body` under `secret`
    pub fn hmac_hex(&self, secret: &[u8], body: &[u8]) -> String {
        match self {
            Self::Sha1 => {
                let mut mac =
                    HmacSha1::new_from_slice(secret).expect("HMAC can take key of any size");
                mac.update(body);
                hex::encode(mac.finalize().into_bytes())
            }
        }
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = SignatureError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "sha1" => Ok(Self::Sha1),
            other => Err(SignatureError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// A parsed `<algorithm>=<digest>` header value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureHeader<'a> {
    pub algorithm: DigestAlgorithm,
    pub digest: &'a str,
}

impl<'a> SignatureHeader<'a> {
    /// Parse a header value, splitting on the first `=`.
    ///
    /// An absent or empty value is `MissingSignature`; a value without `=` is
    /// `MalformedSignatureHeader`.
    pub fn parse(value: Option<&'a str>) -> Result<Self, SignatureError> {
        let value = match value {
            Some(v) if !v.is_empty() => v,
            _ => return Err(SignatureError::MissingSignature),
        };

        let (algorithm, digest) = value
            .split_once('=')
            .ok_or(SignatureError::MalformedSignatureHeader)?;

        Ok(Self {
            algorithm: algorithm.parse()?,
            digest,
        })
    }
}

/// Read `X-Hub-Signature` from the request headers
///
/// A value that is present but not valid UTF-8 is `MalformedSignatureHeader`,
/// not missing.
pub fn signature_header(headers: &HeaderMap) -> Result<Option<&str>, SignatureError> {
    headers
        .get(SIGNATURE_HEADER)
        .map(|v| v.to_str().map_err(|_| SignatureError::MalformedSignatureHeader))
        .transpose()
}

/// Verify that `header` is a valid signature of `body` under `secret`.
///
/// `body` must be the exact bytes received on the wire.
pub fn check(secret: &[u8], header: Option<&str>, body: &[u8]) -> Result<(), SignatureError> {
    let header = SignatureHeader::parse(header)?;
    let expected = header.algorithm.hmac_hex(secret, body);

    if constant_time_compare(expected.as_bytes(), header.digest.as_bytes()) {
        Ok(())
    } else {
        Err(SignatureError::SignatureMismatch)
    }
}

/// Build the header value GitHub would send for `body`
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    let algorithm = DigestAlgorithm::Sha1;
    format!("{}={}", algorithm.as_str(), algorithm.hmac_hex(secret, body))
}

/// Equality whose running time does not depend on where the inputs differ.
///
/// Inputs of different length compare unequal; the length itself is not secret.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.ct_eq(b).into()
}
