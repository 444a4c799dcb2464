use secrecy::{ExposeSecret, SecretString};

use super::signature::{self, SignatureError, SignatureHeader};

/// Trait for verifying webhook signatures
///
/// Verification is synchronous and CPU-bound, so implementations can be
/// shared behind an `Arc` and called from any request task.
pub trait WebhookVerifier: Send + Sync {
    /// Verify the signature header against the raw request body
    ///
    /// # Arguments
    ///
    /// * `signature` - The `X-Hub-Signature` header value, if present
    /// * `payload` - The raw webhook payload bytes, exactly as received
    fn verify(&self, signature: Option<&str>, payload: &[u8]) -> Result<(), SignatureError>;

    /// Whether this verifier actually checks signatures
    fn is_enforcing(&self) -> bool {
        true
    }

    /// Whether a usable secret is available
    fn is_configured(&self) -> bool {
        true
    }
}

/// Verifier used until a secret is configured; rejects every delivery
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl WebhookVerifier for RejectAll {
    fn verify(&self, signature: Option<&str>, _payload: &[u8]) -> Result<(), SignatureError> {
        SignatureHeader::parse(signature)?;
        tracing::warn!("No webhook secret configured - delivery rejected");
        Err(SignatureError::SignatureMismatch)
    }

    fn is_configured(&self) -> bool {
        false
    }
}

/// No-op verifier that accepts all webhooks
///
/// **WARNING:** This verifier accepts ALL webhooks without verification.
/// Only use it for local development against a tunnel you control.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVerification;

impl WebhookVerifier for NoVerification {
    fn verify(&self, _signature: Option<&str>, _payload: &[u8]) -> Result<(), SignatureError> {
        tracing::warn!("NoVerification webhook verifier used - delivery accepted without verification");
        Ok(())
    }

    fn is_enforcing(&self) -> bool {
        false
    }
}

/// HMAC-SHA1 verifier for GitHub's `X-Hub-Signature` header
///
/// The secret is stored as a [`SecretString`] so it never shows up in debug
/// output or logs. An empty secret signs nothing: with it every delivery is
/// rejected, since anyone can compute an HMAC under an empty key.
///
/// # Example
///
/// ```rust
/// use hubhook::webhooks::{HmacSha1Verifier, WebhookVerifier, signature};
///
/// let verifier = HmacSha1Verifier::new("topsecret");
/// let body = br#"{"zen":"test"}"#;
/// let header = signature::sign(b"topsecret", body);
///
/// assert!(verifier.verify(Some(header.as_str()), body).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HmacSha1Verifier {
    secret: SecretString,
}

impl HmacSha1Verifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    pub fn from_secret(secret: SecretString) -> Self {
        Self { secret }
    }
}

impl WebhookVerifier for HmacSha1Verifier {
    fn verify(&self, signature: Option<&str>, payload: &[u8]) -> Result<(), SignatureError> {
        if !self.is_configured() {
            return RejectAll.verify(signature, payload);
        }

        let result = signature::check(self.secret.expose_secret().as_bytes(), signature, payload);

        if let Err(ref e) = result {
            tracing::debug!(reason = %e, "Webhook signature verification failed");
        }

        result
    }

    fn is_configured(&self) -> bool {
        !self.secret.expose_secret().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_hmac_verifier_accepts_valid_signature() {
        let verifier = HmacSha1Verifier::new("my-webhook-secret");
        let payload = br#"{"action":"opened"}"#;
        let header = signature::sign(b"my-webhook-secret", payload);

        assert_eq!(verifier.verify(Some(header.as_str()), payload), Ok(()));
        assert!(verifier.is_enforcing());
    }

    #[test]
    fn test_hmac_verifier_rejects_wrong_secret() {
        let payload = b"test payload";
        let header = signature::sign(b"secret1", payload);

        let verifier = HmacSha1Verifier::new("secret2");
        assert_eq!(
            verifier.verify(Some(header.as_str()), payload),
            Err(SignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn test_hmac_verifier_propagates_header_errors() {
        let verifier = HmacSha1Verifier::new("secret");

        assert_eq!(verifier.verify(None, b"x"), Err(SignatureError::MissingSignature));
        assert_eq!(
            verifier.verify(Some("garbage"), b"x"),
            Err(SignatureError::MalformedSignatureHeader)
        );
        assert_eq!(
            verifier.verify(Some("sha256=00"), b"x"),
            Err(SignatureError::UnsupportedAlgorithm("sha256".to_string()))
        );
    }

    #[test]
    fn test_debug_output_redacts_secret() {
        let verifier = HmacSha1Verifier::new("super-secret-value");
        let debug = format!("{:?}", verifier);
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_no_verification_accepts_everything() {
        let verifier = NoVerification;

        assert!(verifier.verify(None, b"any payload").is_ok());
        assert!(verifier.verify(Some("sha1=bogus"), b"").is_ok());
        assert!(!verifier.is_enforcing());
    }

    #[test]
    fn test_empty_secret_rejects_empty_key_signature() {
        let verifier = HmacSha1Verifier::new("");
        let header = signature::sign(b"", b"forged");

        assert_eq!(
            verifier.verify(Some(header.as_str()), b"forged"),
            Err(SignatureError::SignatureMismatch)
        );
        assert!(!verifier.is_configured());
    }

    #[test]
    fn test_reject_all() {
        let header = signature::sign(b"", b"{}");

        assert_eq!(RejectAll.verify(Some(header.as_str()), b"{}"), Err(SignatureError::SignatureMismatch));
        assert_eq!(RejectAll.verify(None, b"{}"), Err(SignatureError::MissingSignature));
        assert!(RejectAll.is_enforcing());
        assert!(!RejectAll.is_configured());
    }

    #[test]
    fn test_verifier_as_dyn_trait() {
        let verifier: Arc<dyn WebhookVerifier> = Arc::new(HmacSha1Verifier::new("arc-secret"));
        let header = signature::sign(b"arc-secret", b"arc-test");
        assert!(verifier.verify(Some(header.as_str()), b"arc-test").is_ok());
    }
}
