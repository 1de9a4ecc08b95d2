//! Slack request signing
//!
//! `v0=` + hex(HMAC-SHA256(signing_secret, "v0:{timestamp}:{raw_body}")).
//! The MAC is checked in constant time and stale timestamps are refused.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::constants::slack::MAX_REQUEST_AGE_SECS;
use crate::types::{DigestError, Result};

type HmacSha256 = Hmac<Sha256>;

const VERSION: &str = "v0";

pub struct SignatureVerifier {
    secret: SecretString,
    max_age_secs: i64,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"[REDACTED]")
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
            max_age_secs: MAX_REQUEST_AGE_SECS,
        }
    }

    fn mac(&self, timestamp: &str, body: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| DigestError::Config(format!("Invalid signing secret: {}", e)))?;
        mac.update(format!("{}:{}:", VERSION, timestamp).as_bytes());
        mac.update(body);
        Ok(mac)
    }

    /// Signature header value for `body` sent at `timestamp`
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String> {
        let digest = self.mac(timestamp, body)?.finalize().into_bytes();
        Ok(format!("{}={}", VERSION, hex::encode(digest)))
    }

    /// Check the signature header against the raw body; `now` is unix seconds
    pub fn verify(&self, timestamp: &str, signature: &str, body: &[u8], now: i64) -> Result<()> {
        let sent: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| DigestError::SignatureInvalid)?;
        if now.abs_diff(sent) > self.max_age_secs.unsigned_abs() {
            return Err(DigestError::SignatureInvalid);
        }

        let expected = signature
            .strip_prefix("v0=")
            .and_then(|h| hex::decode(h).ok())
            .ok_or(DigestError::SignatureInvalid)?;

        self.mac(timestamp, body)?
            .verify_slice(&expected)
            .map_err(|_| DigestError::SignatureInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_known_vector() {
        // Example from Slack's request verification guide
        let verifier = SignatureVerifier::new("8f742231b10e8888abcd99yyyzzz85a5");
        let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
        let signature = verifier.sign("1531420618", body).unwrap();
        assert_eq!(
            signature,
            "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503"
        );
        verifier
            .verify("1531420618", &signature, body, 1531420618)
            .unwrap();
    }

    #[test]
    fn test_round_trip() {
        let verifier = SignatureVerifier::new("secret");
        let ts = NOW.to_string();
        let signature = verifier.sign(&ts, b"payload=%7B%7D").unwrap();
        assert!(verifier.verify(&ts, &signature, b"payload=%7B%7D", NOW).is_ok());
    }

    #[test]
    fn test_tampered_body() {
        let verifier = SignatureVerifier::new("secret");
        let ts = NOW.to_string();
        let signature = verifier.sign(&ts, b"a=1").unwrap();
        assert!(matches!(
            verifier.verify(&ts, &signature, b"a=2", NOW),
            Err(DigestError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let ts = NOW.to_string();
        let signature = SignatureVerifier::new("one").sign(&ts, b"x").unwrap();
        assert!(SignatureVerifier::new("two").verify(&ts, &signature, b"x", NOW).is_err());
    }

    #[test]
    fn test_stale_timestamp() {
        let verifier = SignatureVerifier::new("secret");
        let ts = (NOW - MAX_REQUEST_AGE_SECS - 1).to_string();
        let signature = verifier.sign(&ts, b"x").unwrap();
        assert!(verifier.verify(&ts, &signature, b"x", NOW).is_err());
    }

    #[test]
    fn test_malformed_headers() {
        let verifier = SignatureVerifier::new("secret");
        assert!(verifier.verify("abc", "v0=00", b"x", NOW).is_err());
        assert!(verifier.verify(&NOW.to_string(), "v1=00", b"x", NOW).is_err());
        assert!(verifier.verify(&NOW.to_string(), "v0=zz", b"x", NOW).is_err());
        assert!(matches!(
            verifier.verify("-9223372036854775808", "v0=00", b"x", NOW),
            Err(DigestError::SignatureInvalid)
        ));
        assert!(verifier.verify(&i64::MAX.to_string(), "v0=00", b"x", -1).is_err());
    }
}
