use crate::domain_model::SessionId;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;

/// Binds the OAuth `state` parameter to the session that started sign-in.
pub struct StateSigner {
    key: Vec<u8>,
}

impl StateSigner {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    pub fn sign(&self, session: &SessionId) -> anyhow::Result<String> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)?;
        mac.update(session.0.as_bytes());
        let out = mac.finalize().into_bytes();
        Ok(hex::encode(out))
    }

    pub fn verify(&self, session: &SessionId, state: &str) -> bool {
        let Ok(provided) = hex::decode(state) else {
            return false;
        };
        let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&self.key) else {
            return false;
        };
        mac.update(session.0.as_bytes());
        mac.verify_slice(&provided).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_bound_to_session() {
        let signer = StateSigner::new("test-key");
        let a = SessionId("session-a".into());
        let b = SessionId("session-b".into());

        let state = signer.sign(&a).unwrap();
        assert!(signer.verify(&a, &state));
        assert!(!signer.verify(&b, &state));
        assert!(!signer.verify(&a, "not-hex"));
        assert!(!StateSigner::new("other-key").verify(&a, &state));
    }
}
