//! Opaque session-credential armor.
//!
//! Stored credentials are base64 over a small JSON payload. Consumers treat
//! the string as a secret blob; only connector implementations look inside.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{de::DeserializeOwned, Serialize};

use crate::TelegramError;

/// Codec for the serialized session credential.
pub struct StringSession;

impl StringSession {
    /// Armor a connector-specific payload into the storable blob.
    pub fn encode<T: Serialize>(payload: &T) -> String {
        // Serialization of a plain payload struct cannot fail.
        let json = serde_json::to_vec(payload).expect("session payload serializes");
        STANDARD.encode(json)
    }

    /// Recover a connector-specific payload from a stored blob.
    pub fn decode<T: DeserializeOwned>(blob: &str) -> Result<T, TelegramError> {
        let raw = STANDARD
            .decode(blob.trim())
            .map_err(|e| TelegramError::BadSession(format!("not base64: {e}")))?;
        serde_json::from_slice(&raw)
            .map_err(|e| TelegramError::BadSession(format!("malformed payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Payload {
        session_id: String,
    }

    #[test]
    fn round_trips_payload() {
        let payload = Payload {
            session_id: "abc-123".into(),
        };
        let blob = StringSession::encode(&payload);
        let back: Payload = StringSession::decode(&blob).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn rejects_garbage() {
        assert!(StringSession::decode::<Payload>("!!not-base64!!").is_err());
        let not_json = base64::engine::general_purpose::STANDARD.encode(b"plain text");
        assert!(StringSession::decode::<Payload>(&not_json).is_err());
    }
}
