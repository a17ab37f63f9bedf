//! Reversible encoding of numeric ids into short tokens.
//!
//! Tokens are [hashids](https://hashids.org/): a salted, deterministic bijection between
//! non-negative integers and short alphanumeric strings. The token *is* the index, so no
//! token → id table is ever stored; decoding is pure computation.
//!
//! Changing the salt invalidates every token issued under the previous salt.

use harsh::Harsh;

/// Sample id used by [`HashIdCodec::self_test`].
const SELF_TEST_ID: i64 = 12345;

/// Errors produced by the codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashIdError {
    #[error("Invalid hashids configuration: {0}")]
    InvalidConfig(String),

    #[error("Id cannot be negative: {0}")]
    InvalidInput(i64),

    #[error("Invalid token: '{0}'")]
    InvalidToken(String),

    #[error("Encoder self-test failed: {0}")]
    SelfTest(String),
}

/// Salted encoder/decoder between ids and short tokens.
#[derive(Debug, Clone)]
pub struct HashIdCodec {
    harsh: Harsh,
    min_length: usize,
}

impl HashIdCodec {
    /// Builds a codec for the given salt and minimum token length.
    ///
    /// # Errors
    ///
    /// Returns [`HashIdError::InvalidConfig`] if the salt is empty, `min_length` is zero,
    /// or the underlying hashids builder rejects the configuration.
    pub fn new(salt: &str, min_length: usize) -> Result<Self, HashIdError> {
        if salt.is_empty() {
            return Err(HashIdError::InvalidConfig(
                "salt cannot be empty".to_string(),
            ));
        }

        if min_length < 1 {
            return Err(HashIdError::InvalidConfig(
                "min length must be at least 1".to_string(),
            ));
        }

        let harsh = Harsh::builder()
            .salt(salt.as_bytes())
            .length(min_length)
            .build()
            .map_err(|e| HashIdError::InvalidConfig(e.to_string()))?;

        Ok(Self { harsh, min_length })
    }

    /// Encodes a non-negative id into a token of at least `min_length` characters.
    pub fn encode(&self, id: i64) -> Result<String, HashIdError> {
        let value = u64::try_from(id).map_err(|_| HashIdError::InvalidInput(id))?;

        let token = self.harsh.encode(&[value]);
        if token.is_empty() {
            return Err(HashIdError::InvalidInput(id));
        }

        Ok(token)
    }

    /// Decodes a token back into the single id it encodes.
    ///
    /// A token only decodes if re-encoding the result reproduces it exactly, which rejects
    /// multi-value payloads, non-canonical spellings and tokens minted under another salt.
    pub fn decode(&self, token: &str) -> Result<i64, HashIdError> {
        let invalid = || HashIdError::InvalidToken(token.to_string());

        if token.is_empty() {
            return Err(invalid());
        }

        let values = self.harsh.decode(token).map_err(|_| invalid())?;
        let [value] = values.as_slice() else {
            return Err(invalid());
        };

        let id = i64::try_from(*value).map_err(|_| invalid())?;

        if self.harsh.encode(&[*value]) != token {
            return Err(invalid());
        }

        Ok(id)
    }

    /// Returns `true` if the token decodes to exactly one id.
    pub fn is_valid(&self, token: &str) -> bool {
        self.decode(token).is_ok()
    }

    /// Configured minimum token length.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Verifies round-trip and minimum length on a fixed sample id.
    ///
    /// Used as a startup gate and by the health endpoint.
    pub fn self_test(&self) -> Result<(), HashIdError> {
        let token = self
            .encode(SELF_TEST_ID)
            .map_err(|e| HashIdError::SelfTest(format!("encoding failed: {e}")))?;

        let decoded = self
            .decode(&token)
            .map_err(|e| HashIdError::SelfTest(format!("decoding failed: {e}")))?;

        if decoded != SELF_TEST_ID {
            return Err(HashIdError::SelfTest(format!(
                "expected {SELF_TEST_ID}, got {decoded}"
            )));
        }

        if token.len() < self.min_length {
            return Err(HashIdError::SelfTest(format!(
                "token length {} is less than configured minimum {}",
                token.len(),
                self.min_length
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> HashIdCodec {
        HashIdCodec::new("test-salt", 3).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();

        for id in [0, 1, 2, 9, 10, 61, 62, 1_000, 12_345, 987_654_321, i64::MAX] {
            let token = codec.encode(id).unwrap();
            assert_eq!(codec.decode(&token).unwrap(), id, "token {token}");
        }
    }

    #[test]
    fn test_round_trip_sequential_range() {
        let codec = codec();

        for id in 0..2_000 {
            let token = codec.encode(id).unwrap();
            assert_eq!(codec.decode(&token).unwrap(), id);
        }
    }

    #[test]
    fn test_distinct_ids_give_distinct_tokens() {
        let codec = codec();
        let tokens: std::collections::HashSet<String> =
            (0..1_000).map(|id| codec.encode(id).unwrap()).collect();

        assert_eq!(tokens.len(), 1_000);
    }

    #[test]
    fn test_min_length_respected() {
        for min_length in [1, 3, 6, 10] {
            let codec = HashIdCodec::new("pad-salt", min_length).unwrap();
            for id in [0, 1, 42, 100_000] {
                let token = codec.encode(id).unwrap();
                assert!(token.len() >= min_length, "{token} shorter than {min_length}");
                assert_eq!(codec.decode(&token).unwrap(), id);
            }
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let first = HashIdCodec::new("same", 4).unwrap();
        let second = HashIdCodec::new("same", 4).unwrap();

        assert_eq!(first.encode(777).unwrap(), second.encode(777).unwrap());
    }

    #[test]
    fn test_salt_changes_tokens() {
        let first = HashIdCodec::new("salt-one", 4).unwrap();
        let second = HashIdCodec::new("salt-two", 4).unwrap();

        assert_ne!(first.encode(777).unwrap(), second.encode(777).unwrap());
    }

    #[test]
    fn test_negative_id_rejected() {
        assert_eq!(codec().encode(-1), Err(HashIdError::InvalidInput(-1)));
    }

    #[test]
    fn test_decode_empty_rejected() {
        assert!(matches!(
            codec().decode(""),
            Err(HashIdError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_decode_garbage_rejected() {
        let codec = codec();

        for token in ["!!!", "@@@@", "a b c", "../etc", "ÄÖÜ"] {
            assert!(codec.decode(token).is_err(), "{token} should not decode");
            assert!(!codec.is_valid(token));
        }
    }

    #[test]
    fn test_decode_foreign_salt_rejected() {
        let issuer = HashIdCodec::new("issuer-salt", 5).unwrap();
        let other = HashIdCodec::new("another-salt", 5).unwrap();

        for id in [1, 17, 4_242, 99_999] {
            let token = issuer.encode(id).unwrap();
            assert!(other.decode(&token).is_err(), "{token} decoded under wrong salt");
        }
    }

    #[test]
    fn test_decode_multi_value_rejected() {
        let harsh = Harsh::builder()
            .salt("test-salt".as_bytes())
            .length(3)
            .build()
            .unwrap();
        let token = harsh.encode(&[1, 2]);

        assert!(codec().decode(&token).is_err());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            HashIdCodec::new("", 3),
            Err(HashIdError::InvalidConfig(_))
        ));
        assert!(matches!(
            HashIdCodec::new("salt", 0),
            Err(HashIdError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_self_test_passes() {
        assert!(codec().self_test().is_ok());
        assert!(HashIdCodec::new("long", 12).unwrap().self_test().is_ok());
    }
}
