use super::TokenError;

/// Seals tokens for storage and opens them again.
pub trait TokenCipher: Send + Sync {
    fn seal(&self, token: &str) -> Result<String, TokenError>;
    fn open(&self, sealed: &str) -> Result<String, TokenError>;
}

/// Hex encoding only; provides no secrecy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexCipher;

impl TokenCipher for HexCipher {
    fn seal(&self, token: &str) -> Result<String, TokenError> {
        Ok(hex::encode(token.as_bytes()))
    }

    fn open(&self, sealed: &str) -> Result<String, TokenError> {
        let bytes = hex::decode(sealed).map_err(|e| TokenError::Open(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| TokenError::Open(e.to_string()))
    }
}
