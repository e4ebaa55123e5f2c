//! Command signature: AES-128 CMAC over a truncated unix timestamp

use aes::Aes128;
use cmac::{Cmac, Mac};
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};

use crate::Error;

/// Number of hex characters in a secret key
const SECRET_KEY_HEX_LEN: usize = 32;

/// 16-byte CMAC key shared with the lock, parsed from its 32 hex digit form
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; 16]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Sign a timestamp with this key
    pub fn sign(&self, timestamp: u32) -> Tag {
        let mut mac = <Cmac<Aes128> as Mac>::new(&self.0.into());
        mac.update(&timestamp_message(timestamp));
        Tag(HEXLOWER.encode(&mac.finalize().into_bytes()))
    }
}

// never print key material
impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

impl std::str::FromStr for SecretKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != SECRET_KEY_HEX_LEN {
            return Err(Error::InvalidKey {
                reason: format!("expected {SECRET_KEY_HEX_LEN} hex digits, got {}", s.len()),
            });
        }

        let bytes = HEXLOWER_PERMISSIVE
            .decode(s.as_bytes())
            .map_err(|e| Error::InvalidKey {
                reason: e.to_string(),
            })?;

        let bytes: [u8; 16] = bytes.try_into().map_err(|_| Error::InvalidKey {
            reason: "expected 16 bytes".to_string(),
        })?;

        Ok(Self(bytes))
    }
}

/// Hex encoded CMAC sent as the `sign` field of a command
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The three bytes that get authenticated: bits 8..31 of the timestamp,
/// least significant first. The low byte is dropped, so every timestamp in
/// the same 256 second window signs to the same tag.
pub fn timestamp_message(timestamp: u32) -> [u8; 3] {
    let [_, b0, b1, b2] = timestamp.to_le_bytes();
    [b0, b1, b2]
}

/// Generate the `sign` tag for a command from the hex secret key and a unix
/// timestamp in seconds.
pub fn generate_tag(secret_key: &str, timestamp: u32) -> Result<Tag, Error> {
    let key = match secret_key.parse::<SecretKey>() {
        Ok(key) => key,
        Err(e) => {
            log::error!("Invalid secret key: {secret_key} ({e})");
            return Err(e);
        }
    };
    Ok(key.sign(timestamp))
}
