use sha2::{Digest, Sha256};

/// Hex SHA256 of an encoded artifact, recorded so repeated runs can be compared.
pub fn digest_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
