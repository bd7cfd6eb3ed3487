//! Derives selectors and topic hashes from a canonical signature string
//! via Keccak-256, the one place this crate talks to a hashing primitive.

use alloy_primitives::{keccak256, B256};

use crate::error::Result;

/// The full 32-byte `keccak256(signature)` digest.
pub fn topic_hash(signature: &str) -> Result<B256> {
    Ok(keccak256(signature.as_bytes()))
}

/// The first 4 bytes of `keccak256(signature)`, used as a function or
/// custom-error selector.
pub fn selector(signature: &str) -> Result<[u8; 4]> {
    let hash = topic_hash(signature)?;
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_selector_matches_known_value() {
        let sig = "transfer(address,uint256)";
        let sel = selector(sig).unwrap();
        assert_eq!(alloy_primitives::hex::encode(sel), "a9059cbb");
    }
}
