//! Function selectors.

use alloy_primitives::keccak256;

/// Canonical signature: `name(type1,type2)` with no spaces.
pub fn signature<S: AsRef<str>>(name: &str, types: &[S]) -> String {
    let types: Vec<&str> = types.iter().map(AsRef::as_ref).collect();
    format!("{name}({})", types.join(","))
}

/// First four bytes of the Keccak-256 hash of a canonical signature.
pub fn selector_of(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn selector<S: AsRef<str>>(name: &str, types: &[S]) -> [u8; 4] {
    selector_of(&signature(name, types))
}

/// Lowercase hex without a prefix, e.g. `a9059cbb`.
pub fn selector_hex(selector: [u8; 4]) -> String {
    alloy_primitives::hex::encode(selector)
}
