//! Names the contract base class gives meaning to.

use crate::SemanticType;
use alloy_primitives::U256;

/// Base class a contract must derive from.
pub const CONTRACT_BASE: &str = "PySmartContract";
pub const CONSTRUCTOR: &str = "__init__";
pub const RECEIVER: &str = "self";

/// `self.state_var("name", initial)` declares a state variable.
pub const STATE_VAR_METHOD: &str = "state_var";
/// `self.event("Name", args...)` declares (and would emit) an event.
pub const EVENT_METHOD: &str = "event";
/// `self.require(cond)` reverts when `cond` is zero.
pub const REQUIRE_METHOD: &str = "require";
/// `self.<mapping>.get(key[, default])` reads a mapping entry.
pub const MAPPING_GET_METHOD: &str = "get";

pub const PUBLIC_MARKERS: [&str; 2] = ["public", "public_function"];
pub const VIEW_MARKERS: [&str; 2] = ["view", "view_function"];

/// Transaction and block context exposed as `self.<method>()`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EnvironmentRead {
    Caller,
    BlockNumber,
    Timestamp,
    CallValue,
}

impl EnvironmentRead {
    pub fn from_method(name: &str) -> Option<Self> {
        Some(match name {
            "msg_sender" => EnvironmentRead::Caller,
            "block_number" => EnvironmentRead::BlockNumber,
            "block_timestamp" => EnvironmentRead::Timestamp,
            "msg_value" => EnvironmentRead::CallValue,
            _ => return None,
        })
    }
}

/// Word encoding of a string literal.
///
/// A 42-character `0x` string that parses as hex is an address. Anything else
/// is packed as bytes32: UTF-8 bytes truncated to 32, left-aligned and
/// zero-padded, read big-endian.
pub fn string_word(text: &str) -> (SemanticType, U256) {
    if text.len() == 42 && text.starts_with("0x") {
        if let Ok(address) = U256::from_str_radix(&text[2..], 16) {
            return (SemanticType::Address, address);
        }
    }

    let mut word = [0u8; 32];
    let bytes = text.as_bytes();
    let len = bytes.len().min(32);
    word[..len].copy_from_slice(&bytes[..len]);
    (SemanticType::Bytes32, U256::from_be_bytes(word))
}
