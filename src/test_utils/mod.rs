//! Helpers for tests: a scripted in-memory chain and canned errors.

mod mock;

use alloy::{
    primitives::{B256, U256},
    rpc::json_rpc::ErrorPayload,
    transports::{RpcError, TransportErrorKind},
};

use crate::Error;

pub use mock::MockChain;

/// A transport failure, as seen when the connection to the node drops.
#[must_use]
pub fn backend_gone() -> Error {
    TransportErrorKind::BackendGone.into()
}

/// An error reported by the node itself.
#[must_use]
pub fn rpc_error(code: i64, message: &'static str) -> Error {
    RpcError::<TransportErrorKind>::ErrorResp(ErrorPayload {
        code,
        message: message.into(),
        data: None,
    })
    .into()
}

/// A topic holding `value` as a big-endian word, the way indexed integers are encoded.
#[must_use]
pub fn topic(value: u64) -> B256 {
    B256::from(U256::from(value))
}

/// Inverse of [`topic`] for values that fit into a `u64`.
#[must_use]
pub fn topic_value(topic: &B256) -> u64 {
    U256::from_be_bytes(topic.0).saturating_to()
}
