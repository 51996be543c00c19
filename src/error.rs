use std::{fmt, sync::Arc, time::Duration};

use alloy::{
    eips::BlockNumberOrTag,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

/// Errors returned by the retry engine, the logs searcher and the finality poller.
///
/// [`Error::Rpc`], [`Error::Transport`], [`Error::BlockNotFound`] and [`Error::InvalidResponse`]
/// are transient: the retry engine absorbs them and only reports them wrapped in
/// [`Error::RetryExhausted`]. All other variants are terminal.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The node answered a well-formed request with a JSON-RPC error object.
    #[error("json-rpc error: code={code} message={message} data={data:?}")]
    Rpc { code: i64, message: String, data: Option<String> },

    /// Connectivity, serialization or timeout failure below the JSON-RPC layer.
    #[error("transport error: {0}")]
    Transport(Arc<RpcError<TransportErrorKind>>),

    /// The node did not know the requested block.
    #[error("block not found: {0}")]
    BlockNotFound(BlockNumberOrTag),

    /// The node returned data that cannot be turned into a domain value.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The attempt budget was consumed before the stop condition held.
    #[error("retries exhausted after {attempts} attempts, last outcome: {last}")]
    RetryExhausted { attempts: u32, last: LastOutcome },

    /// The wall-clock budget of a whole retry sequence elapsed.
    #[error("retry sequence timed out after {0:?}")]
    RetryTimeout(Duration),

    /// A caller supplied argument is out of range. Never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A searched chunk contained no logs and the searcher is configured to fail on that.
    #[error("no logs found in chunk {from}..={to}")]
    EmptyChunk { from: u64, to: u64 },
}

impl Error {
    /// Whether the retry engine may try the failed operation again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Rpc { .. } |
                Error::Transport(_) |
                Error::BlockNotFound(_) |
                Error::InvalidResponse(_)
        )
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

/// What the last attempt of an exhausted retry sequence produced.
#[derive(Debug, Clone)]
pub enum LastOutcome {
    /// The attempt failed.
    Error(Box<Error>),
    /// The attempt succeeded, but its value did not satisfy the stop condition.
    Value(String),
}

impl fmt::Display for LastOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastOutcome::Error(error) => write!(f, "error: {error}"),
            LastOutcome::Value(value) => write!(f, "value: {value}"),
        }
    }
}

impl From<RpcError<TransportErrorKind>> for Error {
    fn from(error: RpcError<TransportErrorKind>) -> Self {
        match error {
            RpcError::ErrorResp(payload) => Error::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
                data: payload.data.as_ref().map(|data| data.get().to_owned()),
            },
            other => Error::Transport(Arc::new(other)),
        }
    }
}

impl From<TransportErrorKind> for Error {
    fn from(kind: TransportErrorKind) -> Self {
        Error::from(RpcError::Transport(kind))
    }
}
