//! Transport seam
//!
//! # Purpose
//! The control layer never opens connections itself. The transport hands it a
//! connected [`Proxy`] bound to one endpoint address and secret; every remote
//! call goes through [`Proxy::invoke`] and blocks until the endpoint answers or
//! the transport gives up.
//!
//! # Thread Safety
//! Adapters share one proxy and do not serialize calls. Implementations must be
//! safe to call from several threads at once.

use crate::wire::WireValue;
use mctl_core::ServerId;
use std::fmt;

/// Object a remote call is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The endpoint's server manager
    Meta,
    /// One virtual server
    Server(ServerId),
}

impl Target {
    pub fn server(&self) -> Option<ServerId> {
        match self {
            Target::Meta => None,
            Target::Server(id) => Some(*id),
        }
    }
}

impl From<ServerId> for Target {
    fn from(id: ServerId) -> Self {
        Target::Server(id)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Meta => f.write_str("meta"),
            Target::Server(id) => write!(f, "server {}", id),
        }
    }
}

/// Failure reported by the transport for a single call
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The endpoint raised an exception (bad id, permission, invalid state)
    #[error("{exception}: {reason}")]
    Rejected { exception: String, reason: String },

    /// The connection failed mid-call
    #[error("transport failure: {0}")]
    Transport(String),
}

impl CallError {
    pub fn rejected(exception: impl Into<String>, reason: impl Into<String>) -> Self {
        CallError::Rejected {
            exception: exception.into(),
            reason: reason.into(),
        }
    }
}

/// Exception name the endpoint raises for calls that need a booted server
pub const SERVER_BOOTED_EXCEPTION: &str = "ServerBootedException";

/// Connected, synchronous request/response channel to one endpoint
pub trait Proxy: Send + Sync {
    /// Lightweight reachability check
    fn ping(&self) -> Result<(), CallError>;

    /// Invoke `op` on `target` and wait for the reply
    fn invoke(&self, target: Target, op: &str, args: Vec<WireValue>) -> Result<WireValue, CallError>;
}
