//! Connection to one endpoint, seen through a dialect
//!
//! [`Endpoint::call`] is the single place remote failures enter the error
//! taxonomy: every adapter operation goes through it, so the operation name and
//! server id are attached once instead of per method.

use crate::dialect::Dialect;
use mctl_core::{CtlError, Generation, Result, ServerId, Version};
use mctl_protocol::{
    CallError, Op, Proxy, StringEncoding, StructureTranslator, Target, TextureFormat, WireValue,
    SERVER_BOOTED_EXCEPTION,
};
use std::sync::Arc;
use tracing::debug;

pub struct Endpoint {
    proxy: Arc<dyn Proxy>,
    dialect: Dialect,
    version: Version,
}

impl Endpoint {
    pub fn new(proxy: Arc<dyn Proxy>, dialect: Dialect, version: Version) -> Self {
        Self {
            proxy,
            dialect,
            version,
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn generation(&self) -> Generation {
        self.dialect.generation
    }

    pub fn strings(&self) -> StringEncoding {
        self.dialect.strings
    }

    pub fn names(&self) -> StructureTranslator {
        self.dialect.names
    }

    pub fn texture_format(&self) -> TextureFormat {
        self.dialect.texture
    }

    /// Invoke `op` and translate transport failures
    pub fn call(&self, target: Target, op: Op, args: Vec<WireValue>) -> Result<WireValue> {
        debug!(op = op.name(), %target, "remote call");
        self.proxy
            .invoke(target, op.name(), args)
            .map_err(|err| translate_error(target, op, err))
    }

    /// Invoke `op` and decode its reply, tagging decode failures with the call
    pub fn fetch<T, F>(&self, target: Target, op: Op, args: Vec<WireValue>, decode: F) -> Result<T>
    where
        F: FnOnce(WireValue) -> Result<T>,
    {
        let reply = self.call(target, op, args)?;
        decode(reply).map_err(|err| match err {
            CtlError::Protocol(msg) => {
                CtlError::Protocol(format!("{} on {}: {}", op.name(), target, msg))
            }
            other => other,
        })
    }

    pub fn meta(&self, op: Op, args: Vec<WireValue>) -> Result<WireValue> {
        self.call(Target::Meta, op, args)
    }

    pub fn server(&self, server: ServerId, op: Op, args: Vec<WireValue>) -> Result<WireValue> {
        self.call(Target::Server(server), op, args)
    }

    /// Encode a string the way this generation expects it
    pub fn text(&self, s: &str) -> WireValue {
        self.dialect.strings.encode(s)
    }

    /// Error for an operation this generation does not provide
    pub fn unsupported(&self, operation: &'static str) -> CtlError {
        CtlError::OperationUnsupported {
            operation,
            generation: self.dialect.generation,
        }
    }
}

pub(crate) fn translate_error(target: Target, op: Op, err: CallError) -> CtlError {
    let operation = op.name();
    match (err, target) {
        (CallError::Rejected { exception, .. }, Target::Server(server))
            if exception == SERVER_BOOTED_EXCEPTION =>
        {
            CtlError::ServerNotRunning { operation, server }
        }
        (CallError::Rejected { exception, reason }, _) => CtlError::RemoteRejected {
            operation,
            server: target.server(),
            exception,
            reason,
        },
        (CallError::Transport(reason), _) => CtlError::TransportFailure {
            operation,
            server: target.server(),
            reason,
        },
    }
}

/// Current time in epoch seconds
pub(crate) fn now_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
