//! Core error types for MCTL

use crate::{ConfMap, Generation, ServerId, UserId, Version};

#[derive(thiserror::Error, Debug)]
pub enum CtlError {
    #[error("Endpoint unreachable: {0}")]
    EndpointUnreachable(String),

    #[error("No adapter available for server version {0}")]
    UnsupportedVersion(Version),

    #[error("{operation}: server {server} is not running")]
    ServerNotRunning {
        operation: &'static str,
        server: ServerId,
    },

    #[error("No texture has been set for user {user} on server {server}")]
    NoTexture { server: ServerId, user: UserId },

    #[error("{operation} is not supported by the {generation} protocol")]
    OperationUnsupported {
        operation: &'static str,
        generation: Generation,
    },

    #[error("{operation} on {} rejected: {exception}: {reason}", scope(.server))]
    RemoteRejected {
        operation: &'static str,
        server: Option<ServerId>,
        exception: String,
        reason: String,
    },

    #[error("{operation} on {} failed in transport: {reason}", scope(.server))]
    TransportFailure {
        operation: &'static str,
        server: Option<ServerId>,
        reason: String,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Texture error: {0}")]
    Texture(String),

    /// The configuration was repaired in memory but the write-back failed.
    #[error("Configuration repair was not persisted: {source}")]
    RepairNotPersisted {
        conf: ConfMap,
        #[source]
        source: Box<CtlError>,
    },
}

fn scope(server: &Option<ServerId>) -> String {
    match server {
        Some(id) => format!("server {}", id),
        None => "meta".to_string(),
    }
}

/// Flat classification of [`CtlError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EndpointUnreachable,
    UnsupportedVersion,
    ServerNotRunning,
    NoTexture,
    OperationUnsupported,
    RemoteRejected,
    TransportFailure,
    Protocol,
    InvalidArgument,
    Texture,
}

impl CtlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EndpointUnreachable(_) => ErrorKind::EndpointUnreachable,
            Self::UnsupportedVersion(_) => ErrorKind::UnsupportedVersion,
            Self::ServerNotRunning { .. } => ErrorKind::ServerNotRunning,
            Self::NoTexture { .. } => ErrorKind::NoTexture,
            Self::OperationUnsupported { .. } => ErrorKind::OperationUnsupported,
            Self::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            Self::TransportFailure { .. } => ErrorKind::TransportFailure,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Texture(_) => ErrorKind::Texture,
            Self::RepairNotPersisted { source, .. } => source.kind(),
        }
    }

    /// Corrected configuration carried by a failed repair write-back
    pub fn repaired_conf(&self) -> Option<&ConfMap> {
        match self {
            Self::RepairNotPersisted { conf, .. } => Some(conf),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CtlError>;
