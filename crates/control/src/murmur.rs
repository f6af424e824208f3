//! Murmur 1.2.x - 1.4.x
//!
//! Same records and operations as the current protocol, but strings travel as
//! UTF-8 bytes. Texture handling and uptime vary within the range.

use crate::adapter::{fetch_texture, fetch_uptime, Adapter};
use crate::endpoint::Endpoint;
use mctl_core::{Generation, Result, ServerId, Texture, UserId};
use tracing::warn;

pub struct MurmurAdapter {
    endpoint: Endpoint,
}

impl MurmurAdapter {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

impl Adapter for MurmurAdapter {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn get_uptime(&self, server: ServerId) -> Result<Option<u64>> {
        match self.endpoint.generation() {
            Generation::Murmur120 => Ok(None),
            _ => fetch_uptime(&self.endpoint, server),
        }
    }

    /// Texture download returns garbage on 1.2.2 and is refused there
    fn get_texture(&self, server: ServerId, user: UserId) -> Result<Texture> {
        if self.endpoint.generation() == Generation::Murmur122 {
            warn!(%server, %user, "getTexture is broken on Murmur 1.2.2");
            return Err(self.endpoint.unsupported("getTexture"));
        }
        fetch_texture(&self.endpoint, server, user)
    }
}
