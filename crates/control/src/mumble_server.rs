//! Mumble server 1.5 and later
//!
//! Speaks the current protocol the [`Adapter`] methods are written against.

use crate::adapter::Adapter;
use crate::endpoint::Endpoint;

pub struct MumbleServerAdapter {
    endpoint: Endpoint,
}

impl MumbleServerAdapter {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

impl Adapter for MumbleServerAdapter {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}
