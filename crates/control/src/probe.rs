//! Version probe and adapter selection

use crate::adapter::Adapter;
use crate::dialect::Dialect;
use crate::endpoint::{translate_error, Endpoint};
use crate::legacy::LegacyAdapter;
use crate::mumble_server::MumbleServerAdapter;
use crate::murmur::MurmurAdapter;
use mctl_core::{CtlError, Generation, Result, Version};
use mctl_protocol::{normalize, Op, Proxy, Target, WireValue};
use std::sync::Arc;
use tracing::info;

/// Map a version to the generation that speaks it, first match wins
pub fn select_generation(version: &Version) -> Option<Generation> {
    let (major, minor, patch) = version.triple();
    match (major, minor, patch) {
        _ if (major, minor, patch) >= (1, 5, 0) => Some(Generation::MumbleServer),
        (1, 1, 8) => Some(Generation::Legacy),
        (1, m, _) if m >= 3 => Some(Generation::Murmur123),
        (1, 2, 2) => Some(Generation::Murmur122),
        (1, 2, p) if p >= 3 => Some(Generation::Murmur123),
        (1, 2, 0..=1) => Some(Generation::Murmur120),
        _ => None,
    }
}

fn version_part(value: Option<&WireValue>, what: &str) -> Result<u32> {
    let raw = value
        .ok_or_else(|| CtlError::Protocol(format!("getVersion: missing {}", what)))?
        .expect_int(what)?;
    u32::try_from(raw).map_err(|_| CtlError::Protocol(format!("getVersion: invalid {} {}", what, raw)))
}

/// Check liveness, then ask the endpoint for its version
pub fn probe_version(proxy: &dyn Proxy) -> Result<Version> {
    proxy
        .ping()
        .map_err(|err| CtlError::EndpointUnreachable(err.to_string()))?;

    let reply = proxy
        .invoke(Target::Meta, Op::GetVersion.name(), vec![])
        .map_err(|err| translate_error(Target::Meta, Op::GetVersion, err))?
        .into_list("getVersion reply")?;

    let version = Version::new(
        version_part(reply.first(), "major")?,
        version_part(reply.get(1), "minor")?,
        version_part(reply.get(2), "patch")?,
    );
    Ok(match reply.get(3).cloned().map(normalize) {
        Some(WireValue::Text(release)) => version.with_release(release),
        _ => version,
    })
}

/// Probe the endpoint behind `proxy` and build the matching adapter
pub fn select_adapter(proxy: Arc<dyn Proxy>) -> Result<Box<dyn Adapter>> {
    let version = probe_version(proxy.as_ref())?;
    let generation = match select_generation(&version) {
        Some(generation) => generation,
        None => return Err(CtlError::UnsupportedVersion(version)),
    };
    info!(%version, %generation, "selected protocol generation");

    let endpoint = Endpoint::new(proxy, Dialect::for_generation(generation), version);
    Ok(match generation {
        Generation::Legacy => Box::new(LegacyAdapter::new(endpoint)),
        Generation::Murmur120 | Generation::Murmur122 | Generation::Murmur123 => {
            Box::new(MurmurAdapter::new(endpoint))
        }
        Generation::MumbleServer => Box::new(MumbleServerAdapter::new(endpoint)),
    })
}
