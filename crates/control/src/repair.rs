//! Read-time repair of the display-name migration defect
//!
//! Servers migrated from 1.1.8 kept the default user name under `playername`
//! while later generations read `username`. Reading the full configuration moves
//! the value across and writes both keys back, so the repair happens once.

use crate::endpoint::Endpoint;
use mctl_core::{ConfMap, CtlError, Result, ServerId};
use mctl_protocol::Op;
use tracing::{info, warn};

/// Configuration key the 1.1.8 generation stores the display name under
pub const LEGACY_NAME_KEY: &str = "playername";

/// Configuration key later generations use for the display name
pub const NAME_KEY: &str = "username";

/// Move a non-empty `playername` into `username` and persist both keys.
///
/// The corrected map is returned even when a write fails; in that case it is
/// carried inside [`CtlError::RepairNotPersisted`].
pub fn repair_conf(endpoint: &Endpoint, server: ServerId, mut conf: ConfMap) -> Result<ConfMap> {
    let legacy = match conf.get(LEGACY_NAME_KEY) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => return Ok(conf),
    };

    info!(%server, name = %legacy, "moving {} to {}", LEGACY_NAME_KEY, NAME_KEY);
    conf.insert(NAME_KEY.to_string(), legacy.clone());
    conf.insert(LEGACY_NAME_KEY.to_string(), String::new());

    // `username` goes first so a failed second write leaves `playername` for the next read
    let writes = [(NAME_KEY, legacy.as_str()), (LEGACY_NAME_KEY, "")];
    for (key, value) in writes {
        let args = vec![endpoint.text(key), endpoint.text(value)];
        if let Err(err) = endpoint.server(server, Op::SetConf, args) {
            warn!(%server, key, error = %err, "configuration repair not persisted");
            return Err(CtlError::RepairNotPersisted {
                conf,
                source: Box::new(err),
            });
        }
    }

    Ok(conf)
}

/// Rename `playername` to `username` without touching the endpoint
pub fn alias_legacy_conf(mut conf: ConfMap) -> ConfMap {
    if let Some(value) = conf.remove(LEGACY_NAME_KEY) {
        conf.insert(NAME_KEY.to_string(), value);
    }
    conf
}
