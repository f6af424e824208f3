//! Channel viewer documents
//!
//! JSON documents in the channel viewer protocol layout, ready for an HTTP front
//! end to serve. Unregistered users and the root's parent are written as `-1`.

use crate::adapter::Adapter;
use mctl_core::{ChannelNode, Result, ServerId, UserState};
use serde_json::{json, Value};

/// Configuration key holding the server's display name
pub const SERVER_NAME_KEY: &str = "registername";

fn user_value(user: &UserState) -> Value {
    json!({
        "channel": user.channel.get(),
        "deaf": user.deaf,
        "mute": user.mute,
        "name": user.name,
        "selfDeaf": user.self_deaf,
        "selfMute": user.self_mute,
        "session": user.session.get(),
        "suppress": user.suppress,
        "userid": user.user_id.map_or(-1, |id| id.get() as i64),
        "idlesecs": user.idle_secs,
        "recording": user.recording,
        "comment": user.comment,
        "prioritySpeaker": user.priority_speaker,
    })
}

fn channel_value(node: &ChannelNode) -> Value {
    let c = &node.channel;
    json!({
        "id": c.id.get(),
        "name": c.name,
        "parent": c.parent.map_or(-1, |p| p.get() as i64),
        "links": c.links.iter().map(|l| l.get()).collect::<Vec<_>>(),
        "description": c.description,
        "temporary": c.temporary,
        "position": c.position,
        "channels": node.children.iter().map(channel_value).collect::<Vec<_>>(),
        "users": node.users.iter().map(user_value).collect::<Vec<_>>(),
    })
}

pub fn server_document(
    server: ServerId,
    name: &str,
    connect_url: Option<&str>,
    tree: &ChannelNode,
) -> Value {
    json!({
        "x_connecturl": connect_url,
        "id": server.get(),
        "name": name,
        "root": channel_value(tree),
    })
}

/// Read the server name and channel tree and build the viewer document.
///
/// A server without `registername` is named after its id.
pub fn fetch_server_document(
    adapter: &dyn Adapter,
    server: ServerId,
    connect_url: Option<&str>,
) -> Result<Value> {
    let mut name = adapter.get_conf(server, SERVER_NAME_KEY)?;
    if name.is_empty() {
        name = server.to_string();
    }
    let tree = adapter.get_tree(server)?;
    Ok(server_document(server, &name, connect_url, &tree))
}

pub fn server_list(servers: &[ServerId]) -> Value {
    json!({ "servers": servers.iter().map(|s| s.get()).collect::<Vec<_>>() })
}

/// Wrap `body` as `callback(body)` when a callback name is given
pub fn jsonp(callback: Option<&str>, body: &Value) -> String {
    match callback {
        Some(cb) if !cb.is_empty() => format!("{}({})", cb, body),
        _ => body.to_string(),
    }
}
