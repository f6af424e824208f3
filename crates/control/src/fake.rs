//! In-memory endpoint for tests
//!
//! Answers calls the way a server of the configured generation would: byte or
//! text strings, 1.1.8 field names, per-generation operation sets and
//! `ServerBootedException` for stopped servers. Every call is recorded in order.

use crate::adapter::Adapter;
use crate::dialect::Dialect;
use crate::probe::{select_adapter, select_generation};
use mctl_core::{Generation, ServerId, Version};
use mctl_protocol::{
    CallError, Fields, Proxy, RecordKind, StringEncoding, Target, WireValue,
    SERVER_BOOTED_EXCEPTION,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

type Reply = Result<WireValue, CallError>;

/// Operations a stopped server still answers
const OFFLINE_OPS: &[&str] = &[
    "isRunning",
    "start",
    "stop",
    "delete",
    "getConf",
    "setConf",
    "getAllConf",
    "setSuperuserPassword",
    "getLog",
];

const LEGACY_ONLY: &[&str] = &[
    "getPlayers",
    "kickPlayer",
    "registerPlayer",
    "unregisterPlayer",
    "updateregistration",
    "getRegisteredPlayers",
];

const MODERN_ONLY: &[&str] = &[
    "getUsers",
    "kickUser",
    "registerUser",
    "unregisterUser",
    "updateRegistration",
    "getRegisteredUsers",
    "setBans",
];

fn marshal(msg: impl Into<String>) -> CallError {
    CallError::rejected("MarshalException", msg)
}

fn int_arg(args: &[WireValue], i: usize) -> Result<i64, CallError> {
    args.get(i)
        .and_then(WireValue::as_int)
        .ok_or_else(|| marshal(format!("argument {} is not an int", i)))
}

fn bool_arg(args: &[WireValue], i: usize) -> Result<bool, CallError> {
    args.get(i)
        .and_then(WireValue::as_bool)
        .ok_or_else(|| marshal(format!("argument {} is not a bool", i)))
}

fn text_arg(args: &[WireValue], i: usize) -> Result<String, CallError> {
    match args.get(i) {
        Some(WireValue::Text(s)) => Ok(s.clone()),
        other => Err(marshal(format!("argument {} is not a string: {:?}", i, other))),
    }
}

fn struct_arg(args: &[WireValue], i: usize) -> Result<Fields, CallError> {
    match args.get(i) {
        Some(WireValue::Struct(fields)) => Ok(fields.clone()),
        other => Err(marshal(format!("argument {} is not a struct: {:?}", i, other))),
    }
}

fn list_arg(args: &[WireValue], i: usize) -> Result<Vec<WireValue>, CallError> {
    match args.get(i) {
        Some(WireValue::List(items)) => Ok(items.clone()),
        other => Err(marshal(format!("argument {} is not a list: {:?}", i, other))),
    }
}

fn map_arg(args: &[WireValue], i: usize) -> Result<Vec<(WireValue, WireValue)>, CallError> {
    match args.get(i) {
        Some(WireValue::Map(entries)) => Ok(entries.clone()),
        other => Err(marshal(format!("argument {} is not a map: {:?}", i, other))),
    }
}

fn record_fields<'a>(pairs: impl IntoIterator<Item = (&'a str, WireValue)>) -> Fields {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn server_ids(state: &FakeState, running_only: bool) -> WireValue {
    WireValue::List(
        state
            .servers
            .iter()
            .filter(|(_, s)| s.running || !running_only)
            .map(|(id, _)| WireValue::Int(*id as i64))
            .collect(),
    )
}

fn field_int(fields: &Fields, name: &str) -> Option<i64> {
    fields.get(name).and_then(WireValue::as_int)
}

fn info_text(entries: &[(WireValue, WireValue)], key: i64) -> Option<String> {
    entries.iter().find_map(|(k, v)| match (k, v) {
        (WireValue::Int(k), WireValue::Text(s)) if *k == key => Some(s.clone()),
        _ => None,
    })
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// One virtual server; records are kept in the uniform field naming
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeServer {
    pub running: bool,
    pub conf: BTreeMap<String, String>,
    pub superuser_password: Option<String>,
    pub channels: BTreeMap<i64, Fields>,
    pub users: BTreeMap<i64, Fields>,
    pub acls: BTreeMap<i64, (Vec<Fields>, Vec<WireValue>, bool)>,
    pub bans: Vec<WireValue>,
    pub textures: BTreeMap<i64, Vec<u8>>,
    pub registrations: BTreeMap<i64, FakeRegistration>,
    pub log: Vec<(i64, String)>,
    pub messages: Vec<(String, String)>,
}

impl FakeServer {
    fn booted() -> Self {
        let mut server = Self {
            running: true,
            ..Default::default()
        };
        server.conf.insert("registername".into(), "Fake".into());
        server.conf.insert("port".into(), "64738".into());
        server.add_channel(0, "Root", -1);
        server.log.push((1_700_000_000, "Server listening".into()));
        server.log.push((1_700_000_060, "New connection".into()));
        server
    }

    pub fn add_channel(&mut self, id: i64, name: &str, parent: i64) {
        let fields = record_fields([
            ("id", WireValue::Int(id)),
            ("name", WireValue::text(name)),
            ("parent", WireValue::Int(parent)),
            ("links", WireValue::List(vec![])),
            ("description", WireValue::text("")),
            ("temporary", WireValue::Bool(false)),
            ("position", WireValue::Int(0)),
        ]);
        self.channels.insert(id, fields);
    }

    /// Connected user at 192.0.2.`session`
    pub fn add_user(&mut self, session: i64, name: &str, channel: i64) {
        let address = Ipv4Addr::new(192, 0, 2, session as u8).to_ipv6_mapped();
        let fields = record_fields([
            ("session", WireValue::Int(session)),
            ("userid", WireValue::Int(-1)),
            ("name", WireValue::text(name)),
            ("channel", WireValue::Int(channel)),
            ("mute", WireValue::Bool(false)),
            ("deaf", WireValue::Bool(false)),
            ("suppress", WireValue::Bool(false)),
            ("selfMute", WireValue::Bool(false)),
            ("selfDeaf", WireValue::Bool(false)),
            ("recording", WireValue::Bool(false)),
            ("prioritySpeaker", WireValue::Bool(false)),
            ("comment", WireValue::text("")),
            ("onlinesecs", WireValue::Int(60)),
            ("idlesecs", WireValue::Int(5)),
            ("bytespersec", WireValue::Int(0)),
            ("address", WireValue::bytes(address.octets().to_vec())),
        ]);
        self.users.insert(session, fields);
    }

    pub fn register(&mut self, name: &str, email: &str, password: &str) -> i64 {
        let id = self.registrations.keys().max().map_or(1, |max| max + 1);
        self.registrations.insert(
            id,
            FakeRegistration {
                name: name.into(),
                email: email.into(),
                password: password.into(),
            },
        );
        id
    }

    fn user(&self, session: i64) -> Result<&Fields, CallError> {
        self.users
            .get(&session)
            .ok_or_else(|| CallError::rejected("InvalidSessionException", session.to_string()))
    }

    fn channel(&self, id: i64) -> Result<&Fields, CallError> {
        self.channels
            .get(&id)
            .ok_or_else(|| CallError::rejected("InvalidChannelException", id.to_string()))
    }

    fn registration(&mut self, id: i64) -> Result<&mut FakeRegistration, CallError> {
        self.registrations
            .get_mut(&id)
            .ok_or_else(|| CallError::rejected("InvalidUserException", id.to_string()))
    }
}

struct FakeFailure {
    skip: usize,
    once: bool,
    err: CallError,
}

#[derive(Default)]
struct FakeState {
    reachable: bool,
    calls: Vec<String>,
    failures: BTreeMap<String, FakeFailure>,
    servers: BTreeMap<u32, FakeServer>,
}

pub(crate) struct FakeEndpoint {
    dialect: Dialect,
    version: Version,
    state: Mutex<FakeState>,
}

fn default_version(generation: Generation) -> Version {
    match generation {
        Generation::Legacy => Version::new(1, 1, 8),
        Generation::Murmur120 => Version::new(1, 2, 0),
        Generation::Murmur122 => Version::new(1, 2, 2),
        Generation::Murmur123 => Version::new(1, 3, 4),
        Generation::MumbleServer => Version::new(1, 5, 2),
    }
}

impl FakeEndpoint {
    /// Endpoint of `generation` with one booted server, id 1
    pub fn new(generation: Generation) -> Self {
        Self::build(generation, default_version(generation))
    }

    /// Endpoint reporting an arbitrary version
    pub fn with_version(version: Version) -> Self {
        let generation = select_generation(&version).unwrap_or(Generation::MumbleServer);
        Self::build(generation, version)
    }

    fn build(generation: Generation, version: Version) -> Self {
        let mut state = FakeState {
            reachable: true,
            ..Default::default()
        };
        state.servers.insert(1, FakeServer::booted());
        Self {
            dialect: Dialect::for_generation(generation),
            version: version.with_release("fake"),
            state: Mutex::new(state),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().reachable = reachable;
    }

    /// Make every later call of `op` fail with `err`
    pub fn fail(&self, op: &str, err: CallError) {
        let failure = FakeFailure { skip: 0, once: false, err };
        self.state.lock().failures.insert(op.to_string(), failure);
    }

    /// Let `skip` calls of `op` through, fail the next one, then recover
    pub fn fail_once_after(&self, op: &str, skip: usize, err: CallError) {
        let failure = FakeFailure { skip, once: true, err };
        self.state.lock().failures.insert(op.to_string(), failure);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| *c == op).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn server<R>(&self, id: u32, f: impl FnOnce(&mut FakeServer) -> R) -> R {
        let mut state = self.state.lock();
        let server = state.servers.get_mut(&id).expect("fake server exists");
        f(server)
    }

    pub fn has_server(&self, id: u32) -> bool {
        self.state.lock().servers.contains_key(&id)
    }

    fn provides(&self, op: &str) -> bool {
        match self.dialect.generation {
            Generation::Legacy => !MODERN_ONLY.contains(&op) && op != "getUptime",
            Generation::Murmur120 => !LEGACY_ONLY.contains(&op) && op != "getUptime",
            _ => !LEGACY_ONLY.contains(&op),
        }
    }

    /// Check the string encoding of an incoming value and turn it into text.
    /// Addresses stay binary.
    fn inbound(&self, value: WireValue) -> Result<WireValue, CallError> {
        Ok(match (self.dialect.strings, value) {
            (StringEncoding::Utf8Bytes, WireValue::Bytes(b)) => {
                WireValue::Text(String::from_utf8_lossy(&b).into_owned())
            }
            (StringEncoding::Native, WireValue::Bytes(_)) => {
                return Err(marshal("byte string sent to a text-native endpoint"))
            }
            (StringEncoding::Utf8Bytes, WireValue::Text(s)) => {
                return Err(marshal(format!("text {:?} sent to a byte-string endpoint", s)))
            }
            (_, WireValue::List(items)) => WireValue::List(
                items
                    .into_iter()
                    .map(|v| self.inbound(v))
                    .collect::<Result<_, _>>()?,
            ),
            (_, WireValue::Map(entries)) => WireValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| Ok((self.inbound(k)?, self.inbound(v)?)))
                    .collect::<Result<_, CallError>>()?,
            ),
            (_, WireValue::Struct(fields)) => WireValue::Struct(
                fields
                    .into_iter()
                    .map(|(k, v)| {
                        if k == "address" {
                            Ok((k, v))
                        } else {
                            self.inbound(v).map(|v| (k, v))
                        }
                    })
                    .collect::<Result<_, _>>()?,
            ),
            (_, other) => other,
        })
    }

    fn outbound(&self, value: WireValue) -> WireValue {
        match (self.dialect.strings, value) {
            (StringEncoding::Utf8Bytes, WireValue::Text(s)) => WireValue::bytes(s.into_bytes()),
            (_, WireValue::List(items)) => {
                WireValue::List(items.into_iter().map(|v| self.outbound(v)).collect())
            }
            (_, WireValue::Map(entries)) => WireValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (self.outbound(k), self.outbound(v)))
                    .collect(),
            ),
            (_, WireValue::Struct(fields)) => WireValue::Struct(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, self.outbound(v)))
                    .collect(),
            ),
            (_, other) => other,
        }
    }

    fn user_wire(&self, user: &Fields) -> WireValue {
        WireValue::Struct(self.dialect.names.to_wire(RecordKind::User, user.clone()))
    }

    fn registration_wire(&self, id: i64, reg: &FakeRegistration) -> WireValue {
        let fields = record_fields([
            ("userid", WireValue::Int(id)),
            ("name", WireValue::text(&reg.name)),
            ("email", WireValue::text(&reg.email)),
            ("pw", WireValue::text("")),
        ]);
        WireValue::Struct(self.dialect.names.to_wire(RecordKind::Registration, fields))
    }

    fn tree(&self, server: &FakeServer, id: i64) -> WireValue {
        let children = server
            .channels
            .iter()
            .filter(|(cid, c)| **cid != id && field_int(c, "parent") == Some(id))
            .map(|(cid, _)| self.tree(server, *cid))
            .collect();
        let users = server
            .users
            .values()
            .filter(|u| field_int(u, "channel") == Some(id))
            .map(|u| self.user_wire(u))
            .collect();
        let channel = server.channels.get(&id).cloned().unwrap_or_default();
        let node = record_fields([
            ("c", WireValue::Struct(channel)),
            ("children", WireValue::List(children)),
            ("users", WireValue::List(users)),
        ]);
        WireValue::Struct(self.dialect.names.to_wire(RecordKind::Tree, node))
    }

    fn meta_call(&self, state: &mut FakeState, op: &str) -> Reply {
        Ok(match op {
            "getVersion" => {
                let (major, minor, patch) = self.version.triple();
                WireValue::List(vec![
                    major.into(),
                    minor.into(),
                    patch.into(),
                    WireValue::text(&self.version.release),
                ])
            }
            "getBootedServers" => server_ids(state, true),
            "getAllServers" => server_ids(state, false),
            "getDefaultConf" => WireValue::Map(vec![
                (WireValue::text("port"), WireValue::text("64738")),
                (WireValue::text("users"), WireValue::text("100")),
            ]),
            "newServer" => {
                let id = state.servers.keys().max().map_or(1, |max| max + 1);
                state.servers.insert(
                    id,
                    FakeServer {
                        running: false,
                        ..FakeServer::booted()
                    },
                );
                WireValue::Int(id as i64)
            }
            other => return Err(CallError::rejected("OperationNotExistException", other)),
        })
    }

    fn server_call(&self, state: &mut FakeState, id: u32, op: &str, args: Vec<WireValue>) -> Reply {
        let names = self.dialect.names;
        let server = state
            .servers
            .get_mut(&id)
            .ok_or_else(|| CallError::rejected("InvalidServerException", id.to_string()))?;
        if !server.running && !OFFLINE_OPS.contains(&op) {
            return Err(CallError::rejected(SERVER_BOOTED_EXCEPTION, "Server is not running"));
        }
        let args = if op == "setTexture" {
            args
        } else {
            args.into_iter()
                .map(|a| self.inbound(a))
                .collect::<Result<Vec<_>, _>>()?
        };

        let reply = match op {
            "isRunning" => WireValue::Bool(server.running),
            "start" => {
                if server.running {
                    return Err(CallError::rejected("ServerFailureException", "already running"));
                }
                server.running = true;
                WireValue::Unit
            }
            "stop" => {
                server.running = false;
                WireValue::Unit
            }
            "delete" => {
                if server.running {
                    return Err(CallError::rejected("ServerFailureException", "Server is running"));
                }
                state.servers.remove(&id);
                WireValue::Unit
            }
            "getUptime" => WireValue::Int(3600),
            "getLog" => {
                let first = int_arg(&args, 0)?.max(0) as usize;
                let last = int_arg(&args, 1)?.max(0) as usize;
                WireValue::List(
                    server
                        .log
                        .iter()
                        .skip(first)
                        .take(last.saturating_sub(first))
                        .map(|(ts, txt)| {
                            WireValue::record([
                                ("timestamp", WireValue::Int(*ts)),
                                ("txt", WireValue::text(txt)),
                            ])
                        })
                        .collect(),
                )
            }
            "getConf" => {
                let key = text_arg(&args, 0)?;
                WireValue::text(server.conf.get(&key).cloned().unwrap_or_default())
            }
            "setConf" => {
                server.conf.insert(text_arg(&args, 0)?, text_arg(&args, 1)?);
                WireValue::Unit
            }
            "getAllConf" => WireValue::Map(
                server
                    .conf
                    .iter()
                    .map(|(k, v)| (WireValue::text(k), WireValue::text(v)))
                    .collect(),
            ),
            "setSuperuserPassword" => {
                server.superuser_password = Some(text_arg(&args, 0)?);
                WireValue::Unit
            }
            "getTree" => self.tree(server, 0),
            "getChannels" => WireValue::Map(
                server
                    .channels
                    .iter()
                    .map(|(id, c)| (WireValue::Int(*id), WireValue::Struct(c.clone())))
                    .collect(),
            ),
            "getUsers" | "getPlayers" => WireValue::Map(
                server
                    .users
                    .iter()
                    .map(|(s, u)| (WireValue::Int(*s), self.user_wire(u)))
                    .collect(),
            ),
            "getState" => self.user_wire(server.user(int_arg(&args, 0)?)?),
            "setState" => {
                let fields = names.to_uniform(RecordKind::User, struct_arg(&args, 0)?);
                let session = field_int(&fields, "session").ok_or_else(|| marshal("no session"))?;
                server.user(session)?;
                if let Some(channel) = field_int(&fields, "channel") {
                    server.channel(channel)?;
                }
                server.users.insert(session, fields);
                WireValue::Unit
            }
            "getChannelState" => WireValue::Struct(server.channel(int_arg(&args, 0)?)?.clone()),
            "setChannelState" => {
                let fields = struct_arg(&args, 0)?;
                let id = field_int(&fields, "id").ok_or_else(|| marshal("no id"))?;
                server.channel(id)?;
                if let Some(parent) = field_int(&fields, "parent").filter(|p| *p >= 0) {
                    server.channel(parent)?;
                }
                server.channels.insert(id, fields);
                WireValue::Unit
            }
            "addChannel" => {
                let name = text_arg(&args, 0)?;
                let parent = int_arg(&args, 1)?;
                server.channel(parent)?;
                let id = server.channels.keys().max().map_or(0, |max| max + 1);
                server.add_channel(id, &name, parent);
                WireValue::Int(id)
            }
            "removeChannel" => {
                let id = int_arg(&args, 0)?;
                if id == 0 {
                    return Err(CallError::rejected("InvalidChannelException", "root channel"));
                }
                server.channel(id)?;
                server.channels.remove(&id);
                WireValue::Unit
            }
            "kickUser" | "kickPlayer" => {
                let session = int_arg(&args, 0)?;
                server.user(session)?;
                server.users.remove(&session);
                WireValue::Unit
            }
            "sendMessage" => {
                let session = int_arg(&args, 0)?;
                server.user(session)?;
                let text = text_arg(&args, 1)?;
                server.messages.push((format!("session {}", session), text));
                WireValue::Unit
            }
            "sendMessageChannel" => {
                let channel = int_arg(&args, 0)?;
                server.channel(channel)?;
                let scope = if bool_arg(&args, 1)? { "tree" } else { "channel" };
                let text = text_arg(&args, 2)?;
                server.messages.push((format!("{} {}", scope, channel), text));
                WireValue::Unit
            }
            "getACL" => {
                let channel = int_arg(&args, 0)?;
                server.channel(channel)?;
                let (rules, groups, inherit) =
                    server.acls.get(&channel).cloned().unwrap_or((vec![], vec![], true));
                WireValue::List(vec![
                    WireValue::List(
                        rules
                            .into_iter()
                            .map(|r| WireValue::Struct(names.to_wire(RecordKind::Acl, r)))
                            .collect(),
                    ),
                    WireValue::List(groups),
                    WireValue::Bool(inherit),
                ])
            }
            "setACL" => {
                let channel = int_arg(&args, 0)?;
                server.channel(channel)?;
                let rules = list_arg(&args, 1)?
                    .into_iter()
                    .map(|r| match r {
                        WireValue::Struct(fields) => Ok(names.to_uniform(RecordKind::Acl, fields)),
                        other => Err(marshal(format!("ACL rule is {:?}", other))),
                    })
                    .collect::<Result<_, _>>()?;
                let groups = list_arg(&args, 2)?;
                let inherit = bool_arg(&args, 3)?;
                server.acls.insert(channel, (rules, groups, inherit));
                WireValue::Unit
            }
            "getBans" => WireValue::List(server.bans.clone()),
            "setBans" => {
                server.bans = list_arg(&args, 0)?;
                WireValue::Unit
            }
            "getTexture" => {
                let user = int_arg(&args, 0)?;
                server.registration(user)?;
                WireValue::bytes(server.textures.get(&user).cloned().unwrap_or_default())
            }
            "setTexture" => {
                let user = int_arg(&args, 0)?;
                server.registration(user)?;
                let payload = args
                    .get(1)
                    .cloned()
                    .and_then(|v| v.into_payload("texture").ok())
                    .ok_or_else(|| marshal("texture is not bytes"))?;
                server.textures.insert(user, payload.to_vec());
                WireValue::Unit
            }
            "registerUser" => {
                let info = map_arg(&args, 0)?;
                let name = info_text(&info, 0).ok_or_else(|| marshal("no user name"))?;
                let email = info_text(&info, 1).unwrap_or_default();
                let password = info_text(&info, 4).unwrap_or_default();
                WireValue::Int(server.register(&name, &email, &password))
            }
            "registerPlayer" => WireValue::Int(server.register(&text_arg(&args, 0)?, "", "")),
            "unregisterUser" | "unregisterPlayer" => {
                let user = int_arg(&args, 0)?;
                server.registration(user)?;
                server.registrations.remove(&user);
                WireValue::Unit
            }
            "getRegistration" => {
                let user = int_arg(&args, 0)?;
                let reg = server.registration(user)?.clone();
                if self.dialect.generation == Generation::Legacy {
                    self.registration_wire(user, &reg)
                } else {
                    WireValue::Map(vec![
                        (WireValue::Int(0), WireValue::text(reg.name)),
                        (WireValue::Int(1), WireValue::text(reg.email)),
                    ])
                }
            }
            "updateRegistration" => {
                let user = int_arg(&args, 0)?;
                let info = map_arg(&args, 1)?;
                let reg = server.registration(user)?;
                if let Some(name) = info_text(&info, 0) {
                    reg.name = name;
                }
                if let Some(email) = info_text(&info, 1) {
                    reg.email = email;
                }
                if let Some(password) = info_text(&info, 4) {
                    reg.password = password;
                }
                WireValue::Unit
            }
            "updateregistration" => {
                let fields = names.to_uniform(RecordKind::Registration, struct_arg(&args, 0)?);
                let user = field_int(&fields, "userid").ok_or_else(|| marshal("no playerid"))?;
                let text = |name: &str| match fields.get(name) {
                    Some(WireValue::Text(s)) => s.clone(),
                    _ => String::new(),
                };
                let (name, email, password) = (text("name"), text("email"), text("pw"));
                let reg = server.registration(user)?;
                reg.name = name;
                reg.email = email;
                reg.password = password;
                WireValue::Unit
            }
            "getRegisteredUsers" => {
                let filter = text_arg(&args, 0)?;
                WireValue::Map(
                    server
                        .registrations
                        .iter()
                        .filter(|(_, r)| r.name.contains(&filter))
                        .map(|(id, r)| (WireValue::Int(*id), WireValue::text(&r.name)))
                        .collect(),
                )
            }
            "getRegisteredPlayers" => {
                let filter = text_arg(&args, 0)?;
                WireValue::List(
                    server
                        .registrations
                        .iter()
                        .filter(|(_, r)| r.name.contains(&filter))
                        .map(|(id, r)| self.registration_wire(*id, r))
                        .collect(),
                )
            }
            "verifyPassword" => {
                let name = text_arg(&args, 0)?;
                let password = text_arg(&args, 1)?;
                let found = server.registrations.iter().find(|(_, r)| r.name == name);
                WireValue::Int(match found {
                    Some((id, r)) if r.password == password => *id,
                    Some(_) => -1,
                    None => -2,
                })
            }
            other => return Err(CallError::rejected("OperationNotExistException", other)),
        };
        Ok(self.outbound(reply))
    }
}

impl Proxy for FakeEndpoint {
    fn ping(&self) -> Result<(), CallError> {
        if self.state.lock().reachable {
            Ok(())
        } else {
            Err(CallError::Transport("connection refused".into()))
        }
    }

    fn invoke(&self, target: Target, op: &str, args: Vec<WireValue>) -> Reply {
        let mut state = self.state.lock();
        state.calls.push(op.to_string());
        if let Some(failure) = state.failures.get_mut(op) {
            if failure.skip > 0 {
                failure.skip -= 1;
            } else {
                let err = failure.err.clone();
                if failure.once {
                    state.failures.remove(op);
                }
                return Err(err);
            }
        }
        if !self.provides(op) {
            return Err(CallError::rejected("OperationNotExistException", op));
        }
        match target {
            Target::Meta => self.meta_call(&mut state, op).map(|v| self.outbound(v)),
            Target::Server(id) => self.server_call(&mut state, id.get(), op, args),
        }
    }
}

/// Probe a fresh fake endpoint of `generation`; the probe calls are cleared
pub(crate) fn connect(generation: Generation) -> (Arc<FakeEndpoint>, Box<dyn Adapter>) {
    let fake = Arc::new(FakeEndpoint::new(generation));
    let adapter = select_adapter(fake.clone()).expect("fake endpoint probes");
    fake.clear_calls();
    (fake, adapter)
}

pub(crate) const SERVER: ServerId = ServerId::new(1);
