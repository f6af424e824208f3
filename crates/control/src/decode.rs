//! Wire records ↔ data model
//!
//! Decoders first rename fields to the uniform shape (see
//! [`StructureTranslator`](mctl_protocol::StructureTranslator)), then read them
//! with the generation's string encoding. Encoders do the reverse.

use crate::dialect::Dialect;
use mctl_core::{
    Acl, AclGroup, AclRule, AclSubject, BanEntry, Channel, ChannelId, ChannelNode, ConfMap,
    CtlError, LogEntry, RegisteredUser, Registration, Result, ServerId, SessionId, UserId,
    UserState,
};
use mctl_protocol::{Fields, Record, RecordKind, UserInfo, WireValue};
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Offset between an IPv4 mask and the same mask over the 128-bit address form
const IPV4_MAPPED_BITS: u32 = 96;

fn fields<'a>(pairs: impl IntoIterator<Item = (&'a str, WireValue)>) -> Fields {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn string(d: &Dialect, rec: &Record<'_>, field: &str) -> Result<String> {
    d.strings.decode(rec.require(field)?, &rec.path(field))
}

fn string_or_empty(d: &Dialect, rec: &Record<'_>, field: &str) -> Result<String> {
    match rec.get(field) {
        Some(v) => d.strings.decode(v, &rec.path(field)),
        None => Ok(String::new()),
    }
}

fn id_u32(raw: i64, what: &str) -> Result<u32> {
    u32::try_from(raw).map_err(|_| CtlError::Protocol(format!("{}: invalid id {}", what, raw)))
}

fn counter(raw: i64) -> u64 {
    raw.max(0) as u64
}

/// Registered user id; negative values mean "not registered"
pub fn user_id(raw: i64) -> Option<UserId> {
    u32::try_from(raw).ok().map(UserId::new)
}

pub fn server_ids(value: WireValue) -> Result<Vec<ServerId>> {
    value
        .into_list("server list")?
        .iter()
        .map(|v| Ok(ServerId::new(id_u32(v.expect_int("server id")?, "server id")?)))
        .collect()
}

pub fn channel(d: &Dialect, value: WireValue) -> Result<Channel> {
    let fields = value.into_struct("Channel")?;
    let rec = Record::new("Channel", &fields);
    let parent = rec.int_or("parent", -1)?;

    Ok(Channel {
        id: ChannelId::new(id_u32(rec.int("id")?, "Channel.id")?),
        name: string(d, &rec, "name")?,
        parent: if parent < 0 {
            None
        } else {
            Some(ChannelId::new(id_u32(parent, "Channel.parent")?))
        },
        links: rec
            .ints_or_empty("links")?
            .into_iter()
            .map(|l| id_u32(l, "Channel.links").map(ChannelId::new))
            .collect::<Result<_>>()?,
        description: string_or_empty(d, &rec, "description")?,
        temporary: rec.bool_or("temporary", false)?,
        position: rec.int_or("position", 0)? as i32,
    })
}

pub fn channels(d: &Dialect, value: WireValue) -> Result<BTreeMap<ChannelId, Channel>> {
    value
        .into_map("channel map")?
        .into_iter()
        .map(|(_, v)| channel(d, v).map(|c| (c.id, c)))
        .collect()
}

pub fn user(d: &Dialect, value: WireValue) -> Result<UserState> {
    let fields = d.names.to_uniform(RecordKind::User, value.into_struct("User")?);
    let rec = Record::new("User", &fields);
    let address = match rec.get("address") {
        Some(v) => Some(address(v)?),
        None => None,
    };

    Ok(UserState {
        session: SessionId::new(id_u32(rec.int("session")?, "User.session")?),
        user_id: user_id(rec.int_or("userid", -1)?),
        name: string(d, &rec, "name")?,
        channel: ChannelId::new(id_u32(rec.int("channel")?, "User.channel")?),
        mute: rec.bool_or("mute", false)?,
        deaf: rec.bool_or("deaf", false)?,
        suppress: rec.bool_or("suppress", false)?,
        self_mute: rec.bool_or("selfMute", false)?,
        self_deaf: rec.bool_or("selfDeaf", false)?,
        recording: rec.bool_or("recording", false)?,
        priority_speaker: rec.bool_or("prioritySpeaker", false)?,
        comment: string_or_empty(d, &rec, "comment")?,
        online_secs: counter(rec.int_or("onlinesecs", 0)?),
        idle_secs: counter(rec.int_or("idlesecs", 0)?),
        bytes_per_sec: counter(rec.int_or("bytespersec", 0)?),
        address,
    })
}

pub fn users(d: &Dialect, value: WireValue) -> Result<BTreeMap<SessionId, UserState>> {
    value
        .into_map("user map")?
        .into_iter()
        .map(|(_, v)| user(d, v).map(|u| (u.session, u)))
        .collect()
}

/// Decode a channel tree and check its shape
pub fn tree(d: &Dialect, value: WireValue) -> Result<ChannelNode> {
    let root = tree_node(d, value)?;
    root.validate()?;
    Ok(root)
}

fn tree_node(d: &Dialect, value: WireValue) -> Result<ChannelNode> {
    let mut fields = d.names.to_uniform(RecordKind::Tree, value.into_struct("Tree")?);
    let c = fields
        .remove("c")
        .ok_or_else(|| CtlError::Protocol("Tree record has no field 'c'".into()))?;
    let children = match fields.remove("children") {
        Some(v) => v.into_list("Tree.children")?,
        None => Vec::new(),
    };
    let users = match fields.remove("users") {
        Some(v) => v.into_list("Tree.users")?,
        None => Vec::new(),
    };

    Ok(ChannelNode {
        channel: channel(d, c)?,
        children: children
            .into_iter()
            .map(|child| tree_node(d, child))
            .collect::<Result<_>>()?,
        users: users
            .into_iter()
            .map(|u| user(d, u))
            .collect::<Result<_>>()?,
    })
}

pub fn acl_rule(d: &Dialect, value: WireValue) -> Result<AclRule> {
    let fields = d.names.to_uniform(RecordKind::Acl, value.into_struct("ACL")?);
    let rec = Record::new("ACL", &fields);
    let subject = match user_id(rec.int_or("userid", -1)?) {
        Some(id) => AclSubject::User(id),
        None => AclSubject::Group(string_or_empty(d, &rec, "group")?),
    };

    Ok(AclRule {
        apply_here: rec.bool_or("applyHere", true)?,
        apply_subs: rec.bool_or("applySubs", true)?,
        inherited: rec.bool_or("inherited", false)?,
        subject,
        allow: rec.int("allow")? as u32,
        deny: rec.int("deny")? as u32,
    })
}

pub fn acl_rule_to_wire(d: &Dialect, rule: &AclRule) -> WireValue {
    let (userid, group) = match &rule.subject {
        AclSubject::User(id) => (id.get() as i64, ""),
        AclSubject::Group(name) => (-1, name.as_str()),
    };
    let uniform = fields([
        ("applyHere", WireValue::Bool(rule.apply_here)),
        ("applySubs", WireValue::Bool(rule.apply_subs)),
        ("inherited", WireValue::Bool(rule.inherited)),
        ("userid", WireValue::Int(userid)),
        ("group", d.strings.encode(group)),
        ("allow", WireValue::Int(rule.allow as i32 as i64)),
        ("deny", WireValue::Int(rule.deny as i32 as i64)),
    ]);
    WireValue::Struct(d.names.to_wire(RecordKind::Acl, uniform))
}

fn user_ids(rec: &Record<'_>, field: &str) -> Result<Vec<UserId>> {
    rec.ints_or_empty(field)?
        .into_iter()
        .map(|id| id_u32(id, &rec.path(field)).map(UserId::new))
        .collect()
}

fn id_list(ids: &[UserId]) -> WireValue {
    WireValue::List(ids.iter().map(|id| WireValue::Int(id.get() as i64)).collect())
}

pub fn acl_group(d: &Dialect, value: WireValue) -> Result<AclGroup> {
    let fields = value.into_struct("Group")?;
    let rec = Record::new("Group", &fields);
    Ok(AclGroup {
        name: string(d, &rec, "name")?,
        inherited: rec.bool_or("inherited", false)?,
        inherit: rec.bool_or("inherit", true)?,
        inheritable: rec.bool_or("inheritable", true)?,
        add: user_ids(&rec, "add")?,
        remove: user_ids(&rec, "remove")?,
        members: user_ids(&rec, "members")?,
    })
}

pub fn acl_group_to_wire(d: &Dialect, group: &AclGroup) -> WireValue {
    WireValue::Struct(fields([
        ("name", d.strings.encode(&group.name)),
        ("inherited", WireValue::Bool(group.inherited)),
        ("inherit", WireValue::Bool(group.inherit)),
        ("inheritable", WireValue::Bool(group.inheritable)),
        ("add", id_list(&group.add)),
        ("remove", id_list(&group.remove)),
        ("members", id_list(&group.members)),
    ]))
}

/// `getACL` reply: `[rules, groups, inherit]`
pub fn acl(d: &Dialect, value: WireValue) -> Result<Acl> {
    let mut parts = value.into_list("getACL reply")?.into_iter();
    let (rules, groups, inherit) = match (parts.next(), parts.next(), parts.next()) {
        (Some(rules), Some(groups), Some(inherit)) => (rules, groups, inherit),
        _ => return Err(CtlError::Protocol("getACL reply needs 3 parts".into())),
    };

    Ok(Acl {
        rules: rules
            .into_list("ACL list")?
            .into_iter()
            .map(|r| acl_rule(d, r))
            .collect::<Result<_>>()?,
        groups: groups
            .into_list("group list")?
            .into_iter()
            .map(|g| acl_group(d, g))
            .collect::<Result<_>>()?,
        inherit: inherit.expect_bool("inherit flag")?,
    })
}

/// `setACL` arguments after the channel id
pub fn acl_to_wire(d: &Dialect, acl: &Acl) -> Vec<WireValue> {
    vec![
        WireValue::List(acl.rules.iter().map(|r| acl_rule_to_wire(d, r)).collect()),
        WireValue::List(acl.groups.iter().map(|g| acl_group_to_wire(d, g)).collect()),
        WireValue::Bool(acl.inherit),
    ]
}

/// 16-byte (or 4-byte) network address
pub fn address(value: &WireValue) -> Result<IpAddr> {
    let octets: Vec<u8> = match value {
        WireValue::Bytes(b) => b.to_vec(),
        WireValue::List(items) => items
            .iter()
            .map(|v| v.expect_int("address byte").map(|b| b as u8))
            .collect::<Result<_>>()?,
        other => {
            return Err(CtlError::Protocol(format!(
                "address: expected bytes, got {}",
                other.kind()
            )))
        }
    };

    match octets.len() {
        16 => {
            let mut raw = [0u8; 16];
            raw.copy_from_slice(&octets);
            let v6 = Ipv6Addr::from(raw);
            Ok(match v6.to_ipv4_mapped() {
                Some(v4) => IpAddr::V4(v4),
                None => IpAddr::V6(v6),
            })
        }
        4 => Ok(IpAddr::V4(Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]))),
        n => Err(CtlError::Protocol(format!("address: unexpected length {}", n))),
    }
}

pub fn address_to_wire(address: &IpAddr) -> WireValue {
    let v6 = match address {
        IpAddr::V4(v4) => v4.to_ipv6_mapped(),
        IpAddr::V6(v6) => *v6,
    };
    WireValue::bytes(v6.octets().to_vec())
}

pub fn ban(d: &Dialect, value: WireValue) -> Result<BanEntry> {
    let fields = value.into_struct("Ban")?;
    let rec = Record::new("Ban", &fields);
    Ok(BanEntry {
        address: address(rec.require("address")?)?,
        bits: id_u32(rec.int("bits")?, "Ban.bits")?,
        name: string_or_empty(d, &rec, "name")?,
        hash: string_or_empty(d, &rec, "hash")?,
        reason: string_or_empty(d, &rec, "reason")?,
        start: rec.int_or("start", 0)?,
        duration: id_u32(rec.int_or("duration", 0)?, "Ban.duration")?,
    })
}

pub fn ban_to_wire(d: &Dialect, ban: &BanEntry) -> WireValue {
    WireValue::Struct(fields([
        ("address", address_to_wire(&ban.address)),
        ("bits", WireValue::Int(ban.bits as i64)),
        ("name", d.strings.encode(&ban.name)),
        ("hash", d.strings.encode(&ban.hash)),
        ("reason", d.strings.encode(&ban.reason)),
        ("start", WireValue::Int(ban.start)),
        ("duration", WireValue::Int(ban.duration as i64)),
    ]))
}

/// 1.1.8 ban: IPv4 address as an integer and an IPv4 mask width
pub fn legacy_ban(value: WireValue) -> Result<BanEntry> {
    let fields = value.into_struct("Ban")?;
    let rec = Record::new("Ban", &fields);
    let address = Ipv4Addr::from(rec.int("address")? as u32);
    let bits = id_u32(rec.int("bits")?, "Ban.bits")?;
    if bits > 32 {
        return Err(CtlError::Protocol(format!("Ban.bits: {} exceeds an IPv4 mask", bits)));
    }

    Ok(BanEntry {
        address: IpAddr::V4(address),
        bits: bits + IPV4_MAPPED_BITS,
        name: String::new(),
        hash: String::new(),
        reason: String::new(),
        start: 0,
        duration: 0,
    })
}

pub fn log_entry(d: &Dialect, value: WireValue) -> Result<LogEntry> {
    let fields = value.into_struct("LogEntry")?;
    let rec = Record::new("LogEntry", &fields);
    Ok(LogEntry {
        timestamp: rec.int("timestamp")?,
        text: string(d, &rec, "txt")?,
    })
}

/// Configuration map, normalized first where the generation needs it
pub fn conf_map(d: &Dialect, value: WireValue) -> Result<ConfMap> {
    d.strings
        .ingest(value)
        .into_map("configuration")?
        .iter()
        .map(|(k, v)| {
            let key = d.strings.decode(k, "configuration key")?;
            let value = d.strings.decode(v, &key)?;
            Ok((key, value))
        })
        .collect()
}

/// `getRegisteredUsers` reply: user id → name
pub fn registered_users(d: &Dialect, value: WireValue) -> Result<BTreeMap<UserId, RegisteredUser>> {
    value
        .into_map("registered users")?
        .iter()
        .filter_map(|(k, v)| {
            let id = match k.expect_int("user id") {
                Ok(raw) => user_id(raw)?,
                Err(e) => return Some(Err(e)),
            };
            Some(d.strings.decode(v, "user name").map(|name| {
                (
                    id,
                    RegisteredUser {
                        user_id: id,
                        name,
                        email: String::new(),
                        comment: String::new(),
                        hash: String::new(),
                    },
                )
            }))
        })
        .collect()
}

/// `getRegistration` reply keyed by [`UserInfo`]; the password is never read back
pub fn registration_info(d: &Dialect, user: UserId, value: WireValue) -> Result<RegisteredUser> {
    let mut out = RegisteredUser {
        user_id: user,
        name: String::new(),
        email: String::new(),
        comment: String::new(),
        hash: String::new(),
    };
    for (k, v) in value.into_map("registration")? {
        let slot = match UserInfo::from_i64(k.expect_int("registration key")?) {
            Some(UserInfo::Name) => &mut out.name,
            Some(UserInfo::Email) => &mut out.email,
            Some(UserInfo::Comment) => &mut out.comment,
            Some(UserInfo::Hash) => &mut out.hash,
            Some(UserInfo::Password) | None => continue,
        };
        *slot = d.strings.decode(&v, "registration value")?;
    }
    Ok(out)
}

pub fn registration_info_to_wire(d: &Dialect, reg: &Registration) -> WireValue {
    WireValue::Map(vec![
        (WireValue::Int(UserInfo::Name.key()), d.strings.encode(&reg.name)),
        (WireValue::Int(UserInfo::Email.key()), d.strings.encode(&reg.email)),
        (WireValue::Int(UserInfo::Password.key()), d.strings.encode(&reg.password)),
    ])
}

/// 1.1.8 `RegisteredPlayer` record; `pw` is ignored
pub fn registered_player(d: &Dialect, value: WireValue) -> Result<RegisteredUser> {
    let fields = d.names.to_uniform(RecordKind::Registration, value.into_struct("RegisteredPlayer")?);
    let rec = Record::new("RegisteredPlayer", &fields);
    Ok(RegisteredUser {
        user_id: UserId::new(id_u32(rec.int("userid")?, "RegisteredPlayer.userid")?),
        name: string(d, &rec, "name")?,
        email: string_or_empty(d, &rec, "email")?,
        comment: String::new(),
        hash: String::new(),
    })
}

pub fn registered_player_to_wire(d: &Dialect, user: UserId, reg: &Registration) -> WireValue {
    let uniform = fields([
        ("userid", WireValue::Int(user.get() as i64)),
        ("name", d.strings.encode(&reg.name)),
        ("email", d.strings.encode(&reg.email)),
        ("pw", d.strings.encode(&reg.password)),
    ]);
    WireValue::Struct(d.names.to_wire(RecordKind::Registration, uniform))
}
