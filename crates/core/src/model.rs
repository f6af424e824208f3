//! Version-independent data model
//!
//! # Purpose
//! Every adapter translates its wire shapes into these types, so callers never see
//! which protocol generation produced them. Channel and user views are transient
//! snapshots fetched per call; registrations, ACLs, bans and configuration live on
//! the endpoint.

use crate::{ChannelId, CtlError, Result, SessionId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::net::IpAddr;

/// Server configuration as key/value text
pub type ConfMap = BTreeMap<String, String>;

/// Mask width used when banning a single address
pub const DEFAULT_BAN_BITS: u32 = 128;

/// Ban length used by the session-derived ban path (seconds)
pub const DEFAULT_BAN_DURATION: u32 = 3600;

/// Flat channel description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    /// `None` for the root channel
    pub parent: Option<ChannelId>,
    /// Channels whose users can hear this channel
    pub links: Vec<ChannelId>,
    pub description: String,
    pub temporary: bool,
    /// Sort position among siblings
    pub position: i32,
}

/// Connected user as seen by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    pub session: SessionId,
    /// `None` when the user is not registered
    pub user_id: Option<UserId>,
    pub name: String,
    pub channel: ChannelId,
    pub mute: bool,
    pub deaf: bool,
    pub suppress: bool,
    pub self_mute: bool,
    pub self_deaf: bool,
    pub recording: bool,
    pub priority_speaker: bool,
    pub comment: String,
    pub online_secs: u64,
    pub idle_secs: u64,
    pub bytes_per_sec: u64,
    /// Remote address, when the protocol reports it
    pub address: Option<IpAddr>,
}

/// One channel of a channel tree with its subchannels and present users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelNode {
    pub channel: Channel,
    pub children: Vec<ChannelNode>,
    pub users: Vec<UserState>,
}

impl ChannelNode {
    pub fn id(&self) -> ChannelId {
        self.channel.id
    }

    /// IDs of the direct subchannels, in server order
    pub fn child_ids(&self) -> Vec<ChannelId> {
        self.children.iter().map(|c| c.channel.id).collect()
    }

    /// Find a channel anywhere below (or at) this node
    pub fn find(&self, id: ChannelId) -> Option<&ChannelNode> {
        if self.channel.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Number of channels in this subtree, including this one
    pub fn channel_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.channel_count()).sum::<usize>()
    }

    /// Number of users in this subtree
    pub fn user_count(&self) -> usize {
        self.users.len() + self.children.iter().map(|c| c.user_count()).sum::<usize>()
    }

    /// Check the tree invariants: rooted at channel 0 without a parent, every
    /// child names its enclosing node as parent, and no channel appears twice.
    pub fn validate(&self) -> Result<()> {
        if !self.channel.id.is_root() || self.channel.parent.is_some() {
            return Err(CtlError::Protocol(format!(
                "tree root is channel {} with parent {:?}",
                self.channel.id, self.channel.parent
            )));
        }
        let mut seen = HashSet::new();
        self.validate_subtree(&mut seen)
    }

    fn validate_subtree(&self, seen: &mut HashSet<ChannelId>) -> Result<()> {
        if !seen.insert(self.channel.id) {
            return Err(CtlError::Protocol(format!(
                "channel {} appears more than once in the tree",
                self.channel.id
            )));
        }
        for child in &self.children {
            if child.channel.parent != Some(self.channel.id) {
                return Err(CtlError::Protocol(format!(
                    "channel {} listed under {} but names parent {:?}",
                    child.channel.id, self.channel.id, child.channel.parent
                )));
            }
            child.validate_subtree(seen)?;
        }
        Ok(())
    }
}

/// Registration record as returned by the endpoint
///
/// Passwords are write-only and never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub comment: String,
    /// Certificate hash, if the protocol reports one
    pub hash: String,
}

/// Registration data written to the endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Who an ACL rule applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AclSubject {
    User(UserId),
    Group(String),
}

/// Single ACL rule; order within a channel's list is significant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    pub apply_here: bool,
    pub apply_subs: bool,
    pub inherited: bool,
    pub subject: AclSubject,
    pub allow: u32,
    pub deny: u32,
}

/// Channel group definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclGroup {
    pub name: String,
    pub inherited: bool,
    pub inherit: bool,
    pub inheritable: bool,
    pub add: Vec<UserId>,
    pub remove: Vec<UserId>,
    pub members: Vec<UserId>,
}

/// Complete ACL state of a channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    pub rules: Vec<AclRule>,
    pub groups: Vec<AclGroup>,
    /// Whether the channel inherits ACLs from its parent
    pub inherit: bool,
}

/// Address ban
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanEntry {
    pub address: IpAddr,
    /// Mask length over the 128-bit address form
    pub bits: u32,
    /// Associated user name (empty if none)
    pub name: String,
    /// Associated certificate hash (empty if none)
    pub hash: String,
    pub reason: String,
    /// Epoch seconds
    pub start: i64,
    /// Seconds, 0 = permanent
    pub duration: u32,
}

/// Field-wise ban selector; an entry matches when every set field is equal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanFilter {
    pub address: Option<IpAddr>,
    pub bits: Option<u32>,
    pub name: Option<String>,
    pub hash: Option<String>,
    pub reason: Option<String>,
    pub start: Option<i64>,
    pub duration: Option<u32>,
}

impl BanFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: IpAddr) -> Self {
        self.address = Some(address);
        self
    }

    pub fn bits(mut self, bits: u32) -> Self {
        self.bits = Some(bits);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn duration(mut self, duration: u32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, ban: &BanEntry) -> bool {
        fn eq<T: PartialEq>(want: &Option<T>, have: &T) -> bool {
            want.as_ref().map_or(true, |w| w == have)
        }

        eq(&self.address, &ban.address)
            && eq(&self.bits, &ban.bits)
            && eq(&self.name, &ban.name)
            && eq(&self.hash, &ban.hash)
            && eq(&self.reason, &ban.reason)
            && eq(&self.start, &ban.start)
            && eq(&self.duration, &ban.duration)
    }
}

/// Ban fields supplied to the session-derived ban path; unset fields get defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanTemplate {
    pub bits: Option<u32>,
    pub start: Option<i64>,
    pub duration: Option<u32>,
    pub name: String,
    pub hash: String,
    pub reason: String,
}

impl BanTemplate {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..Default::default()
        }
    }

    /// Build the ban for `address`, filling mask bits, start and duration
    pub fn into_entry(self, address: IpAddr, now: i64) -> BanEntry {
        BanEntry {
            address,
            bits: self.bits.unwrap_or(DEFAULT_BAN_BITS),
            name: self.name,
            hash: self.hash,
            reason: self.reason,
            start: self.start.unwrap_or(now),
            duration: self.duration.unwrap_or(DEFAULT_BAN_DURATION),
        }
    }
}

/// Server log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Epoch seconds
    pub timestamp: i64,
    pub text: String,
}
