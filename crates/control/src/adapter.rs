//! Uniform control interface
//!
//! # Purpose
//! [`Adapter`] is the one interface callers use regardless of the protocol
//! generation the endpoint speaks. The provided methods implement the current
//! protocol through the endpoint's [`Dialect`](crate::Dialect); generation
//! variants override only where the wire genuinely differs.
//!
//! # Errors
//! Every remote failure is translated once in [`Endpoint::call`]. Methods here add
//! nothing but decoding, so a failing operation reports the remote op name and the
//! server it ran against.

use crate::decode;
use crate::endpoint::{now_epoch, Endpoint};
use crate::repair;
use mctl_core::{
    Acl, BanEntry, BanFilter, BanTemplate, Channel, ChannelId, ChannelNode, ConfMap, CtlError,
    Generation, LogEntry, RegisteredUser, Registration, Result, ServerId, SessionId, Texture,
    UserId, UserState, Version,
};
use mctl_protocol::{Op, Target, WireValue};
use std::collections::BTreeMap;
use tracing::debug;

pub(crate) fn int(id: u32) -> WireValue {
    WireValue::Int(id as i64)
}

/// Fetch a state record, change one field and write it back
pub(crate) fn update_record(
    endpoint: &Endpoint,
    server: ServerId,
    (get, set): (Op, Op),
    id: u32,
    changes: Vec<(&str, WireValue)>,
) -> Result<()> {
    let mut fields = endpoint
        .server(server, get, vec![int(id)])?
        .into_struct(get.name())?;
    for (field, value) in changes {
        fields.insert(field.to_string(), value);
    }
    endpoint.server(server, set, vec![WireValue::Struct(fields)])?;
    Ok(())
}

pub(crate) fn fetch_uptime(endpoint: &Endpoint, server: ServerId) -> Result<Option<u64>> {
    let secs = endpoint.server(server, Op::GetUptime, vec![])?.expect_int("uptime")?;
    Ok(Some(secs.max(0) as u64))
}

pub(crate) fn fetch_texture(endpoint: &Endpoint, server: ServerId, user: UserId) -> Result<Texture> {
    let payload = endpoint
        .server(server, Op::GetTexture, vec![int(user.get())])?
        .into_payload("texture")?;
    if payload.is_empty() {
        return Err(CtlError::NoTexture { server, user });
    }
    endpoint.texture_format().decode(&payload)
}

pub trait Adapter: Send + Sync {
    fn endpoint(&self) -> &Endpoint;

    /// Version reported by the endpoint at probe time
    fn version(&self) -> Version {
        self.endpoint().version().clone()
    }

    fn generation(&self) -> Generation {
        self.endpoint().generation()
    }

    // Servers

    fn list_booted_servers(&self) -> Result<Vec<ServerId>> {
        let ep = self.endpoint();
        ep.fetch(Target::Meta, Op::GetBootedServers, vec![], decode::server_ids)
    }

    fn list_all_servers(&self) -> Result<Vec<ServerId>> {
        let ep = self.endpoint();
        ep.fetch(Target::Meta, Op::GetAllServers, vec![], decode::server_ids)
    }

    fn new_server(&self) -> Result<ServerId> {
        let id = self.endpoint().meta(Op::NewServer, vec![])?.expect_int("server id")?;
        u32::try_from(id)
            .map(ServerId::new)
            .map_err(|_| CtlError::Protocol(format!("newServer: invalid server id {}", id)))
    }

    fn is_booted(&self, server: ServerId) -> Result<bool> {
        self.endpoint()
            .server(server, Op::IsRunning, vec![])?
            .expect_bool("isRunning")
    }

    fn start(&self, server: ServerId) -> Result<()> {
        self.endpoint().server(server, Op::Start, vec![])?;
        Ok(())
    }

    fn stop(&self, server: ServerId) -> Result<()> {
        self.endpoint().server(server, Op::Stop, vec![])?;
        Ok(())
    }

    /// Stop the server if it is running, then delete it
    fn delete_server(&self, server: ServerId) -> Result<()> {
        if self.is_booted(server)? {
            debug!(%server, "stopping before delete");
            self.stop(server)?;
        }
        self.endpoint().server(server, Op::Delete, vec![])?;
        Ok(())
    }

    /// Seconds since boot, where the generation reports it
    fn get_uptime(&self, server: ServerId) -> Result<Option<u64>> {
        fetch_uptime(self.endpoint(), server)
    }

    fn get_log(&self, server: ServerId, first: i32, last: i32) -> Result<Vec<LogEntry>> {
        let ep = self.endpoint();
        let args = vec![WireValue::from(first), WireValue::from(last)];
        let reply = ep.server(server, Op::GetLog, args)?;
        reply
            .into_list("log")?
            .into_iter()
            .map(|entry| decode::log_entry(ep.dialect(), entry))
            .collect()
    }

    // Configuration

    fn get_default_conf(&self) -> Result<ConfMap> {
        let ep = self.endpoint();
        decode::conf_map(ep.dialect(), ep.meta(Op::GetDefaultConf, vec![])?)
    }

    fn get_conf(&self, server: ServerId, key: &str) -> Result<String> {
        let ep = self.endpoint();
        let value = ep.server(server, Op::GetConf, vec![ep.text(key)])?;
        ep.strings().decode(&ep.strings().ingest(value), key)
    }

    fn set_conf(&self, server: ServerId, key: &str, value: &str) -> Result<()> {
        let ep = self.endpoint();
        ep.server(server, Op::SetConf, vec![ep.text(key), ep.text(value)])?;
        Ok(())
    }

    /// Full configuration; repairs a migrated display name as a side effect
    fn get_all_conf(&self, server: ServerId) -> Result<ConfMap> {
        let ep = self.endpoint();
        let conf = decode::conf_map(ep.dialect(), ep.server(server, Op::GetAllConf, vec![])?)?;
        repair::repair_conf(ep, server, conf)
    }

    fn set_superuser_password(&self, server: ServerId, password: &str) -> Result<()> {
        let ep = self.endpoint();
        ep.server(server, Op::SetSuperuserPassword, vec![ep.text(password)])?;
        Ok(())
    }

    // Channels and users

    fn get_tree(&self, server: ServerId) -> Result<ChannelNode> {
        let ep = self.endpoint();
        ep.fetch(server.into(), Op::GetTree, vec![], |v| decode::tree(ep.dialect(), v))
    }

    fn get_channels(&self, server: ServerId) -> Result<BTreeMap<ChannelId, Channel>> {
        let ep = self.endpoint();
        ep.fetch(server.into(), Op::GetChannels, vec![], |v| decode::channels(ep.dialect(), v))
    }

    fn get_users(&self, server: ServerId) -> Result<BTreeMap<SessionId, UserState>> {
        let ep = self.endpoint();
        ep.fetch(server.into(), Op::GetUsers, vec![], |v| decode::users(ep.dialect(), v))
    }

    fn get_state(&self, server: ServerId, session: SessionId) -> Result<UserState> {
        let ep = self.endpoint();
        let args = vec![int(session.get())];
        ep.fetch(server.into(), Op::GetState, args, |v| decode::user(ep.dialect(), v))
    }

    // Registration

    /// Registered users whose name contains `filter` (empty for all)
    fn get_registered_users(
        &self,
        server: ServerId,
        filter: &str,
    ) -> Result<BTreeMap<UserId, RegisteredUser>> {
        let ep = self.endpoint();
        let args = vec![ep.text(filter)];
        ep.fetch(server.into(), Op::GetRegisteredUsers, args, |v| {
            decode::registered_users(ep.dialect(), v)
        })
    }

    fn register_user(&self, server: ServerId, registration: &Registration) -> Result<UserId> {
        let ep = self.endpoint();
        let info = decode::registration_info_to_wire(ep.dialect(), registration);
        let id = ep.server(server, Op::RegisterUser, vec![info])?.expect_int("user id")?;
        decode::user_id(id)
            .ok_or_else(|| CtlError::Protocol(format!("registerUser: invalid user id {}", id)))
    }

    fn unregister_user(&self, server: ServerId, user: UserId) -> Result<()> {
        self.endpoint()
            .server(server, Op::UnregisterUser, vec![int(user.get())])?;
        Ok(())
    }

    /// Registration record; the password is never returned
    fn get_registration(&self, server: ServerId, user: UserId) -> Result<RegisteredUser> {
        let ep = self.endpoint();
        ep.fetch(server.into(), Op::GetRegistration, vec![int(user.get())], |v| {
            decode::registration_info(ep.dialect(), user, v)
        })
    }

    fn set_registration(
        &self,
        server: ServerId,
        user: UserId,
        registration: &Registration,
    ) -> Result<()> {
        let ep = self.endpoint();
        let info = decode::registration_info_to_wire(ep.dialect(), registration);
        ep.server(server, Op::UpdateRegistration, vec![int(user.get()), info])?;
        Ok(())
    }

    /// User id when the credentials are valid
    fn verify_password(&self, server: ServerId, name: &str, password: &str) -> Result<Option<UserId>> {
        let ep = self.endpoint();
        let args = vec![ep.text(name), ep.text(password)];
        let id = ep.server(server, Op::VerifyPassword, args)?.expect_int("verifyPassword")?;
        Ok(decode::user_id(id))
    }

    // Access control

    fn get_acl(&self, server: ServerId, channel: ChannelId) -> Result<Acl> {
        let ep = self.endpoint();
        ep.fetch(server.into(), Op::GetAcl, vec![int(channel.get())], |v| {
            decode::acl(ep.dialect(), v)
        })
    }

    fn set_acl(&self, server: ServerId, channel: ChannelId, acl: &Acl) -> Result<()> {
        let ep = self.endpoint();
        let mut args = vec![int(channel.get())];
        args.extend(decode::acl_to_wire(ep.dialect(), acl));
        ep.server(server, Op::SetAcl, args)?;
        Ok(())
    }

    // Bans

    fn get_bans(&self, server: ServerId) -> Result<Vec<BanEntry>> {
        let ep = self.endpoint();
        let reply = ep.server(server, Op::GetBans, vec![])?;
        reply
            .into_list("ban list")?
            .into_iter()
            .map(|ban| decode::ban(ep.dialect(), ban))
            .collect()
    }

    /// Replace the whole ban list
    fn set_bans(&self, server: ServerId, bans: &[BanEntry]) -> Result<()> {
        let ep = self.endpoint();
        let list = bans.iter().map(|b| decode::ban_to_wire(ep.dialect(), b)).collect();
        ep.server(server, Op::SetBans, vec![WireValue::List(list)])?;
        Ok(())
    }

    /// Append a fully specified ban
    fn add_ban(&self, server: ServerId, ban: BanEntry) -> Result<()> {
        let mut bans = self.get_bans(server)?;
        bans.push(ban);
        self.set_bans(server, &bans)
    }

    /// Ban the address a session is connected from
    fn add_ban_for_session(
        &self,
        server: ServerId,
        session: SessionId,
        template: BanTemplate,
    ) -> Result<()> {
        let state = self.get_state(server, session)?;
        let address = state.address.ok_or_else(|| {
            CtlError::Protocol(format!("session {} on server {} has no address", session, server))
        })?;
        self.add_ban(server, template.into_entry(address, now_epoch()))
    }

    /// Remove every ban matching all set fields of `filter`; returns how many went
    fn remove_ban(&self, server: ServerId, filter: &BanFilter) -> Result<usize> {
        if filter.is_empty() {
            return Err(CtlError::InvalidArgument(
                "removeBan needs at least one filter field".into(),
            ));
        }
        let bans = self.get_bans(server)?;
        let before = bans.len();
        let kept: Vec<BanEntry> = bans.into_iter().filter(|b| !filter.matches(b)).collect();
        let removed = before - kept.len();
        self.set_bans(server, &kept)?;
        Ok(removed)
    }

    // Textures

    fn get_texture(&self, server: ServerId, user: UserId) -> Result<Texture> {
        fetch_texture(self.endpoint(), server, user)
    }

    /// Stored texture bytes, unmodified
    fn get_raw_texture(&self, server: ServerId, user: UserId) -> Result<Vec<u8>> {
        let ep = self.endpoint();
        if !ep.texture_format().has_raw_access() {
            return Err(ep.unsupported("getRawTexture"));
        }
        let payload = ep
            .server(server, Op::GetTexture, vec![int(user.get())])?
            .into_payload("texture")?;
        Ok(payload.to_vec())
    }

    /// Upload an avatar, normalized to 600x60
    fn set_texture(&self, server: ServerId, user: UserId, texture: &Texture) -> Result<()> {
        let ep = self.endpoint();
        let data = ep.texture_format().encode(texture)?;
        ep.server(server, Op::SetTexture, vec![int(user.get()), WireValue::bytes(data)])?;
        Ok(())
    }

    // Moderation and messaging

    fn move_user(&self, server: ServerId, session: SessionId, channel: ChannelId) -> Result<()> {
        let ops = (Op::GetState, Op::SetState);
        update_record(self.endpoint(), server, ops, session.get(), vec![("channel", int(channel.get()))])
    }

    fn mute_user(&self, server: ServerId, session: SessionId, mute: bool) -> Result<()> {
        let ops = (Op::GetState, Op::SetState);
        update_record(self.endpoint(), server, ops, session.get(), vec![("mute", mute.into())])
    }

    fn deafen_user(&self, server: ServerId, session: SessionId, deaf: bool) -> Result<()> {
        let ops = (Op::GetState, Op::SetState);
        update_record(self.endpoint(), server, ops, session.get(), vec![("deaf", deaf.into())])
    }

    fn kick_user(&self, server: ServerId, session: SessionId, reason: &str) -> Result<()> {
        let ep = self.endpoint();
        ep.server(server, Op::KickUser, vec![int(session.get()), ep.text(reason)])?;
        Ok(())
    }

    fn send_message(&self, server: ServerId, session: SessionId, message: &str) -> Result<()> {
        let ep = self.endpoint();
        ep.server(server, Op::SendMessage, vec![int(session.get()), ep.text(message)])?;
        Ok(())
    }

    /// Message a channel, and its subchannels when `tree` is set
    fn send_message_to_channel_tree(
        &self,
        server: ServerId,
        channel: ChannelId,
        tree: bool,
        message: &str,
    ) -> Result<()> {
        let ep = self.endpoint();
        let args = vec![int(channel.get()), tree.into(), ep.text(message)];
        ep.server(server, Op::SendMessageChannel, args)?;
        Ok(())
    }

    // Channel management

    fn add_channel(&self, server: ServerId, name: &str, parent: ChannelId) -> Result<ChannelId> {
        let ep = self.endpoint();
        let args = vec![ep.text(name), int(parent.get())];
        let id = ep.server(server, Op::AddChannel, args)?.expect_int("channel id")?;
        u32::try_from(id)
            .map(ChannelId::new)
            .map_err(|_| CtlError::Protocol(format!("addChannel: invalid channel id {}", id)))
    }

    fn remove_channel(&self, server: ServerId, channel: ChannelId) -> Result<()> {
        self.endpoint()
            .server(server, Op::RemoveChannel, vec![int(channel.get())])?;
        Ok(())
    }

    fn rename_channel(
        &self,
        server: ServerId,
        channel: ChannelId,
        name: &str,
        description: &str,
    ) -> Result<()> {
        let ep = self.endpoint();
        let changes = vec![("name", ep.text(name)), ("description", ep.text(description))];
        let ops = (Op::GetChannelState, Op::SetChannelState);
        update_record(ep, server, ops, channel.get(), changes)
    }

    fn move_channel(&self, server: ServerId, channel: ChannelId, parent: ChannelId) -> Result<()> {
        let ops = (Op::GetChannelState, Op::SetChannelState);
        update_record(self.endpoint(), server, ops, channel.get(), vec![("parent", int(parent.get()))])
    }
}
