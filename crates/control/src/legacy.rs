//! Murmur 1.1.8
//!
//! Byte-string wire values, `playerid` records, `Player` instead of `User`
//! operations and a `RegisteredPlayer` record instead of `UserInfo` maps. The
//! display name lives under `playername` in the configuration.

use crate::adapter::{int, update_record, Adapter};
use crate::decode;
use crate::endpoint::Endpoint;
use crate::repair::{self, LEGACY_NAME_KEY, NAME_KEY};
use mctl_core::{
    BanEntry, ChannelId, ConfMap, CtlError, RegisteredUser, Registration, Result, ServerId,
    SessionId, UserId, UserState,
};
use mctl_protocol::Op;
use std::collections::BTreeMap;

pub struct LegacyAdapter {
    endpoint: Endpoint,
}

impl LegacyAdapter {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

fn wire_conf_key(key: &str) -> &str {
    if key == NAME_KEY {
        LEGACY_NAME_KEY
    } else {
        key
    }
}

impl Adapter for LegacyAdapter {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn get_uptime(&self, _server: ServerId) -> Result<Option<u64>> {
        Ok(None)
    }

    fn get_conf(&self, server: ServerId, key: &str) -> Result<String> {
        let ep = &self.endpoint;
        let value = ep.server(server, Op::GetConf, vec![ep.text(wire_conf_key(key))])?;
        ep.strings().decode(&ep.strings().ingest(value), key)
    }

    fn set_conf(&self, server: ServerId, key: &str, value: &str) -> Result<()> {
        let ep = &self.endpoint;
        let args = vec![ep.text(wire_conf_key(key)), ep.text(value)];
        ep.server(server, Op::SetConf, args)?;
        Ok(())
    }

    fn get_all_conf(&self, server: ServerId) -> Result<ConfMap> {
        let ep = &self.endpoint;
        let conf = decode::conf_map(ep.dialect(), ep.server(server, Op::GetAllConf, vec![])?)?;
        Ok(repair::alias_legacy_conf(conf))
    }

    fn get_users(&self, server: ServerId) -> Result<BTreeMap<SessionId, UserState>> {
        let ep = &self.endpoint;
        ep.fetch(server.into(), Op::GetPlayers, vec![], |v| decode::users(ep.dialect(), v))
    }

    fn get_registered_users(
        &self,
        server: ServerId,
        filter: &str,
    ) -> Result<BTreeMap<UserId, RegisteredUser>> {
        let ep = &self.endpoint;
        let reply = ep.server(server, Op::GetRegisteredPlayers, vec![ep.text(filter)])?;
        reply
            .into_list("registered players")?
            .into_iter()
            .map(|player| decode::registered_player(ep.dialect(), player).map(|u| (u.user_id, u)))
            .collect()
    }

    fn register_user(&self, server: ServerId, registration: &Registration) -> Result<UserId> {
        let ep = &self.endpoint;
        let id = ep
            .server(server, Op::RegisterPlayer, vec![ep.text(&registration.name)])?
            .expect_int("player id")?;
        let user = decode::user_id(id)
            .ok_or_else(|| CtlError::Protocol(format!("registerPlayer: invalid player id {}", id)))?;
        self.set_registration(server, user, registration)?;
        Ok(user)
    }

    fn unregister_user(&self, server: ServerId, user: UserId) -> Result<()> {
        self.endpoint
            .server(server, Op::UnregisterPlayer, vec![int(user.get())])?;
        Ok(())
    }

    fn get_registration(&self, server: ServerId, user: UserId) -> Result<RegisteredUser> {
        let ep = &self.endpoint;
        ep.fetch(server.into(), Op::GetRegistration, vec![int(user.get())], |v| {
            decode::registered_player(ep.dialect(), v).map(|reg| RegisteredUser {
                user_id: user,
                ..reg
            })
        })
    }

    fn set_registration(
        &self,
        server: ServerId,
        user: UserId,
        registration: &Registration,
    ) -> Result<()> {
        let ep = &self.endpoint;
        let record = decode::registered_player_to_wire(ep.dialect(), user, registration);
        ep.server(server, Op::UpdateRegistrationLegacy, vec![record])?;
        Ok(())
    }

    fn get_bans(&self, server: ServerId) -> Result<Vec<BanEntry>> {
        let reply = self.endpoint.server(server, Op::GetBans, vec![])?;
        reply
            .into_list("ban list")?
            .into_iter()
            .map(decode::legacy_ban)
            .collect()
    }

    fn set_bans(&self, _server: ServerId, _bans: &[BanEntry]) -> Result<()> {
        Err(self.endpoint.unsupported("setBans"))
    }

    fn kick_user(&self, server: ServerId, session: SessionId, reason: &str) -> Result<()> {
        let ep = &self.endpoint;
        ep.server(server, Op::KickPlayer, vec![int(session.get()), ep.text(reason)])?;
        Ok(())
    }

    /// Channel descriptions do not exist in this generation
    fn rename_channel(
        &self,
        server: ServerId,
        channel: ChannelId,
        name: &str,
        _description: &str,
    ) -> Result<()> {
        let ops = (Op::GetChannelState, Op::SetChannelState);
        let changes = vec![("name", self.endpoint.text(name))];
        update_record(&self.endpoint, server, ops, channel.get(), changes)
    }
}
