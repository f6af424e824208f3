//! Remote operation names
//!
//! Names are exactly what the endpoint's interface definition declares. Several
//! operations were renamed between generations (`kickPlayer` / `kickUser`,
//! `updateregistration` / `updateRegistration`), so each spelling is its own
//! variant and the dialect picks the one to use.

/// Remote operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // Meta
    GetVersion,
    GetBootedServers,
    GetAllServers,
    NewServer,
    GetDefaultConf,

    // Server lifecycle
    IsRunning,
    Start,
    Stop,
    Delete,
    GetUptime,
    GetLog,

    // Configuration
    GetConf,
    SetConf,
    GetAllConf,
    SetSuperuserPassword,

    // Channels and users
    GetTree,
    GetChannels,
    GetPlayers,
    GetUsers,
    GetState,
    SetState,
    GetChannelState,
    SetChannelState,
    AddChannel,
    RemoveChannel,
    KickPlayer,
    KickUser,
    SendMessage,
    SendMessageChannel,

    // ACL and bans
    GetAcl,
    SetAcl,
    GetBans,
    SetBans,

    // Textures
    GetTexture,
    SetTexture,

    // Registration
    RegisterPlayer,
    RegisterUser,
    UnregisterPlayer,
    UnregisterUser,
    GetRegistration,
    UpdateRegistrationLegacy,
    UpdateRegistration,
    GetRegisteredPlayers,
    GetRegisteredUsers,
    VerifyPassword,
}

impl Op {
    /// Wire name of the operation
    pub fn name(&self) -> &'static str {
        match self {
            Op::GetVersion => "getVersion",
            Op::GetBootedServers => "getBootedServers",
            Op::GetAllServers => "getAllServers",
            Op::NewServer => "newServer",
            Op::GetDefaultConf => "getDefaultConf",
            Op::IsRunning => "isRunning",
            Op::Start => "start",
            Op::Stop => "stop",
            Op::Delete => "delete",
            Op::GetUptime => "getUptime",
            Op::GetLog => "getLog",
            Op::GetConf => "getConf",
            Op::SetConf => "setConf",
            Op::GetAllConf => "getAllConf",
            Op::SetSuperuserPassword => "setSuperuserPassword",
            Op::GetTree => "getTree",
            Op::GetChannels => "getChannels",
            Op::GetPlayers => "getPlayers",
            Op::GetUsers => "getUsers",
            Op::GetState => "getState",
            Op::SetState => "setState",
            Op::GetChannelState => "getChannelState",
            Op::SetChannelState => "setChannelState",
            Op::AddChannel => "addChannel",
            Op::RemoveChannel => "removeChannel",
            Op::KickPlayer => "kickPlayer",
            Op::KickUser => "kickUser",
            Op::SendMessage => "sendMessage",
            Op::SendMessageChannel => "sendMessageChannel",
            Op::GetAcl => "getACL",
            Op::SetAcl => "setACL",
            Op::GetBans => "getBans",
            Op::SetBans => "setBans",
            Op::GetTexture => "getTexture",
            Op::SetTexture => "setTexture",
            Op::RegisterPlayer => "registerPlayer",
            Op::RegisterUser => "registerUser",
            Op::UnregisterPlayer => "unregisterPlayer",
            Op::UnregisterUser => "unregisterUser",
            Op::GetRegistration => "getRegistration",
            Op::UpdateRegistrationLegacy => "updateregistration",
            Op::UpdateRegistration => "updateRegistration",
            Op::GetRegisteredPlayers => "getRegisteredPlayers",
            Op::GetRegisteredUsers => "getRegisteredUsers",
            Op::VerifyPassword => "verifyPassword",
        }
    }

    /// Parse a wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.name() == name)
    }

    pub const ALL: [Op; 45] = [
        Op::GetVersion,
        Op::GetBootedServers,
        Op::GetAllServers,
        Op::NewServer,
        Op::GetDefaultConf,
        Op::IsRunning,
        Op::Start,
        Op::Stop,
        Op::Delete,
        Op::GetUptime,
        Op::GetLog,
        Op::GetConf,
        Op::SetConf,
        Op::GetAllConf,
        Op::SetSuperuserPassword,
        Op::GetTree,
        Op::GetChannels,
        Op::GetPlayers,
        Op::GetUsers,
        Op::GetState,
        Op::SetState,
        Op::GetChannelState,
        Op::SetChannelState,
        Op::AddChannel,
        Op::RemoveChannel,
        Op::KickPlayer,
        Op::KickUser,
        Op::SendMessage,
        Op::SendMessageChannel,
        Op::GetAcl,
        Op::SetAcl,
        Op::GetBans,
        Op::SetBans,
        Op::GetTexture,
        Op::SetTexture,
        Op::RegisterPlayer,
        Op::RegisterUser,
        Op::UnregisterPlayer,
        Op::UnregisterUser,
        Op::GetRegistration,
        Op::UpdateRegistrationLegacy,
        Op::UpdateRegistration,
        Op::GetRegisteredPlayers,
        Op::GetRegisteredUsers,
        Op::VerifyPassword,
    ];
}

/// Keys of the registration map used from 1.2 on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserInfo {
    Name = 0,
    Email = 1,
    Comment = 2,
    Hash = 3,
    Password = 4,
}

impl UserInfo {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(UserInfo::Name),
            1 => Some(UserInfo::Email),
            2 => Some(UserInfo::Comment),
            3 => Some(UserInfo::Hash),
            4 => Some(UserInfo::Password),
            _ => None,
        }
    }

    pub fn key(self) -> i64 {
        self as i64
    }
}
