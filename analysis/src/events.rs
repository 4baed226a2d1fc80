use common::demo_analysis::Side;

/// The numeric id a player has inside one replay.
///
/// Not stable across a leave/rejoin, see [`PlayerEntity::steam_id64`] for that.
pub type UserId = i32;

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// State of a player entity as the decoder currently sees it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerEntity {
    pub user_id: UserId,
    pub steam_id64: String,
    /// The short account id (`friendsId`)
    pub steam_id3: u32,
    pub name: String,
    #[serde(default)]
    pub is_fake: bool,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub mvps: u32,
    #[serde(default)]
    pub score: i32,
    /// Headshot kills, one entry per played round.
    #[serde(default)]
    pub round_headshots: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TeamScore {
    pub side: Side,
    #[serde(default)]
    pub score: Option<u32>,
}

/// Metadata only known once the decoder reached the end of the replay.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReplaySummary {
    pub map_name: String,
    /// Seconds
    pub playback_time: f32,
    pub teams: Vec<TeamScore>,
}

impl ReplaySummary {
    pub fn score(&self, side: Side) -> Option<u32> {
        self.teams
            .iter()
            .find(|t| t.side == side)
            .and_then(|t| t.score)
    }
}

/// A single event emitted while playing back a replay.
///
/// The decoder emits these in playback order and terminates the stream with
/// either [`ReplayEvent::End`] or [`ReplayEvent::Error`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    PlayerCreated(PlayerEntity),
    PlayerUpdated(PlayerEntity),
    PlayerMoved {
        user_id: UserId,
        position: Position,
    },
    WeaponFire {
        user_id: UserId,
        weapon: String,
    },
    PlayerFallDamage {
        user_id: UserId,
        damage: u32,
    },
    PlayerJump {
        user_id: UserId,
    },
    PlayerBlind {
        user_id: UserId,
        duration: f32,
    },
    ItemPickup {
        user_id: UserId,
        item: String,
        #[serde(default)]
        silent: bool,
    },
    WeaponReload {
        user_id: UserId,
    },
    PlayerFootstep {
        user_id: UserId,
    },
    BombPlanted {
        user_id: UserId,
    },
    PlayerHurt {
        user_id: UserId,
        weapon: String,
        damage: u32,
    },
    End(ReplaySummary),
    Error {
        message: String,
    },
}
