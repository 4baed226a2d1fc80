use std::collections::BTreeMap;

/// Side of the server a team (or player) finished the match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    #[serde(rename = "T")]
    Terrorist,
    #[serde(rename = "CT")]
    CounterTerrorist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Winner {
    #[serde(rename = "T")]
    Terrorist,
    #[serde(rename = "CT")]
    CounterTerrorist,
    #[serde(rename = "TIE")]
    Tie,
}

impl Winner {
    pub fn from_scores(t_rounds: u32, ct_rounds: u32) -> Self {
        match t_rounds.cmp(&ct_rounds) {
            core::cmp::Ordering::Equal => Self::Tie,
            core::cmp::Ordering::Greater => Self::Terrorist,
            core::cmp::Ordering::Less => Self::CounterTerrorist,
        }
    }

    pub fn is(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (Self::Terrorist, Side::Terrorist) | (Self::CounterTerrorist, Side::CounterTerrorist)
        )
    }
}

/// The finished result of processing one replay, as sent to the coordinator.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// `[terrorist rounds, counter-terrorist rounds]`
    pub score: [u32; 2],
    pub winner: Winner,
    #[serde(rename = "map")]
    pub map_display_name: String,
    /// Milliseconds since the unix epoch.
    #[serde(rename = "date")]
    pub match_timestamp: i64,
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    pub terrorist_team: Team,
    pub counter_terrorist_team: Team,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Team {
    #[serde(rename = "winner")]
    pub is_winner: bool,
    pub score: u32,
    pub side: Side,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub steam_id64: String,
    pub steam_id3: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    /// Headshot percentage, rounded.
    pub hsp: u32,
    pub mvps: u32,
    pub ping: u32,
    pub side: Side,
    pub score: i32,
    pub unnecessary_stats: UnnecessaryStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemPickups {
    pub count: u32,
    pub silent: u32,
}

/// Everything we count that the scoreboard does not show.
///
/// All counters only ever grow while a replay is processed.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnnecessaryStats {
    pub jumps: u32,
    pub fall_damage: u32,
    pub blinded: u32,
    pub blind_duration: f32,
    pub reloads: u32,
    pub footsteps: u32,
    pub bomb_plants: u32,
    pub weapon_fire: BTreeMap<String, u32>,
    pub damage_taken: BTreeMap<String, u32>,
    pub item_pickups: BTreeMap<String, ItemPickups>,
    pub heatmap: Vec<HeatmapCell>,
}

/// One bucket of the firing heat-map.
///
/// `x` and `y` are the grid coordinates scaled back up by the cell size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct HeatmapCell {
    pub x: i64,
    pub y: i64,
    pub value: u32,
}
