use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use common::demo_analysis::{Match, Player, Side, Team, UnnecessaryStats, Winner};

use crate::decoder::{DecodeError, ReplayDecoder};
use crate::events::{PlayerEntity, Position, ReplayEvent, ReplaySummary, UserId};
use crate::heatmap::{Config, HeatmapAccumulator, RadarData, RadarDirectory};
use crate::stats::{self, StatAccumulator};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Decoding replay: {0}")]
    Decode(#[from] DecodeError),
    #[error("No round count for the {0:?} team")]
    MissingTeamScore(Side),
}

/// Who a player was when their entity got created.
///
/// Players leaving near the end of a match get their name and short id
/// replaced by the bot taking over their slot, only the long id survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub display_name: String,
    pub short_id: u32,
    pub long_id: String,
}

/// Plays back one replay and builds the [`Match`] from it.
pub struct ReplayAggregator {
    path: PathBuf,
    match_timestamp: i64,
    radars: RadarDirectory,
    config: Config,

    players: Vec<PlayerEntity>,
    identities: HashMap<String, PlayerIdentity>,
    user_ids: HashMap<String, BTreeSet<UserId>>,
    positions: HashMap<UserId, Position>,

    stats: StatAccumulator,
    heatmaps: HashMap<UserId, HeatmapAccumulator>,
}

impl ReplayAggregator {
    pub fn new<P>(path: P, match_timestamp: i64, radars: RadarDirectory) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            path: path.into(),
            match_timestamp,
            radars,
            config: Config::default(),
            players: Vec::new(),
            identities: HashMap::new(),
            user_ids: HashMap::new(),
            positions: HashMap::new(),
            stats: StatAccumulator::new(),
            heatmaps: HashMap::new(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decodes the replay and consumes its events until the end marker.
    pub fn process<D>(mut self, decoder: &D) -> Result<Match, AnalysisError>
    where
        D: ReplayDecoder + ?Sized,
    {
        let _guard = tracing::info_span!("Replay", path = ?self.path).entered();
        tracing::debug!("Processing replay");

        let events = decoder.decode(&self.path)?;
        for event in events {
            match event? {
                ReplayEvent::End(summary) => return self.finish(summary),
                other => self.handle(other),
            }
        }

        Err(AnalysisError::Decode(DecodeError::Truncated))
    }

    pub fn handle(&mut self, event: ReplayEvent) {
        match event {
            ReplayEvent::PlayerCreated(entity) => self.player_created(entity),
            ReplayEvent::PlayerUpdated(entity) => self.player_updated(entity),
            ReplayEvent::PlayerMoved { user_id, position } => {
                self.positions.insert(user_id, position);
            }
            ReplayEvent::WeaponFire { user_id, weapon } => {
                self.stats.weapon_fire(user_id, &weapon);

                match self.positions.get(&user_id) {
                    Some(pos) => self
                        .heatmaps
                        .entry(user_id)
                        .or_default()
                        .add_point(pos.x, pos.y),
                    None => tracing::trace!(?user_id, "Weapon fire without a known position"),
                };
            }
            ReplayEvent::PlayerFallDamage { user_id, damage } => {
                self.stats.fall_damage(user_id, damage)
            }
            ReplayEvent::PlayerJump { user_id } => self.stats.jump(user_id),
            ReplayEvent::PlayerBlind { user_id, duration } => {
                self.stats.blinded(user_id, duration)
            }
            ReplayEvent::ItemPickup {
                user_id,
                item,
                silent,
            } => self.stats.item_pickup(user_id, &item, silent),
            ReplayEvent::WeaponReload { user_id } => self.stats.reload(user_id),
            ReplayEvent::PlayerFootstep { user_id } => self.stats.footstep(user_id),
            ReplayEvent::BombPlanted { user_id } => self.stats.bomb_planted(user_id),
            ReplayEvent::PlayerHurt {
                user_id,
                weapon,
                damage,
            } => self.stats.damage_taken(user_id, &weapon, damage),
            ReplayEvent::End(_) | ReplayEvent::Error { .. } => {
                tracing::warn!("Stream markers are handled by process");
            }
        };
    }

    fn player_created(&mut self, entity: PlayerEntity) {
        if entity.is_fake {
            tracing::trace!(name = ?entity.name, "Ignoring bot");
            return;
        }

        let _guard = tracing::trace_span!("Entity", steam_id = ?entity.steam_id64, user_id = ?entity.user_id).entered();

        // Leaving and rejoining creates a new entity for the same player
        if let Some(idx) = self
            .players
            .iter()
            .position(|p| p.steam_id64 == entity.steam_id64)
        {
            tracing::debug!("Player rejoined");
            self.players.remove(idx);
        }

        self.identities
            .entry(entity.steam_id64.clone())
            .or_insert_with(|| PlayerIdentity {
                display_name: entity.name.clone(),
                short_id: entity.steam_id3,
                long_id: entity.steam_id64.clone(),
            });
        self.user_ids
            .entry(entity.steam_id64.clone())
            .or_default()
            .insert(entity.user_id);

        self.players.push(entity);
    }

    fn player_updated(&mut self, entity: PlayerEntity) {
        let live = match self
            .players
            .iter_mut()
            .find(|p| p.steam_id64 == entity.steam_id64)
        {
            Some(p) => p,
            None => return,
        };

        self.user_ids
            .entry(entity.steam_id64.clone())
            .or_default()
            .insert(entity.user_id);

        *live = entity;
    }

    fn finish(mut self, summary: ReplaySummary) -> Result<Match, AnalysisError> {
        let t_rounds = summary
            .score(Side::Terrorist)
            .ok_or(AnalysisError::MissingTeamScore(Side::Terrorist))?;
        let ct_rounds = summary
            .score(Side::CounterTerrorist)
            .ok_or(AnalysisError::MissingTeamScore(Side::CounterTerrorist))?;

        let winner = Winner::from_scores(t_rounds, ct_rounds);

        let mut terrorists = Team {
            is_winner: winner.is(Side::Terrorist),
            score: t_rounds,
            side: Side::Terrorist,
            players: Vec::new(),
        };
        let mut counter_terrorists = Team {
            is_winner: winner.is(Side::CounterTerrorist),
            score: ct_rounds,
            side: Side::CounterTerrorist,
            players: Vec::new(),
        };

        let radar = match self.radars.load(&summary.map_name) {
            Ok(r) => Some(r),
            Err(e) => {
                tracing::warn!("No heatmaps for this replay: {}", e);
                None
            }
        };

        let players = std::mem::take(&mut self.players);
        for entity in players {
            let player = self.finish_player(entity, radar.as_ref());

            match player.side {
                Side::Terrorist => terrorists.players.push(player),
                Side::CounterTerrorist => counter_terrorists.players.push(player),
            };
        }

        let duration = summary.playback_time.max(0.0).round() as u64;

        tracing::debug!("Replay processed");

        Ok(Match {
            score: [t_rounds, ct_rounds],
            winner,
            map_display_name: crate::maps::display_name(&summary.map_name).to_owned(),
            match_timestamp: self.match_timestamp,
            duration_seconds: duration,
            terrorist_team: terrorists,
            counter_terrorist_team: counter_terrorists,
        })
    }

    fn finish_player(&mut self, entity: PlayerEntity, radar: Option<&RadarData>) -> Player {
        let identity = self
            .identities
            .get(&entity.steam_id64)
            .cloned()
            .unwrap_or_else(|| PlayerIdentity {
                display_name: entity.name.clone(),
                short_id: entity.steam_id3,
                long_id: entity.steam_id64.clone(),
            });

        let user_ids = self
            .user_ids
            .remove(&entity.steam_id64)
            .unwrap_or_default();

        let mut unnecessary = UnnecessaryStats::default();
        let mut heatmap = HeatmapAccumulator::new();
        for user_id in user_ids.iter().copied().chain(core::iter::once(entity.user_id)) {
            if let Some(s) = self.stats.take(user_id) {
                stats::absorb(&mut unnecessary, s);
            }
            if let Some(h) = self.heatmaps.remove(&user_id) {
                heatmap.extend(h);
            }
        }

        if let Some(radar) = radar {
            unnecessary.heatmap = heatmap.bucket(&self.config, radar);
        }

        Player {
            name: identity.display_name,
            steam_id64: identity.long_id,
            steam_id3: identity.short_id.to_string(),
            kills: entity.kills,
            deaths: entity.deaths,
            assists: entity.assists,
            hsp: headshot_percentage(&entity.round_headshots),
            mvps: entity.mvps,
            ping: 0,
            side: entity.side.unwrap_or(Side::CounterTerrorist),
            score: entity.score,
            unnecessary_stats: unnecessary,
        }
    }
}

/// `round(100 * headshots / rounds)`, 0 if no round was played.
pub fn headshot_percentage(round_headshots: &[u32]) -> u32 {
    if round_headshots.is_empty() {
        return 0;
    }

    let total: u64 = round_headshots.iter().map(|h| *h as u64).sum();
    (100.0 * total as f64 / round_headshots.len() as f64).round() as u32
}
