#![allow(dead_code)]

use analysis::events::{PlayerEntity, Position, ReplayEvent, ReplaySummary, TeamScore, UserId};
use common::demo_analysis::Side;

pub const TEST_MAP: &str = "de_test";

pub fn player(user_id: UserId, steam_id64: &str, name: &str, side: Side) -> PlayerEntity {
    PlayerEntity {
        user_id,
        steam_id64: steam_id64.to_owned(),
        steam_id3: 1000 + user_id as u32,
        name: name.to_owned(),
        is_fake: false,
        side: Some(side),
        kills: 0,
        deaths: 0,
        assists: 0,
        mvps: 0,
        score: 0,
        round_headshots: Vec::new(),
    }
}

pub fn end(map: &str, t: Option<u32>, ct: Option<u32>) -> ReplayEvent {
    ReplayEvent::End(ReplaySummary {
        map_name: map.to_owned(),
        playback_time: 1800.4,
        teams: vec![
            TeamScore {
                side: Side::Terrorist,
                score: t,
            },
            TeamScore {
                side: Side::CounterTerrorist,
                score: ct,
            },
        ],
    })
}

pub fn fire_at(user_id: UserId, x: f32, y: f32) -> [ReplayEvent; 2] {
    [
        ReplayEvent::PlayerMoved {
            user_id,
            position: Position { x, y },
        },
        ReplayEvent::WeaponFire {
            user_id,
            weapon: "ak47".to_owned(),
        },
    ]
}

/// Radar folder with an identity calibration for [`TEST_MAP`].
pub fn radar_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(format!("{}.txt", TEST_MAP)),
        "\"de_test\"\n{\n\t\"material\"\t\"overviews/de_test\"\n\t\"pos_x\"\t\t\"0\"\n\t\"pos_y\"\t\t\"0\"\n\t\"scale\"\t\t\"1.0\"\n}\n",
    )
    .unwrap();
    dir
}
