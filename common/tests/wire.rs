use std::collections::BTreeMap;

use common::demo_analysis::{
    HeatmapCell, ItemPickups, Match, Player, Side, Team, UnnecessaryStats, Winner,
};
use common::{Envelope, Message, SharingCode};
use pretty_assertions::assert_eq;

fn player() -> Player {
    Player {
        name: "Excel".to_owned(),
        steam_id64: "76561198236134832".to_owned(),
        steam_id3: "275869104".to_owned(),
        kills: 21,
        deaths: 15,
        assists: 4,
        hsp: 48,
        mvps: 3,
        ping: 0,
        side: Side::Terrorist,
        score: 55,
        unnecessary_stats: UnnecessaryStats {
            jumps: 120,
            weapon_fire: BTreeMap::from([("ak47".to_owned(), 310)]),
            item_pickups: BTreeMap::from([(
                "flashbang".to_owned(),
                ItemPickups { count: 4, silent: 1 },
            )]),
            heatmap: vec![HeatmapCell { x: 7, y: -14, value: 2 }],
            ..Default::default()
        },
    }
}

#[test]
fn match_field_names() {
    let result = Match {
        score: [8, 8],
        winner: Winner::Tie,
        map_display_name: "Dust II".to_owned(),
        match_timestamp: 1_600_000_000_000,
        duration_seconds: 1800,
        terrorist_team: Team {
            is_winner: false,
            score: 8,
            side: Side::Terrorist,
            players: vec![player()],
        },
        counter_terrorist_team: Team {
            is_winner: false,
            score: 8,
            side: Side::CounterTerrorist,
            players: Vec::new(),
        },
    };

    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(serde_json::json!([8, 8]), value["score"]);
    assert_eq!("TIE", value["winner"]);
    assert_eq!("Dust II", value["map"]);
    assert_eq!(1_600_000_000_000i64, value["date"]);
    assert_eq!(1800, value["duration"]);
    assert_eq!(false, value["terroristTeam"]["winner"]);
    assert_eq!("CT", value["counterTerroristTeam"]["side"]);

    let player = &value["terroristTeam"]["players"][0];
    assert_eq!("76561198236134832", player["steamId64"]);
    assert_eq!("275869104", player["steamId3"]);
    assert_eq!(48, player["hsp"]);
    assert_eq!("T", player["side"]);
    assert_eq!(120, player["unnecessaryStats"]["jumps"]);
    assert_eq!(310, player["unnecessaryStats"]["weaponFire"]["ak47"]);
    assert_eq!(
        serde_json::json!({ "count": 4, "silent": 1 }),
        player["unnecessaryStats"]["itemPickups"]["flashbang"]
    );
    assert_eq!(
        serde_json::json!([{ "x": 7, "y": -14, "value": 2 }]),
        player["unnecessaryStats"]["heatmap"]
    );

    let back: Match = serde_json::from_value(value).unwrap();
    assert_eq!(result, back);
}

#[test]
fn envelope() {
    assert_eq!(
        serde_json::json!({ "error": true, "data": { "message": "Already initialized" } }),
        serde_json::to_value(Envelope::<Message>::err("Already initialized")).unwrap()
    );
}

#[test]
fn sharing_code_fields() {
    let code = SharingCode {
        match_id: 1,
        outcome_id: 2,
        token_id: 3,
    };

    assert_eq!(
        serde_json::json!({ "matchId": 1, "outcomeId": 2, "tokenId": 3 }),
        serde_json::to_value(code).unwrap()
    );
}
