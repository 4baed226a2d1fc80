use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use common::demo_analysis::HeatmapCell;

use crate::events::Position;

/// Size of a single heat-map cell in radar units.
pub const CELL_SIZE: f32 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub cell_size: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HeatmapError {
    #[error("Reading radar file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Radar file for {map:?} has no usable {key:?}")]
    MissingKey { map: String, key: &'static str },
}

/// Calibration of a map's radar image relative to world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarData {
    pub origin_x: f32,
    pub origin_y: f32,
    pub scale: f32,
}

impl RadarData {
    pub const IDENTITY: Self = Self {
        origin_x: 0.0,
        origin_y: 0.0,
        scale: 1.0,
    };

    pub fn to_radar(&self, pos: Position) -> Position {
        Position {
            x: (pos.x - self.origin_x) / self.scale,
            y: (pos.y - self.origin_y) / -self.scale,
        }
    }

    /// Parses the tab separated, quoted key-value format of the radar files.
    pub fn parse(map: &str, content: &str) -> Result<Self, HeatmapError> {
        let values = parse_tbs(content);

        let lookup = |keys: &[&'static str]| -> Result<f32, HeatmapError> {
            keys.iter()
                .find_map(|key| values.get(*key).and_then(|v| v.parse::<f32>().ok()))
                .ok_or_else(|| HeatmapError::MissingKey {
                    map: map.to_owned(),
                    key: keys[0],
                })
        };

        Ok(Self {
            origin_x: lookup(&["pos_x", "origin_x"])?,
            origin_y: lookup(&["pos_y", "origin_y"])?,
            scale: lookup(&["scale"])?,
        })
    }
}

fn parse_tbs(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter(|line| line.contains('\t'))
        .filter_map(|line| {
            let mut parts = line
                .split('\t')
                .map(|part| part.trim())
                .filter(|part| part.len() > 1);

            let key = parts.next()?;
            let value = parts.next()?;

            Some((
                key.trim_matches('"').to_owned(),
                value.trim_matches('"').to_owned(),
            ))
        })
        .collect()
}

/// Folder containing one `<map>.txt` calibration file per map.
#[derive(Debug, Clone)]
pub struct RadarDirectory {
    root: PathBuf,
}

impl RadarDirectory {
    pub fn new<P>(root: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load(&self, map: &str) -> Result<RadarData, HeatmapError> {
        let path = self.root.join(format!("{}.txt", map));
        let content = std::fs::read_to_string(&path)
            .map_err(|source| HeatmapError::Read { path, source })?;

        RadarData::parse(map, &content)
    }
}

/// Collects the positions of one player and buckets them into cells.
#[derive(Debug, Clone, Default)]
pub struct HeatmapAccumulator {
    points: Vec<Position>,
}

impl HeatmapAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, x: f32, y: f32) {
        self.points.push(Position { x, y });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn extend(&mut self, other: HeatmapAccumulator) {
        self.points.extend(other.points);
    }

    /// Loads the calibration for `map` and buckets all collected points.
    pub fn save(&self, radars: &RadarDirectory, map: &str) -> Result<Vec<HeatmapCell>, HeatmapError> {
        let radar = radars.load(map)?;
        Ok(self.bucket(&Config::default(), &radar))
    }

    pub fn bucket(&self, config: &Config, radar: &RadarData) -> Vec<HeatmapCell> {
        let mut cells = BTreeMap::<(i64, i64), u32>::new();

        for pos in self.points.iter().copied() {
            let radar_pos = radar.to_radar(pos);

            let x_cell = (radar_pos.x / config.cell_size).floor() as i64;
            let y_cell = (radar_pos.y / config.cell_size).floor() as i64;

            tracing::trace!("Coord (X, Y): {:?} -> {:?}", (pos.x, pos.y), (x_cell, y_cell));

            *cells.entry((x_cell, y_cell)).or_default() += 1;
        }

        let size = config.cell_size as f64;
        cells
            .into_iter()
            .map(|((x, y), value)| HeatmapCell {
                x: (x as f64 * size) as i64,
                y: (y as f64 * size) as i64,
                value,
            })
            .collect()
    }
}
