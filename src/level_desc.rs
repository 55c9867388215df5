//! Serializable level descriptions and the built-in level catalog
//!
//! A level is plain JSON: spawn points, sensors, aggregators and the wiring
//! between them. `LevelDesc::build` turns one into a ready-to-run `Level`.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::sim::{
    Aggregator, AggregatorId, Body, EntityId, FinishPoint, Goal, Level, MovingPlatform, PingPong,
    Sensor, SensorId, SensorKind, Switch, SwitchKind, TagFilter, Trigger, Wire,
};
use crate::tuning::Tuning;

/// Sensor behavior as written in a level file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorKindDesc {
    Trigger {
        #[serde(default)]
        filter: TagFilter,
        #[serde(default)]
        on_contact: bool,
    },
    Switch {
        #[serde(default)]
        kind: SwitchKind,
    },
    Goal,
    Finish {
        #[serde(default)]
        next_level: Option<String>,
    },
    Platform {
        #[serde(default = "default_half_height")]
        half_height: f32,
        #[serde(default)]
        path: Option<PathDesc>,
    },
}

/// Back-and-forth path of a moving platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDesc {
    pub to: Vec3,
    pub speed: f32,
}

fn default_half_height() -> f32 {
    0.25
}

fn default_radius() -> f32 {
    1.0
}

fn default_floor() -> Vec2 {
    Vec2::new(20.0, 20.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDesc {
    pub id: SensorId,
    pub position: Vec3,
    #[serde(default = "default_radius")]
    pub radius: f32,
    pub kind: SensorKindDesc,
}

impl SensorDesc {
    fn build(&self) -> Sensor {
        let kind = match &self.kind {
            SensorKindDesc::Trigger { filter, on_contact } => SensorKind::Trigger(Trigger {
                filter: *filter,
                on_contact: *on_contact,
            }),
            SensorKindDesc::Switch { kind } => SensorKind::Switch(Switch::new(*kind)),
            SensorKindDesc::Goal => SensorKind::Goal(Goal::new(self.position)),
            SensorKindDesc::Finish { next_level } => SensorKind::Finish(FinishPoint::new(next_level.clone())),
            SensorKindDesc::Platform { half_height, path } => {
                let path = path
                    .as_ref()
                    .map(|p| PingPong::new(self.position, p.to, p.speed));
                SensorKind::Platform(MovingPlatform::new(self.position, *half_height, path))
            }
        };
        Sensor {
            id: self.id,
            position: self.position,
            radius: self.radius,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorDesc {
    pub id: AggregatorId,
    /// Defaults to the tuning's aggregator target
    #[serde(default)]
    pub target: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDesc {
    /// Scene name, e.g. `Level_1`
    pub name: String,
    /// Preview image shown on the level-select button
    #[serde(default)]
    pub preview: String,
    /// Initial camera yaw (degrees)
    #[serde(default)]
    pub camera_yaw: f32,
    /// Player spawn points; ids are assigned 1..=n in order
    pub players: Vec<Vec3>,
    /// Ball spawn points; ids continue after the players
    #[serde(default)]
    pub balls: Vec<Vec3>,
    #[serde(default)]
    pub sensors: Vec<SensorDesc>,
    #[serde(default)]
    pub aggregators: Vec<AggregatorDesc>,
    #[serde(default)]
    pub wires: Vec<Wire>,
    /// Half-size of the headless floor
    #[serde(default = "default_floor")]
    pub floor_half_extent: Vec2,
}

impl LevelDesc {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Spawn everything into a fresh level. The level is not started.
    pub fn build(&self, tuning: &Tuning) -> Result<Level> {
        let centroid = if self.players.is_empty() {
            Vec3::ZERO
        } else {
            self.players.iter().copied().sum::<Vec3>() / self.players.len() as f32
        };
        let mut level = Level::new(self.name.clone(), tuning.clone(), centroid, self.camera_yaw);

        let mut next_id = 1u32;
        for &spawn in &self.players {
            level.add_player(Body::player(EntityId(next_id), spawn))?;
            next_id += 1;
        }
        for &spawn in &self.balls {
            level.add_prop(Body::ball(EntityId(next_id), spawn))?;
            next_id += 1;
        }
        for sensor in &self.sensors {
            level.add_sensor(sensor.build())?;
        }
        for agg in &self.aggregators {
            let target = agg.target.unwrap_or(tuning.aggregator_target);
            level.add_aggregator(agg.id, Aggregator::new(target))?;
        }
        for wire in &self.wires {
            level.add_wire(wire.clone())?;
        }
        log::debug!(
            "Built '{}': {} bodies, {} sensors, {} wires",
            self.name,
            next_id - 1,
            self.sensors.len(),
            self.wires.len()
        );
        Ok(level)
    }
}

/// Ordered list of playable levels; index `i` is `Level_{i+1}`
#[derive(Debug, Clone, Default)]
pub struct LevelCatalog {
    levels: Vec<LevelDesc>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<LevelDesc>) -> Self {
        Self { levels }
    }

    /// Levels shipped with the crate
    pub fn builtin() -> Result<Self> {
        let levels = [
            include_str!("../levels/level_1.json"),
            include_str!("../levels/level_2.json"),
        ]
        .into_iter()
        .map(LevelDesc::from_json)
        .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(levels))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, name: &str) -> Result<&LevelDesc> {
        self.levels
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| GameError::UnknownLevel(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().map(|l| l.name.as_str())
    }

    /// Preview images in level-select order
    pub fn previews(&self) -> Vec<String> {
        self.levels.iter().map(|l| l.preview.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Signal, SignalSource, WireTarget};

    #[test]
    fn test_builtin_catalog_builds() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Level_1", "Level_2"]);
        for name in ["Level_1", "Level_2"] {
            let level = catalog.get(name).unwrap().build(&Tuning::default()).unwrap();
            assert!(!level.roster().is_empty());
            assert!(level.finish_position().is_some());
        }
    }

    #[test]
    fn test_next_level_comes_from_finish() {
        let catalog = LevelCatalog::builtin().unwrap();
        let level = catalog.get("Level_1").unwrap().build(&Tuning::default()).unwrap();
        assert_eq!(level.session().next_level(), Some("Level_2"));
        let last = catalog.get("Level_2").unwrap().build(&Tuning::default()).unwrap();
        assert_eq!(last.session().next_level(), None);
    }

    #[test]
    fn test_unknown_level() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert!(matches!(catalog.get("Level_9"), Err(GameError::UnknownLevel(_))));
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let desc = LevelDesc::from_json(
            r#"{
                "name": "Level_7",
                "players": [[0, 0.5, 0], [2, 0.5, 0]],
                "balls": [[0, 0.5, 4]],
                "sensors": [{ "id": 1, "position": [0, 0, 4], "kind": { "type": "goal" } }],
                "aggregators": [{ "id": 1 }],
                "wires": [{ "from": { "Sensor": 1 }, "signal": "Scored", "to": { "Aggregator": 1 } }]
            }"#,
        )
        .unwrap();
        assert_eq!(desc.floor_half_extent, Vec2::new(20.0, 20.0));
        assert_eq!(desc.sensors[0].radius, 1.0);
        assert_eq!(
            desc.wires[0],
            Wire {
                from: SignalSource::Sensor(SensorId(1)),
                signal: Signal::Scored,
                to: WireTarget::Aggregator(AggregatorId(1)),
            }
        );

        let level = desc.build(&Tuning::default()).unwrap();
        assert_eq!(level.aggregator(AggregatorId(1)).unwrap().target, 3);
        // Ball ids follow the players
        assert!(level.body(EntityId(3)).is_some());
        assert!(!level.roster().contains(EntityId(3)));
    }

    #[test]
    fn test_bad_wire_rejected() {
        let desc = LevelDesc::from_json(
            r#"{
                "name": "Level_7",
                "players": [],
                "wires": [{ "from": { "Sensor": 4 }, "signal": "Fired", "to": { "Hook": "open_gate" } }]
            }"#,
        )
        .unwrap();
        assert!(matches!(desc.build(&Tuning::default()), Err(GameError::UnknownSensor(SensorId(4)))));
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(LevelDesc::from_json("{ nope"), Err(GameError::Json(_))));
    }
}
