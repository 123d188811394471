use genesoup_data::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hue in degrees, saturation and lightness in percent.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    /// Body fill fades towards black as the creature starves.
    #[must_use]
    pub fn fill(hue: f64, hunger: f64) -> Self {
        Self {
            h: hue,
            s: 100.0 * hunger,
            l: 50.0 * hunger,
        }
    }

    #[must_use]
    pub fn stroke(hue: f64) -> Self {
        Self {
            h: hue,
            s: 100.0,
            l: 50.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreatureSnapshot {
    pub id: Uuid,
    pub position: Vec2,
    pub radius: f64,
    pub fill: Hsl,
    pub stroke: Hsl,
    pub hunger: f64,
    pub mass: f64,
    pub generation: u32,
    pub genetic: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FoodSnapshot {
    pub id: Uuid,
    pub position: Vec2,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct LaserSnapshot {
    pub from: Vec2,
    pub to: Vec2,
}

/// Render frame: everything a drawer needs, detached from the simulation.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub width: f64,
    pub height: f64,
    pub creatures: Vec<CreatureSnapshot>,
    pub food: Vec<FoodSnapshot>,
    pub lasers: Vec<LaserSnapshot>,
}
