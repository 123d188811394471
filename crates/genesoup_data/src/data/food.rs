use super::geometry::{BodyHandle, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A passive food pellet, consumed whole on contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: Uuid,
    pub body: BodyHandle,
    pub position: Vec2,
}

impl Food {
    pub const RADIUS: f64 = 3.0;
}
