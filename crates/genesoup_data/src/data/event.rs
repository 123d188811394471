use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tagged union of all simulation events emitted during a tick.
///
/// Serialised with `#[serde(tag = "event")]` for streaming JSONL output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event")]
pub enum LiveEvent {
    /// A creature appeared, either spawned fresh or replicated from a parent.
    Birth {
        id: Uuid,
        parent_id: Option<Uuid>,
        gen: u32,
        tick: u64,
    },
    /// A creature starved.
    Death { id: Uuid, age: u64, tick: u64 },
    /// The child's program or traits differ from the parent's.
    Mutation {
        id: Uuid,
        operator: String,
        tick: u64,
    },
    Attack {
        attacker: Uuid,
        target: Uuid,
        tick: u64,
    },
    FoodEaten { creature: Uuid, food: Uuid, tick: u64 },
    /// Population dropped to zero.
    Extinction { tick: u64 },
}
