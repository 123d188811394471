use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of entries in the gene catalog.
pub const CATALOG_LEN: usize = 16;

/// One instruction kind together with the constants memorized when the gene
/// was built. Jump targets are program indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Push along the facing angle with a fixed power.
    Move { power: f64 },
    /// Face a fresh random direction every time.
    TurnRandom,
    /// Face the direction drawn when the gene was built.
    TurnFixed { direction: f64 },
    TurnToFood,
    TurnToKin,
    TurnFromKin,
    TurnToStranger,
    TurnFromStranger,
    JumpIfKin { to: usize },
    JumpIfStranger { to: usize },
    JumpIfFood { to: usize },
    /// Jump when hunger drops below `threshold`.
    JumpIfHungry { threshold: f64, to: usize },
    /// Jump when mass exceeds `threshold`.
    JumpIfLarge { threshold: f64, to: usize },
    Attack,
    Replicate,
    Wait,
}

impl Instruction {
    /// Catalog position of this instruction kind.
    #[must_use]
    pub fn catalog_index(&self) -> usize {
        match self {
            Instruction::Move { .. } => 0,
            Instruction::TurnRandom => 1,
            Instruction::TurnFixed { .. } => 2,
            Instruction::TurnToFood => 3,
            Instruction::TurnToKin => 4,
            Instruction::TurnFromKin => 5,
            Instruction::TurnToStranger => 6,
            Instruction::TurnFromStranger => 7,
            Instruction::JumpIfKin { .. } => 8,
            Instruction::JumpIfStranger { .. } => 9,
            Instruction::JumpIfFood { .. } => 10,
            Instruction::JumpIfHungry { .. } => 11,
            Instruction::JumpIfLarge { .. } => 12,
            Instruction::Attack => 13,
            Instruction::Replicate => 14,
            Instruction::Wait => 15,
        }
    }

    #[must_use]
    pub fn jump_target(&self) -> Option<usize> {
        match *self {
            Instruction::JumpIfKin { to }
            | Instruction::JumpIfStranger { to }
            | Instruction::JumpIfFood { to }
            | Instruction::JumpIfHungry { to, .. }
            | Instruction::JumpIfLarge { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Rewrites the jump target. No-op for instructions without one.
    pub fn set_jump_target(&mut self, target: usize) {
        match self {
            Instruction::JumpIfKin { to }
            | Instruction::JumpIfStranger { to }
            | Instruction::JumpIfFood { to }
            | Instruction::JumpIfHungry { to, .. }
            | Instruction::JumpIfLarge { to, .. } => *to = target,
            _ => {}
        }
    }
}

/// A gene instance inside a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Stable identity, used to repair jumps across structural mutations.
    pub id: Uuid,
    pub index: usize,
    /// Ticks the creature stays busy after running this gene.
    pub time_cost: u32,
    pub instruction: Instruction,
}

impl Gene {
    /// Single-letter code used in the program's genetic string.
    #[must_use]
    pub fn code(&self) -> char {
        // index is bounded by CATALOG_LEN, well inside the ASCII range
        char::from(b'A' + (self.index % CATALOG_LEN) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_target_roundtrip() {
        let mut ins = Instruction::JumpIfHungry {
            threshold: 0.4,
            to: 3,
        };
        assert_eq!(ins.jump_target(), Some(3));
        ins.set_jump_target(11);
        assert_eq!(ins.jump_target(), Some(11));
        if let Instruction::JumpIfHungry { threshold, .. } = ins {
            assert_eq!(threshold, 0.4);
        }
    }

    #[test]
    fn test_non_jump_ignores_target() {
        let mut ins = Instruction::Wait;
        ins.set_jump_target(4);
        assert_eq!(ins.jump_target(), None);
    }

    #[test]
    fn test_code_letters() {
        let gene = Gene {
            id: Uuid::nil(),
            index: 13,
            time_cost: 50,
            instruction: Instruction::Attack,
        };
        assert_eq!(gene.code(), 'N');
    }
}
