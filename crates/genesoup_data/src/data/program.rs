use super::gene::{Gene, CATALOG_LEN};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Construction-time defects of a program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    #[error("program length {len} outside [{min}, {max}]")]
    Length { len: usize, min: usize, max: usize },

    #[error("gene references unknown catalog entry {0}")]
    UnknownGene(usize),
}

/// An ordered gene sequence, looped by the interpreter.
///
/// The length invariant is checked once at construction, deserialization
/// included; the gene list is never exposed mutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProgramRepr", into = "ProgramRepr")]
pub struct Program {
    genes: Vec<Gene>,
}

/// Wire shape of [`Program`]; only reachable through `Program::new`.
#[derive(Serialize, Deserialize)]
struct ProgramRepr {
    genes: Vec<Gene>,
}

impl TryFrom<ProgramRepr> for Program {
    type Error = ProgramError;

    fn try_from(repr: ProgramRepr) -> Result<Self, Self::Error> {
        Program::new(repr.genes)
    }
}

impl From<Program> for ProgramRepr {
    fn from(program: Program) -> Self {
        Self {
            genes: program.genes,
        }
    }
}

impl Program {
    pub const MIN_LENGTH: usize = 15;
    pub const MAX_LENGTH: usize = 60;
    pub const DEFAULT_LENGTH: usize = 20;

    pub fn new(genes: Vec<Gene>) -> Result<Self, ProgramError> {
        let len = genes.len();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
            return Err(ProgramError::Length {
                len,
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }
        if let Some(bad) = genes
            .iter()
            .find(|g| g.index >= CATALOG_LEN || g.index != g.instruction.catalog_index())
        {
            return Err(ProgramError::UnknownGene(bad.index));
        }
        Ok(Self { genes })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Gene> {
        self.genes.get(index)
    }

    #[must_use]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Concatenated gene codes, e.g. `"AABNO..."`.
    #[must_use]
    pub fn genetic_string(&self) -> String {
        self.genes.iter().map(Gene::code).collect()
    }

    #[must_use]
    pub fn into_genes(self) -> Vec<Gene> {
        self.genes
    }
}
