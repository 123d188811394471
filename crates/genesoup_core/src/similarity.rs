//! Genome similarity and its bounded memo.
//!
//! Similarity is the Sørensen–Dice coefficient over character bigrams of two
//! genetic strings. Scores are cached per unordered pair; the cache never
//! holds more than `capacity` entries and drops its older half on overflow.

use std::collections::HashMap;

/// Dice coefficient of the bigram multisets of `a` and `b`, in `[0, 1]`.
#[must_use]
pub fn dice_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut bigrams: HashMap<[u8; 2], usize> = HashMap::new();
    for pair in a.windows(2) {
        *bigrams.entry([pair[0], pair[1]]).or_insert(0) += 1;
    }
    let mut shared = 0usize;
    for pair in b.windows(2) {
        if let Some(count) = bigrams.get_mut(&[pair[0], pair[1]]) {
            if *count > 0 {
                *count -= 1;
                shared += 1;
            }
        }
    }
    (2.0 * shared as f64) / ((a.len() - 1) + (b.len() - 1)) as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CacheEntry {
    ordinal: u64,
    score: f64,
}

/// Unordered pair key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey(String, String);

impl PairKey {
    #[must_use]
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimilarityCache {
    entries: HashMap<PairKey, CacheEntry>,
    next_ordinal: u64,
    capacity: usize,
}

impl Default for SimilarityCache {
    fn default() -> Self {
        Self::new(1_000)
    }
}

impl SimilarityCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            next_ordinal: 0,
            capacity: capacity.max(2),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn get(&self, key: &PairKey) -> Option<f64> {
        self.entries.get(key).map(|e| e.score)
    }

    /// Insertion ordinal of `key`, 1-based after the last compaction.
    #[must_use]
    pub fn ordinal(&self, key: &PairKey) -> Option<u64> {
        self.entries.get(key).map(|e| e.ordinal)
    }

    pub fn insert(&mut self, key: PairKey, score: f64) {
        self.next_ordinal += 1;
        self.entries.insert(
            key,
            CacheEntry {
                ordinal: self.next_ordinal,
                score,
            },
        );
        if self.entries.len() >= self.capacity {
            self.compact();
        }
    }

    /// Keeps the `capacity / 2` most recent entries and renumbers them from 1.
    fn compact(&mut self) {
        let keep = (self.capacity / 2) as u64;
        let mut ordinals: Vec<u64> = self.entries.values().map(|e| e.ordinal).collect();
        ordinals.sort_unstable();
        let cutoff = ordinals
            .len()
            .checked_sub(keep as usize + 1)
            .map_or(0, |i| ordinals[i]);
        self.entries.retain(|_, e| e.ordinal > cutoff);

        let mut survivors: Vec<&mut CacheEntry> = self.entries.values_mut().collect();
        survivors.sort_unstable_by_key(|e| e.ordinal);
        for (i, entry) in survivors.into_iter().enumerate() {
            entry.ordinal = i as u64 + 1;
        }
        self.next_ordinal = self.entries.len() as u64;
        tracing::debug!(kept = self.entries.len(), "Similarity cache compacted");
    }

    /// Cached similarity of two genetic strings.
    pub fn similarity(&mut self, a: &str, b: &str) -> f64 {
        let key = PairKey::new(a, b);
        if let Some(score) = self.get(&key) {
            return score;
        }
        let score = dice_similarity(a, b);
        self.insert(key, score);
        score
    }
}
