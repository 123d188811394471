//! Hue-derived kinship.
//!
//! A creature's hue is computed once at birth from its genetic string. Two
//! creatures are kin when their hues are close on the colour wheel.

/// Maps a genetic string onto a hue in `[0, 360)`.
///
/// Adjacent character pairs are binned into three channels by
/// `(a + b) mod 3`; the normalized channel counts are read as RGB and
/// converted to a hue in whole degrees.
#[must_use]
pub fn genetic_hue(genetic: &str) -> f64 {
    let bytes = genetic.as_bytes();
    let mut channels = [0u32; 3];
    for pair in bytes.windows(2) {
        let bucket = (u32::from(pair[0]) + u32::from(pair[1])) % 3;
        channels[bucket as usize] += 1;
    }
    let max = channels.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return 0.0;
    }
    let max = f64::from(max);
    let [r, g, b] = channels.map(|c| f64::from(c) / max);

    let cmin = r.min(g).min(b);
    let cmax = r.max(g).max(b);
    let delta = cmax - cmin;
    let h = if delta == 0.0 {
        0.0
    } else if cmax == r {
        ((g - b) / delta) % 6.0
    } else if cmax == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    // round half up, then wrap negatives
    let mut hue = (h * 60.0 + 0.5).floor();
    if hue < 0.0 {
        hue += 360.0;
    }
    hue
}

/// Circular distance between two hues as a fraction of the full wheel, in
/// `[0, 0.5]`.
#[must_use]
pub fn hue_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    diff.min(360.0 - diff) / 360.0
}

/// Kin test between two creatures described by `(hue, family_threshold)`.
///
/// The stricter of the two thresholds applies, so the relation is symmetric.
#[must_use]
pub fn is_kin(a: (f64, f64), b: (f64, f64)) -> bool {
    let threshold = a.1.max(b.1);
    hue_distance(a.0, b.0) <= 1.0 - threshold
}

/// Kin test on genome similarity, again under the stricter threshold.
#[must_use]
pub fn is_similar_kin(similarity: f64, threshold_a: f64, threshold_b: f64) -> bool {
    similarity >= threshold_a.max(threshold_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_in_range() {
        for s in ["AB", "ABCDEFGHIJKLMNOP", "PPPPPPPPPPPPPPP", "NOAKDDDAAB"] {
            let h = genetic_hue(s);
            assert!((0.0..360.0).contains(&h), "{s} -> {h}");
            assert_eq!(h, h.round());
        }
    }

    #[test]
    fn test_uniform_string_is_green() {
        // 'P' + 'P' = 160, 160 % 3 = 1: every pair lands in the green bucket
        assert_eq!(genetic_hue("PPPP"), 120.0);
    }

    #[test]
    fn test_short_string_is_zero() {
        assert_eq!(genetic_hue("A"), 0.0);
        assert_eq!(genetic_hue(""), 0.0);
    }

    #[test]
    fn test_hue_distance_wraps() {
        assert!((hue_distance(350.0, 10.0) - 20.0 / 360.0).abs() < 1e-12);
        assert!((hue_distance(0.0, 180.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_kin_uses_stricter_threshold() {
        // 36 degrees apart = 0.1 of the wheel
        let a = (0.0, 0.95);
        let b = (36.0, 0.5);
        assert!(!is_kin(a, b));
        assert!(!is_kin(b, a));
        assert!(is_kin((0.0, 0.5), (36.0, 0.85)));
    }

    #[test]
    fn test_similarity_kin_symmetric() {
        assert!(is_similar_kin(0.8, 0.75, 0.5));
        assert!(!is_similar_kin(0.8, 0.5, 0.9));
        assert!(!is_similar_kin(0.8, 0.9, 0.5));
    }
}
