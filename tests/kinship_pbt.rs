use genesoup_lib::model::kinship::{genetic_hue, hue_distance, is_kin, is_similar_kin};
use genesoup_lib::model::similarity::{dice_similarity, SimilarityCache};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_hue_in_range(genetic in "[A-P]{15,60}") {
        let hue = genetic_hue(&genetic);
        prop_assert!((0.0..360.0).contains(&hue));
    }

    #[test]
    fn test_hue_distance_symmetric_and_bounded(a in 0.0f64..360.0, b in 0.0f64..360.0) {
        let d = hue_distance(a, b);
        prop_assert!((0.0..=0.5).contains(&d));
        prop_assert_eq!(d, hue_distance(b, a));
    }

    #[test]
    fn test_kinship_symmetric(
        ha in 0.0f64..360.0,
        hb in 0.0f64..360.0,
        ta in 0.0f64..=1.0,
        tb in 0.0f64..=1.0,
    ) {
        prop_assert_eq!(is_kin((ha, ta), (hb, tb)), is_kin((hb, tb), (ha, ta)));
    }

    #[test]
    fn test_similarity_symmetric(a in "[A-P]{15,60}", b in "[A-P]{15,60}") {
        let forward = dice_similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&forward));
        prop_assert!((forward - dice_similarity(&b, &a)).abs() < 1e-12);
        prop_assert_eq!(is_similar_kin(forward, 0.5, 0.9), is_similar_kin(forward, 0.9, 0.5));
    }

    #[test]
    fn test_cache_stays_bounded(capacity in 2usize..64, pairs in prop::collection::vec(("[A-D]{4}", "[A-D]{4}"), 1..200)) {
        let mut cache = SimilarityCache::new(capacity);
        for (a, b) in &pairs {
            let cached = cache.similarity(a, b);
            prop_assert_eq!(cached, dice_similarity(a, b));
            prop_assert!(cache.len() < capacity);
        }
    }
}

#[test]
fn test_identical_hues_are_kin_at_any_threshold() {
    assert!(is_kin((42.0, 1.0), (42.0, 1.0)));
    assert!(!is_kin((0.0, 0.75), (120.0, 0.0)));
}
