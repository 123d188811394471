/// Asserts that the live population matches the expected value.
#[macro_export]
macro_rules! assert_population {
    ($sim:expr, $count:expr) => {
        assert_eq!($sim.population(), $count, "Population count mismatch");
    };
}

/// Asserts that a creature with the given id is no longer alive.
#[macro_export]
macro_rules! assert_creature_dead {
    ($sim:expr, $id:expr) => {
        assert!(
            $sim.get_creature($id).is_none(),
            "Creature {} should be dead but was found alive",
            $id
        );
    };
}

/// Asserts the hunger and mass bounds for every live creature.
#[macro_export]
macro_rules! assert_economy_bounds {
    ($sim:expr) => {
        for c in $sim.creatures_sorted() {
            assert!(
                (0.0..=1.0).contains(&c.hunger),
                "Creature {} hunger {} out of [0, 1]",
                c.id,
                c.hunger
            );
            assert!(c.mass >= 100.0, "Creature {} mass {} below 100", c.id, c.mass);
        }
    };
}
