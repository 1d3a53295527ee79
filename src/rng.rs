use rand::Rng;

/// Picks one entry from an ordered weight table, proportionally to weight.
///
/// Draws a uniform value in `[0, total)` and returns the first entry whose
/// cumulative weight exceeds it, walking the table in order. Entries with
/// zero weight can never be selected. The table must contain at least one
/// positive weight; an all-zero table is a caller bug.
pub fn weighted_choice<'a, T>(rng: &mut impl Rng, table: &'a [(T, f64)]) -> &'a T {
    let total: f64 = table.iter().map(|(_, weight)| weight).sum();
    debug_assert!(total > 0.0, "weighted_choice over an all-zero table");

    let mut selection = rng.random_range(0.0..total);
    for (outcome, weight) in table {
        if selection < *weight {
            return outcome;
        }
        selection -= weight;
    }
    // Floating-point slack can push the draw past the last band.
    &table
        .iter()
        .rfind(|(_, weight)| *weight > 0.0)
        .expect("weighted_choice table has no positive weight")
        .0
}
