//! Random height draw shared by every skip-list variant

use rand::Rng;

/// Draws a node height in `[0, max_height)` from a geometric distribution
///
/// A fair coin is flipped per level; every head promotes the node one level,
/// capped below `max_height`. The generator is thread-local and seeded from
/// system entropy at thread start.
pub(crate) fn random_height(max_height: usize) -> usize {
    debug_assert!(max_height > 0);

    let mut rng = rand::thread_rng();
    let mut height = 0;
    while height < max_height - 1 && rng.gen_bool(0.5) {
        height += 1;
    }
    height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_stays_below_maximum() {
        for _ in 0..10_000 {
            assert!(random_height(16) < 16);
        }
    }

    #[test]
    fn test_height_is_zero_for_single_level() {
        for _ in 0..100 {
            assert_eq!(random_height(1), 0);
        }
    }

    #[test]
    fn test_height_zero_has_roughly_half_probability() {
        let draws = 10_000;
        let zeroes = (0..draws).filter(|_| random_height(16) == 0).count();

        // 4 sigma around p = 1/2
        assert!(zeroes > 4 * draws / 10, "too few zero heights: {zeroes}");
        assert!(zeroes < 6 * draws / 10, "too many zero heights: {zeroes}");
    }
}
