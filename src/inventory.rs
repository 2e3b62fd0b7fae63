//! Inventory - dynamic-programming routines over item collections.

/// Modulus for [`count_string_possibilities`]
pub const MODULUS: u64 = 1_000_000_007;

/// Minimum difference between the sums of a two-way split of `values`.
///
/// Subset-sum DP: find the reachable sum closest to (but not above) half
/// the total; the other group takes the rest.
///
/// # Complexity
/// O(n * total) time, O(total) space
pub fn optimize_loot_split(values: &[u32]) -> u64 {
    let total: u64 = values.iter().map(|&value| u64::from(value)).sum();
    let half = (total / 2) as usize;

    // reachable[s]: some subset sums to exactly s
    let mut reachable = vec![false; half + 1];
    reachable[0] = true;

    for &value in values {
        let value = value as usize;
        if value > half {
            continue;
        }
        // Backwards so each value is used at most once
        for sum in (value..=half).rev() {
            if reachable[sum - value] {
                reachable[sum] = true;
            }
        }
    }

    let best = (0..=half).rev().find(|&sum| reachable[sum]).unwrap_or(0) as u64;
    total - 2 * best
}

/// Best total value of `(weight, value)` items fitting in `capacity`,
/// each item taken at most once (0/1 knapsack).
///
/// # Complexity
/// O(n * capacity) time, O(capacity) space
pub fn maximize_carry_value(capacity: u32, items: &[(u32, u64)]) -> u64 {
    let capacity = capacity as usize;
    let mut best = vec![0u64; capacity + 1];

    for &(weight, value) in items {
        let weight = weight as usize;
        if weight > capacity {
            continue;
        }
        for room in (weight..=capacity).rev() {
            best[room] = best[room].max(best[room - weight] + value);
        }
    }

    best[capacity]
}

/// Number of ways to read `s` when each "uu" or "nn" pair may also stand for
/// a single merged letter, modulo [`MODULUS`].
///
/// Any other character is always a valid singleton, so it neither adds
/// nor removes readings.
pub fn count_string_possibilities(s: &str) -> u64 {
    // Readings of the prefix ending two characters back, and one back
    let mut two_back = 1u64;
    let mut one_back = 1u64;
    let mut prev = None;

    for c in s.chars() {
        let mut ways = one_back;
        if prev == Some(c) && matches!(c, 'u' | 'n') {
            ways = (ways + two_back) % MODULUS;
        }
        two_back = one_back;
        one_back = ways;
        prev = Some(c);
    }

    one_back
}
