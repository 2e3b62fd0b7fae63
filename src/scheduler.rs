//! Scheduler - task ordering under a cooldown.

use rustc_hash::FxHashMap;

/// Fewest intervals needed to run every task when two runs of the same task
/// must be separated by at least `cooldown` other intervals (tasks or idle).
///
/// The most frequent tasks fix the frame: `max_freq - 1` full blocks of
/// `cooldown + 1` slots, plus one slot per task sharing the top frequency.
/// When the other tasks overflow the idle slots, no idling is needed at all.
///
/// # Complexity
/// O(n) time, O(distinct tasks) space
pub fn min_intervals(tasks: &[char], cooldown: usize) -> usize {
    if tasks.is_empty() {
        return 0;
    }

    let mut counts: FxHashMap<char, usize> = FxHashMap::default();
    for &task in tasks {
        *counts.entry(task).or_insert(0) += 1;
    }

    let max_freq = counts.values().copied().max().unwrap_or(0);
    let at_max = counts.values().filter(|&&count| count == max_freq).count();

    let framed = (max_freq - 1) * (cooldown + 1) + at_max;
    framed.max(tasks.len())
}
