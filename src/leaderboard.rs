//! Leaderboard - a score-ordered skip list.
//!
//! Entries are ordered by score (descending), ties broken by player id
//! (ascending). Nodes live in an [`Arena`] and link to each other by index;
//! a sentinel head node spans every level.
//!
//! ```text
//! level 2: HEAD ----------------------> [9:300] -------------------> NULL
//! level 1: HEAD ----------> [4:500] --> [9:300] --------> [2:120] -> NULL
//! level 0: HEAD -> [1:500] -> [4:500] -> [9:300] -> [3:150] -> [2:120] -> NULL
//! ```
//!
//! Level sampling uses a per-instance random generator, so a board built
//! with [`Leaderboard::with_seed`] has a reproducible shape.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use arrayvec::ArrayVec;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::arena::{Arena, ArenaIndex, NULL_INDEX};
use crate::error::InvariantViolation;

/// Highest level a node can reach
pub const MAX_LEVEL: usize = 16;

/// Number of levels spanned by the head sentinel (levels `0..=MAX_LEVEL`)
pub const LEVEL_COUNT: usize = MAX_LEVEL + 1;

/// Chance that a node is promoted one more level
pub const PROMOTE_PROBABILITY: f64 = 0.5;

pub type PlayerId = i64;
pub type Score = i64;

/// A player's standing on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub score: Score,
}

impl LeaderboardEntry {
    /// Returns true if `self` ranks strictly ahead of `other`:
    /// higher score first, lower id first on equal scores.
    #[inline]
    pub fn ranks_before(&self, other: &LeaderboardEntry) -> bool {
        self.score > other.score || (self.score == other.score && self.player_id < other.player_id)
    }
}

struct SkipNode {
    entry: LeaderboardEntry,
    /// One forward link per level the node occupies (`0..=level`)
    forward: ArrayVec<ArenaIndex, LEVEL_COUNT>,
}

impl SkipNode {
    fn new(entry: LeaderboardEntry, level: usize) -> Self {
        Self {
            entry,
            forward: (0..=level).map(|_| NULL_INDEX).collect(),
        }
    }

    #[inline]
    fn level(&self) -> usize {
        self.forward.len() - 1
    }
}

/// Score-ordered skip list with cumulative scoring.
///
/// The generic parameter is the coin-flip source used for level sampling.
pub struct Leaderboard<R = ChaCha8Rng> {
    nodes: Arena<SkipNode>,
    /// Sentinel spanning all levels; its entry is never compared
    head: ArenaIndex,
    /// player_id -> node, replaces a linear scan of level 0
    index: FxHashMap<PlayerId, ArenaIndex>,
    rng: R,
}

impl Leaderboard<ChaCha8Rng> {
    /// Create an empty board with an entropy-seeded generator.
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    /// Create an empty board whose level sampling is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for Leaderboard<ChaCha8Rng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> Leaderboard<R> {
    /// Create an empty board drawing levels from `rng`.
    pub fn with_rng(rng: R) -> Self {
        let mut nodes = Arena::new();
        let sentinel = LeaderboardEntry {
            player_id: PlayerId::MIN,
            score: Score::MIN,
        };
        let head = nodes.alloc(SkipNode::new(sentinel, MAX_LEVEL));

        Self {
            nodes,
            head,
            index: FxHashMap::default(),
            rng,
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Add `delta` to a player's score, creating the player if absent.
    ///
    /// The player's position depends on the score, so an existing node is
    /// unlinked and a fresh one is spliced in at a newly sampled level.
    pub fn add_score(&mut self, player_id: PlayerId, delta: Score) {
        let score = match self.index.get(&player_id).copied() {
            Some(existing) => self.unlink(existing).score.saturating_add(delta),
            None => delta,
        };

        self.link(LeaderboardEntry { player_id, score });
    }

    /// Remove a player from the board.
    ///
    /// Returns the removed entry, or `None` (and does nothing) if the
    /// player is not on the board.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Option<LeaderboardEntry> {
        let node = self.index.get(&player_id).copied()?;
        Some(self.unlink(node))
    }

    /// Remove every player. The generator state is kept.
    pub fn clear(&mut self) {
        let head = self.nodes.get_mut(self.head);
        head.forward.iter_mut().for_each(|link| *link = NULL_INDEX);

        // Free everything except the sentinel
        let live: Vec<ArenaIndex> = self.index.drain().map(|(_, node)| node).collect();
        for node in live {
            self.nodes.free(node);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Ids of the best `n` players, best first.
    ///
    /// Shorter than `n` when fewer players exist; empty when `n == 0`.
    pub fn top_n(&self, n: usize) -> Vec<PlayerId> {
        self.iter().take(n).map(|entry| entry.player_id).collect()
    }

    /// Current score of a player.
    #[inline]
    pub fn score(&self, player_id: PlayerId) -> Option<Score> {
        self.index
            .get(&player_id)
            .map(|&node| self.nodes.get(node).entry.score)
    }

    #[inline]
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.index.contains_key(&player_id)
    }

    /// Zero-based position of a player in the ranking.
    ///
    /// # Complexity
    /// O(n) - walks level 0 up to the player
    pub fn rank(&self, player_id: PlayerId) -> Option<usize> {
        if !self.contains(player_id) {
            return None;
        }
        self.iter().position(|entry| entry.player_id == player_id)
    }

    /// Number of players on the board.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate over all entries, best first.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            cursor: self.nodes.get(self.head).forward[0],
            remaining: self.len(),
        }
    }

    /// Number of levels a player's node occupies above level 0.
    pub fn level_of(&self, player_id: PlayerId) -> Option<usize> {
        self.index
            .get(&player_id)
            .map(|&node| self.nodes.get(node).level())
    }

    /// Hash of every `(id, score, level)` in ranking order.
    ///
    /// Two boards hash equal only if they hold the same entries with the
    /// same node levels, which makes seeded runs comparable.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.len().hash(&mut hasher);

        let mut cursor = self.nodes.get(self.head).forward[0];
        while cursor != NULL_INDEX {
            let node = self.nodes.get(cursor);
            node.entry.hash(&mut hasher);
            node.level().hash(&mut hasher);
            cursor = node.forward[0];
        }

        hasher.finish()
    }

    /// Check every structural invariant.
    ///
    /// - each level is strictly ordered
    /// - level `l` holds exactly the nodes whose level is at least `l`
    /// - the id index covers exactly the nodes on level 0
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut expected = [0usize; LEVEL_COUNT];
        let mut linked = 0;

        let mut cursor = self.nodes.get(self.head).forward[0];
        while cursor != NULL_INDEX {
            let node = self.nodes.get(cursor);
            if self.index.get(&node.entry.player_id) != Some(&cursor) {
                return Err(InvariantViolation::IndexMismatch {
                    indexed: self.index.len(),
                    linked: linked + 1,
                });
            }
            for count in expected.iter_mut().take(node.level() + 1) {
                *count += 1;
            }
            linked += 1;
            cursor = node.forward[0];
        }

        if linked != self.index.len() {
            return Err(InvariantViolation::IndexMismatch {
                indexed: self.index.len(),
                linked,
            });
        }

        for (level, &expected) in expected.iter().enumerate() {
            let mut found = 0;
            let mut prev: Option<&LeaderboardEntry> = None;
            let mut cursor = self.nodes.get(self.head).forward[level];

            while cursor != NULL_INDEX {
                let node = self.nodes.get(cursor);
                if node.level() < level {
                    return Err(InvariantViolation::LevelCount {
                        level,
                        expected,
                        found: found + 1,
                    });
                }
                if let Some(prev) = prev {
                    if !prev.ranks_before(&node.entry) {
                        return Err(InvariantViolation::LevelMisordered {
                            level,
                            first: prev.player_id,
                            second: node.entry.player_id,
                        });
                    }
                }
                prev = Some(&node.entry);
                found += 1;
                cursor = node.forward[level];
            }

            if found != expected {
                return Err(InvariantViolation::LevelCount { level, expected, found });
            }
        }

        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Coin-flip level: 0, promoted with probability 0.5 per step, capped.
    fn random_level(&mut self) -> usize {
        let mut level = 0;
        while level < MAX_LEVEL && self.rng.gen_bool(PROMOTE_PROBABILITY) {
            level += 1;
        }
        level
    }

    /// True if `entry` belongs before the node at `next` (or `next` is the end).
    #[inline]
    fn goes_before(&self, entry: &LeaderboardEntry, next: ArenaIndex) -> bool {
        next == NULL_INDEX || entry.ranks_before(&self.nodes.get(next).entry)
    }

    /// For every level, the last node whose forward link must be rewired
    /// to reach `entry`'s position.
    ///
    /// When `target` is a live node the descent also stops on reaching it,
    /// so the splice points of that exact node are found.
    fn splice_points(&self, entry: &LeaderboardEntry, target: ArenaIndex) -> [ArenaIndex; LEVEL_COUNT] {
        let mut update = [self.head; LEVEL_COUNT];
        let mut cursor = self.head;

        for level in (0..LEVEL_COUNT).rev() {
            loop {
                let next = self.nodes.get(cursor).forward[level];
                if next == target || self.goes_before(entry, next) {
                    break;
                }
                cursor = next;
            }
            update[level] = cursor;
        }

        update
    }

    fn link(&mut self, entry: LeaderboardEntry) {
        let level = self.random_level();
        let update = self.splice_points(&entry, NULL_INDEX);
        let node = self.nodes.alloc(SkipNode::new(entry, level));

        for (lvl, &prev) in update.iter().enumerate().take(level + 1) {
            let next = self.nodes.get(prev).forward[lvl];
            self.nodes.get_mut(node).forward[lvl] = next;
            self.nodes.get_mut(prev).forward[lvl] = node;
        }

        self.index.insert(entry.player_id, node);
    }

    fn unlink(&mut self, node: ArenaIndex) -> LeaderboardEntry {
        let entry = self.nodes.get(node).entry;
        let update = self.splice_points(&entry, node);
        let level = self.nodes.get(node).level();

        for (lvl, &prev) in update.iter().enumerate().take(level + 1) {
            if self.nodes.get(prev).forward[lvl] == node {
                let next = self.nodes.get(node).forward[lvl];
                self.nodes.get_mut(prev).forward[lvl] = next;
            }
        }

        self.index.remove(&entry.player_id);
        self.nodes.free(node);
        entry
    }
}

/// Iterator over leaderboard entries in ranking order.
pub struct Iter<'a> {
    nodes: &'a Arena<SkipNode>,
    cursor: ArenaIndex,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = LeaderboardEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NULL_INDEX {
            return None;
        }
        let node = self.nodes.get(self.cursor);
        self.cursor = node.forward[0];
        self.remaining -= 1;
        Some(node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a, R: RngCore> IntoIterator for &'a Leaderboard<R> {
    type Item = LeaderboardEntry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn board() -> Leaderboard {
        Leaderboard::with_seed(7)
    }

    #[test]
    fn test_empty_board() {
        let lb = board();
        assert!(lb.is_empty());
        assert_eq!(lb.top_n(5), Vec::<PlayerId>::new());
        assert!(lb.validate().is_ok());
    }

    #[test]
    fn test_single_player() {
        let mut lb = board();
        lb.add_score(1, 100);
        assert_eq!(lb.top_n(1), vec![1]);
        assert_eq!(lb.score(1), Some(100));
    }

    #[test]
    fn test_higher_score_first() {
        let mut lb = board();
        lb.add_score(1, 100);
        lb.add_score(2, 200);
        assert_eq!(lb.top_n(1), vec![2]);

        lb.add_score(3, 150);
        assert_eq!(lb.top_n(3), vec![2, 3, 1]);
    }

    #[test]
    fn test_tie_break_by_ascending_id() {
        let mut lb = board();
        lb.add_score(5, 200);
        lb.add_score(2, 200);
        lb.add_score(9, 200);
        assert_eq!(lb.top_n(3), vec![2, 5, 9]);
    }

    #[test]
    fn test_mixed_scores_and_ties() {
        let mut lb = board();
        lb.add_score(3, 150);
        lb.add_score(1, 200);
        lb.add_score(2, 200);
        lb.add_score(5, 120);
        lb.add_score(4, 150);
        assert_eq!(lb.top_n(5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_scores_accumulate() {
        let mut lb = board();
        lb.add_score(1, 50);
        lb.add_score(2, 100);
        lb.add_score(1, 60);

        assert_eq!(lb.score(1), Some(110));
        assert_eq!(lb.top_n(2), vec![1, 2]);
        assert_eq!(lb.len(), 2);
    }

    #[test]
    fn test_negative_delta_moves_player_down() {
        let mut lb = board();
        lb.add_score(1, 100);
        lb.add_score(2, 90);
        lb.add_score(1, -20);
        assert_eq!(lb.top_n(2), vec![2, 1]);
        assert_eq!(lb.score(1), Some(80));
    }

    #[test]
    fn test_remove_player() {
        let mut lb = board();
        lb.add_score(1, 50);
        lb.add_score(2, 100);

        let removed = lb.remove_player(1);
        assert_eq!(removed, Some(LeaderboardEntry { player_id: 1, score: 50 }));
        assert_eq!(lb.top_n(2), vec![2]);

        // Second removal is a no-op
        assert_eq!(lb.remove_player(1), None);
        assert_eq!(lb.top_n(2), vec![2]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut lb = board();
        lb.add_score(10, 10);
        assert_eq!(lb.remove_player(9999), None);
        assert_eq!(lb.top_n(1), vec![10]);
    }

    #[test]
    fn test_top_n_zero_and_short() {
        let mut lb = board();
        for id in 1..=3 {
            lb.add_score(id, id * 10);
        }
        assert!(lb.top_n(0).is_empty());
        assert_eq!(lb.top_n(10), vec![3, 2, 1]);
    }

    #[test]
    fn test_add_remove_sequence() {
        let mut lb = board();
        lb.add_score(1, 100);
        lb.add_score(2, 100);
        lb.add_score(3, 90);
        lb.add_score(2, 50);
        lb.remove_player(1);
        assert_eq!(lb.top_n(3), vec![2, 3]);
        assert!(lb.validate().is_ok());
    }

    #[test]
    fn test_rank() {
        let mut lb = board();
        for id in 1..=8 {
            lb.add_score(id, id * 10);
        }
        assert_eq!(lb.rank(8), Some(0));
        assert_eq!(lb.rank(1), Some(7));
        assert_eq!(lb.rank(42), None);
    }

    #[test]
    fn test_iter_yields_entries() {
        let mut lb = board();
        lb.add_score(4, 10);
        lb.add_score(6, 30);

        let entries: Vec<_> = lb.iter().collect();
        assert_eq!(
            entries,
            vec![
                LeaderboardEntry { player_id: 6, score: 30 },
                LeaderboardEntry { player_id: 4, score: 10 },
            ]
        );
        assert_eq!(lb.iter().len(), 2);
    }

    #[test]
    fn test_every_node_level_zero() {
        // Draws of u64::MAX never fall below the promotion threshold
        let mut lb = Leaderboard::with_rng(StepRng::new(u64::MAX, 0));
        for id in 0..20 {
            lb.add_score(id, 20 - id);
        }
        assert!((0..20).all(|id| lb.level_of(id) == Some(0)));
        assert_eq!(lb.top_n(3), vec![0, 1, 2]);
        assert!(lb.validate().is_ok());
    }

    #[test]
    fn test_every_node_max_level() {
        // Draws of zero always fall below the promotion threshold
        let mut lb = Leaderboard::with_rng(StepRng::new(0, 0));
        for id in 0..20 {
            lb.add_score(id, id);
        }
        assert!((0..20).all(|id| lb.level_of(id) == Some(MAX_LEVEL)));
        lb.remove_player(10);
        assert_eq!(lb.top_n(3), vec![19, 18, 17]);
        assert!(lb.validate().is_ok());
    }

    #[test]
    fn test_same_seed_same_shape() {
        let mut a = Leaderboard::with_seed(99);
        let mut b = Leaderboard::with_seed(99);
        for id in 0..200 {
            a.add_score(id, (id * 37) % 101);
            b.add_score(id, (id * 37) % 101);
        }
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_ranking_independent_of_update_order() {
        // Repeated ids, negative deltas and tied totals
        let updates: Vec<(PlayerId, Score)> = (0..500)
            .map(|i| ((i * 7919) % 60, (i * 31) % 41 - 10))
            .collect();

        let mut forward = Leaderboard::with_seed(1);
        let mut reversed = Leaderboard::with_seed(2);
        for &(id, delta) in &updates {
            forward.add_score(id, delta);
        }
        for &(id, delta) in updates.iter().rev() {
            reversed.add_score(id, delta);
        }

        assert_eq!(forward.len(), reversed.len());
        assert_eq!(forward.top_n(forward.len()), reversed.top_n(reversed.len()));
        assert!(forward.iter().eq(reversed.iter()));
        assert!(forward.validate().is_ok());
        assert!(reversed.validate().is_ok());
    }

    #[test]
    fn test_clear_then_reuse() {
        let mut lb = board();
        for id in 0..50 {
            lb.add_score(id, id);
        }
        lb.clear();
        assert!(lb.is_empty());
        assert!(lb.top_n(5).is_empty());
        assert!(lb.validate().is_ok());

        lb.add_score(7, 1);
        assert_eq!(lb.top_n(5), vec![7]);
    }

    #[test]
    fn test_ranks_before() {
        let a = LeaderboardEntry { player_id: 1, score: 10 };
        let b = LeaderboardEntry { player_id: 2, score: 10 };
        let c = LeaderboardEntry { player_id: 0, score: 5 };
        assert!(a.ranks_before(&b));
        assert!(!b.ranks_before(&a));
        assert!(b.ranks_before(&c));
        assert!(!a.ranks_before(&a));
    }
}
