//! Engine - single-writer front end over the leaderboard and auction index.
//!
//! Every mutation arrives as a [`Command`], so a command log replays to the
//! same state (given the same leaderboard seed).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::auction::AuctionIndex;
use crate::command::{Command, Outcome};
use crate::leaderboard::Leaderboard;

/// Owns both ordered structures and applies commands to them.
pub struct Engine<R = ChaCha8Rng> {
    pub leaderboard: Leaderboard<R>,
    pub auction: AuctionIndex,
}

impl Engine<ChaCha8Rng> {
    /// Create an engine with an entropy-seeded leaderboard.
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    /// Create an engine whose leaderboard levels are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for Engine<ChaCha8Rng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> Engine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            leaderboard: Leaderboard::with_rng(rng),
            auction: AuctionIndex::new(),
        }
    }

    /// Apply a single command.
    ///
    /// Removals of absent ids are reported as [`Outcome::NoOp`]; every other
    /// command always applies.
    #[inline]
    pub fn process_command(&mut self, cmd: Command) -> Outcome {
        match cmd {
            Command::AddScore(add) => {
                self.leaderboard.add_score(add.player_id, add.delta);
                Outcome::Applied
            }
            Command::RemovePlayer(remove) => match self.leaderboard.remove_player(remove.player_id) {
                Some(_) => Outcome::Applied,
                None => Outcome::NoOp,
            },
            Command::InsertItem(insert) => {
                self.auction.insert_item(insert.item_id, insert.price);
                Outcome::Applied
            }
            Command::DeleteItem(delete) => match self.auction.delete_item(delete.item_id) {
                Some(_) => Outcome::Applied,
                None => Outcome::NoOp,
            },
        }
    }

    /// Apply commands in order, returning how many changed state.
    pub fn process_all<I>(&mut self, commands: I) -> usize
    where
        I: IntoIterator<Item = Command>,
    {
        commands
            .into_iter()
            .filter(|&cmd| self.process_command(cmd) == Outcome::Applied)
            .count()
    }

    /// Compute state hash for determinism testing.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.leaderboard.state_hash().hash(&mut hasher);
        self.auction.state_hash().hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{AddScore, DeleteItem, InsertItem, RemovePlayer};

    fn add(player_id: i64, delta: i64) -> Command {
        Command::AddScore(AddScore { player_id, delta })
    }

    fn insert(item_id: i64, price: i64) -> Command {
        Command::InsertItem(InsertItem { item_id, price })
    }

    #[test]
    fn test_engine_creation() {
        let engine = Engine::with_seed(1);
        assert!(engine.leaderboard.is_empty());
        assert!(engine.auction.is_empty());
    }

    #[test]
    fn test_engine_process_add_and_remove() {
        let mut engine = Engine::with_seed(1);

        assert_eq!(engine.process_command(add(1, 100)), Outcome::Applied);
        assert_eq!(engine.process_command(add(2, 200)), Outcome::Applied);
        assert_eq!(engine.leaderboard.top_n(1), vec![2]);

        let remove = Command::RemovePlayer(RemovePlayer { player_id: 2 });
        assert_eq!(engine.process_command(remove), Outcome::Applied);
        assert_eq!(engine.process_command(remove), Outcome::NoOp);
        assert_eq!(engine.leaderboard.top_n(5), vec![1]);
    }

    #[test]
    fn test_engine_process_items() {
        let mut engine = Engine::with_seed(1);
        for cmd in [insert(100, 50), insert(200, 30), insert(300, 70), insert(400, 20)] {
            engine.process_command(cmd);
        }
        assert_eq!(engine.auction.in_order_ids(), vec![400, 200, 100, 300]);

        let delete = Command::DeleteItem(DeleteItem { item_id: 200 });
        assert_eq!(engine.process_command(delete), Outcome::Applied);
        assert_eq!(engine.process_command(delete), Outcome::NoOp);
        assert_eq!(engine.auction.in_order_ids(), vec![400, 100, 300]);
    }

    #[test]
    fn test_process_all_counts_applied() {
        let mut engine = Engine::with_seed(1);
        let applied = engine.process_all([
            add(1, 10),
            Command::RemovePlayer(RemovePlayer { player_id: 9 }),
            insert(5, 5),
            Command::DeleteItem(DeleteItem { item_id: 6 }),
        ]);
        assert_eq!(applied, 2);
    }

    #[test]
    fn test_engine_state_hash_determinism() {
        let mut engine1 = Engine::with_seed(42);
        let mut engine2 = Engine::with_seed(42);

        for i in 0..100 {
            let cmd = if i % 2 == 0 { add(i % 17, i) } else { insert(i % 23, i * 3) };
            engine1.process_command(cmd);
            engine2.process_command(cmd);
        }

        assert_eq!(engine1.state_hash(), engine2.state_hash());
    }
}
