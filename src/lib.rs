//! # Arcadia Index
//!
//! Ordered in-memory indexes for a game backend, plus a handful of
//! stateless routines that sit next to them.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: each structure is owned by one thread (no locks)
//! - **Arena Allocation**: nodes live in a slab and link by 32-bit index
//! - **Reproducible**: randomness is per-instance and seedable
//!
//! ## Architecture
//!
//! ```text
//! [Replay Log] --> [Command] --> [Engine] --+--> [Leaderboard]   (skip list)
//!                                           +--> [AuctionIndex]  (red-black tree)
//!
//! [inventory] [navigator] [scheduler] [PlayerTable]   (standalone)
//! ```

pub mod arena;
pub mod auction;
pub mod command;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod leaderboard;
pub mod navigator;
pub mod player_table;
pub mod replay;
pub mod scheduler;

// Re-exports for convenience
pub use arena::{Arena, ArenaIndex, NULL_INDEX};
pub use auction::{AuctionIndex, AuctionItem, Color};
pub use command::{AddScore, Command, DeleteItem, InsertItem, Outcome, RemovePlayer};
pub use engine::Engine;
pub use error::{InvariantViolation, ReplayError, TableError};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use navigator::Road;
pub use player_table::PlayerTable;
