//! Command and outcome types for the engine.
//!
//! Commands are the replayable inputs: every mutation of the leaderboard or
//! the auction index goes through one.

use serde::Serialize;

use crate::auction::{ItemId, Price};
use crate::leaderboard::{PlayerId, Score};

// ============================================================================
// Input Commands
// ============================================================================

/// Add `delta` to a player's score, creating the player if absent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddScore {
    pub player_id: PlayerId,
    pub delta: Score,
}

/// Remove a player from the leaderboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemovePlayer {
    pub player_id: PlayerId,
}

/// List an item, replacing the price of an existing listing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertItem {
    pub item_id: ItemId,
    pub price: Price,
}

/// Withdraw an item
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeleteItem {
    pub item_id: ItemId,
}

/// Input commands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    AddScore(AddScore),
    RemovePlayer(RemovePlayer),
    InsertItem(InsertItem),
    DeleteItem(DeleteItem),
}

impl Command {
    /// Name used in replay logs
    pub const fn op_name(&self) -> &'static str {
        match self {
            Command::AddScore(_) => "add_score",
            Command::RemovePlayer(_) => "remove_player",
            Command::InsertItem(_) => "insert_item",
            Command::DeleteItem(_) => "delete_item",
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Result of applying a command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The command changed state
    Applied,
    /// Removal of an absent id; nothing changed
    NoOp,
}
