//! Error types.
//!
//! The core structures never fail on valid input; these errors cover the
//! fixed-size player table, replay log parsing, and structural self-checks.

use thiserror::Error;

/// Failure to store a player in the fixed-size table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    /// Every slot on the probe sequence is taken by another player
    #[error("player table is full, cannot insert player {player_id}")]
    Full { player_id: i64 },
}

/// Failure while reading or writing a replay log.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record {record}: unknown operation `{op}`")]
    UnknownOp { record: usize, op: String },

    #[error("record {record}: operation `{op}` requires a value")]
    MissingValue { record: usize, op: String },
}

/// A broken structural invariant, reported by `validate()`.
///
/// Seeing one of these means a bug in the structure itself, not bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Two neighbours on one skip-list level are in the wrong order
    #[error("level {level}: id {first} is linked before id {second} but ranks after it")]
    LevelMisordered { level: usize, first: i64, second: i64 },

    /// A skip-list level holds a different node set than the node levels imply
    #[error("level {level}: expected {expected} nodes, found {found}")]
    LevelCount { level: usize, expected: usize, found: usize },

    /// In-order neighbours of the tree are in the wrong order
    #[error("id {first} is ordered before id {second} but has a greater key")]
    Misordered { first: i64, second: i64 },

    /// The root of the red-black tree is red
    #[error("root node {id} is red")]
    RedRoot { id: i64 },

    /// A red node has a red child
    #[error("red node {id} has a red child")]
    RedRed { id: i64 },

    /// The two subtrees of a node have different black heights
    #[error("node {id}: black height {left} on the left, {right} on the right")]
    BlackHeight { id: i64, left: usize, right: usize },

    /// A child does not point back at its parent
    #[error("node {id} has a broken parent link")]
    ParentLink { id: i64 },

    /// A cached subtree size is stale
    #[error("node {id}: cached size {cached}, actual {actual}")]
    SubtreeSize { id: i64, cached: usize, actual: usize },

    /// The id index disagrees with the linked structure
    #[error("id index out of sync: {indexed} indexed, {linked} linked")]
    IndexMismatch { indexed: usize, linked: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TableError::Full { player_id: 42 }.to_string(),
            "player table is full, cannot insert player 42"
        );
        assert_eq!(
            ReplayError::UnknownOp { record: 3, op: "boom".into() }.to_string(),
            "record 3: unknown operation `boom`"
        );
        assert_eq!(
            InvariantViolation::BlackHeight { id: 7, left: 2, right: 3 }.to_string(),
            "node 7: black height 2 on the left, 3 on the right"
        );
    }
}
