//! Player Table - fixed-size open-addressed hash table.
//!
//! Maps player ids to names in exactly [`TABLE_SIZE`] slots. Collisions are
//! resolved by double hashing; since the table size is prime and the step is
//! never zero, every probe sequence visits every slot once.
//!
//! Entries are never removed, so the first vacant slot on a probe sequence
//! proves the id is absent.

use crate::error::TableError;

/// Number of slots (prime)
pub const TABLE_SIZE: usize = 101;

/// Prime below `TABLE_SIZE` used for the probe step
const STEP_PRIME: i64 = 97;

struct PlayerSlot {
    player_id: i64,
    name: String,
}

/// Fixed-capacity id -> name table.
pub struct PlayerTable {
    slots: [Option<PlayerSlot>; TABLE_SIZE],
    len: usize,
}

impl PlayerTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            len: 0,
        }
    }

    /// Slot indices visited when looking for `player_id`.
    fn probe(player_id: i64) -> impl Iterator<Item = usize> {
        let home = player_id.rem_euclid(TABLE_SIZE as i64) as usize;
        let step = (STEP_PRIME - player_id.rem_euclid(STEP_PRIME)) as usize;
        (0..TABLE_SIZE).map(move |i| (home + i * step) % TABLE_SIZE)
    }

    /// Store a player's name, overwriting the name of an existing id.
    ///
    /// Returns [`TableError::Full`] if the id is new and no slot is free.
    pub fn insert(&mut self, player_id: i64, name: impl Into<String>) -> Result<(), TableError> {
        for index in Self::probe(player_id) {
            match &mut self.slots[index] {
                Some(slot) if slot.player_id == player_id => {
                    slot.name = name.into();
                    return Ok(());
                }
                Some(_) => continue,
                vacant @ None => {
                    *vacant = Some(PlayerSlot {
                        player_id,
                        name: name.into(),
                    });
                    self.len += 1;
                    return Ok(());
                }
            }
        }

        Err(TableError::Full { player_id })
    }

    /// Look up a player's name.
    pub fn search(&self, player_id: i64) -> Option<&str> {
        for index in Self::probe(player_id) {
            match &self.slots[index] {
                Some(slot) if slot.player_id == player_id => return Some(&slot.name),
                Some(_) => continue,
                None => return None,
            }
        }
        None
    }

    /// Number of stored players.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == TABLE_SIZE
    }

    /// Total number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        TABLE_SIZE
    }
}

impl Default for PlayerTable {
    fn default() -> Self {
        Self::new()
    }
}
