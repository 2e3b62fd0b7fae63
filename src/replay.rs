//! Replay - CSV command logs and snapshots.
//!
//! A log has a header row and one command per row:
//!
//! ```text
//! op,id,value
//! add_score,1,100
//! insert_item,100,50
//! remove_player,1,
//! delete_item,100,
//! ```
//!
//! `value` is the score delta or the price, and is left empty for removals.

use std::io;

use serde::{Deserialize, Serialize};

use crate::command::{AddScore, Command, DeleteItem, InsertItem, RemovePlayer};
use crate::error::ReplayError;

/// One raw row of a replay log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayRow {
    pub op: String,
    pub id: i64,
    pub value: Option<i64>,
}

impl ReplayRow {
    /// Convert the raw row to a typed command.
    /// `record` is the 1-based row number, used in errors.
    pub fn to_command(&self, record: usize) -> Result<Command, ReplayError> {
        let value = || {
            self.value.ok_or_else(|| ReplayError::MissingValue {
                record,
                op: self.op.clone(),
            })
        };

        let cmd = match self.op.as_str() {
            "add_score" => Command::AddScore(AddScore {
                player_id: self.id,
                delta: value()?,
            }),
            "remove_player" => Command::RemovePlayer(RemovePlayer { player_id: self.id }),
            "insert_item" => Command::InsertItem(InsertItem {
                item_id: self.id,
                price: value()?,
            }),
            "delete_item" => Command::DeleteItem(DeleteItem { item_id: self.id }),
            other => {
                return Err(ReplayError::UnknownOp {
                    record,
                    op: other.to_string(),
                })
            }
        };
        Ok(cmd)
    }
}

impl From<Command> for ReplayRow {
    fn from(cmd: Command) -> Self {
        let (id, value) = match cmd {
            Command::AddScore(a) => (a.player_id, Some(a.delta)),
            Command::RemovePlayer(r) => (r.player_id, None),
            Command::InsertItem(i) => (i.item_id, Some(i.price)),
            Command::DeleteItem(d) => (d.item_id, None),
        };
        Self {
            op: cmd.op_name().to_string(),
            id,
            value,
        }
    }
}

/// Parse a whole replay log.
pub fn read_commands<R: io::Read>(reader: R) -> Result<Vec<Command>, ReplayError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut commands = Vec::new();
    for (i, result) in csv_reader.deserialize::<ReplayRow>().enumerate() {
        let row = result?;
        commands.push(row.to_command(i + 1)?);
    }
    Ok(commands)
}

/// Write commands as a replay log, header included.
pub fn write_commands<W, I>(writer: W, commands: I) -> Result<(), ReplayError>
where
    W: io::Write,
    I: IntoIterator<Item = Command>,
{
    write_records(writer, commands.into_iter().map(ReplayRow::from))
}

/// Write any serializable records as CSV, header taken from field names.
pub fn write_records<W, T, I>(writer: W, records: I) -> Result<(), ReplayError>
where
    W: io::Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}
