//! Saving and loading the board through a key-value store.
//!
//! The board is stored as one JSON document under a single key. Loading
//! never trusts stored data: every image entry is validated on its own and
//! dropped if anything about it is off.

mod record;
mod store;

pub use record::{board_from_json, BoardRecord, ImageRecord};
pub use store::{FileStore, KeyValueStore, MemoryStore};

use tracing::info;

use crate::board::Board;
use crate::config::ScalerConfig;
use crate::error::{Result, ScalerError};

/// Serialize `board` and store it under `key`.
pub fn save_board<S: KeyValueStore + ?Sized>(store: &mut S, key: &str, board: &Board) -> Result<()> {
    let json = serde_json::to_string(&board.to_record()?)?;
    store.put(key, &json)?;
    info!(key, images = board.len(), bytes = json.len(), "Board saved");
    Ok(())
}

/// Load the board stored under `key`, or `None` if nothing is stored.
///
/// A document that is not JSON at all is an error; anything inside it that
/// fails validation is dropped or defaulted.
pub fn load_board<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
    config: ScalerConfig,
) -> Result<Option<Board>> {
    let Some(text) = store.get(key)? else {
        return Ok(None);
    };
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| ScalerError::CorruptPersistedRecord(format!("{key}: {e}")))?;
    let board = board_from_json(&value, config)?;
    info!(key, images = board.len(), "Board loaded");
    Ok(Some(board))
}
