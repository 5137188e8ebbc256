//! Player identity persisted next to the lives ledger.
//!
//! A headless engine has no login, so the first run mints a player id and
//! stores it in the profile file. Later runs reuse it, which keeps the
//! backend leaderboard attributing harvests to the same player.

use marrow_core::{KeyValueStore, StoreError};
use marrow_types::PlayerId;
use tracing::{info, warn};
use uuid::Uuid;

/// Profile key holding the player id.
pub const PLAYER_ID_KEY: &str = "playerId";

/// Read the stored player id, creating and saving one on first run.
pub fn load_or_create_player_id<S: KeyValueStore>(store: &mut S) -> Result<PlayerId, StoreError> {
    if let Some(raw) = store.get(PLAYER_ID_KEY)? {
        return match Uuid::parse_str(raw.trim()) {
            Ok(id) => Ok(PlayerId::from(id)),
            Err(e) => {
                warn!(error = %e, "Stored player id is not a UUID");
                Err(StoreError::Corrupt {
                    key: PLAYER_ID_KEY.to_owned(),
                    value: raw,
                })
            }
        };
    }

    let id = PlayerId::new();
    store.set(PLAYER_ID_KEY, &id.to_string())?;
    info!(player_id = %id, "Created new player profile");
    Ok(id)
}
