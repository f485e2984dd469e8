//! The incremental pull watermark.
//!
//! The watermark records the server timestamp of the last fully applied
//! pull. It is stored in milliseconds in the settings store and
//! converted to seconds at the wire boundary. The watermark is only
//! advanced after every record of a pull has been applied, so a crash
//! or cancellation mid-pull re-fetches rather than skips records.

use std::sync::Arc;

use tracing::warn;

use crate::error::CoreResult;
use crate::settings::SettingsStore;
use crate::types::{now_epoch_ms, EpochMillis};

/// Settings key under which the watermark is persisted.
pub const WATERMARK_KEY: &str = "last_sync_timestamp";

/// One day in milliseconds, the tolerance for clock-skew sanity checks.
const ONE_DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Reads and advances the persisted pull watermark.
#[derive(Clone)]
pub struct SyncClock {
    settings: Arc<dyn SettingsStore>,
}

impl std::fmt::Debug for SyncClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClock").finish_non_exhaustive()
    }
}

impl SyncClock {
    /// Wraps a settings store.
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Current watermark in milliseconds; zero when never synced or
    /// when the stored value cannot be parsed.
    pub fn watermark_ms(&self) -> CoreResult<EpochMillis> {
        let raw = self.settings.get_value(WATERMARK_KEY)?;
        let value = raw
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(0);

        // A watermark in the future means a clock went wrong somewhere;
        // reset and re-pull rather than silently miss server changes.
        if value > now_epoch_ms() + ONE_DAY_MS {
            warn!(watermark_ms = value, "sync watermark is in the future, resetting");
            self.settings.set_value(WATERMARK_KEY, "0")?;
            return Ok(0);
        }
        Ok(value.max(0))
    }

    /// Watermark as the wire `since` parameter in seconds. A device
    /// that has never synced sends 1, not 0, so the server treats the
    /// request as an incremental pull from the epoch rather than a
    /// special case.
    pub fn since_seconds(&self) -> CoreResult<i64> {
        let ms = self.watermark_ms()?;
        if ms == 0 {
            return Ok(1);
        }
        Ok(ms / 1000)
    }

    /// Persists a new watermark from the server-reported pull timestamp
    /// in seconds. Called only after the whole pull has been applied.
    pub fn advance_to_server_seconds(&self, server_seconds: i64) -> CoreResult<()> {
        let ms = server_seconds.saturating_mul(1000);
        self.settings.set_value(WATERMARK_KEY, &ms.to_string())
    }
}
