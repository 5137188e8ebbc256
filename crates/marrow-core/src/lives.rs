//! Seed lives and the daily spin.
//!
//! - Lives reset to the daily cap the first time they are checked on a new
//!   calendar day (date comparison, not elapsed time). Checking again the
//!   same day does nothing.
//! - Starting a session costs exactly one life.
//! - The daily spin is available once per rolling cooldown window
//!   (elapsed time, not calendar day). The spin timestamp is written before
//!   the roll, so a crash mid-spin never grants a second attempt.
//!
//! All values live in an injected [`KeyValueStore`].

use chrono::{DateTime, Duration, NaiveDate, Utc};
use marrow_sim::config::roll;
use marrow_types::{ProfileSnapshot, SessionId, SpinOutcome, SpinSymbol};
use rand::Rng;
use tracing::{debug, info};

use crate::config::LivesConfig;
use crate::store::{KeyValueStore, StoreError};

/// Store key for the current lives count.
pub const LIVES_KEY: &str = "seedLives";
/// Store key for the calendar date of the last reset (`YYYY-MM-DD`).
pub const RESET_DATE_KEY: &str = "lastLivesReset";
/// Store key for the RFC 3339 timestamp of the last spin.
pub const LAST_SPIN_KEY: &str = "lastSpinAt";
/// Store key for lifetime harvested grams.
pub const TOTAL_YIELD_KEY: &str = "totalYield";

/// Errors raised by lives bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum LivesError {
    /// The backing store failed.
    #[error("lives store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// No life is left to spend.
    #[error("no seed lives left")]
    NoLives,

    /// The spin is still cooling down.
    #[error("daily spin unavailable until {available_at}")]
    SpinCoolingDown {
        /// When the next spin unlocks.
        available_at: DateTime<Utc>,
    },
}

/// The counter a running session reads and writes.
///
/// Session start consumes a life through it and harvest-time theft deducts
/// one through it.
pub trait LivesAccount: Send {
    /// Current lives.
    fn lives(&self) -> Result<u32, LivesError>;

    /// Overwrite the lives count.
    fn set_lives(&mut self, lives: u32) -> Result<(), LivesError>;
}

/// Persistent per-player bookkeeping over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct LivesLedger<S> {
    store: S,
    config: LivesConfig,
}

impl<S: KeyValueStore> LivesLedger<S> {
    /// Wrap `store` with the given tuning.
    pub const fn new(store: S, config: LivesConfig) -> Self {
        Self { store, config }
    }

    /// Borrow the backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn read<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, LivesError> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(value) => Ok(Some(value)),
                Err(_) => Err(LivesError::from(StoreError::Corrupt {
                    key: key.to_owned(),
                    value: raw,
                })),
            },
        }
    }

    /// Restore lives to the daily cap if `today` differs from the stored
    /// reset date or no lives value is stored. Returns whether a reset
    /// happened.
    pub fn daily_reset(&mut self, today: NaiveDate) -> Result<bool, LivesError> {
        let last_reset: Option<NaiveDate> = self.read(RESET_DATE_KEY)?;
        let lives: Option<u32> = self.read(LIVES_KEY)?;
        if last_reset == Some(today) && lives.is_some() {
            return Ok(false);
        }
        self.store
            .set(LIVES_KEY, &self.config.daily_cap.to_string())?;
        self.store.set(RESET_DATE_KEY, &today.to_string())?;
        info!(%today, lives = self.config.daily_cap, "Daily lives reset");
        Ok(true)
    }

    /// Spend one life to start a session. Returns the lives left.
    pub fn consume_life(&mut self) -> Result<u32, LivesError> {
        let current = self.lives()?;
        let remaining = current.checked_sub(1).ok_or(LivesError::NoLives)?;
        self.set_lives(remaining)?;
        Ok(remaining)
    }

    /// Add `count` lives. Returns the new total.
    pub fn award_lives(&mut self, count: u32) -> Result<u32, LivesError> {
        let total = self.lives()?.saturating_add(count);
        self.set_lives(total)?;
        Ok(total)
    }

    /// When the player last spun.
    pub fn last_spin_at(&self) -> Result<Option<DateTime<Utc>>, LivesError> {
        self.read(LAST_SPIN_KEY)
    }

    /// Record a spin at `at`.
    pub fn set_last_spin_at(&mut self, at: DateTime<Utc>) -> Result<(), LivesError> {
        self.store.set(LAST_SPIN_KEY, &at.to_rfc3339())?;
        Ok(())
    }

    fn cooldown(&self) -> Duration {
        Duration::hours(i64::from(self.config.spin_cooldown_hours))
    }

    /// When the next spin unlocks, or `None` if it is available now.
    pub fn next_spin_at(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, LivesError> {
        let Some(last) = self.last_spin_at()? else {
            return Ok(None);
        };
        let available_at = last.checked_add_signed(self.cooldown()).unwrap_or(last);
        Ok((now < available_at).then_some(available_at))
    }

    /// Whether a spin is available at `now`.
    pub fn can_spin(&self, now: DateTime<Utc>) -> Result<bool, LivesError> {
        Ok(self.next_spin_at(now)?.is_none())
    }

    /// Spin the daily wheel.
    pub fn spin<R: Rng>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<SpinOutcome, LivesError> {
        if let Some(available_at) = self.next_spin_at(now)? {
            return Err(LivesError::SpinCoolingDown { available_at });
        }
        self.set_last_spin_at(now)?;

        let won = roll(rng, self.config.spin_win_chance);
        let lives_awarded = if won { self.config.spin_award } else { 0 };
        if lives_awarded > 0 {
            self.award_lives(lives_awarded)?;
        }
        let outcome = SpinOutcome {
            won,
            lives_awarded,
            reels: spin_reels(won, rng),
        };
        debug!(won, lives_awarded, "Daily spin");
        Ok(outcome)
    }

    /// Lifetime harvested grams.
    pub fn total_yield(&self) -> Result<u64, LivesError> {
        Ok(self.read(TOTAL_YIELD_KEY)?.unwrap_or(0))
    }

    /// Add a harvest's weight to the lifetime total. Returns the new total.
    pub fn add_yield(&mut self, grams: u32) -> Result<u64, LivesError> {
        let total = self.total_yield()?.saturating_add(u64::from(grams));
        self.store.set(TOTAL_YIELD_KEY, &total.to_string())?;
        Ok(total)
    }

    /// Read-only view for the observer.
    pub fn snapshot(
        &self,
        now: DateTime<Utc>,
        active_session: Option<SessionId>,
    ) -> Result<ProfileSnapshot, LivesError> {
        Ok(ProfileSnapshot {
            lives: self.lives()?,
            last_spin_at: self.last_spin_at()?,
            spin_available: self.can_spin(now)?,
            active_session,
        })
    }
}

impl<S: KeyValueStore> LivesAccount for LivesLedger<S> {
    fn lives(&self) -> Result<u32, LivesError> {
        Ok(self.read(LIVES_KEY)?.unwrap_or(0))
    }

    fn set_lives(&mut self, lives: u32) -> Result<(), LivesError> {
        self.store.set(LIVES_KEY, &lives.to_string())?;
        Ok(())
    }
}

/// Reel symbols for a spin: a win shows leaf, leaf, bone; a loss always
/// shows at least one skull.
fn spin_reels<R: Rng>(won: bool, rng: &mut R) -> [SpinSymbol; 3] {
    if won {
        return [SpinSymbol::Leaf, SpinSymbol::Leaf, SpinSymbol::Bone];
    }
    let skull_at = rng.random_range(0..3_usize);
    let mut reels = [SpinSymbol::Skull; 3];
    for (i, reel) in reels.iter_mut().enumerate() {
        if i != skull_at {
            *reel = if rng.random_bool(0.5) {
                SpinSymbol::Bone
            } else {
                SpinSymbol::Leaf
            };
        }
    }
    reels
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::store::MemoryStore;

    fn ledger() -> LivesLedger<MemoryStore> {
        LivesLedger::new(MemoryStore::new(), LivesConfig::default())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, 0, 0).unwrap()
    }

    #[test]
    fn first_visit_resets_to_cap() {
        let mut ledger = ledger();
        assert!(ledger.daily_reset(day(1)).unwrap());
        assert_eq!(ledger.lives().unwrap(), 3);
    }

    #[test]
    fn reset_is_idempotent_within_a_day() {
        let mut ledger = ledger();
        ledger.daily_reset(day(1)).unwrap();
        ledger.consume_life().unwrap();
        for _ in 0..10 {
            assert!(!ledger.daily_reset(day(1)).unwrap());
        }
        assert_eq!(ledger.lives().unwrap(), 2);

        assert!(ledger.daily_reset(day(2)).unwrap());
        assert_eq!(ledger.lives().unwrap(), 3);
    }

    #[test]
    fn missing_lives_value_forces_reset() {
        let mut store = MemoryStore::new();
        store.set(RESET_DATE_KEY, "2026-03-01").unwrap();
        let mut ledger = LivesLedger::new(store, LivesConfig::default());
        assert!(ledger.daily_reset(day(1)).unwrap());
        assert_eq!(ledger.lives().unwrap(), 3);
    }

    #[test]
    fn consuming_the_last_life_then_failing() {
        let mut ledger = ledger();
        ledger.set_lives(1).unwrap();
        assert_eq!(ledger.consume_life().unwrap(), 0);
        assert!(matches!(ledger.consume_life(), Err(LivesError::NoLives)));
        assert_eq!(ledger.lives().unwrap(), 0);
    }

    #[test]
    fn corrupt_lives_value_is_reported() {
        let mut store = MemoryStore::new();
        store.set(LIVES_KEY, "many").unwrap();
        let ledger = LivesLedger::new(store, LivesConfig::default());
        assert!(matches!(
            ledger.lives(),
            Err(LivesError::Store {
                source: StoreError::Corrupt { .. }
            })
        ));
    }

    #[test]
    fn spin_cooldown_is_a_rolling_window() {
        let mut ledger = ledger();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(ledger.can_spin(at(1, 22)).unwrap());
        ledger.spin(at(1, 22), &mut rng).unwrap();

        // Next calendar day but under 24 hours later.
        assert!(!ledger.can_spin(at(2, 8)).unwrap());
        assert!(matches!(
            ledger.spin(at(2, 8), &mut rng),
            Err(LivesError::SpinCoolingDown { available_at }) if available_at == at(2, 22)
        ));
        assert!(ledger.can_spin(at(2, 22)).unwrap());
    }

    #[test]
    fn spin_records_timestamp_before_rolling() {
        let mut ledger = ledger();
        let mut rng = SmallRng::seed_from_u64(3);
        ledger.spin(at(5, 10), &mut rng).unwrap();
        assert_eq!(ledger.last_spin_at().unwrap(), Some(at(5, 10)));
    }

    #[test]
    fn spin_awards_exactly_one_life_on_win() {
        let mut rng = SmallRng::seed_from_u64(12);
        for i in 0..200 {
            let mut ledger = ledger();
            ledger.set_lives(2).unwrap();
            let outcome = ledger.spin(at(1, 0) + Duration::days(i), &mut rng).unwrap();
            if outcome.won {
                assert_eq!(outcome.lives_awarded, 1);
                assert_eq!(ledger.lives().unwrap(), 3);
                assert_eq!(
                    outcome.reels,
                    [SpinSymbol::Leaf, SpinSymbol::Leaf, SpinSymbol::Bone]
                );
            } else {
                assert_eq!(outcome.lives_awarded, 0);
                assert_eq!(ledger.lives().unwrap(), 2);
                assert!(outcome.reels.contains(&SpinSymbol::Skull));
            }
        }
    }

    #[test]
    fn spin_win_rate_is_a_quarter() {
        let mut ledger = ledger();
        let mut rng = SmallRng::seed_from_u64(2024);
        let start = at(1, 0);
        let trials = 100_000_i64;
        let mut wins = 0_u32;
        for i in 0..trials {
            let outcome = ledger.spin(start + Duration::days(i), &mut rng).unwrap();
            if outcome.won {
                wins = wins.saturating_add(1);
            }
        }
        let rate = f64::from(wins) / 100_000.0;
        assert!((rate - 0.25).abs() < 0.01, "win rate was {rate}");
    }

    #[test]
    fn yield_accumulates() {
        let mut ledger = ledger();
        assert_eq!(ledger.total_yield().unwrap(), 0);
        ledger.add_yield(120).unwrap();
        assert_eq!(ledger.add_yield(80).unwrap(), 200);
    }

    #[test]
    fn snapshot_reports_spin_availability() {
        let mut ledger = ledger();
        ledger.daily_reset(day(1)).unwrap();
        let snap = ledger.snapshot(at(1, 9), None).unwrap();
        assert_eq!(snap.lives, 3);
        assert!(snap.spin_available);
        ledger.set_last_spin_at(at(1, 8)).unwrap();
        assert!(!ledger.snapshot(at(1, 9), None).unwrap().spin_available);
    }
}
