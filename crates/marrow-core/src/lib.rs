//! Session lifecycle, lives bookkeeping, and tick scheduling for Marrow Grow.
//!
//! This crate wraps the pure simulation in `marrow-sim` with everything a
//! running game needs: a persistent lives ledger with the daily reset and
//! spin, session start and termination, the per-tick pipeline, player
//! commands, and the async loop that paces ticks.
//!
//! # Modules
//!
//! - [`clock`] -- Wall-clock abstraction with a manual clock for tests.
//! - [`config`] -- Configuration loading from `marrow-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- [`SessionControl`] shared between the loop and the
//!   observer API.
//! - [`input`] -- [`PlayerInput`] trait, [`IdleInput`], and [`AutoTender`].
//! - [`lives`] -- [`LivesLedger`]: daily reset, life spending, daily spin.
//! - [`runner`] -- [`run_session`], the paced tick loop.
//! - [`session`] -- [`Session`] start, player actions, and the
//!   [`SessionRegistry`].
//! - [`sink`] -- [`HarvestSink`] trait and in-process sinks.
//! - [`store`] -- [`KeyValueStore`] trait, memory and JSON file stores.
//! - [`tick`] -- The per-tick pipeline and [`TickSummary`].

pub mod clock;
pub mod config;
pub mod control;
pub mod input;
pub mod lives;
pub mod runner;
pub mod session;
pub mod sink;
pub mod store;
pub mod tick;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GameConfig;
pub use control::{PlayerCommand, SessionControl, SessionEndReason};
pub use input::{AutoTender, IdleInput, PlayerInput};
pub use lives::{LivesAccount, LivesError, LivesLedger};
pub use runner::{
    NoOpCallback, RunnerError, SessionReport, TickCallback, await_seed_search, run_session,
};
pub use session::{Session, SessionError, SessionRegistry};
pub use sink::{HarvestSink, MemorySink, NullSink, SinkError};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use tick::{TickError, TickSummary};
