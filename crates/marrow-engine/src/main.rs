//! Headless game engine for Marrow Grow.
//!
//! Wires the lives ledger, one grow session, the Observer API, and the
//! backend harvest sync together and runs the session to its end.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `marrow-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Open the profile file and resolve the player id
//! 4. Apply the daily lives reset, then spin the wheel if allowed
//! 5. Start a session from the configured selection
//! 6. Start the Observer API server
//! 7. Run the session loop with the harvest sink and player input
//! 8. Record the yield, settle harvest sync, and publish the final snapshot
//! 9. Run the one-time seed search, automatically or on request

mod error;
mod observer_callback;
mod profile;
mod selection;
mod sync;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use marrow_core::config::LoggingConfig;
use marrow_core::runner::log_session_end;
use marrow_core::{
    AutoTender, Clock, GameConfig, HarvestSink, IdleInput, JsonFileStore, LivesAccount,
    LivesLedger, NullSink, PlayerInput, Session, SessionControl, SessionRegistry, SessionReport,
    SystemClock, await_seed_search, run_session,
};
use marrow_observer::{AppState, ServerConfig, spawn_observer};
use marrow_types::{LightSource, ProfileSnapshot, SessionOutcome};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;
use crate::sync::HttpHarvestSink;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "marrow-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the session itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run().await?;
    Ok(())
}

/// Run one session from startup to shutdown.
#[allow(clippy::too_many_lines)]
async fn run() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = Path::new(CONFIG_PATH);
    let config_found = config_path.exists();
    let config = if config_found {
        GameConfig::from_file(config_path)?
    } else {
        GameConfig::default()
    };

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("marrow-engine starting");
    if !config_found {
        info!("Config file not found, using defaults");
    }
    info!(
        tick_interval_ms = config.session.tick_interval_ms,
        rng_seed = ?config.session.rng_seed,
        profile = %config.profile.path.display(),
        "Configuration loaded"
    );

    // 3. Open the profile and resolve the player.
    let mut store = JsonFileStore::open(&config.profile.path)?;
    let player_id = profile::load_or_create_player_id(&mut store)?;
    let mut ledger = LivesLedger::new(store, config.lives.clone());
    let clock = SystemClock;

    // 4. Daily reset and spin.
    if ledger.daily_reset(clock.today())? {
        info!(lives = config.lives.daily_cap, "Daily lives reset");
    }

    let mut rng = config
        .session
        .rng_seed
        .map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);

    if config.selection.auto_spin && ledger.can_spin(clock.now())? {
        let spin = ledger.spin(clock.now(), &mut rng)?;
        info!(
            won = spin.won,
            lives_awarded = spin.lives_awarded,
            reels = ?spin.reels,
            "Daily spin"
        );
    }

    let lives = ledger.lives()?;
    info!(%player_id, lives, "Profile loaded");

    // 5. Start the session.
    let input = selection::session_input(player_id, &config.selection)?;
    let registry = SessionRegistry::new();
    let total_yield = ledger.total_yield()?;
    let mut session = Session::start(input, &mut ledger, &registry, config.events, rng)?
        .with_total_yield(total_yield);

    if config.selection.light != LightSource::default() {
        match session.switch_light(config.selection.light) {
            Ok(()) => info!(light = config.selection.light.label(), "Light installed"),
            Err(e) => warn!(
                light = config.selection.light.label(),
                total_yield,
                error = %e,
                "Configured light not available"
            ),
        }
    }

    // 6. Observer API.
    let control = Arc::new(SessionControl::new(config.session.tick_interval_ms));
    let app_state = Arc::new(AppState::with_control(Arc::clone(&control)));
    {
        let mut snap = app_state.snapshot.write().await;
        snap.session_id = Some(session.id());
        snap.state = Some(session.state().clone());
        snap.profile = Some(ledger.snapshot(clock.now(), Some(session.id()))?);
    }

    let _observer_handle = if config.observer.enabled {
        let (handle, addr) =
            spawn_observer(&ServerConfig::from(&config.observer), Arc::clone(&app_state)).await?;
        info!(%addr, "Observer API server started");
        Some(handle)
    } else {
        info!("Observer API disabled");
        None
    };

    // 7. Run the session.
    let http_sink = config
        .sync
        .backend_url
        .as_deref()
        .map(|url| {
            HttpHarvestSink::new(url, Duration::from_millis(config.sync.request_timeout_ms))
        })
        .transpose()?;
    let sink: &dyn HarvestSink = match &http_sink {
        Some(sink) => {
            info!("Harvest sync enabled");
            sink
        }
        None => &NullSink,
    };

    let mut input: Box<dyn PlayerInput> = if config.selection.auto_fix_lights {
        Box::new(AutoTender::new())
    } else {
        Box::new(IdleInput)
    };
    let mut callback = ObserverCallback::new(Arc::clone(&app_state), session.id());

    info!(session_id = %session.id(), "Entering session loop");
    let report = run_session(
        &mut session,
        &mut ledger,
        &control,
        input.as_mut(),
        sink,
        &mut callback,
    )
    .await?;

    log_session_end(&report);

    // 8. Record the yield, settle harvest sync, and publish the snapshot.
    let harvest = report.outcome.as_ref().and_then(SessionOutcome::harvest);
    if let Some(result) = harvest {
        let total = ledger.add_yield(result.weight)?;
        info!(total_yield = total, "Lifetime yield updated");
    }
    if let Some(sink) = &http_sink {
        let failed = sink.settle(&mut session).await;
        if failed > 0 {
            warn!(failed, "Harvest sync failed, local result kept");
        }
    }
    publish_final(
        &app_state,
        &session,
        &report,
        ledger.snapshot(clock.now(), None)?,
    )
    .await;

    // 9. One seed search per harvest, automatic or requested in the window.
    if harvest.is_some() {
        let found = if config.selection.auto_search_seeds {
            Some(session.search_for_seeds(&mut ledger)?)
        } else if config.observer.enabled && config.session.harvest_window_ms > 0 {
            info!(
                window_ms = config.session.harvest_window_ms,
                "Waiting for a seed search request"
            );
            await_seed_search(
                &mut session,
                &mut ledger,
                &control,
                Duration::from_millis(config.session.harvest_window_ms),
            )
            .await?
        } else {
            None
        };
        if let Some(found) = found {
            info!(found, lives = ledger.lives()?, "Seed search done");
            publish_final(
                &app_state,
                &session,
                &report,
                ledger.snapshot(clock.now(), None)?,
            )
            .await;
        }
    }
    drop(session);

    info!(
        end_reason = ?report.end_reason,
        total_ticks = report.total_ticks,
        "marrow-engine shutdown complete"
    );

    Ok(())
}

/// Write the settled plant, outcome, and profile into the observer snapshot.
async fn publish_final<R: rand::Rng>(
    app_state: &AppState,
    session: &Session<R>,
    report: &SessionReport,
    profile: ProfileSnapshot,
) {
    let mut snap = app_state.snapshot.write().await;
    snap.state = Some(session.state().clone());
    snap.outcome.clone_from(&report.outcome);
    snap.profile = Some(profile);
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
