//! Observer API server for the Marrow Grow simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/ticks`) streaming one message per tick
//!   via [`tokio::sync::broadcast`]
//! - **REST endpoints** for the latest plant, the session outcome, and the
//!   player's lives
//! - **Command endpoints** that queue player actions (fix lights, switch
//!   light) or stop the session
//! - **Minimal HTML page** (`GET /`) showing the plant at a glance
//!
//! The observer never touches the simulation. It reads whole snapshots the
//! engine publishes after each tick and queues commands on the session's
//! control handle.

pub mod commands;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, spawn_observer, start_server};
pub use state::{AppState, GameSnapshot, TickBroadcast};
