//! # engine_runtime
//!
//! The single-threaded frame loop around a scene:
//!
//! - [`EngineConfig`]: settings from defaults, JSON, and the environment.
//! - [`EngineContext`]: tick counter, viewport, zoom and exit flag.
//! - [`EventBus`] / [`EventListener`]: typed input dispatch.
//! - [`EngineRunner`]: waits for input until the next tick is due, then
//!   advances, updates and redraws.

pub mod config;
pub mod context;
pub mod events;
pub mod runner;
pub mod tick;

pub use config::{ConfigError, EngineConfig, TICK_RATE_ENV};
pub use context::EngineContext;
pub use events::{ESCAPE, EventBus, EventListener, InputEvent};
pub use runner::{EngineRunner, EventSource, Scene, ScriptedEvents, TerminalEvents};
pub use tick::{MAX_TICK_RATE, MIN_TICK_RATE, TickClock, TickConfig};
