//! Steering Telemetry Bus Client
//!
//! A small, reusable subscriber for the vehicle telemetry bus. It connects to
//! a publisher, splits the byte stream into frames, decodes the topics the
//! steering monitor needs, and exposes them as a synchronized latest-value
//! view.
//!
//! # Architecture
//!
//! The library is intentionally limited to the bus side:
//! - Resolves an address to a transport (local IPC or TCP)
//! - Reads length-prefixed JSON envelopes
//! - Decodes `carState`, `carControl` and `controlsState` into typed structs
//! - Conflates `carControl` into a heartbeat ("drop to most recent")
//!
//! The library does NOT:
//! - Gate samples on engagement
//! - Accumulate statistics
//! - Render anything
//!
//! All of that lives in the application layer (steer-accuracy-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use steer_telemetry::{BusConfig, ControlLaw, Poll, SubMaster};
//!
//! let config = BusConfig::new().with_poll_interval_ms(100);
//! let mut sm = SubMaster::connect("127.0.0.1", &config).unwrap();
//!
//! loop {
//!     match sm.poll().unwrap() {
//!         Poll::Heartbeat => {
//!             let snapshot = sm.snapshot(ControlLaw::Pid);
//!             println!("speed {:.1} m/s, active {}", snapshot.speed, snapshot.active);
//!         }
//!         Poll::Idle => continue,
//!         Poll::Closed => break,
//!     }
//! }
//! ```

// Public modules
pub mod config;
pub mod snapshot;
pub mod sub_master;
pub mod transport;
pub mod types;
pub mod wire;

// Re-export main types for convenience
pub use config::{BusConfig, DEFAULT_ADDR};
pub use snapshot::Snapshot;
pub use sub_master::{Poll, SubMaster};
pub use transport::Endpoint;
pub use types::{
    CarControl, CarState, ControlLaw, ControlsState, LateralControlState, LateralState, Result,
    TelemetryError, Timestamp, Topic, TopicMessage, UnknownControlLaw,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
