//! Sector Gateway
//!
//! A configuration-driven front end that maps incoming HTTP/WebSocket
//! connections to tenant-specific plugin chains ("sectors") and hands
//! listener specifications to an external load-balancing layer.
//!
//! # Architecture Overview
//!
//! ```text
//!   conf/init.yaml                 <sector root>/sector.yaml
//!        │                                  │
//!        ▼                                  ▼
//!   ┌─────────┐     ┌──────────┐     ┌──────────────┐
//!   │ config  │────▶│ registry │◀────│   modules    │
//!   │ loader  │     │  build   │     │  (resolver)  │
//!   └─────────┘     └────┬─────┘     └──────────────┘
//!                        │
//!             ┌──────────┴──────────┐
//!             ▼                     ▼
//!      ┌────────────┐       ┌──────────────┐
//!      │ listeners  │       │   routing    │
//!      │ spec build │       │ (per request)│
//!      └─────┬──────┘       └──────┬───────┘
//!            ▼                     ▼
//!     load-balancing layer   sector module chain
//!     (external)             (first Handled wins)
//! ```
//!
//! The load-balancing layer itself (accepting connections, spawning
//! workers, distributing requests) is an external collaborator: this crate
//! only builds the routing model and executes the dispatch decision for a
//! request already handed to it. There is no network I/O, TLS handshake,
//! or process supervision here.

// Core subsystems
pub mod config;
pub mod listeners;
pub mod modules;
pub mod registry;
pub mod routing;

// Startup reporting
pub mod report;

pub use config::loader::{ConfigError, ConfigLoader};
pub use config::schema::InitConfig;
pub use modules::{ModuleRegistry, SectorModule};
pub use registry::Registry;
pub use routing::RequestRouter;
