//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (Host header)
//!     → matcher.rs (normalize to host:port, exact match)
//!     → router.rs (matched sector's module chain, in order)
//!     → Return: Handled (a module wrote the response) or Unhandled
//!
//! Match table compilation (at startup):
//!     Registry sectors × vhosts
//!     → one VhostMatcher per vhost, registry iteration order
//!     → Freeze as immutable RequestRouter
//! ```
//!
//! # Design Decisions
//! - Match table compiled at startup, immutable at runtime
//! - Exact host:port matching; first match in registry iteration order
//!   wins (overlaps are already rejected at build time)
//! - Explicit Unhandled rather than a synthesized response
//! - Module hooks are awaited strictly in sequence; the first Handled
//!   result short-circuits the chain

pub mod matcher;
pub mod router;

pub use matcher::VhostMatcher;
pub use router::{RequestRouter, RouteOutcome};
