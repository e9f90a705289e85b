//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! <root>/conf/init.yaml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → InitConfig (validated, immutable)
//!
//! Per sectorPaths entry:
//!     <sector root>/sector.yaml       → SectorConfig
//!     <sector root>/module.<n>.yaml   → ModuleInit (empty if absent)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - The root directory is an explicit [`loader::ConfigLoader`] argument,
//!   never process-global mutable state
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::{InitConfig, LoadBalancerConfig, ProtocolClass, SectorConfig, SslBundle, Vhost};
