//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. All types derive Serde traits for deserialization from the
//! YAML documents: the root `conf/init.yaml` and the per-sector
//! `sector.yaml` files.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;

/// Root initialization document (`conf/init.yaml`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitConfig {
    /// Title the worker processes run under.
    pub process_title: String,

    /// Load-balancing policy and distribution maps, handed verbatim to
    /// the external load-balancing layer.
    pub load_balancer: LoadBalancerConfig,

    /// Ordered mapping from sector name to its filesystem root.
    /// Declaration order is registry iteration order.
    #[serde(default)]
    pub sector_paths: SectorPaths,
}

/// Load-balancer section of the init document.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadBalancerConfig {
    /// Distribution policy.
    #[serde(rename = "type")]
    pub policy: BalancePolicy,

    /// Ordered list of distribution maps.
    pub maps: Vec<DistributionMap>,
}

/// Recognized load-balancing policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum BalancePolicy {
    RoundRobin,
    RandomRobin,
    Manual,
}

impl fmt::Display for BalancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalancePolicy::RoundRobin => write!(f, "RoundRobin"),
            BalancePolicy::RandomRobin => write!(f, "RandomRobin"),
            BalancePolicy::Manual => write!(f, "Manual"),
        }
    }
}

/// One distribution map entry in the load-balancer section.
#[derive(Debug, Clone, Deserialize)]
pub struct DistributionMap {
    /// Dispatch mode, interpreted by the load-balancing layer.
    pub mode: String,

    /// Optional proxy target.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Number of worker clones for this map.
    #[serde(default)]
    pub clone: CloneCount,
}

/// Clone count for a distribution map: a fixed integer, or `auto` meaning
/// one clone per CPU core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneCount {
    Fixed(u32),
    Auto,
}

impl Default for CloneCount {
    fn default() -> Self {
        CloneCount::Fixed(1)
    }
}

impl CloneCount {
    /// Resolve to a concrete count. `Auto` expands to the number of CPU
    /// cores available to the process (at least 1).
    pub fn count(self) -> usize {
        match self {
            CloneCount::Fixed(n) => n as usize,
            CloneCount::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

impl<'de> Deserialize<'de> for CloneCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CloneCountVisitor;

        impl Visitor<'_> for CloneCountVisitor {
            type Value = CloneCount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a positive integer or the string \"auto\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CloneCount, E> {
                u32::try_from(v)
                    .map(CloneCount::Fixed)
                    .map_err(|_| E::custom(format!("clone count {v} out of range")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CloneCount, E> {
                u32::try_from(v)
                    .map(CloneCount::Fixed)
                    .map_err(|_| E::custom(format!("clone count {v} out of range")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CloneCount, E> {
                match v {
                    "auto" => Ok(CloneCount::Auto),
                    other => Err(E::custom(format!("expected \"auto\", got \"{other}\""))),
                }
            }
        }

        deserializer.deserialize_any(CloneCountVisitor)
    }
}

/// Ordered sector-name → filesystem-root mapping.
///
/// YAML declaration order is preserved because it determines registry
/// iteration order, which in turn decides host-match precedence.
/// Duplicate keys are rejected at parse time.
#[derive(Debug, Clone, Default)]
pub struct SectorPaths(Vec<(String, PathBuf)>);

impl SectorPaths {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.0.iter().map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, PathBuf)> for SectorPaths {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for SectorPaths {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SectorPathsVisitor;

        impl<'de> Visitor<'de> for SectorPathsVisitor {
            type Value = SectorPaths;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping from sector name to path")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SectorPaths, A::Error> {
                let mut entries: Vec<(String, PathBuf)> = Vec::new();
                while let Some((name, path)) = map.next_entry::<String, PathBuf>()? {
                    if entries.iter().any(|(existing, _)| *existing == name) {
                        return Err(de::Error::custom(format!(
                            "duplicate sector \"{name}\" in sectorPaths"
                        )));
                    }
                    entries.push((name, path));
                }
                Ok(SectorPaths(entries))
            }
        }

        deserializer.deserialize_map(SectorPathsVisitor)
    }
}

/// Per-sector document (`sector.yaml` under the sector root).
#[derive(Debug, Clone, Deserialize)]
pub struct SectorConfig {
    /// Must equal the sector's key in `sectorPaths`.
    pub name: String,

    /// Disabled sectors still register and appear in the startup report.
    #[serde(default = "default_enable")]
    pub enable: bool,

    /// Virtual-host bindings, in declaration order. A sector with no
    /// vhosts is skipped during registry build.
    #[serde(default)]
    pub vhosts: Vec<VhostConfig>,

    /// Module names; declaration order is dispatch order.
    #[serde(default)]
    pub modules: Vec<String>,
}

fn default_enable() -> bool {
    true
}

/// Raw vhost record as declared in `sector.yaml`, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct VhostConfig {
    /// Host name the `Host` header is matched against.
    pub host: String,

    /// Port; defaults to the protocol's well-known port.
    #[serde(default)]
    pub port: Option<u16>,

    /// Protocol class.
    #[serde(rename = "type")]
    pub protocol: ProtocolClass,

    /// TLS material, required for the encrypted protocol classes.
    #[serde(default)]
    pub ssl: Option<SslBundle>,
}

impl VhostConfig {
    /// Validate this record into a [`Vhost`]: fill in the default port,
    /// render the URL, and require TLS material on encrypted classes.
    pub fn resolve(&self) -> Result<Vhost, ConfigError> {
        let port = self.port.unwrap_or_else(|| self.protocol.default_port());

        let kind = match self.protocol {
            ProtocolClass::Http => VhostKind::Http,
            ProtocolClass::WebSocket => VhostKind::WebSocket,
            ProtocolClass::Https => VhostKind::Https {
                ssl: self.require_ssl()?,
            },
            ProtocolClass::WebSocketSsl => VhostKind::WebSocketSsl {
                ssl: self.require_ssl()?,
            },
        };

        // The URL carries a port suffix only when it differs from the
        // protocol default.
        let mut url = format!("{}{}", self.protocol.scheme(), self.host);
        if port != self.protocol.default_port() {
            url.push_str(&format!(":{port}"));
        }

        Ok(Vhost {
            host: self.host.clone(),
            port,
            kind,
            url,
        })
    }

    fn require_ssl(&self) -> Result<SslBundle, ConfigError> {
        self.ssl.clone().ok_or_else(|| ConfigError::MissingSsl {
            host: self.host.clone(),
            protocol: self.protocol,
        })
    }
}

/// Protocol classes a vhost can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ProtocolClass {
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "https")]
    Https,
    #[serde(rename = "webSocket")]
    WebSocket,
    #[serde(rename = "webSocketSSL")]
    WebSocketSsl,
}

impl ProtocolClass {
    /// Well-known port for this protocol class.
    pub fn default_port(self) -> u16 {
        match self {
            ProtocolClass::Http | ProtocolClass::WebSocket => 80,
            ProtocolClass::Https | ProtocolClass::WebSocketSsl => 443,
        }
    }

    /// URL scheme prefix, including the separator.
    pub fn scheme(self) -> &'static str {
        match self {
            ProtocolClass::Http => "http://",
            ProtocolClass::Https => "https://",
            ProtocolClass::WebSocket => "ws://",
            ProtocolClass::WebSocketSsl => "wss://",
        }
    }

    /// True for the classes that terminate TLS.
    pub fn is_encrypted(self) -> bool {
        matches!(self, ProtocolClass::Https | ProtocolClass::WebSocketSsl)
    }

    /// Configuration spelling of this class.
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolClass::Http => "http",
            ProtocolClass::Https => "https",
            ProtocolClass::WebSocket => "webSocket",
            ProtocolClass::WebSocketSsl => "webSocketSSL",
        }
    }
}

impl fmt::Display for ProtocolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TLS material attached to an encrypted vhost.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SslBundle {
    /// Private key (path or PEM, interpreted by the serving layer).
    pub key: String,

    /// Certificate.
    pub cert: String,

    /// Certificate-authority chain.
    #[serde(default)]
    pub ca: Vec<String>,
}

/// A validated vhost binding.
///
/// The protocol-dependent fields live in [`VhostKind`]: the encrypted
/// cases mandatorily carry TLS material, the plaintext cases carry none,
/// so no field of this type is ever conditionally present.
#[derive(Debug, Clone)]
pub struct Vhost {
    pub host: String,
    pub port: u16,
    pub kind: VhostKind,
    /// Rendered URL, e.g. `http://example.com` or `https://a.test:8443`.
    pub url: String,
}

/// Protocol-specific part of a vhost.
#[derive(Debug, Clone)]
pub enum VhostKind {
    Http,
    WebSocket,
    Https { ssl: SslBundle },
    WebSocketSsl { ssl: SslBundle },
}

impl Vhost {
    pub fn protocol(&self) -> ProtocolClass {
        match self.kind {
            VhostKind::Http => ProtocolClass::Http,
            VhostKind::WebSocket => ProtocolClass::WebSocket,
            VhostKind::Https { .. } => ProtocolClass::Https,
            VhostKind::WebSocketSsl { .. } => ProtocolClass::WebSocketSsl,
        }
    }

    pub fn ssl(&self) -> Option<&SslBundle> {
        match &self.kind {
            VhostKind::Https { ssl } | VhostKind::WebSocketSsl { ssl } => Some(ssl),
            VhostKind::Http | VhostKind::WebSocket => None,
        }
    }

    /// Normalized `host:port` key used for overlap checks and matching.
    pub fn host_key(&self) -> String {
        format!("{}:{}", self.host.to_lowercase(), self.port)
    }
}
