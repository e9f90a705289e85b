//! Listener specification derivation.
//!
//! # Responsibilities
//! - Walk the registry in sector-then-vhost order
//! - Emit the deduplicated listener set handed to the external
//!   load-balancing layer before it starts accepting connections
//!
//! # Design Decisions
//! - Plaintext classes (http, webSocket) get at most one listener per
//!   port: connections are routed to tenants after accept via the Host
//!   header, so one listener per port suffices regardless of how many
//!   vhosts share it
//! - Encrypted classes (https, webSocketSSL) get one listener per vhost,
//!   each carrying its own TLS material: termination is bound to a
//!   certificate/domain pair and cannot be shared without per-connection
//!   SNI dispatch, which this crate does not implement

use std::collections::HashSet;

use crate::config::schema::{ProtocolClass, SslBundle, VhostKind};
use crate::registry::Registry;

/// Descriptor of one network listener the load-balancing layer must open.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerSpec {
    pub protocol: ProtocolClass,
    pub port: u16,
    /// TLS material; present exactly for the encrypted protocol classes.
    pub ssl: Option<SslBundle>,
}

/// Derive the listener set for a built registry.
pub fn build_listener_specs(registry: &Registry) -> Vec<ListenerSpec> {
    let mut specs = Vec::new();
    let mut http_ports: HashSet<u16> = HashSet::new();
    let mut ws_ports: HashSet<u16> = HashSet::new();

    for sector in registry.iter() {
        for vhost in &sector.vhosts {
            match &vhost.kind {
                VhostKind::Http => {
                    if http_ports.insert(vhost.port) {
                        specs.push(ListenerSpec {
                            protocol: ProtocolClass::Http,
                            port: vhost.port,
                            ssl: None,
                        });
                    }
                }
                VhostKind::WebSocket => {
                    if ws_ports.insert(vhost.port) {
                        specs.push(ListenerSpec {
                            protocol: ProtocolClass::WebSocket,
                            port: vhost.port,
                            ssl: None,
                        });
                    }
                }
                VhostKind::Https { ssl } => specs.push(ListenerSpec {
                    protocol: ProtocolClass::Https,
                    port: vhost.port,
                    ssl: Some(ssl.clone()),
                }),
                VhostKind::WebSocketSsl { ssl } => specs.push(ListenerSpec {
                    protocol: ProtocolClass::WebSocketSsl,
                    port: vhost.port,
                    ssl: Some(ssl.clone()),
                }),
            }
        }
    }

    specs
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::config::schema::VhostConfig;
    use crate::registry::Sector;

    fn sector(name: &str, vhosts: &[&str]) -> Arc<Sector> {
        let vhosts = vhosts
            .iter()
            .map(|yaml| {
                serde_yaml::from_str::<VhostConfig>(yaml)
                    .unwrap()
                    .resolve()
                    .unwrap()
            })
            .collect();
        Arc::new(Sector {
            name: name.to_string(),
            root: PathBuf::from(format!("/sectors/{name}")),
            enabled: true,
            vhosts,
            modules: Vec::new(),
        })
    }

    #[test]
    fn test_plaintext_ports_dedup_across_sectors() {
        let registry = Registry::from_sectors(vec![
            sector("alpha", &["host: a.test\ntype: http"]),
            sector("beta", &["host: b.test\ntype: http"]),
        ]);
        let specs = build_listener_specs(&registry);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].protocol, ProtocolClass::Http);
        assert_eq!(specs[0].port, 80);
        assert!(specs[0].ssl.is_none());
    }

    #[test]
    fn test_http_and_websocket_dedup_independently() {
        let registry = Registry::from_sectors(vec![sector(
            "alpha",
            &[
                "host: a.test\ntype: http",
                "host: ws.a.test\ntype: webSocket",
                "host: b.test\ntype: http\nport: 8080",
            ],
        )]);
        let specs = build_listener_specs(&registry);
        // http:80, webSocket:80, http:8080 — the two classes keep
        // separate port sets.
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].protocol, ProtocolClass::Http);
        assert_eq!(specs[1].protocol, ProtocolClass::WebSocket);
        assert_eq!(specs[1].port, 80);
        assert_eq!(specs[2].port, 8080);
    }

    #[test]
    fn test_encrypted_vhosts_emit_one_spec_each() {
        let registry = Registry::from_sectors(vec![sector(
            "alpha",
            &[
                "host: a.test\ntype: https\nport: 443\nssl:\n  key: ka\n  cert: ca",
                "host: b.test\ntype: https\nport: 443\nssl:\n  key: kb\n  cert: cb",
            ],
        )]);
        let specs = build_listener_specs(&registry);
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].ssl.as_ref().unwrap().key, "ka");
        assert_eq!(specs[1].ssl.as_ref().unwrap().key, "kb");
    }

    #[test]
    fn test_sector_then_vhost_order() {
        let registry = Registry::from_sectors(vec![
            sector("alpha", &["host: a.test\ntype: http\nport: 8080"]),
            sector(
                "beta",
                &["host: wss.b.test\ntype: webSocketSSL\nssl:\n  key: k\n  cert: c"],
            ),
        ]);
        let specs = build_listener_specs(&registry);
        assert_eq!(specs[0].protocol, ProtocolClass::Http);
        assert_eq!(specs[1].protocol, ProtocolClass::WebSocketSsl);
        assert_eq!(specs[1].port, 443);
    }
}
