//! Startup-path integration tests: config tree on disk → registry →
//! listener specs → report tables.

use std::sync::Arc;

use sector_gateway::config::{ConfigError, ConfigLoader, ProtocolClass};
use sector_gateway::listeners::build_listener_specs;
use sector_gateway::modules::{ModuleRegistry, ModuleResolver};
use sector_gateway::registry::Registry;
use sector_gateway::report;

mod common;
use common::GatewayRoot;

fn empty_resolver() -> ModuleResolver {
    ModuleResolver::new(ModuleRegistry::new())
}

fn build(root: &GatewayRoot) -> Result<Registry, ConfigError> {
    let loader = ConfigLoader::new(root.path());
    let init = loader.load_init()?;
    Registry::build(&init, &loader, &empty_resolver())
}

#[test]
fn test_single_http_sector_scenario() {
    let root = GatewayRoot::new();
    root.add_sector(
        "alpha",
        "name: alpha\nvhosts:\n  - host: example.com\n    type: http\n",
    );
    root.write_init(&["alpha"]);

    let registry = build(&root).unwrap();
    let sector = registry.get("alpha").unwrap();
    assert!(sector.enabled);
    assert_eq!(sector.vhosts[0].port, 80);
    assert_eq!(sector.vhosts[0].url, "http://example.com");

    let specs = build_listener_specs(&registry);
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].protocol, ProtocolClass::Http);
    assert_eq!(specs[0].port, 80);
}

#[test]
fn test_shared_http_port_across_sectors_emits_one_listener() {
    let root = GatewayRoot::new();
    root.add_sector(
        "alpha",
        "name: alpha\nvhosts:\n  - host: a.test\n    type: http\n",
    );
    root.add_sector(
        "beta",
        "name: beta\nvhosts:\n  - host: b.test\n    type: http\n",
    );
    root.write_init(&["alpha", "beta"]);

    let registry = build(&root).unwrap();
    assert_eq!(registry.len(), 2);

    let specs = build_listener_specs(&registry);
    assert_eq!(specs.len(), 1);
    assert_eq!((specs[0].protocol, specs[0].port), (ProtocolClass::Http, 80));
}

#[test]
fn test_https_vhosts_keep_their_own_ssl_material() {
    let root = GatewayRoot::new();
    root.add_sector(
        "alpha",
        r#"name: alpha
vhosts:
  - host: a.test
    type: https
    port: 443
    ssl:
      key: a.key
      cert: a.pem
  - host: b.test
    type: https
    port: 443
    ssl:
      key: b.key
      cert: b.pem
"#,
    );
    root.write_init(&["alpha"]);

    let registry = build(&root).unwrap();
    let specs = build_listener_specs(&registry);
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].ssl.as_ref().unwrap().key, "a.key");
    assert_eq!(specs[1].ssl.as_ref().unwrap().key, "b.key");
    assert!(specs.iter().all(|s| s.port == 443));
}

#[test]
fn test_sector_name_mismatch_registers_nothing() {
    let root = GatewayRoot::new();
    root.add_sector(
        "alpha",
        "name: something-else\nvhosts:\n  - host: a.test\n    type: http\n",
    );
    root.write_init(&["alpha"]);

    let err = build(&root).unwrap_err();
    assert!(matches!(err, ConfigError::SectorNameMismatch { .. }));
}

#[test]
fn test_missing_sector_directory_is_fatal() {
    let root = GatewayRoot::new();
    root.write_init(&["ghost"]);

    let err = build(&root).unwrap_err();
    assert!(matches!(err, ConfigError::SectorMissing(_)));
}

#[test]
fn test_vhostless_sector_is_skipped() {
    let root = GatewayRoot::new();
    root.add_sector("quiet", "name: quiet\n");
    root.add_sector(
        "alpha",
        "name: alpha\nvhosts:\n  - host: a.test\n    type: http\n",
    );
    root.write_init(&["quiet", "alpha"]);

    let registry = build(&root).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.get("quiet").is_none());
    assert!(registry.get("alpha").is_some());
}

#[test]
fn test_overlapping_host_port_is_rejected_at_build() {
    let root = GatewayRoot::new();
    root.add_sector(
        "alpha",
        "name: alpha\nvhosts:\n  - host: shared.test\n    type: http\n",
    );
    root.add_sector(
        "beta",
        "name: beta\nvhosts:\n  - host: shared.test\n    type: http\n",
    );
    root.write_init(&["alpha", "beta"]);

    let err = build(&root).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(err.to_string().contains("shared.test:80"));
}

#[test]
fn test_unregistered_module_leaves_empty_slot() {
    let root = GatewayRoot::new();
    root.add_sector(
        "alpha",
        "name: alpha\nvhosts:\n  - host: a.test\n    type: http\nmodules:\n  - ghost\n  - phantom\n",
    );
    root.write_init(&["alpha"]);

    let registry = build(&root).unwrap();
    let sector = registry.get("alpha").unwrap();
    // Slots preserve positional indices even when nothing resolved.
    assert_eq!(sector.modules.len(), 2);
    assert_eq!(sector.resolved_modules(), 0);
}

#[test]
fn test_disabled_sector_still_registers() {
    let root = GatewayRoot::new();
    root.add_sector(
        "alpha",
        "name: alpha\nenable: false\nvhosts:\n  - host: a.test\n    type: http\n",
    );
    root.write_init(&["alpha"]);

    let registry = build(&root).unwrap();
    assert!(!registry.get("alpha").unwrap().enabled);
}

#[test]
fn test_report_tables_render() {
    let root = GatewayRoot::new();
    root.add_sector(
        "alpha",
        "name: alpha\nvhosts:\n  - host: example.com\n    type: http\n    port: 8080\n",
    );
    root.write_init(&["alpha"]);

    let loader = ConfigLoader::new(root.path());
    let init = loader.load_init().unwrap();
    let registry = Arc::new(Registry::build(&init, &loader, &empty_resolver()).unwrap());

    let sectors = report::sector_table(&registry);
    assert!(sectors.contains("alpha"));
    assert!(sectors.contains("http://example.com:8080"));

    let balancer = report::balancer_table(&init.load_balancer);
    assert!(balancer.contains("type = RoundRobin"));
    assert!(balancer.contains("worker"));
}
