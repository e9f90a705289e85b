//! Startup console reporting.
//!
//! Renders the tables the gateway prints after the registry is built:
//! one row per resolved vhost, and one row per load-balancer worker
//! clone. Rendering is separated from printing so the tables are
//! testable as plain strings.

use crate::config::schema::LoadBalancerConfig;
use crate::registry::Registry;

/// Render the sector/vhost listing.
pub fn sector_table(registry: &Registry) -> String {
    let mut out = String::from("<Sectors>\n");
    let head = format!(
        " {:<9} | {:<10} | {:<40} | {:<8} | {:<10}",
        "name", "type", "url", "ssl", "enable"
    );
    out.push_str(&head);
    out.push('\n');
    out.push_str(&"-".repeat(head.len()));
    out.push('\n');

    for sector in registry.iter() {
        for vhost in &sector.vhosts {
            let row = format!(
                " {:<9} | {:<10} | {:<40} | {:<8} | {:<10}",
                sector.name,
                vhost.protocol().as_str(),
                vhost.url,
                vhost.ssl().is_some(),
                sector.enabled
            );
            out.push_str(&row);
            out.push('\n');
            out.push_str(&"-".repeat(row.len()));
            out.push('\n');
        }
    }
    out
}

/// Render the load-balancer distribution maps, one row per worker clone.
pub fn balancer_table(load_balancer: &LoadBalancerConfig) -> String {
    let mut out = String::from("<LoadBalancer>\n");
    out.push_str(&format!("type = {}\n", load_balancer.policy));

    let head = format!(" {:<9} | {:<20} | {:<20}", "number", "mode", "proxy");
    out.push_str(&head);
    out.push('\n');
    out.push_str(&"-".repeat(head.len()));
    out.push('\n');

    let mut number = 0usize;
    for map in &load_balancer.maps {
        let proxy = map.proxy.as_deref().unwrap_or("");
        for _ in 0..map.clone.count() {
            let row = format!(" {:<9} | {:<20} | {:<20}", number, map.mode, proxy);
            out.push_str(&row);
            out.push('\n');
            out.push_str(&"-".repeat(row.len()));
            out.push('\n');
            number += 1;
        }
    }
    out
}
