//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `citynav_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use citynav_core::Catalog;

fn main() {
    println!("citynav_core ping={}", citynav_core::ping());
    println!("citynav_core version={}", citynav_core::core_version());

    let catalog = Catalog::default_seed();
    println!("baseline_catalog entries={}", catalog.len());
    for point in catalog.iter() {
        println!(
            "  {} ({}, {})",
            point.name, point.coordinate.latitude, point.coordinate.longitude
        );
    }
}
