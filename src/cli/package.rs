use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use vorrat_shared::unit::Unit;
use vorrat_shopping::{ParsedPackage, RetailProduct, choose_offer, parse_package_size};

use super::print_json;

#[derive(Serialize)]
struct PackageQuantity {
    package: ParsedPackage,
    quantity: u32,
}

pub fn quantity(amount: f64, unit: &str, package: &str) -> Result<()> {
    let parsed = parse_package_size(package);
    let quantity =
        vorrat_shopping::resolve_package_quantity(amount, &Unit::normalize(unit), &parsed);

    print_json(&PackageQuantity {
        package: parsed,
        quantity,
    })
}

pub fn offer(amount: f64, unit: &str, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read products {}", path.display()))?;
    let products: Vec<RetailProduct> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse products {}", path.display()))?;

    match choose_offer(amount, &Unit::normalize(unit), &products) {
        Some(offer) => print_json(&offer),
        None => {
            tracing::warn!("no product with a usable price");
            Ok(())
        }
    }
}
