use serde::{Deserialize, Serialize};
use vorrat_shared::unit::Unit;

use crate::{ParsedPackage, parse_package_size, resolve_package_quantity};

/// A product as returned by a retail catalog search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetailProduct {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub package_size_text: Option<String>,
}

impl RetailProduct {
    /// Size text first, name for whatever the size text leaves open.
    pub fn parsed_package(&self) -> ParsedPackage {
        let from_name = parse_package_size(&self.name);

        match &self.package_size_text {
            Some(text) => parse_package_size(text).or(from_name),
            None => from_name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Offer {
    pub product_id: String,
    pub name: String,
    pub package: ParsedPackage,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Picks the cheapest way to cover a need from catalog results.
///
/// Cheapest total wins, then fewer packages, then catalog order. Products
/// without a usable price are skipped.
pub fn choose_offer(
    needed_amount: f64,
    needed_unit: &Unit,
    products: &[RetailProduct],
) -> Option<Offer> {
    let mut best: Option<Offer> = None;

    for product in products {
        if !product.price.is_finite() || product.price < 0.0 {
            tracing::debug!(
                product_id = %product.id,
                price = product.price,
                "skipping product without price"
            );
            continue;
        }

        let package = product.parsed_package();
        let quantity = resolve_package_quantity(needed_amount, needed_unit, &package);
        let total_price = product.price * f64::from(quantity);

        let better = match &best {
            None => true,
            Some(current) => {
                total_price < current.total_price
                    || (total_price == current.total_price && quantity < current.quantity)
            }
        };

        if better {
            best = Some(Offer {
                product_id: product.id.to_owned(),
                name: product.name.to_owned(),
                package,
                quantity,
                unit_price: product.price,
                total_price,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, price: f64, size: Option<&str>) -> RetailProduct {
        RetailProduct {
            id: id.to_owned(),
            name: name.to_owned(),
            price,
            package_size_text: size.map(str::to_owned),
        }
    }

    #[test]
    fn test_cheapest_total_wins() {
        let products = [
            product("small", "Mehl 500g", 0.99, None),
            product("large", "Mehl", 1.29, Some("1 kg")),
        ];

        let offer = choose_offer(1.5, &Unit::Kilogram, &products).unwrap();
        assert_eq!(offer.product_id, "large");
        assert_eq!(offer.quantity, 2);
        assert!((offer.total_price - 2.58).abs() < 1e-9);
    }

    #[test]
    fn test_tie_prefers_fewer_packages_then_order() {
        let products = [
            product("a", "Eier 6 Stück", 2.0, None),
            product("b", "Eier 12 Stück", 4.0, None),
            product("c", "Eier", 4.0, Some("12 Stk")),
        ];

        let offer = choose_offer(12.0, &Unit::Piece, &products).unwrap();
        assert_eq!(offer.product_id, "b");
        assert_eq!(offer.quantity, 1);
    }

    #[test]
    fn test_piece_count_from_name() {
        let item = product("duo", "REWE Bio Zwiebel Duo", 1.49, Some("150 g"));
        assert_eq!(
            item.parsed_package(),
            ParsedPackage {
                amount: Some(150.0),
                unit: Some(Unit::Gram),
                piece_count: Some(2),
            }
        );

        let offer = choose_offer(4.0, &Unit::Piece, &[item]).unwrap();
        assert_eq!(offer.quantity, 2);
    }

    #[test]
    fn test_no_usable_product() {
        assert!(choose_offer(1.0, &Unit::Piece, &[]).is_none());
        assert!(
            choose_offer(1.0, &Unit::Piece, &[product("x", "Salat", f64::NAN, None)]).is_none()
        );
    }
}
