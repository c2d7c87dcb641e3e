use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use vorrat_shared::unit::{Unit, UnitKind, sanitize_amount, to_base};

/// `6 x 1,5 l`, `4x125g`
static MULTIPACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*[x×]\s*(\d+(?:[.,]\d+)?)\s*(kg|g|ml|l)\b").unwrap()
});

/// First `<number> <unit>` token, decimal comma allowed.
static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(kg|g|ml|l|stück|stk|st)\b").unwrap()
});

/// `3er Pack`, `6er-Pack`, `10er Packung`
static N_PACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*er[\s-]*pack").unwrap());

static WORD_PACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(duo|trio|doppelpack|dreierpack)\b").unwrap());

/// Loose produce sold in a container, assumed to hold at least three pieces.
static CONTAINER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(netz|sack|schale|korb)\b").unwrap());

const CONTAINER_PIECES: u32 = 3;

/// Size of one retail package as read from its label.
///
/// `amount`/`unit` are always in base units (`g`, `ml`) or pieces.
/// `piece_count` is how many discrete items one package holds and is parsed
/// independently of the size.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedPackage {
    pub amount: Option<f64>,
    pub unit: Option<Unit>,
    pub piece_count: Option<u32>,
}

impl ParsedPackage {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.unit.is_none() && self.piece_count.is_none()
    }

    /// Size with a usable positive amount, if any.
    fn size(&self) -> Option<(f64, &Unit)> {
        match (self.amount, &self.unit) {
            (Some(amount), Some(unit)) if amount.is_finite() && amount > 0.0 => {
                Some((amount, unit))
            }
            _ => None,
        }
    }

    /// Fills whatever is still unknown from `other`.
    pub fn or(self, other: ParsedPackage) -> ParsedPackage {
        let (amount, unit) = if self.size().is_some() {
            (self.amount, self.unit)
        } else {
            (other.amount, other.unit)
        };

        ParsedPackage {
            amount,
            unit,
            piece_count: self.piece_count.or(other.piece_count),
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn size_unit(raw: &str) -> Option<(Unit, f64)> {
    let unit = Unit::normalize(raw);
    match unit.kind() {
        UnitKind::Weight | UnitKind::Volume => Some((unit.base(), unit.base_factor())),
        UnitKind::Counting if unit == Unit::Piece => Some((Unit::Piece, 1.0)),
        _ => None,
    }
}

fn parse_piece_count(text: &str) -> Option<u32> {
    if let Some(caps) = N_PACK_RE.captures(text) {
        if let Some(count) = caps[1].parse::<u32>().ok().filter(|c| *c > 0) {
            return Some(count);
        }
    }

    if let Some(caps) = WORD_PACK_RE.captures(text) {
        return match caps[1].to_lowercase().as_str() {
            "duo" | "doppelpack" => Some(2),
            "trio" | "dreierpack" => Some(3),
            _ => None,
        };
    }

    CONTAINER_RE.is_match(text).then_some(CONTAINER_PIECES)
}

/// Reads package size and piece count out of a free-text product label.
///
/// ```
/// use vorrat_shared::unit::Unit;
/// use vorrat_shopping::parse_package_size;
///
/// let parsed = parse_package_size("REWE Bio Zwiebel Duo 150g");
/// assert_eq!(parsed.amount, Some(150.0));
/// assert_eq!(parsed.unit, Some(Unit::Gram));
/// assert_eq!(parsed.piece_count, Some(2));
/// ```
pub fn parse_package_size(text: &str) -> ParsedPackage {
    let mut parsed = ParsedPackage::default();

    if let Some(caps) = MULTIPACK_RE.captures(text) {
        let count = caps[1].parse::<u32>().ok().filter(|c| *c > 0);
        let each = parse_number(&caps[2]);

        if let (Some(count), Some(each), Some((unit, factor))) = (count, each, size_unit(&caps[3]))
        {
            parsed.amount = Some(f64::from(count) * each * factor);
            parsed.unit = Some(unit);
            parsed.piece_count = Some(count);

            return parsed;
        }
    }

    if let Some(caps) = SIZE_RE.captures(text) {
        if let (Some(amount), Some((unit, factor))) = (parse_number(&caps[1]), size_unit(&caps[2]))
        {
            parsed.amount = Some(amount * factor);
            parsed.unit = Some(unit);
        }
    }

    parsed.piece_count = parse_piece_count(text);
    parsed
}

fn ceil_count(value: f64) -> u32 {
    let value = (value - 1e-9).ceil();
    if value >= f64::from(u32::MAX) {
        u32::MAX
    } else if value < 1.0 {
        1
    } else {
        value as u32
    }
}

/// How many packages cover `needed_amount` of `needed_unit`. Never zero.
pub fn resolve_package_quantity(
    needed_amount: f64,
    needed_unit: &Unit,
    package: &ParsedPackage,
) -> u32 {
    let needed = sanitize_amount(needed_amount);
    let needed_kind = needed_unit.kind();

    if needed_kind == UnitKind::Spoon {
        return 1;
    }

    if needed_kind == UnitKind::Counting {
        let quantity = match package.size() {
            Some((amount, unit)) if unit.is_counting() => needed / amount,
            Some(_) => match package.piece_count.filter(|c| *c > 0) {
                Some(pieces) => needed / f64::from(pieces),
                None => needed,
            },
            None => needed,
        };

        return ceil_count(quantity);
    }

    let Some((pkg_amount, pkg_unit)) = package.size() else {
        return 1;
    };

    let needed_base = to_base(needed, needed_unit);
    let pkg_base = to_base(pkg_amount, pkg_unit);

    if needed_base.unit == pkg_base.unit {
        return ceil_count(needed_base.amount / pkg_base.amount);
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(amount: Option<f64>, unit: Option<Unit>, piece_count: Option<u32>) -> ParsedPackage {
        ParsedPackage {
            amount,
            unit,
            piece_count,
        }
    }

    #[test]
    fn test_parse_table() {
        let cases: &[(&str, Option<f64>, Option<Unit>, Option<u32>)] = &[
            ("REWE Bio Zwiebel Duo 150g", Some(150.0), Some(Unit::Gram), Some(2)),
            ("Mehl Type 405 1kg", Some(1000.0), Some(Unit::Gram), None),
            ("Vollmilch 3,5% 1l", Some(1000.0), Some(Unit::Milliliter), None),
            ("Sahne 200 ml", Some(200.0), Some(Unit::Milliliter), None),
            ("Kartoffeln 2,5 kg Sack", Some(2500.0), Some(Unit::Gram), Some(3)),
            ("Mineralwasser 6 x 1,5 l", Some(9000.0), Some(Unit::Milliliter), Some(6)),
            ("Joghurt 4x125g", Some(500.0), Some(Unit::Gram), Some(4)),
            ("Eier 10 Stück", Some(10.0), Some(Unit::Piece), None),
            ("Bio Eier 6 Stk.", Some(6.0), Some(Unit::Piece), None),
            ("Paprika Trio 500g", Some(500.0), Some(Unit::Gram), Some(3)),
            ("Avocado Doppelpack", None, None, Some(2)),
            ("Limetten Dreierpack", None, None, Some(3)),
            ("Mozzarella 3er Pack 375g", Some(375.0), Some(Unit::Gram), Some(3)),
            ("Brötchen 10er-Pack", None, None, Some(10)),
            ("Zitronen im Netz", None, None, Some(3)),
            ("Tomaten Schale 250 g", Some(250.0), Some(Unit::Gram), Some(3)),
            ("Äpfel Korb", None, None, Some(3)),
            ("Basilikum", None, None, None),
            ("", None, None, None),
            ("Glas 0,5 L", Some(500.0), Some(Unit::Milliliter), None),
        ];

        for (text, amount, unit, piece_count) in cases {
            let parsed = parse_package_size(text);
            assert_eq!(
                parsed,
                package(*amount, unit.clone(), *piece_count),
                "label '{text}'"
            );
        }
    }

    #[test]
    fn test_unit_must_stand_alone() {
        let parsed = parse_package_size("Lauch 2 Stangen");
        assert!(parsed.is_empty());

        let parsed = parse_package_size("Gouda 48% gerieben");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_spoon_always_one() {
        let pkg = package(Some(100.0), Some(Unit::Gram), None);
        assert_eq!(resolve_package_quantity(12.0, &Unit::Tablespoon, &pkg), 1);
        assert_eq!(resolve_package_quantity(40.0, &Unit::Teaspoon, &pkg), 1);
        assert_eq!(resolve_package_quantity(3.0, &Unit::Pinch, &ParsedPackage::default()), 1);
    }

    #[test]
    fn test_counting_against_counting_package() {
        let pkg = package(Some(6.0), Some(Unit::Piece), None);
        assert_eq!(resolve_package_quantity(10.0, &Unit::Piece, &pkg), 2);
        assert_eq!(resolve_package_quantity(6.0, &Unit::Piece, &pkg), 1);
    }

    #[test]
    fn test_counting_against_weight_package() {
        let pkg = package(Some(1000.0), Some(Unit::Gram), None);
        assert_eq!(resolve_package_quantity(4.0, &Unit::Piece, &pkg), 4);

        let pkg = package(Some(150.0), Some(Unit::Gram), Some(2));
        assert_eq!(resolve_package_quantity(3.0, &Unit::Piece, &pkg), 2);
    }

    #[test]
    fn test_counting_without_size() {
        let pkg = ParsedPackage::default();
        assert_eq!(resolve_package_quantity(2.5, &Unit::Piece, &pkg), 3);
        assert_eq!(resolve_package_quantity(2.0, &Unit::Bunch, &pkg), 2);

        let pkg = package(None, None, Some(3));
        assert_eq!(resolve_package_quantity(7.0, &Unit::Piece, &pkg), 7);
    }

    #[test]
    fn test_same_dimension() {
        let pkg = package(Some(500.0), Some(Unit::Gram), None);
        assert_eq!(resolve_package_quantity(1.2, &Unit::Kilogram, &pkg), 3);
        assert_eq!(resolve_package_quantity(500.0, &Unit::Gram, &pkg), 1);
        assert_eq!(resolve_package_quantity(0.3, &Unit::Kilogram, &pkg), 1);

        let pkg = package(Some(1000.0), Some(Unit::Milliliter), None);
        assert_eq!(resolve_package_quantity(1.5, &Unit::Liter, &pkg), 2);
    }

    #[test]
    fn test_other_combinations_default_to_one() {
        let pkg = package(Some(1000.0), Some(Unit::Milliliter), None);
        assert_eq!(resolve_package_quantity(2000.0, &Unit::Gram, &pkg), 1);
        assert_eq!(resolve_package_quantity(400.0, &Unit::Gram, &ParsedPackage::default()), 1);

        let pkg = package(Some(0.0), Some(Unit::Gram), None);
        assert_eq!(resolve_package_quantity(400.0, &Unit::Gram, &pkg), 1);
    }

    #[test]
    fn test_never_zero() {
        let pkg = package(Some(500.0), Some(Unit::Gram), None);
        assert_eq!(resolve_package_quantity(0.0, &Unit::Gram, &pkg), 1);
        assert_eq!(resolve_package_quantity(-5.0, &Unit::Piece, &pkg), 1);
        assert_eq!(resolve_package_quantity(f64::NAN, &Unit::Gram, &pkg), 1);
    }

    #[test]
    fn test_or_fills_missing_parts() {
        let from_text = parse_package_size("150 g");
        let from_name = parse_package_size("Zwiebel Duo");

        let merged = from_text.or(from_name);
        assert_eq!(merged, package(Some(150.0), Some(Unit::Gram), Some(2)));
    }
}
