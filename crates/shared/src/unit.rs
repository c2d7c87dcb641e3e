use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical measurement unit.
///
/// `Piece` renders as the empty string and stands for a count of discrete
/// items ("2 Zwiebeln"). Anything the vocabulary does not know is kept as
/// `Other` with its lower-cased label, so it only ever matches itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Unit {
    #[default]
    Piece,
    Gram,
    Kilogram,
    Milliliter,
    Liter,
    Tablespoon,
    Teaspoon,
    Pinch,
    KnifeTip,
    Bunch,
    Can,
    Pack,
    Clove,
    Slice,
    Tub,
    Jar,
    Cup,
    Handful,
    Other(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    Weight,
    Volume,
    Spoon,
    Counting,
}

impl Unit {
    /// Folds a free-text unit (typos, plurals, abbreviations, trailing
    /// period) onto the canonical vocabulary.
    pub fn normalize(raw: &str) -> Unit {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed).trim();
        let lower = trimmed.to_lowercase();

        match lower.as_str() {
            "" | "stück" | "stueck" | "stck" | "stk" | "st" | "stücke" | "stuecke" | "x"
            | "piece" | "pieces" | "pc" | "pcs" => Unit::Piece,
            "g" | "gr" | "gramm" | "gram" | "grams" | "gramms" => Unit::Gram,
            "kg" | "kilo" | "kilos" | "kilogramm" | "kilogram" | "kilograms" => Unit::Kilogram,
            "ml" | "milliliter" | "millilitre" | "milliliters" => Unit::Milliliter,
            "l" | "liter" | "litre" | "liters" | "ltr" => Unit::Liter,
            "el" | "esslöffel" | "essloeffel" | "eßlöffel" | "tbsp" | "tablespoon"
            | "tablespoons" => Unit::Tablespoon,
            "tl" | "teelöffel" | "teeloeffel" | "tsp" | "teaspoon" | "teaspoons" => Unit::Teaspoon,
            "prise" | "prisen" | "pinch" => Unit::Pinch,
            "msp" | "messerspitze" | "messerspitzen" => Unit::KnifeTip,
            "bund" | "bünde" | "bunde" => Unit::Bunch,
            "dose" | "dosen" => Unit::Can,
            "packung" | "packungen" | "pck" | "pkg" | "päckchen" | "pack" => Unit::Pack,
            "zehe" | "zehen" => Unit::Clove,
            "scheibe" | "scheiben" => Unit::Slice,
            "becher" => Unit::Tub,
            "glas" | "gläser" | "glaeser" => Unit::Jar,
            "tasse" | "tassen" => Unit::Cup,
            "handvoll" => Unit::Handful,
            _ => Unit::Other(lower),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Unit::Piece => "",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Milliliter => "ml",
            Unit::Liter => "l",
            Unit::Tablespoon => "EL",
            Unit::Teaspoon => "TL",
            Unit::Pinch => "Prise",
            Unit::KnifeTip => "Msp",
            Unit::Bunch => "Bund",
            Unit::Can => "Dose",
            Unit::Pack => "Packung",
            Unit::Clove => "Zehe",
            Unit::Slice => "Scheibe",
            Unit::Tub => "Becher",
            Unit::Jar => "Glas",
            Unit::Cup => "Tasse",
            Unit::Handful => "Handvoll",
            Unit::Other(label) => label,
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Unit::Gram | Unit::Kilogram => UnitKind::Weight,
            Unit::Milliliter | Unit::Liter => UnitKind::Volume,
            Unit::Tablespoon | Unit::Teaspoon | Unit::Pinch | Unit::KnifeTip => UnitKind::Spoon,
            _ => UnitKind::Counting,
        }
    }

    /// Multiplier from this unit into its base unit. Only `kg` and `l`
    /// scale; everything else maps 1:1 onto itself.
    pub fn base_factor(&self) -> f64 {
        match self {
            Unit::Kilogram | Unit::Liter => 1000.0,
            _ => 1.0,
        }
    }

    pub fn base(&self) -> Unit {
        match self {
            Unit::Kilogram => Unit::Gram,
            Unit::Liter => Unit::Milliliter,
            other => other.clone(),
        }
    }

    pub fn is_counting(&self) -> bool {
        self.kind() == UnitKind::Counting
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Unit::normalize(s))
    }
}

impl From<&str> for Unit {
    fn from(value: &str) -> Self {
        Unit::normalize(value)
    }
}

impl From<String> for Unit {
    fn from(value: String) -> Self {
        Unit::normalize(&value)
    }
}

impl From<Unit> for String {
    fn from(value: Unit) -> Self {
        value.as_str().to_owned()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BaseQuantity {
    pub amount: f64,
    pub unit: Unit,
}

/// Converts to grams for weight, milliliters for volume and leaves every
/// other unit untouched.
pub fn to_base(amount: f64, unit: &Unit) -> BaseQuantity {
    BaseQuantity {
        amount: amount * unit.base_factor(),
        unit: unit.base(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Compatibility {
    pub compatible: bool,
    pub factor: f64,
}

impl Compatibility {
    pub const NONE: Compatibility = Compatibility {
        compatible: false,
        factor: 0.0,
    };

    const SAME: Compatibility = Compatibility {
        compatible: true,
        factor: 1.0,
    };
}

/// Identical units compare 1:1, and so do grams and milliliters (no
/// density model, 1 g is taken as 1 ml). Everything else is incomparable.
pub fn compatible(a: &Unit, b: &Unit) -> Compatibility {
    if a == b {
        return Compatibility::SAME;
    }

    match (a, b) {
        (Unit::Gram, Unit::Milliliter) | (Unit::Milliliter, Unit::Gram) => Compatibility::SAME,
        _ => Compatibility::NONE,
    }
}

/// Negative, NaN and infinite amounts count as zero.
pub fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_vocabulary() {
        let cases = [
            ("Stück", Unit::Piece),
            ("stk", Unit::Piece),
            ("St.", Unit::Piece),
            ("", Unit::Piece),
            ("  ", Unit::Piece),
            ("Gramm", Unit::Gram),
            ("gr.", Unit::Gram),
            ("KG", Unit::Kilogram),
            ("Liter", Unit::Liter),
            ("ml", Unit::Milliliter),
            ("Teelöffel", Unit::Teaspoon),
            ("TL", Unit::Teaspoon),
            ("Esslöffel", Unit::Tablespoon),
            ("el.", Unit::Tablespoon),
            ("Prisen", Unit::Pinch),
            ("Zehen", Unit::Clove),
            ("Dosen", Unit::Can),
        ];

        for (raw, expected) in cases {
            assert_eq!(Unit::normalize(raw), expected, "raw unit '{raw}'");
        }
    }

    #[test]
    fn test_unknown_unit_kept_lowercase() {
        assert_eq!(Unit::normalize("Stange"), Unit::Other("stange".to_owned()));
        assert_eq!(Unit::normalize("Stange").as_str(), "stange");
        assert_eq!(Unit::normalize("Stange").kind(), UnitKind::Counting);
    }

    #[test]
    fn test_classify() {
        assert_eq!(Unit::Gram.kind(), UnitKind::Weight);
        assert_eq!(Unit::Kilogram.kind(), UnitKind::Weight);
        assert_eq!(Unit::Liter.kind(), UnitKind::Volume);
        assert_eq!(Unit::Tablespoon.kind(), UnitKind::Spoon);
        assert_eq!(Unit::Pinch.kind(), UnitKind::Spoon);
        assert_eq!(Unit::Piece.kind(), UnitKind::Counting);
        assert_eq!(Unit::Bunch.kind(), UnitKind::Counting);
    }

    #[test]
    fn test_to_base_only_scales_kg_and_l() {
        let base = to_base(2.5, &Unit::Kilogram);
        assert_eq!(base.unit, Unit::Gram);
        assert_eq!(base.amount, 2.5 * 1000.0);

        let base = to_base(0.75, &Unit::Liter);
        assert_eq!(base.unit, Unit::Milliliter);
        assert_eq!(base.amount, 750.0);

        let base = to_base(3.0, &Unit::Tablespoon);
        assert_eq!(base, BaseQuantity { amount: 3.0, unit: Unit::Tablespoon });

        let base = to_base(4.0, &Unit::Piece);
        assert_eq!(base, BaseQuantity { amount: 4.0, unit: Unit::Piece });
    }

    #[test]
    fn test_to_base_is_stable_on_base_units() {
        let grams = to_base(1.2, &Unit::Kilogram);
        let again = to_base(grams.amount, &grams.unit);
        assert_eq!(again.amount, 1.2 * 1000.0);
        assert_eq!(again.unit, Unit::Gram);
    }

    #[test]
    fn test_compatible() {
        assert_eq!(compatible(&Unit::Gram, &Unit::Gram).factor, 1.0);
        assert!(compatible(&Unit::Gram, &Unit::Milliliter).compatible);
        assert!(compatible(&Unit::Milliliter, &Unit::Gram).compatible);
        assert!(!compatible(&Unit::Gram, &Unit::Piece).compatible);
        assert!(!compatible(&Unit::Tablespoon, &Unit::Teaspoon).compatible);
        assert!(!compatible(&Unit::Gram, &Unit::Kilogram).compatible);
    }

    #[test]
    fn test_sanitize_amount() {
        assert_eq!(sanitize_amount(-3.0), 0.0);
        assert_eq!(sanitize_amount(f64::NAN), 0.0);
        assert_eq!(sanitize_amount(f64::INFINITY), 0.0);
        assert_eq!(sanitize_amount(2.5), 2.5);
    }

    #[test]
    fn test_serde_uses_canonical_label() -> anyhow::Result<()> {
        let unit: Unit = serde_json::from_str("\"Stück\"")?;
        assert_eq!(unit, Unit::Piece);
        assert_eq!(serde_json::to_string(&Unit::Teaspoon)?, "\"TL\"");

        Ok(())
    }
}
