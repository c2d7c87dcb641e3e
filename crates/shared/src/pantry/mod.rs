use serde::{Deserialize, Serialize};

use crate::unit::Unit;

/// Stock a household has on hand. Permanent entries ("salt", "oil") are an
/// unlimited source and are never decremented.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PantryEntry {
    pub id: String,
    pub owner_id: String,
    pub ingredient_name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub is_permanent: bool,
    #[serde(default)]
    pub category: Option<String>,
    /// Unix timestamp (seconds).
    #[serde(default)]
    pub expiry_date: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    pub owner_id: String,
    pub canonical_name: String,
    pub alias_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRule {
    pub owner_id: String,
    pub ingredient_name: String,
}
