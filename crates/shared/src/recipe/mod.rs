use serde::{Deserialize, Serialize};

use crate::unit::Unit;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub recipe_id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub is_optional: bool,
}

/// A recipe ingredient already multiplied by its planned serving factor,
/// as fed into shopping list aggregation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaledIngredient {
    pub recipe_id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl ScaledIngredient {
    pub fn new(
        recipe_id: impl Into<String>,
        name: impl Into<String>,
        amount: f64,
        unit: impl Into<Unit>,
    ) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }
}
