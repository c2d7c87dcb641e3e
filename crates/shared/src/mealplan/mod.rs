use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

use crate::recipe::{RecipeIngredient, ScaledIngredient};
use crate::unit::sanitize_amount;

/// Meal slots within a day, declared in consumption order.
#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    #[default]
    Dinner,
    Snack,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedEntry {
    pub id: String,
    pub recipe_id: String,
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: u8,
    pub meal_type: MealType,
    pub servings: u16,
    pub original_servings: u16,
}

impl PlannedEntry {
    /// `servings / original_servings`, or 1 when the recipe has no serving
    /// count recorded.
    pub fn scale_factor(&self) -> f64 {
        if self.original_servings == 0 {
            return 1.0;
        }

        f64::from(self.servings) / f64::from(self.original_servings)
    }

    pub fn chronological_key(&self) -> (u8, MealType) {
        (self.day_of_week, self.meal_type)
    }
}

pub type RecipeBook = HashMap<String, Vec<RecipeIngredient>>;

/// Flattens a plan into scaled ingredients in chronological order.
/// Optional ingredients and entries whose recipe is unknown are skipped.
pub fn scale_plan(entries: &[PlannedEntry], recipes: &RecipeBook) -> Vec<ScaledIngredient> {
    let mut ordered = entries.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| {
        a.chronological_key()
            .cmp(&b.chronological_key())
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut scaled = vec![];

    for entry in ordered {
        let Some(ingredients) = recipes.get(&entry.recipe_id) else {
            continue;
        };

        let factor = entry.scale_factor();

        for ingredient in ingredients.iter().filter(|i| !i.is_optional) {
            scaled.push(ScaledIngredient {
                recipe_id: entry.recipe_id.to_owned(),
                name: ingredient.name.to_owned(),
                amount: sanitize_amount(ingredient.amount * factor),
                unit: ingredient.unit.clone(),
            });
        }
    }

    scaled
}
