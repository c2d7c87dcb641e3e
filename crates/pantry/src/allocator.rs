use std::collections::BTreeMap;

use serde::Serialize;
use vorrat_shared::mealplan::{MealType, PlannedEntry, RecipeBook};
use vorrat_shared::pantry::PantryEntry;
use vorrat_shared::recipe::RecipeIngredient;
use vorrat_shared::unit::{Unit, compatible, sanitize_amount, to_base};

use crate::{AliasTable, BlockList};

/// How much of a pool entry is left, in its base unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Remaining {
    Unlimited,
    Finite(f64),
}

impl Remaining {
    pub fn is_available(&self) -> bool {
        match self {
            Remaining::Unlimited => true,
            Remaining::Finite(amount) => *amount > 0.0,
        }
    }
}

/// All pantry rows sharing one canonical ingredient name.
#[derive(Clone, Debug)]
pub struct PoolEntry {
    pub name: String,
    pub base_unit: Unit,
    pub starting: Remaining,
    pub remaining: Remaining,
    /// Contributing rows, soonest expiry first.
    pub records: Vec<PantryEntry>,
}

/// A decrement to apply to one pantry row, in that row's own unit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Draw {
    pub pantry_id: String,
    pub amount: f64,
}

impl PoolEntry {
    fn consume(&mut self, needed: f64) -> f64 {
        match self.remaining {
            Remaining::Unlimited => needed,
            Remaining::Finite(left) => {
                let covered = needed.min(left);
                self.remaining = Remaining::Finite((left - needed).max(0.0));
                covered
            }
        }
    }

    /// Splits a covered base amount over the contributing rows, soonest
    /// expiry first. Permanent pools never draw.
    pub fn draw(&self, base_amount: f64) -> Vec<Draw> {
        if self.starting == Remaining::Unlimited {
            return vec![];
        }

        let mut left = sanitize_amount(base_amount);
        let mut draws = vec![];

        for record in &self.records {
            if left <= 0.0 {
                break;
            }

            let factor = record.unit.base_factor();
            let available = sanitize_amount(record.amount) * factor;
            let taken = left.min(available);

            if taken > 0.0 {
                draws.push(Draw {
                    pantry_id: record.id.to_owned(),
                    amount: taken / factor,
                });
                left -= taken;
            }
        }

        draws
    }
}

/// Mutable pantry stock keyed by canonical ingredient name.
#[derive(Clone, Debug, Default)]
pub struct PantryPool {
    entries: BTreeMap<String, PoolEntry>,
    ignored: Vec<(String, PantryEntry)>,
}

impl PantryPool {
    pub fn build(pantry: &[PantryEntry], aliases: &AliasTable) -> Self {
        let mut pool = PantryPool::default();

        for record in pantry {
            let name = aliases.resolve(&record.ingredient_name);
            let base = to_base(sanitize_amount(record.amount), &record.unit);

            match pool.entries.get_mut(&name) {
                None => {
                    let remaining = if record.is_permanent {
                        Remaining::Unlimited
                    } else {
                        Remaining::Finite(base.amount)
                    };

                    pool.entries.insert(
                        name.to_owned(),
                        PoolEntry {
                            name,
                            base_unit: base.unit,
                            starting: remaining,
                            remaining,
                            records: vec![record.clone()],
                        },
                    );
                }
                Some(entry) => {
                    let compat = compatible(&entry.base_unit, &base.unit);
                    if !compat.compatible {
                        tracing::debug!(
                            ingredient = %name,
                            pool_unit = %entry.base_unit,
                            record_unit = %base.unit,
                            "pantry row left out of pool, unit differs"
                        );
                        pool.ignored.push((name.to_owned(), record.clone()));
                        continue;
                    }

                    entry.remaining = match (entry.remaining, record.is_permanent) {
                        (Remaining::Unlimited, _) | (_, true) => Remaining::Unlimited,
                        (Remaining::Finite(left), false) => {
                            Remaining::Finite(left + base.amount * compat.factor)
                        }
                    };
                    entry.starting = entry.remaining;
                    entry.records.push(record.clone());
                }
            }
        }

        for entry in pool.entries.values_mut() {
            entry
                .records
                .sort_by(|a, b| match (a.expiry_date, b.expiry_date) {
                    (Some(a_exp), Some(b_exp)) => a_exp.cmp(&b_exp).then_with(|| a.id.cmp(&b.id)),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => a.id.cmp(&b.id),
                });
        }

        pool
    }

    pub fn get(&self, name: &str) -> Option<&PoolEntry> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &PoolEntry> {
        self.entries.values()
    }

    /// Stock left after allocation, back in each row's display unit.
    pub fn unassigned(&self) -> Vec<UnassignedPantry> {
        let mut unassigned = vec![];

        for entry in self.entries.values() {
            if !entry.remaining.is_available() {
                continue;
            }

            let shown = match entry.starting {
                Remaining::Unlimited => entry.records.iter().find(|r| r.is_permanent),
                Remaining::Finite(_) => entry.records.first(),
            };

            let Some(shown) = shown else {
                continue;
            };

            let amount = match entry.remaining {
                Remaining::Unlimited => sanitize_amount(shown.amount),
                Remaining::Finite(left) => left / shown.unit.base_factor(),
            };

            unassigned.push(UnassignedPantry::from_record(
                shown,
                entry.name.to_owned(),
                amount,
                entry.starting == Remaining::Unlimited,
            ));
        }

        for (name, record) in &self.ignored {
            unassigned.push(UnassignedPantry::from_record(
                record,
                name.to_owned(),
                sanitize_amount(record.amount),
                record.is_permanent,
            ));
        }

        unassigned.sort_by(|a, b| {
            a.resolved_name
                .cmp(&b.resolved_name)
                .then_with(|| a.id.cmp(&b.id))
        });

        unassigned
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnassignedPantry {
    pub id: String,
    pub ingredient_name: String,
    pub resolved_name: String,
    pub amount: f64,
    pub unit: Unit,
    pub is_permanent: bool,
    pub category: Option<String>,
    pub expiry_date: Option<u64>,
}

impl UnassignedPantry {
    fn from_record(
        record: &PantryEntry,
        resolved_name: String,
        amount: f64,
        is_permanent: bool,
    ) -> Self {
        Self {
            id: record.id.to_owned(),
            ingredient_name: record.ingredient_name.to_owned(),
            resolved_name,
            amount,
            unit: record.unit.clone(),
            is_permanent,
            category: record.category.to_owned(),
            expiry_date: record.expiry_date,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AllocationResult {
    pub ingredient_name: String,
    pub resolved_name: String,
    pub needed_amount: f64,
    pub needed_unit: Unit,
    pub needed_base_amount: f64,
    pub needed_base_unit: Unit,
    pub covered_base_amount: f64,
    pub is_covered: bool,
    pub is_partial: bool,
    pub is_missing: bool,
    pub is_blocked: bool,
    pub unit_mismatch: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecipeAllocation {
    pub entry_id: String,
    pub recipe_id: String,
    pub day_of_week: u8,
    pub meal_type: MealType,
    pub servings: u16,
    pub ingredients: Vec<AllocationResult>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Allocation {
    pub recipes: Vec<RecipeAllocation>,
    pub unassigned: Vec<UnassignedPantry>,
}

/// Walks planned meals in chronological order and consumes pantry stock.
///
/// The allocator only computes a report; it never writes anything back.
pub struct PantryAllocator<'a> {
    aliases: &'a AliasTable,
    blocks: &'a BlockList,
    pool: PantryPool,
}

impl<'a> PantryAllocator<'a> {
    pub fn new(pantry: &[PantryEntry], aliases: &'a AliasTable, blocks: &'a BlockList) -> Self {
        Self {
            aliases,
            blocks,
            pool: PantryPool::build(pantry, aliases),
        }
    }

    pub fn pool(&self) -> &PantryPool {
        &self.pool
    }

    pub fn allocate(mut self, entries: &[PlannedEntry], recipes: &RecipeBook) -> Allocation {
        let mut ordered = entries.iter().collect::<Vec<_>>();
        ordered.sort_by(|a, b| {
            a.chronological_key()
                .cmp(&b.chronological_key())
                .then_with(|| a.id.cmp(&b.id))
        });

        let allocations = ordered
            .into_iter()
            .map(|entry| {
                let ingredients: &[RecipeIngredient] = match recipes.get(&entry.recipe_id) {
                    Some(ingredients) => ingredients.as_slice(),
                    None => {
                        tracing::debug!(
                            entry_id = %entry.id,
                            recipe_id = %entry.recipe_id,
                            "planned recipe has no ingredients"
                        );
                        &[]
                    }
                };

                self.allocate_entry(entry, ingredients)
            })
            .collect();

        Allocation {
            recipes: allocations,
            unassigned: self.pool.unassigned(),
        }
    }

    pub fn allocate_entry(
        &mut self,
        entry: &PlannedEntry,
        ingredients: &[RecipeIngredient],
    ) -> RecipeAllocation {
        let factor = entry.scale_factor();

        let ingredients = ingredients
            .iter()
            .filter(|ingredient| !ingredient.is_optional)
            .map(|ingredient| self.allocate_ingredient(ingredient, factor))
            .collect();

        RecipeAllocation {
            entry_id: entry.id.to_owned(),
            recipe_id: entry.recipe_id.to_owned(),
            day_of_week: entry.day_of_week,
            meal_type: entry.meal_type,
            servings: entry.servings,
            ingredients,
        }
    }

    fn allocate_ingredient(
        &mut self,
        ingredient: &RecipeIngredient,
        factor: f64,
    ) -> AllocationResult {
        let needed_amount = sanitize_amount(ingredient.amount * factor);
        let base = to_base(needed_amount, &ingredient.unit);
        let resolved_name = self.aliases.resolve(&ingredient.name);

        let mut result = AllocationResult {
            ingredient_name: ingredient.name.to_owned(),
            resolved_name,
            needed_amount,
            needed_unit: ingredient.unit.clone(),
            needed_base_amount: base.amount,
            needed_base_unit: base.unit,
            ..Default::default()
        };

        if self.blocks.is_blocked(&ingredient.name, self.aliases) {
            result.is_blocked = true;
            return result;
        }

        let Some(entry) = self.pool.entries.get_mut(&result.resolved_name) else {
            result.is_missing = true;
            return result;
        };

        let compat = compatible(&result.needed_base_unit, &entry.base_unit);
        if !compat.compatible {
            tracing::debug!(
                ingredient = %result.resolved_name,
                needed_unit = %result.needed_base_unit,
                pantry_unit = %entry.base_unit,
                "unit mismatch, assuming covered"
            );
            result.unit_mismatch = true;
            result.is_covered = true;
            return result;
        }

        let needed = result.needed_base_amount * compat.factor;
        let covered = entry.consume(needed);

        result.covered_base_amount = covered;
        result.is_covered = covered >= needed;
        result.is_partial = covered > 0.0 && covered < needed;
        result.is_missing = covered <= 0.0 && needed > 0.0;

        result
    }

    /// Stock left over once every planned entry has been processed.
    pub fn finish(self) -> Vec<UnassignedPantry> {
        self.pool.unassigned()
    }
}

/// Runs a whole plan against a pantry snapshot.
pub fn allocate(
    pantry: &[PantryEntry],
    aliases: &AliasTable,
    blocks: &BlockList,
    entries: &[PlannedEntry],
    recipes: &RecipeBook,
) -> Allocation {
    PantryAllocator::new(pantry, aliases, blocks).allocate(entries, recipes)
}
