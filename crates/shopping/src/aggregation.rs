use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vorrat_pantry::{AliasTable, BlockList};
use vorrat_shared::pantry::PantryEntry;
use vorrat_shared::recipe::ScaledIngredient;
use vorrat_shared::unit::{Unit, compatible, sanitize_amount, to_base};

use crate::{MergeCandidate, NoopMerger, SemanticMerger};

pub const DEFAULT_MERGE_TIMEOUT: Duration = Duration::from_secs(5);

const EPSILON: f64 = 1e-9;

/// One purchasable line of the final shopping list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShoppingLineItem {
    pub ingredient_name: String,
    /// Still to buy, in `unit`.
    pub amount: f64,
    pub unit: Unit,
    pub source_recipe_ids: Vec<String>,
    /// Taken off by pantry stock, in `unit`.
    pub pantry_deducted: f64,
    pub pantry_note: Option<String>,
}

/// An aggregated need before pantry stock is taken into account.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedLine {
    pub ingredient_name: String,
    pub resolved_name: String,
    pub amount: f64,
    pub unit: Unit,
    pub source_recipe_ids: Vec<String>,
}

impl MergedLine {
    fn add_source(&mut self, recipe_id: &str) {
        if !self.source_recipe_ids.iter().any(|id| id == recipe_id) {
            self.source_recipe_ids.push(recipe_id.to_owned());
        }
    }
}

/// Groups ingredients by canonical name and unit and sums their amounts.
///
/// Units are compared as written: `200 g` and `0.3 kg` stay two lines.
/// Blocked ingredients are dropped. Lines keep the order in which their
/// first ingredient appeared.
pub fn exact_merge(
    ingredients: &[ScaledIngredient],
    aliases: &AliasTable,
    blocks: &BlockList,
) -> Vec<MergedLine> {
    let mut lines: Vec<MergedLine> = vec![];
    let mut index: HashMap<(String, Unit), usize> = HashMap::new();

    for ingredient in ingredients {
        let name = ingredient.name.trim();
        if name.is_empty() {
            continue;
        }

        if blocks.is_blocked(name, aliases) {
            tracing::debug!(ingredient = %name, "blocked, left off the shopping list");
            continue;
        }

        let resolved_name = aliases.resolve(name);
        let amount = sanitize_amount(ingredient.amount);

        match index.entry((resolved_name.to_owned(), ingredient.unit.clone())) {
            Entry::Occupied(entry) => {
                let line = &mut lines[*entry.get()];
                line.amount += amount;
                line.add_source(&ingredient.recipe_id);
            }
            Entry::Vacant(entry) => {
                entry.insert(lines.len());
                lines.push(MergedLine {
                    ingredient_name: name.to_owned(),
                    resolved_name,
                    amount,
                    unit: ingredient.unit.clone(),
                    source_recipe_ids: vec![ingredient.recipe_id.to_owned()],
                });
            }
        }
    }

    lines
}

struct StockRow {
    amount: f64,
    unit: Unit,
    base_unit: Unit,
    remaining: f64,
}

/// Pantry stock grouped by canonical name, shared by all lines of one list.
struct PantryStock {
    rows: HashMap<String, Vec<StockRow>>,
    permanent: HashMap<String, bool>,
}

impl PantryStock {
    fn new(pantry: &[PantryEntry], aliases: &AliasTable) -> Self {
        let mut rows: HashMap<String, Vec<StockRow>> = HashMap::new();
        let mut permanent: HashMap<String, bool> = HashMap::new();

        for record in pantry {
            let name = aliases.resolve(&record.ingredient_name);
            let amount = sanitize_amount(record.amount);
            let base = to_base(amount, &record.unit);

            *permanent.entry(name.to_owned()).or_default() |= record.is_permanent;
            rows.entry(name).or_default().push(StockRow {
                amount,
                unit: record.unit.clone(),
                base_unit: base.unit,
                remaining: base.amount,
            });
        }

        Self { rows, permanent }
    }

    fn deduct(&mut self, line: MergedLine) -> ShoppingLineItem {
        let base = to_base(sanitize_amount(line.amount), &line.unit);
        let mut needed = base.amount;
        let mut deducted = 0.0;
        let mut mismatched = vec![];

        if self
            .permanent
            .get(&line.resolved_name)
            .copied()
            .unwrap_or_default()
        {
            deducted = needed;
            needed = 0.0;
        } else if let Some(rows) = self.rows.get_mut(&line.resolved_name) {
            for row in rows.iter_mut() {
                let compat = compatible(&base.unit, &row.base_unit);
                if !compat.compatible {
                    if row.amount > 0.0 {
                        mismatched.push(
                            format!("{} {}", format_amount(row.amount), row.unit)
                                .trim_end()
                                .to_owned(),
                        );
                    }
                    continue;
                }

                let taken = needed.min(row.remaining * compat.factor);
                if taken <= 0.0 {
                    continue;
                }

                row.remaining -= taken / compat.factor;
                needed -= taken;
                deducted += taken;
            }
        }

        let pantry_note = if mismatched.is_empty() {
            None
        } else {
            tracing::warn!(
                ingredient = %line.resolved_name,
                unit = %line.unit,
                "pantry stock not comparable with needed unit"
            );

            Some(format!(
                "pantry has {}, not comparable with {}",
                mismatched.join(" + "),
                unit_label(&line.unit)
            ))
        };

        let factor = line.unit.base_factor();

        ShoppingLineItem {
            ingredient_name: line.ingredient_name,
            amount: needed.max(0.0) / factor,
            unit: line.unit,
            source_recipe_ids: line.source_recipe_ids,
            pantry_deducted: deducted / factor,
            pantry_note,
        }
    }
}

/// Subtracts pantry stock from merged lines and keeps what still has to be
/// bought.
///
/// Stock is matched on canonical name only and converted no further than
/// `kg`/`g`, `l`/`ml` and the `g`/`ml` pair. Permanent stock covers a line
/// completely. Lines untouched by the pantry come first, each group sorted
/// by name.
pub fn deduct_pantry(
    lines: Vec<MergedLine>,
    pantry: &[PantryEntry],
    aliases: &AliasTable,
) -> Vec<ShoppingLineItem> {
    let mut stock = PantryStock::new(pantry, aliases);

    let mut items = lines
        .into_iter()
        .map(|line| stock.deduct(line))
        .filter(|item| item.amount > EPSILON)
        .collect::<Vec<_>>();

    items.sort_by_cached_key(|item| {
        (
            item.pantry_deducted > 0.0 || item.pantry_note.is_some(),
            collation_key(&item.ingredient_name),
            item.unit.to_string(),
        )
    });

    items
}

/// Rule-based shopping list: exact merge then pantry deduction.
pub fn build_shopping_list(
    ingredients: &[ScaledIngredient],
    pantry: &[PantryEntry],
    aliases: &AliasTable,
    blocks: &BlockList,
) -> Vec<ShoppingLineItem> {
    deduct_pantry(exact_merge(ingredients, aliases, blocks), pantry, aliases)
}

/// Builds shopping lists, optionally asking a [`SemanticMerger`] to unify
/// lines of the same ingredient that ended up with different units.
pub struct ShoppingAggregator {
    merger: Box<dyn SemanticMerger>,
    timeout: Duration,
}

impl Default for ShoppingAggregator {
    fn default() -> Self {
        Self::new(NoopMerger, DEFAULT_MERGE_TIMEOUT)
    }
}

impl ShoppingAggregator {
    pub fn new(merger: impl SemanticMerger + 'static, timeout: Duration) -> Self {
        Self {
            merger: Box::new(merger),
            timeout,
        }
    }

    pub async fn build(
        &self,
        ingredients: &[ScaledIngredient],
        pantry: &[PantryEntry],
        aliases: &AliasTable,
        blocks: &BlockList,
    ) -> Vec<ShoppingLineItem> {
        let lines = exact_merge(ingredients, aliases, blocks);
        let lines = self.semantic_merge(lines, aliases).await;

        deduct_pantry(lines, pantry, aliases)
    }

    async fn semantic_merge(
        &self,
        lines: Vec<MergedLine>,
        aliases: &AliasTable,
    ) -> Vec<MergedLine> {
        let mut groups: Vec<Vec<MergedLine>> = vec![];
        let mut index: HashMap<String, usize> = HashMap::new();

        for line in lines {
            match index.entry(line.resolved_name.to_owned()) {
                Entry::Occupied(entry) => groups[*entry.get()].push(line),
                Entry::Vacant(entry) => {
                    entry.insert(groups.len());
                    groups.push(vec![line]);
                }
            }
        }

        let mut merged = vec![];

        for group in groups {
            if group.len() > 1 {
                merged.extend(self.merge_group(group, aliases).await);
            } else {
                merged.extend(group);
            }
        }

        merged
    }

    async fn merge_group(&self, group: Vec<MergedLine>, aliases: &AliasTable) -> Vec<MergedLine> {
        let Some(first) = group.first() else {
            return group;
        };

        let candidates = group
            .iter()
            .map(|line| MergeCandidate {
                name: line.ingredient_name.to_owned(),
                amount: line.amount,
                unit: line.unit.clone(),
            })
            .collect::<Vec<_>>();

        let merged = match tokio::time::timeout(self.timeout, self.merger.merge(&candidates)).await
        {
            Ok(Ok(merged)) => merged,
            Ok(Err(err)) => {
                tracing::warn!(
                    ingredient = %first.resolved_name,
                    error = %err,
                    "semantic merge failed, keeping lines separate"
                );
                return group;
            }
            Err(_) => {
                tracing::warn!(
                    ingredient = %first.resolved_name,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "semantic merge timed out, keeping lines separate"
                );
                return group;
            }
        };

        if !is_usable(&merged, &first.resolved_name, candidates.len(), aliases) {
            tracing::warn!(
                ingredient = %first.resolved_name,
                returned = merged.len(),
                "semantic merge returned an unusable result, keeping lines separate"
            );
            return group;
        }

        // Same units in and out: every line keeps the recipes of its own input
        // line. Otherwise the result is attributed to the whole group.
        let units_unchanged = merged.len() == group.len()
            && group
                .iter()
                .all(|line| merged.iter().filter(|c| c.unit == line.unit).count() == 1);

        let mut lines: Vec<MergedLine> = vec![];

        for candidate in merged {
            let sources = match group.iter().find(|l| l.unit == candidate.unit) {
                Some(line) if units_unchanged => {
                    line.source_recipe_ids.iter().collect::<Vec<_>>()
                }
                _ => group
                    .iter()
                    .flat_map(|l| l.source_recipe_ids.iter())
                    .collect(),
            };

            if let Some(line) = lines.iter_mut().find(|l| l.unit == candidate.unit) {
                line.amount += candidate.amount;
                for id in sources {
                    line.add_source(id);
                }
                continue;
            }

            let mut line = MergedLine {
                ingredient_name: first.ingredient_name.to_owned(),
                resolved_name: first.resolved_name.to_owned(),
                amount: candidate.amount,
                unit: candidate.unit,
                source_recipe_ids: vec![],
            };

            for id in sources {
                line.add_source(id);
            }

            lines.push(line);
        }

        tracing::debug!(
            ingredient = %first.resolved_name,
            before = group.len(),
            after = lines.len(),
            "semantic merge applied"
        );

        lines
    }
}

fn is_usable(
    merged: &[MergeCandidate],
    resolved_name: &str,
    submitted: usize,
    aliases: &AliasTable,
) -> bool {
    !merged.is_empty()
        && merged.len() <= submitted
        && merged.iter().all(|candidate| {
            candidate.amount.is_finite()
                && candidate.amount >= 0.0
                && aliases.resolve(&candidate.name) == resolved_name
        })
}

/// Case and umlaut insensitive sort key, "Äpfel" sorts with "Apfel".
pub fn collation_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());

    for c in name.trim().chars().flat_map(char::to_lowercase) {
        match c {
            'ä' => key.push('a'),
            'ö' => key.push('o'),
            'ü' => key.push('u'),
            'ß' => key.push_str("ss"),
            c => key.push(c),
        }
    }

    key
}

fn format_amount(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded}")
    }
}

fn unit_label(unit: &Unit) -> &str {
    match unit {
        Unit::Piece => "pieces",
        other => other.as_str(),
    }
}
