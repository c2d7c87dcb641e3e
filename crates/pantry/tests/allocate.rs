use vorrat_pantry::{AliasTable, BlockList, Remaining, allocate};
use vorrat_shared::mealplan::{MealType, PlannedEntry, RecipeBook};
use vorrat_shared::pantry::PantryEntry;
use vorrat_shared::recipe::RecipeIngredient;

fn pantry(id: &str, name: &str, amount: f64, unit: &str) -> PantryEntry {
    PantryEntry {
        id: id.to_owned(),
        owner_id: "john".to_owned(),
        ingredient_name: name.to_owned(),
        amount,
        unit: unit.into(),
        is_permanent: false,
        category: None,
        expiry_date: None,
    }
}

fn planned(id: &str, recipe_id: &str, day: u8, meal_type: MealType) -> PlannedEntry {
    PlannedEntry {
        id: id.to_owned(),
        recipe_id: recipe_id.to_owned(),
        day_of_week: day,
        meal_type,
        servings: 2,
        original_servings: 2,
    }
}

fn recipe(recipes: &mut RecipeBook, id: &str, ingredients: &[(&str, f64, &str)]) {
    recipes.insert(
        id.to_owned(),
        ingredients
            .iter()
            .map(|(name, amount, unit)| RecipeIngredient {
                recipe_id: id.to_owned(),
                name: (*name).to_owned(),
                amount: *amount,
                unit: (*unit).into(),
                is_optional: false,
            })
            .collect(),
    );
}

#[test]
fn test_exhausted_stock_reports_missing() {
    let mut recipes = RecipeBook::new();
    recipe(&mut recipes, "salad", &[("onion", 2.0, "")]);
    recipe(&mut recipes, "stew", &[("onion", 2.0, "")]);

    let stock = vec![pantry("p1", "onion", 2.0, "")];
    let entries = vec![
        planned("e1", "salad", 0, MealType::Dinner),
        planned("e2", "stew", 1, MealType::Dinner),
    ];

    let allocation = allocate(
        &stock,
        &AliasTable::new(),
        &BlockList::new(),
        &entries,
        &recipes,
    );

    let first = &allocation.recipes[0].ingredients[0];
    assert!(first.is_covered);
    assert!(!first.is_missing);

    let second = &allocation.recipes[1].ingredients[0];
    assert_eq!(second.covered_base_amount, 0.0);
    assert!(!second.is_covered);
    assert!(!second.is_partial);
    assert!(second.is_missing);
}

#[test]
fn test_earlier_meal_consumes_first() {
    let mut recipes = RecipeBook::new();
    recipe(&mut recipes, "salad", &[("onion", 2.0, "")]);
    recipe(&mut recipes, "stew", &[("onion", 2.0, "Stück")]);

    let stock = vec![pantry("p1", "onion", 3.0, "")];
    let entries = vec![
        planned("e2", "stew", 1, MealType::Dinner),
        planned("e1", "salad", 0, MealType::Dinner),
    ];

    let allocation = allocate(
        &stock,
        &AliasTable::new(),
        &BlockList::new(),
        &entries,
        &recipes,
    );

    let day0 = &allocation.recipes[0];
    assert_eq!(day0.entry_id, "e1");
    assert_eq!(day0.ingredients[0].covered_base_amount, 2.0);
    assert!(day0.ingredients[0].is_covered);
    assert!(!day0.ingredients[0].is_partial);

    let day1 = &allocation.recipes[1];
    assert_eq!(day1.entry_id, "e2");
    assert_eq!(day1.ingredients[0].covered_base_amount, 1.0);
    assert!(day1.ingredients[0].is_partial);
    assert!(!day1.ingredients[0].is_covered);

    assert!(allocation.unassigned.is_empty());
}

#[test]
fn test_meal_type_order_within_a_day() {
    let mut recipes = RecipeBook::new();
    recipe(&mut recipes, "omelette", &[("Ei", 3.0, "")]);
    recipe(&mut recipes, "cake", &[("Ei", 3.0, "")]);

    let stock = vec![pantry("p1", "Eier", 4.0, "")];
    let mut aliases = AliasTable::new();
    aliases.define("ei", "eier").unwrap();

    let entries = vec![
        planned("snack", "cake", 2, MealType::Snack),
        planned("breakfast", "omelette", 2, MealType::Breakfast),
    ];

    let allocation = allocate(&stock, &aliases, &BlockList::new(), &entries, &recipes);

    assert_eq!(allocation.recipes[0].entry_id, "breakfast");
    assert!(allocation.recipes[0].ingredients[0].is_covered);
    assert_eq!(allocation.recipes[1].ingredients[0].covered_base_amount, 1.0);
}

#[test]
fn test_blocked_ingredient_never_covered() {
    let mut recipes = RecipeBook::new();
    recipe(&mut recipes, "sauce", &[("tomato", 400.0, "g"), ("garlic", 2.0, "")]);

    let stock = vec![pantry("p1", "Tomato", 1.0, "kg")];
    let blocks = BlockList::from_rules([vorrat_shared::pantry::BlockRule {
        owner_id: "john".to_owned(),
        ingredient_name: "tomato".to_owned(),
    }]);

    let allocation = allocate(
        &stock,
        &AliasTable::new(),
        &blocks,
        &[planned("e1", "sauce", 0, MealType::Lunch)],
        &recipes,
    );

    let tomato = &allocation.recipes[0].ingredients[0];
    assert!(tomato.is_blocked);
    assert!(!tomato.is_covered);
    assert!(!tomato.is_missing);
    assert_eq!(tomato.covered_base_amount, 0.0);

    let garlic = &allocation.recipes[0].ingredients[1];
    assert!(garlic.is_missing);
    assert!(!garlic.is_covered);

    assert_eq!(allocation.unassigned.len(), 1);
    assert_eq!(allocation.unassigned[0].amount, 1.0);
}

#[test]
fn test_servings_scale_needed_amount() {
    let mut recipes = RecipeBook::new();
    recipe(&mut recipes, "pasta", &[("Nudeln", 250.0, "g")]);

    let stock = vec![pantry("p1", "Nudeln", 0.5, "kg")];
    let mut entry = planned("e1", "pasta", 0, MealType::Dinner);
    entry.servings = 6;

    let allocation = allocate(
        &stock,
        &AliasTable::new(),
        &BlockList::new(),
        &[entry],
        &recipes,
    );

    let pasta = &allocation.recipes[0].ingredients[0];
    assert_eq!(pasta.needed_amount, 750.0);
    assert_eq!(pasta.covered_base_amount, 500.0);
    assert!(pasta.is_partial);
}

#[test]
fn test_permanent_stock_covers_everything() {
    let mut recipes = RecipeBook::new();
    recipe(&mut recipes, "soup", &[("Salz", 2.0, "TL")]);

    let mut salt = pantry("p1", "Salz", 1.0, "TL");
    salt.is_permanent = true;

    let entries = (0..7)
        .map(|day| planned(&format!("e{day}"), "soup", day, MealType::Dinner))
        .collect::<Vec<_>>();

    let allocation = allocate(
        &[salt],
        &AliasTable::new(),
        &BlockList::new(),
        &entries,
        &recipes,
    );

    assert!(
        allocation
            .recipes
            .iter()
            .all(|r| r.ingredients[0].is_covered && r.ingredients[0].covered_base_amount == 2.0)
    );
    assert_eq!(allocation.unassigned.len(), 1);
    assert!(allocation.unassigned[0].is_permanent);
}

#[test]
fn test_covered_never_exceeds_starting_stock() {
    let mut recipes = RecipeBook::new();
    recipe(
        &mut recipes,
        "a",
        &[("Mehl", 0.4, "kg"), ("Milch", 300.0, "ml"), ("Butter", 50.0, "g")],
    );
    recipe(
        &mut recipes,
        "b",
        &[("Mehl", 350.0, "g"), ("Milch", 0.5, "l"), ("Butter", 125.0, "g")],
    );

    let stock = vec![
        pantry("p1", "Mehl", 1.0, "kg"),
        pantry("p2", "Milch", 0.7, "l"),
        pantry("p3", "Butter", 100.0, "g"),
    ];

    let entries = (0..7u8)
        .flat_map(|day| {
            [
                planned(&format!("a{day}"), "a", day, MealType::Lunch),
                planned(&format!("b{day}"), "b", day, MealType::Dinner),
            ]
        })
        .collect::<Vec<_>>();

    let aliases = AliasTable::new();
    let blocks = BlockList::new();
    let allocator = vorrat_pantry::PantryAllocator::new(&stock, &aliases, &blocks);
    let starting = allocator
        .pool()
        .entries()
        .map(|e| (e.name.to_owned(), e.starting))
        .collect::<Vec<_>>();

    let allocation = allocator.allocate(&entries, &recipes);

    for (name, start) in starting {
        let Remaining::Finite(start) = start else {
            panic!("{name} should be finite");
        };

        let covered: f64 = allocation
            .recipes
            .iter()
            .flat_map(|r| r.ingredients.iter())
            .filter(|i| i.resolved_name == name)
            .map(|i| i.covered_base_amount)
            .sum();

        assert!(covered <= start + 1e-9, "{name}: {covered} > {start}");
    }
}

#[test]
fn test_allocation_is_deterministic() -> anyhow::Result<()> {
    let mut recipes = RecipeBook::new();
    recipe(&mut recipes, "a", &[("Reis", 200.0, "g"), ("Zwiebel", 1.0, "")]);
    recipe(&mut recipes, "b", &[("Reis", 300.0, "g"), ("Paprika", 2.0, "")]);

    let stock = vec![
        pantry("p1", "Reis", 400.0, "g"),
        pantry("p2", "Zwiebel", 5.0, ""),
        pantry("p3", "Zucker", 1.0, "kg"),
    ];

    let mut entries = vec![
        planned("e1", "a", 0, MealType::Lunch),
        planned("e2", "b", 0, MealType::Dinner),
        planned("e3", "a", 3, MealType::Breakfast),
        planned("e4", "b", 5, MealType::Snack),
    ];

    let aliases = AliasTable::new();
    let blocks = BlockList::new();

    let first = serde_json::to_string(&allocate(&stock, &aliases, &blocks, &entries, &recipes))?;
    let second = serde_json::to_string(&allocate(&stock, &aliases, &blocks, &entries, &recipes))?;
    assert_eq!(first, second);

    entries.reverse();
    let reversed = serde_json::to_string(&allocate(&stock, &aliases, &blocks, &entries, &recipes))?;
    assert_eq!(first, reversed);

    Ok(())
}
