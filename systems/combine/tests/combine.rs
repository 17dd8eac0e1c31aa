use std::{collections::BTreeMap, time::Duration};

use squad_defence_core::{
    CharacterDefinition, CharacterId, Ingredient, Party, Rarity, Recipe, RecipeId, RecipeTable,
    RosterTable, UnitId, UnitSnapshot, UnitStats, UnitView,
};
use squad_defence_system_combine::{materials, CombineEngine, RecipeHint, Shortfall};

fn definition(id: &str, party: &str, rarity: Rarity, unique: bool) -> CharacterDefinition {
    CharacterDefinition::new(
        CharacterId::new(id),
        id,
        Party::new(party),
        rarity,
        unique,
        UnitStats {
            attack: 12,
            attack_interval: Duration::from_millis(800),
        },
    )
}

fn roster() -> RosterTable {
    RosterTable::from_definitions(vec![
        definition("kuk-recruit", "KUK", Rarity::Common, false),
        definition("kuk-scout", "KUK", Rarity::Common, false),
        definition("kuk-hero", "KUK", Rarity::Common, true),
        definition("min-recruit", "MIN", Rarity::Common, false),
        definition("X", "MIN", Rarity::Rare, false),
        definition("kuk-captain", "KUK", Rarity::Rare, false),
    ])
}

fn unit(id: u32, character: &str, deployed: bool) -> UnitSnapshot {
    UnitSnapshot {
        id: UnitId::new(id),
        character: CharacterId::new(character),
        stats: UnitStats {
            attack: 12,
            attack_interval: Duration::from_millis(800),
        },
        skill_cooldowns: BTreeMap::new(),
        buffs: Vec::new(),
        deployed,
    }
}

fn kuk_common(count: u32) -> Ingredient {
    Ingredient::class(Party::new("KUK"), Rarity::Common, count)
}

#[test]
fn missing_exact_ingredient_is_the_only_hint() {
    let roster = roster();
    let recipe = Recipe::new(
        RecipeId::new("captain"),
        vec![kuk_common(2), Ingredient::exact(CharacterId::new("X"), 1)],
        CharacterId::new("kuk-captain"),
    );
    let recipes = RecipeTable::from_recipes(vec![recipe.clone()]);
    let engine = CombineEngine::new(&roster, &recipes);
    let units = UnitView::from_snapshots(vec![
        unit(1, "kuk-recruit", false),
        unit(2, "kuk-scout", false),
    ]);
    let pool = materials(&units);

    assert!(!engine.can_make_recipe(&recipe, &pool));
    let hint = engine.recipe_hint(&recipe, &pool);
    assert_eq!(
        hint,
        RecipeHint::Missing(vec![Shortfall {
            label: "X".to_owned(),
            missing: 1,
        }])
    );
    assert_eq!(hint.to_string(), "X ×1");
}

#[test]
fn unique_characters_never_fill_class_ingredients() {
    let roster = roster();
    let recipe = Recipe::new(
        RecipeId::new("pair"),
        vec![kuk_common(2)],
        CharacterId::new("kuk-captain"),
    );
    let recipes = RecipeTable::from_recipes(vec![recipe.clone()]);
    let engine = CombineEngine::new(&roster, &recipes);
    let units = UnitView::from_snapshots(vec![
        unit(1, "kuk-hero", false),
        unit(2, "kuk-recruit", false),
    ]);
    let pool = materials(&units);

    assert!(!engine.can_make_recipe(&recipe, &pool));
    assert_eq!(engine.recipe_hint(&recipe, &pool).to_string(), "KUK COMMON ×1");
}

#[test]
fn exact_ingredients_may_consume_unique_characters() {
    let roster = roster();
    let recipe = Recipe::new(
        RecipeId::new("ascend"),
        vec![Ingredient::exact(CharacterId::new("kuk-hero"), 1), kuk_common(1)],
        CharacterId::new("kuk-captain"),
    );
    let recipes = RecipeTable::from_recipes(vec![recipe.clone()]);
    let engine = CombineEngine::new(&roster, &recipes);
    let units = UnitView::from_snapshots(vec![
        unit(4, "kuk-hero", false),
        unit(5, "kuk-recruit", false),
    ]);
    let pool = materials(&units);

    let allocation = engine.allocate(&recipe, &pool);
    assert!(allocation.is_feasible());
    assert_eq!(allocation.consumed(), vec![UnitId::new(4), UnitId::new(5)]);
}

#[test]
fn deployed_units_are_not_materials() {
    let roster = roster();
    let recipe = Recipe::new(
        RecipeId::new("pair"),
        vec![kuk_common(2)],
        CharacterId::new("kuk-captain"),
    );
    let recipes = RecipeTable::from_recipes(vec![recipe.clone()]);
    let engine = CombineEngine::new(&roster, &recipes);
    let units = UnitView::from_snapshots(vec![
        unit(1, "kuk-recruit", true),
        unit(2, "kuk-recruit", false),
        unit(3, "kuk-scout", false),
    ]);
    let pool = materials(&units);

    let allocation = engine.allocate(&recipe, &pool);
    assert_eq!(allocation.consumed(), vec![UnitId::new(2), UnitId::new(3)]);
}

#[test]
fn greedy_walk_does_not_search_for_alternative_assignments() {
    let roster = roster();
    // The class ingredient claims the first KUK common it sees, the scout, even
    // though the exact ingredient declared after it needs that very unit.
    let recipe = Recipe::new(
        RecipeId::new("order-sensitive"),
        vec![kuk_common(1), Ingredient::exact(CharacterId::new("kuk-scout"), 1)],
        CharacterId::new("kuk-captain"),
    );
    let reordered = Recipe::new(
        RecipeId::new("order-friendly"),
        vec![Ingredient::exact(CharacterId::new("kuk-scout"), 1), kuk_common(1)],
        CharacterId::new("kuk-captain"),
    );
    let recipes = RecipeTable::from_recipes(vec![recipe.clone(), reordered.clone()]);
    let engine = CombineEngine::new(&roster, &recipes);
    let units = UnitView::from_snapshots(vec![
        unit(1, "kuk-scout", false),
        unit(2, "kuk-recruit", false),
    ]);
    let pool = materials(&units);

    assert!(!engine.can_make_recipe(&recipe, &pool));
    assert_eq!(engine.recipe_hint(&recipe, &pool).to_string(), "kuk-scout ×1");
    assert!(engine.can_make_recipe(&reordered, &pool));
}

#[test]
fn hint_and_feasibility_agree_across_inventories() {
    let roster = roster();
    let recipes = RecipeTable::from_recipes(vec![
        Recipe::new(
            RecipeId::new("a"),
            vec![kuk_common(2), Ingredient::exact(CharacterId::new("X"), 1)],
            CharacterId::new("kuk-captain"),
        ),
        Recipe::new(
            RecipeId::new("b"),
            vec![
                Ingredient::exact(CharacterId::new("min-recruit"), 2),
                kuk_common(1),
            ],
            CharacterId::new("X"),
        ),
        Recipe::new(
            RecipeId::new("c"),
            vec![Ingredient::class(Party::new("MIN"), Rarity::Rare, 1)],
            CharacterId::new("kuk-captain"),
        ),
    ]);
    let engine = CombineEngine::new(&roster, &recipes);
    let characters = ["kuk-recruit", "kuk-hero", "min-recruit", "X", "kuk-scout"];

    for mask in 0_u32..(1 << 7) {
        let snapshots = (0..7)
            .filter(|bit| mask & (1 << *bit) != 0)
            .map(|bit| unit(bit + 1, characters[bit as usize % characters.len()], false))
            .collect();
        let units = UnitView::from_snapshots(snapshots);
        let pool = materials(&units);
        for recipe in recipes.iter() {
            assert_eq!(
                engine.can_make_recipe(recipe, &pool),
                engine.recipe_hint(recipe, &pool).is_ready(),
                "hint diverged for recipe {} with mask {mask:#b}",
                recipe.id()
            );
        }
    }
}

#[test]
fn partial_matches_report_only_the_remaining_count() {
    let roster = roster();
    let recipe = Recipe::new(
        RecipeId::new("trio"),
        vec![kuk_common(3), Ingredient::exact(CharacterId::new("X"), 2)],
        CharacterId::new("kuk-captain"),
    );
    let recipes = RecipeTable::from_recipes(vec![recipe.clone()]);
    let engine = CombineEngine::new(&roster, &recipes);
    let units = UnitView::from_snapshots(vec![
        unit(1, "kuk-recruit", false),
        unit(2, "X", false),
    ]);
    let pool = materials(&units);

    assert_eq!(
        engine.recipe_hint(&recipe, &pool).to_string(),
        "KUK COMMON ×2, X ×1"
    );
}

#[test]
fn evolution_returns_first_feasible_path_in_declaration_order() {
    let roster = roster();
    let scout = CharacterId::new("kuk-scout");
    let recipes = RecipeTable::from_recipes(vec![
        Recipe::new(
            RecipeId::new("scout-to-x"),
            vec![Ingredient::exact(scout.clone(), 3)],
            CharacterId::new("X"),
        ),
        Recipe::new(
            RecipeId::new("unrelated"),
            vec![kuk_common(1)],
            CharacterId::new("kuk-captain"),
        ),
        Recipe::new(
            RecipeId::new("scout-to-captain"),
            vec![Ingredient::exact(scout.clone(), 1), kuk_common(1)],
            CharacterId::new("kuk-captain"),
        ),
        Recipe::new(
            RecipeId::new("scout-pair"),
            vec![Ingredient::exact(scout.clone(), 2)],
            CharacterId::new("kuk-captain"),
        ),
    ]);
    let engine = CombineEngine::new(&roster, &recipes);

    let paths: Vec<&str> = engine
        .evolution_paths(&scout)
        .into_iter()
        .map(|recipe| recipe.id().as_str())
        .collect();
    assert_eq!(paths, vec!["scout-to-x", "scout-to-captain", "scout-pair"]);

    let units = UnitView::from_snapshots(vec![
        unit(1, "kuk-scout", false),
        unit(2, "kuk-scout", false),
    ]);
    let pool = materials(&units);
    let chosen = engine.can_evolve(&scout, &pool).map(|recipe| recipe.id().as_str());
    assert_eq!(chosen, Some("scout-to-captain"));

    let lone = UnitView::from_snapshots(vec![unit(1, "kuk-scout", false)]);
    assert_eq!(engine.can_evolve(&scout, &materials(&lone)), None);
}

#[test]
fn craftable_lists_feasible_recipes_in_declaration_order() {
    let roster = roster();
    let recipes = RecipeTable::from_recipes(vec![
        Recipe::new(
            RecipeId::new("needs-x"),
            vec![Ingredient::exact(CharacterId::new("X"), 1)],
            CharacterId::new("kuk-captain"),
        ),
        Recipe::new(
            RecipeId::new("kuk-pair"),
            vec![kuk_common(2)],
            CharacterId::new("kuk-captain"),
        ),
        Recipe::new(
            RecipeId::new("kuk-single"),
            vec![kuk_common(1)],
            CharacterId::new("kuk-captain"),
        ),
    ]);
    let engine = CombineEngine::new(&roster, &recipes);
    let units = UnitView::from_snapshots(vec![
        unit(1, "kuk-recruit", false),
        unit(2, "kuk-recruit", false),
    ]);

    let craftable: Vec<&str> = engine
        .craftable(&materials(&units))
        .into_iter()
        .map(|recipe| recipe.id().as_str())
        .collect();
    assert_eq!(craftable, vec!["kuk-pair", "kuk-single"]);
}
