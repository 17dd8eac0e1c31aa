//! Recipe execution against the live inventory.

use squad_defence_core::{CharacterId, Event, RecipeId};
use squad_defence_system_combine::CombineEngine;
use tracing::debug;

use crate::World;

/// Crafts the recipe, consuming its materials atomically.
///
/// The allocation is the same greedy walk used for feasibility checks and
/// hints, so a recipe reported as craftable always succeeds here.
pub(crate) fn craft(world: &mut World, recipe_id: RecipeId, out: &mut Vec<Event>) {
    let engine = CombineEngine::new(&world.roster, &world.recipes);
    let Some(recipe) = world.recipes.get(&recipe_id) else {
        debug!(recipe = %recipe_id, "ignoring unknown recipe");
        out.push(Event::RecipeUnavailable { recipe: recipe_id });
        return;
    };
    let Some(definition) = world.roster.get(recipe.result()) else {
        debug!(
            recipe = %recipe_id,
            result = %recipe.result(),
            "recipe result is not in the roster"
        );
        out.push(Event::RecipeUnavailable { recipe: recipe_id });
        return;
    };

    let allocation = engine.allocate(recipe, &world.inventory.materials());
    if !allocation.is_feasible() {
        debug!(recipe = %recipe_id, "recipe materials are missing");
        out.push(Event::RecipeUnavailable { recipe: recipe_id });
        return;
    }

    let consumed = allocation.consumed();
    world.inventory.consume(&consumed);
    let unit = world.inventory.grant(definition);
    debug!(
        recipe = %recipe_id,
        unit = unit.get(),
        consumed = consumed.len(),
        "recipe crafted"
    );
    out.push(Event::RecipeCrafted {
        recipe: recipe_id,
        unit,
        character: definition.id().clone(),
        consumed,
    });
}

/// Crafts the first feasible recipe that consumes the character by exact id.
pub(crate) fn evolve(world: &mut World, character: &CharacterId, out: &mut Vec<Event>) {
    let engine = CombineEngine::new(&world.roster, &world.recipes);
    let pool = world.inventory.materials();
    let Some(recipe) = engine.can_evolve(character, &pool) else {
        debug!(character = %character, "no evolution path is craftable");
        return;
    };
    let recipe_id = recipe.id().clone();
    craft(world, recipe_id, out);
}
