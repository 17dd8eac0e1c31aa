#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Recipe resolution engine shared by feasibility checks, crafting and hints.
//!
//! Every query runs the same greedy walk: ingredients are visited in
//! declaration order and each one takes the first matching materials that are
//! still unclaimed. Claimed materials are removed from the pool before the next
//! ingredient is evaluated. The walk never backtracks, so an allocation that
//! would succeed under a different assignment is deliberately not found.

use std::fmt;

use squad_defence_core::{
    CharacterId, IngredientFilter, Recipe, RecipeTable, RosterTable, UnitId, UnitView,
};

/// Undeployed character instance offered to the engine as crafting material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Material<'u> {
    /// Instance that may be consumed.
    pub unit: UnitId,
    /// Definition the instance was created from.
    pub character: &'u CharacterId,
}

/// Collects the undeployed instances of the view in ascending identifier order.
#[must_use]
pub fn materials(units: &UnitView) -> Vec<Material<'_>> {
    units
        .inventory()
        .map(|snapshot| Material {
            unit: snapshot.id,
            character: &snapshot.character,
        })
        .collect()
}

/// Materials claimed by a single ingredient during the greedy walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngredientPick {
    /// Position of the ingredient within the recipe.
    pub index: usize,
    /// Materials claimed, in pool order.
    pub chosen: Vec<UnitId>,
    /// How many more materials the ingredient needed.
    pub missing: u32,
}

/// Outcome of the greedy walk over a recipe's ingredients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    picks: Vec<IngredientPick>,
}

impl Allocation {
    /// Reports whether every ingredient obtained its full count.
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.picks.iter().all(|pick| pick.missing == 0)
    }

    /// Per-ingredient picks in declaration order.
    #[must_use]
    pub fn picks(&self) -> &[IngredientPick] {
        &self.picks
    }

    /// Every claimed material, ingredient by ingredient.
    #[must_use]
    pub fn consumed(&self) -> Vec<UnitId> {
        self.picks
            .iter()
            .flat_map(|pick| pick.chosen.iter().copied())
            .collect()
    }
}

/// Unmet part of a single ingredient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shortfall {
    /// Human-readable description of the requirement.
    pub label: String,
    /// Number of materials still needed.
    pub missing: u32,
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ×{}", self.label, self.missing)
    }
}

/// Crafting hint describing what the inventory lacks for a recipe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecipeHint {
    /// Every ingredient is satisfied.
    Ready,
    /// Unmet ingredients in declaration order.
    Missing(Vec<Shortfall>),
}

impl RecipeHint {
    /// Reports whether the hint is the fully satisfied sentinel.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for RecipeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready"),
            Self::Missing(shortfalls) => {
                for (index, shortfall) in shortfalls.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{shortfall}")?;
                }
                Ok(())
            }
        }
    }
}

/// Recipe resolution engine bound to read-only roster and recipe tables.
#[derive(Clone, Copy, Debug)]
pub struct CombineEngine<'a> {
    roster: &'a RosterTable,
    recipes: &'a RecipeTable,
}

impl<'a> CombineEngine<'a> {
    /// Creates an engine over the provided tables.
    #[must_use]
    pub const fn new(roster: &'a RosterTable, recipes: &'a RecipeTable) -> Self {
        Self { roster, recipes }
    }

    /// Runs the greedy declaration-order walk of `recipe` over `pool`.
    ///
    /// `pool` must contain only undeployed instances; its order decides which
    /// candidates an ingredient claims first.
    #[must_use]
    pub fn allocate(&self, recipe: &Recipe, pool: &[Material<'_>]) -> Allocation {
        let mut remaining: Vec<Material<'_>> = pool.to_vec();
        let mut picks = Vec::with_capacity(recipe.ingredients().len());

        for (index, ingredient) in recipe.ingredients().iter().enumerate() {
            let required = usize::try_from(ingredient.count).unwrap_or(usize::MAX);
            let mut chosen = Vec::new();
            remaining.retain(|material| {
                if chosen.len() < required && self.matches(&ingredient.filter, material) {
                    chosen.push(material.unit);
                    false
                } else {
                    true
                }
            });

            let claimed = u32::try_from(chosen.len()).unwrap_or(u32::MAX);
            picks.push(IngredientPick {
                index,
                chosen,
                missing: ingredient.count.saturating_sub(claimed),
            });
        }

        Allocation { picks }
    }

    /// Reports whether the pool satisfies every ingredient of the recipe.
    #[must_use]
    pub fn can_make_recipe(&self, recipe: &Recipe, pool: &[Material<'_>]) -> bool {
        self.allocate(recipe, pool).is_feasible()
    }

    /// Describes the shortfall of every unmet ingredient.
    #[must_use]
    pub fn recipe_hint(&self, recipe: &Recipe, pool: &[Material<'_>]) -> RecipeHint {
        let allocation = self.allocate(recipe, pool);
        if allocation.is_feasible() {
            return RecipeHint::Ready;
        }

        let shortfalls = allocation
            .picks()
            .iter()
            .filter(|pick| pick.missing > 0)
            .map(|pick| Shortfall {
                label: self.describe(&recipe.ingredients()[pick.index].filter),
                missing: pick.missing,
            })
            .collect();
        RecipeHint::Missing(shortfalls)
    }

    /// Recipes consuming the character by exact id, in declaration order.
    #[must_use]
    pub fn evolution_paths<'c>(&self, character: &'c CharacterId) -> Vec<&'c Recipe>
    where
        'a: 'c,
    {
        self.recipes.referencing(character).collect()
    }

    /// First evolution path of the character the pool can currently craft.
    #[must_use]
    pub fn can_evolve<'c>(
        &self,
        character: &'c CharacterId,
        pool: &[Material<'_>],
    ) -> Option<&'c Recipe>
    where
        'a: 'c,
    {
        self.evolution_paths(character)
            .into_iter()
            .find(|recipe| self.can_make_recipe(recipe, pool))
    }

    /// Every recipe the pool can currently craft, in declaration order.
    #[must_use]
    pub fn craftable(&self, pool: &[Material<'_>]) -> Vec<&'a Recipe> {
        self.recipes
            .iter()
            .filter(|recipe| self.can_make_recipe(recipe, pool))
            .collect()
    }

    fn matches(&self, filter: &IngredientFilter, material: &Material<'_>) -> bool {
        match filter {
            IngredientFilter::Exact(character) => material.character == character,
            IngredientFilter::Class { party, rarity } => self
                .roster
                .get(material.character)
                .is_some_and(|definition| {
                    !definition.is_unique()
                        && definition.party() == party
                        && definition.rarity() == *rarity
                }),
        }
    }

    fn describe(&self, filter: &IngredientFilter) -> String {
        match filter {
            IngredientFilter::Exact(character) => self
                .roster
                .get(character)
                .map_or_else(|| character.to_string(), |definition| definition.name().to_owned()),
            IngredientFilter::Class { party, rarity } => format!("{party} {rarity}"),
        }
    }
}
