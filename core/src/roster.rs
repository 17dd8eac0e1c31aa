//! Static character and recipe tables consumed by the simulation.

use std::{collections::BTreeMap, fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Identifier of a static character definition in the roster.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    /// Creates a character identifier from the provided string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a crafting recipe.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(String);

impl RecipeId {
    /// Creates a recipe identifier from the provided string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Faction a character belongs to, such as `KUK`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Party(String);

impl Party {
    /// Creates a party tag from the provided string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed string form of the party tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rarity tier of a character, ordered from weakest to strongest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    /// Entry tier obtained from summons.
    Common,
    /// Second tier.
    Uncommon,
    /// Third tier.
    Rare,
    /// Fourth tier.
    Epic,
    /// Highest tier.
    Legendary,
}

impl Rarity {
    /// Canonical upper-case label used by tables and hints.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Common => "COMMON",
            Self::Uncommon => "UNCOMMON",
            Self::Rare => "RARE",
            Self::Epic => "EPIC",
            Self::Legendary => "LEGENDARY",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Combat statistics carried by a character instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitStats {
    /// Raw damage dealt per attack before mitigation.
    pub attack: u32,
    /// Minimum time between two basic attacks.
    pub attack_interval: Duration,
}

/// Static, read-only description of a character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterDefinition {
    id: CharacterId,
    name: String,
    party: Party,
    rarity: Rarity,
    unique: bool,
    stats: UnitStats,
}

impl CharacterDefinition {
    /// Creates a new character definition.
    #[must_use]
    pub fn new(
        id: CharacterId,
        name: impl Into<String>,
        party: Party,
        rarity: Rarity,
        unique: bool,
        stats: UnitStats,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            party,
            rarity,
            unique,
            stats,
        }
    }

    /// Identifier of the definition.
    #[must_use]
    pub fn id(&self) -> &CharacterId {
        &self.id
    }

    /// Human-readable name shown to players.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Party the character belongs to.
    #[must_use]
    pub fn party(&self) -> &Party {
        &self.party
    }

    /// Rarity tier of the character.
    #[must_use]
    pub const fn rarity(&self) -> Rarity {
        self.rarity
    }

    /// Unique characters can only be consumed by exact-id ingredients.
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique
    }

    /// Base statistics copied into every new instance.
    #[must_use]
    pub const fn stats(&self) -> UnitStats {
        self.stats
    }
}

/// Selection rule of a recipe ingredient.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IngredientFilter {
    /// Matches instances of exactly this character, unique ones included.
    Exact(CharacterId),
    /// Matches any non-unique instance of the party and rarity.
    Class {
        /// Party the instance must belong to.
        party: Party,
        /// Rarity the instance must have.
        rarity: Rarity,
    },
}

/// Requirement of a recipe: a filter and how many instances it consumes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ingredient {
    /// Rule deciding which instances qualify.
    pub filter: IngredientFilter,
    /// Number of instances consumed.
    pub count: u32,
}

impl Ingredient {
    /// Requires `count` instances of the exact character.
    #[must_use]
    pub fn exact(character: CharacterId, count: u32) -> Self {
        Self {
            filter: IngredientFilter::Exact(character),
            count,
        }
    }

    /// Requires `count` non-unique instances of the party and rarity.
    #[must_use]
    pub fn class(party: Party, rarity: Rarity, count: u32) -> Self {
        Self {
            filter: IngredientFilter::Class { party, rarity },
            count,
        }
    }

    /// Reports whether this ingredient names the character by exact id.
    #[must_use]
    pub fn references(&self, character: &CharacterId) -> bool {
        matches!(&self.filter, IngredientFilter::Exact(id) if id == character)
    }
}

/// Crafting rule that consumes instances to produce exactly one new instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipe {
    id: RecipeId,
    ingredients: Vec<Ingredient>,
    result: CharacterId,
}

impl Recipe {
    /// Creates a recipe; ingredients are evaluated in the given order.
    #[must_use]
    pub fn new(id: RecipeId, ingredients: Vec<Ingredient>, result: CharacterId) -> Self {
        Self {
            id,
            ingredients,
            result,
        }
    }

    /// Identifier of the recipe.
    #[must_use]
    pub fn id(&self) -> &RecipeId {
        &self.id
    }

    /// Ingredients in declaration order.
    #[must_use]
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    /// Character produced by the recipe.
    #[must_use]
    pub fn result(&self) -> &CharacterId {
        &self.result
    }

    /// Total number of instances the recipe consumes.
    #[must_use]
    pub fn material_count(&self) -> u32 {
        self.ingredients
            .iter()
            .fold(0_u32, |total, ingredient| total.saturating_add(ingredient.count))
    }
}

/// Read-only table of character definitions keyed by identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RosterTable {
    definitions: BTreeMap<CharacterId, CharacterDefinition>,
}

impl RosterTable {
    /// Builds a roster from definitions. Later duplicates replace earlier ones.
    #[must_use]
    pub fn from_definitions(definitions: impl IntoIterator<Item = CharacterDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|definition| (definition.id().clone(), definition))
                .collect(),
        }
    }

    /// Looks up a definition by identifier.
    #[must_use]
    pub fn get(&self, id: &CharacterId) -> Option<&CharacterDefinition> {
        self.definitions.get(id)
    }

    /// Iterator over all definitions in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterDefinition> {
        self.definitions.values()
    }

    /// Number of definitions in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Reports whether the roster holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Read-only recipe list preserving declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipeTable {
    recipes: Vec<Recipe>,
}

impl RecipeTable {
    /// Builds a recipe table in the provided declaration order.
    #[must_use]
    pub fn from_recipes(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Looks up a recipe by identifier.
    #[must_use]
    pub fn get(&self, id: &RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id() == id)
    }

    /// Iterator over the recipes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    /// Recipes with an exact-id ingredient naming `character`, in declaration order.
    pub fn referencing<'a>(
        &'a self,
        character: &'a CharacterId,
    ) -> impl Iterator<Item = &'a Recipe> + 'a {
        self.recipes.iter().filter(move |recipe| {
            recipe
                .ingredients()
                .iter()
                .any(|ingredient| ingredient.references(character))
        })
    }

    /// Number of recipes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Reports whether the table holds no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
