//! Serde mirror of the table file and its conversion into validated tables.

use std::{collections::BTreeSet, time::Duration};

use serde::Deserialize;
use squad_defence_core::{
    Balance, CharacterDefinition, CharacterId, Ingredient, Party, Rarity, Recipe, RecipeId,
    RecipeTable, RosterTable, UnitStats,
};

use crate::{validate_balance, TableError, Tables, SUPPORTED_TABLE_VERSION};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawTables {
    version: u32,
    #[serde(default)]
    balance: Balance,
    #[serde(default)]
    characters: Vec<RawCharacter>,
    #[serde(default)]
    recipes: Vec<RawRecipe>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCharacter {
    id: CharacterId,
    name: String,
    party: Party,
    rarity: Rarity,
    #[serde(default)]
    unique: bool,
    attack: u32,
    attack_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecipe {
    id: RecipeId,
    result: CharacterId,
    ingredients: Vec<RawIngredient>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIngredient {
    character: Option<CharacterId>,
    party: Option<Party>,
    rarity: Option<Rarity>,
    #[serde(default = "default_count")]
    count: u32,
}

fn default_count() -> u32 {
    1
}

impl RawTables {
    pub(crate) fn into_tables(self) -> Result<Tables, TableError> {
        if self.version != SUPPORTED_TABLE_VERSION {
            return Err(TableError::UnsupportedVersion {
                found: self.version,
                expected: SUPPORTED_TABLE_VERSION,
            });
        }
        validate_balance(&self.balance)?;

        let mut definitions = Vec::with_capacity(self.characters.len());
        let mut known = BTreeSet::new();
        for character in self.characters {
            if !known.insert(character.id.clone()) {
                return Err(TableError::DuplicateCharacter(character.id));
            }
            if character.attack_interval_ms == 0 {
                return Err(TableError::ZeroAttackInterval(character.id));
            }
            definitions.push(CharacterDefinition::new(
                character.id,
                character.name,
                character.party,
                character.rarity,
                character.unique,
                UnitStats {
                    attack: character.attack,
                    attack_interval: Duration::from_millis(character.attack_interval_ms),
                },
            ));
        }

        let mut recipes = Vec::with_capacity(self.recipes.len());
        let mut recipe_ids = BTreeSet::new();
        for recipe in self.recipes {
            if !recipe_ids.insert(recipe.id.clone()) {
                return Err(TableError::DuplicateRecipe(recipe.id));
            }
            recipes.push(recipe.into_recipe(&known)?);
        }

        Ok(Tables {
            roster: RosterTable::from_definitions(definitions),
            recipes: RecipeTable::from_recipes(recipes),
            balance: self.balance,
        })
    }
}

impl RawRecipe {
    fn into_recipe(self, known: &BTreeSet<CharacterId>) -> Result<Recipe, TableError> {
        if self.ingredients.is_empty() {
            return Err(TableError::EmptyRecipe(self.id));
        }
        if !known.contains(&self.result) {
            return Err(TableError::UnknownCharacter {
                recipe: self.id,
                character: self.result,
            });
        }

        let mut ingredients = Vec::with_capacity(self.ingredients.len());
        for (index, raw) in self.ingredients.into_iter().enumerate() {
            if raw.count == 0 {
                return Err(TableError::ZeroCount {
                    recipe: self.id,
                    index,
                });
            }
            let ingredient = match (raw.character, raw.party, raw.rarity) {
                (Some(character), None, None) => {
                    if !known.contains(&character) {
                        return Err(TableError::UnknownCharacter {
                            recipe: self.id,
                            character,
                        });
                    }
                    Ingredient::exact(character, raw.count)
                }
                (None, Some(party), Some(rarity)) => Ingredient::class(party, rarity, raw.count),
                _ => {
                    return Err(TableError::MalformedIngredient {
                        recipe: self.id,
                        index,
                    })
                }
            };
            ingredients.push(ingredient);
        }

        Ok(Recipe::new(self.id, ingredients, self.result))
    }
}
