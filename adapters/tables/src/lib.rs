#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! TOML loader for the static roster, recipe and balance tables.
//!
//! A table file carries a format `version`, an optional `[balance]` section
//! overriding the default tuning, a `[[characters]]` array and a `[[recipes]]`
//! array. Recipes keep their file order, which is the declaration order the
//! combine engine walks. Every reference is validated before the tables are
//! handed to the world.

mod raw;

use std::{
    fs,
    path::{Path, PathBuf},
};

use squad_defence_core::{Balance, CharacterId, RecipeId, RecipeTable, RosterTable};

/// Version of the table format understood by this loader.
pub const SUPPORTED_TABLE_VERSION: u32 = 1;

const BUNDLED_TABLES: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/squad.toml"));

/// Errors raised while reading or validating table files.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The table file could not be read.
    #[error("failed to read tables at {}", .path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The contents are not valid TOML for the table schema.
    #[error("failed to parse table toml contents")]
    Parse(#[from] toml::de::Error),
    /// The file declares a format this loader does not understand.
    #[error("unsupported table version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version declared by the file.
        found: u32,
        /// Version understood by the loader.
        expected: u32,
    },
    /// Two characters share an identifier.
    #[error("duplicate character `{0}`")]
    DuplicateCharacter(CharacterId),
    /// Two recipes share an identifier.
    #[error("duplicate recipe `{0}`")]
    DuplicateRecipe(RecipeId),
    /// A recipe names a character missing from the roster.
    #[error("recipe `{recipe}` references unknown character `{character}`")]
    UnknownCharacter {
        /// Recipe holding the reference.
        recipe: RecipeId,
        /// Character that could not be resolved.
        character: CharacterId,
    },
    /// An ingredient sets neither or both of `character` and `party`/`rarity`.
    #[error("ingredient {index} of recipe `{recipe}` must name either a character or a party and rarity")]
    MalformedIngredient {
        /// Recipe holding the ingredient.
        recipe: RecipeId,
        /// Position of the ingredient within the recipe.
        index: usize,
    },
    /// An ingredient requires zero materials.
    #[error("ingredient {index} of recipe `{recipe}` has a zero count")]
    ZeroCount {
        /// Recipe holding the ingredient.
        recipe: RecipeId,
        /// Position of the ingredient within the recipe.
        index: usize,
    },
    /// A recipe lists no ingredients.
    #[error("recipe `{0}` has no ingredients")]
    EmptyRecipe(RecipeId),
    /// A character attacks with a zero interval.
    #[error("character `{0}` must have a positive attack interval")]
    ZeroAttackInterval(CharacterId),
    /// A balance value would break the monotonic scaling or the scheduler.
    #[error("invalid balance: {0}")]
    InvalidBalance(&'static str),
}

/// Validated tables ready to construct a world.
#[derive(Clone, Debug, PartialEq)]
pub struct Tables {
    /// Character definitions.
    pub roster: RosterTable,
    /// Recipes in declaration order.
    pub recipes: RecipeTable,
    /// Wave curve and session rules.
    pub balance: Balance,
}

impl Tables {
    /// Parses and validates tables from TOML contents.
    pub fn parse(contents: &str) -> Result<Self, TableError> {
        let raw: raw::RawTables = toml::from_str(contents)?;
        raw.into_tables()
    }

    /// Reads and validates the table file at the provided path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Tables compiled into the binary.
    pub fn bundled() -> Result<Self, TableError> {
        Self::parse(BUNDLED_TABLES)
    }
}

/// Checks the balance for values that would stall waves or shrink difficulty.
pub fn validate_balance(balance: &Balance) -> Result<(), TableError> {
    let curve = &balance.curve;
    let session = &balance.session;

    if !curve.hp_growth.is_finite() || curve.hp_growth < 1.0 {
        return Err(TableError::InvalidBalance("hp_growth must be at least 1.0"));
    }
    if !curve.boss_hp_multiplier.is_finite() || curve.boss_hp_multiplier < 1.0 {
        return Err(TableError::InvalidBalance(
            "boss_hp_multiplier must be at least 1.0",
        ));
    }
    if curve.max_monster_count < curve.base_monster_count {
        return Err(TableError::InvalidBalance(
            "max_monster_count must not be below base_monster_count",
        ));
    }
    if curve.min_spawn_interval_ms == 0 {
        return Err(TableError::InvalidBalance(
            "min_spawn_interval_ms must be positive",
        ));
    }
    if curve.base_spawn_interval_ms < curve.min_spawn_interval_ms {
        return Err(TableError::InvalidBalance(
            "base_spawn_interval_ms must not be below min_spawn_interval_ms",
        ));
    }
    if session.wave_duration_ms == 0 {
        return Err(TableError::InvalidBalance("wave_duration_ms must be positive"));
    }
    if !session.monster_speed.is_finite() || session.monster_speed < 0.0 {
        return Err(TableError::InvalidBalance(
            "monster_speed must be a non-negative number",
        ));
    }
    if !(session.path.width.is_finite() && session.path.height.is_finite())
        || session.path.width <= 0.0
        || session.path.height <= 0.0
    {
        return Err(TableError::InvalidBalance("path dimensions must be positive"));
    }
    Ok(())
}
