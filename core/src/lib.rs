#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Squad Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod balance;
mod roster;

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

pub use balance::{
    Balance, MonsterStats, PathLayout, SessionRules, WaveCurve, MIN_TIMER_GAP_MS,
};
pub use roster::{
    CharacterDefinition, CharacterId, Ingredient, IngredientFilter, Party, Rarity, Recipe,
    RecipeId, RecipeTable, RosterTable, UnitStats,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Squad Defence.";

/// Skill cooldown key armed whenever a unit performs a basic attack.
pub const BASIC_ATTACK_SKILL: &str = "basic_attack";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Begins the first wave of a fresh session. Ignored unless the world is idle.
    StartSession,
    /// Tears down the running session and starts a new one.
    Restart,
    /// Advances the simulation clock to the provided monotonic timestamp.
    Tick {
        /// Time elapsed since the world was created.
        now: Duration,
    },
    /// Ends the given wave early and moves on to the next one.
    AdvanceWave {
        /// Wave the caller believes is current; stale values are ignored.
        wave: WaveNumber,
    },
    /// Applies damage from a unit to a monster.
    AttackMonster {
        /// Unit performing the attack.
        attacker: UnitId,
        /// Monster receiving the damage.
        monster: MonsterId,
        /// Damage after mitigation.
        damage: u32,
    },
    /// Reports that a dying monster finished its death presentation.
    SettleDeath {
        /// Monster whose death settled.
        monster: MonsterId,
    },
    /// Adds a new undeployed instance of the character to the inventory.
    GrantCharacter {
        /// Definition to instantiate.
        character: CharacterId,
    },
    /// Places a unit on the field.
    DeployUnit {
        /// Unit to deploy.
        unit: UnitId,
    },
    /// Returns a unit from the field to the inventory.
    RecallUnit {
        /// Unit to recall.
        unit: UnitId,
    },
    /// Crafts the recipe from undeployed inventory units.
    CraftRecipe {
        /// Recipe to craft.
        recipe: RecipeId,
    },
    /// Crafts the first feasible recipe that consumes the character by exact id.
    EvolveCharacter {
        /// Character to evolve.
        character: CharacterId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Clock value after the tick.
        now: Duration,
    },
    /// Announces that a previous session was discarded.
    SessionRestarted,
    /// Announces that a wave began.
    WaveStarted {
        /// Wave that began.
        wave: WaveNumber,
        /// Whether the wave is a boss wave.
        boss: bool,
        /// Maximum number of spawns the wave may perform.
        quota: u32,
    },
    /// Confirms that a monster was created by the spawner.
    MonsterSpawned {
        /// Identifier assigned to the monster.
        monster: MonsterId,
        /// Wave that owns the monster.
        wave: WaveNumber,
        /// Whether the monster is a boss.
        boss: bool,
    },
    /// Reports that the spawner stopped emitting monsters for the wave.
    SpawningStopped {
        /// Wave whose spawn stream ended.
        wave: WaveNumber,
        /// Monsters spawned during the wave.
        spawned: u32,
        /// Condition that ended the stream.
        reason: SpawnStop,
    },
    /// Confirms that an attack reduced a monster's hit points.
    MonsterDamaged {
        /// Monster that was hit.
        monster: MonsterId,
        /// Unit responsible for the hit.
        attacker: UnitId,
        /// Hit points actually removed.
        damage: u32,
        /// Hit points left after the hit.
        remaining: u32,
    },
    /// Reports that a monster reached zero hit points and latched as dying.
    MonsterDying {
        /// Monster that is dying.
        monster: MonsterId,
        /// Unit that landed the final hit.
        killer: UnitId,
    },
    /// Confirms that a dying monster was removed and credited as a kill.
    MonsterKilled {
        /// Monster that was removed.
        monster: MonsterId,
        /// Wave that owned the monster.
        wave: WaveNumber,
        /// Unit credited with the kill.
        killer: UnitId,
    },
    /// Announces the transition from one wave to the next.
    WaveAdvanced {
        /// Wave that ended.
        from: WaveNumber,
        /// Wave that begins.
        to: WaveNumber,
    },
    /// Announces the terminal game-over transition.
    GameOver {
        /// Wave that was current when the game ended.
        wave: WaveNumber,
        /// Condition that ended the game.
        reason: GameOverReason,
    },
    /// Confirms that a character instance joined the inventory.
    UnitGranted {
        /// Identifier of the new instance.
        unit: UnitId,
        /// Definition the instance was created from.
        character: CharacterId,
    },
    /// Confirms that a unit was deployed.
    UnitDeployed {
        /// Unit that was deployed.
        unit: UnitId,
    },
    /// Confirms that a unit was recalled.
    UnitRecalled {
        /// Unit that was recalled.
        unit: UnitId,
    },
    /// Confirms that a recipe consumed its materials and produced a unit.
    RecipeCrafted {
        /// Recipe that was crafted.
        recipe: RecipeId,
        /// Identifier of the produced instance.
        unit: UnitId,
        /// Character of the produced instance.
        character: CharacterId,
        /// Instances consumed as materials, in allocation order.
        consumed: Vec<UnitId>,
    },
    /// Reports that a recipe could not be crafted from the current inventory.
    RecipeUnavailable {
        /// Recipe that was requested.
        recipe: RecipeId,
    },
}

/// Conditions that end a wave's spawn stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnStop {
    /// The wave spawned every monster it was allotted.
    QuotaReached,
    /// The spawn window elapsed before the quota was met.
    WindowElapsed,
    /// Boss waves spawn their single boss and never start a stream.
    BossWave,
}

/// Conditions that end a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Too many monsters were alive at once.
    PopulationCap {
        /// Active monsters at the time of evaluation.
        active: u32,
        /// Configured cap that was exceeded.
        cap: u32,
    },
    /// The final configured wave ran out its timer.
    FinalWaveCompleted,
}

/// Lifecycle phase of the wave scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WavePhase {
    /// No session has started yet.
    Idle,
    /// The spawn stream of the current wave is active.
    Spawning,
    /// Spawning stopped; monsters live on until the wave timer fires.
    Holding,
    /// The wave timer fired and the wave is being wound down.
    Ending,
    /// The scheduler is moving to the next wave.
    Transitioning,
    /// Terminal phase; only a restart leaves it.
    GameOver,
}

impl WavePhase {
    /// Reports whether waves are being played.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Spawning | Self::Holding)
    }
}

/// Ordinal of a wave, starting at one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaveNumber(u32);

impl WaveNumber {
    /// Wave every session starts with.
    pub const FIRST: Self = Self(1);

    /// Creates a new wave number with the provided ordinal.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the ordinal of the wave.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Zero-based offset from the first wave.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.0.saturating_sub(1)
    }

    /// Wave that follows this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Unique identifier assigned to a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a character instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Timed modifier attached to a character instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Buff {
    /// Name of the effect.
    pub name: String,
    /// Time left before the effect expires.
    pub remaining: Duration,
}

/// Immutable representation of a single monster's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct MonsterSnapshot {
    /// Unique identifier assigned to the monster.
    pub id: MonsterId,
    /// Current hit points.
    pub hp: u32,
    /// Hit points at spawn.
    pub max_hp: u32,
    /// Flat defense of the monster.
    pub defense: u32,
    /// Damage the monster deals.
    pub damage: u32,
    /// Wave that spawned the monster.
    pub wave: WaveNumber,
    /// Visual scale relative to a regular monster.
    pub size_multiplier: f32,
    /// Position along the path loop in `[0, 1)`.
    pub progress: f32,
    /// Whether the monster latched as dying.
    pub dying: bool,
    /// Whether the monster is a boss.
    pub boss: bool,
}

/// Read-only snapshot describing all active monsters.
#[derive(Clone, Debug, Default)]
pub struct MonsterView {
    snapshots: Vec<MonsterSnapshot>,
}

impl MonsterView {
    /// Creates a new monster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MonsterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured monster snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &MonsterSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured monsters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MonsterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single character instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Unique identifier of the instance.
    pub id: UnitId,
    /// Definition the instance was created from.
    pub character: CharacterId,
    /// Current statistics.
    pub stats: UnitStats,
    /// Remaining cooldown per skill.
    pub skill_cooldowns: BTreeMap<String, Duration>,
    /// Active buffs.
    pub buffs: Vec<Buff>,
    /// Whether the instance is on the field.
    pub deployed: bool,
}

impl UnitSnapshot {
    /// Remaining cooldown of the skill, zero when absent.
    #[must_use]
    pub fn cooldown(&self, skill: &str) -> Duration {
        self.skill_cooldowns
            .get(skill)
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

/// Read-only snapshot of every character instance the player owns.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over all instances in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over undeployed instances, the pool recipes draw from.
    pub fn inventory(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter().filter(|snapshot| !snapshot.deployed)
    }

    /// Iterator over deployed instances.
    pub fn deployed(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.deployed)
    }

    /// Looks up an instance by identifier.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Scheduler counters exposed to adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaveStatus {
    /// Current lifecycle phase.
    pub phase: WavePhase,
    /// Current wave.
    pub wave: WaveNumber,
    /// Monsters spawned during the current wave.
    pub spawned: u32,
    /// Spawn quota of the current wave.
    pub quota: u32,
    /// Kills credited during the current wave.
    pub killed: u32,
    /// Kills credited during the session.
    pub total_killed: u32,
    /// Monsters currently in the active collection.
    pub active: u32,
}
