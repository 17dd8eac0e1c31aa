#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Squad Defence.
//!
//! The world owns the wave scheduler, the active monster arena, the player's
//! inventory and the cooperative timeline. Every mutation enters through
//! [`apply`]; adapters and systems observe state through [`query`].

mod combat;
mod crafting;
mod inventory;
mod monsters;
mod spawner;
mod timeline;
mod waves;

use std::{collections::BTreeMap, time::Duration};

use squad_defence_core::{
    Balance, Command, Event, MonsterId, RecipeTable, RosterTable, UnitId, WavePhase,
    WELCOME_BANNER,
};
use tracing::debug;

pub use glam::Vec2;

use crate::{
    inventory::Inventory, monsters::MonsterRegistry, spawner::SpawnerState, timeline::Timeline,
    waves::WaveState,
};

/// Represents the authoritative Squad Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    roster: RosterTable,
    recipes: RecipeTable,
    balance: Balance,
    clock: Duration,
    session: u32,
    timeline: Timeline,
    waves: WaveState,
    spawner: SpawnerState,
    monsters: MonsterRegistry,
    inventory: Inventory,
    targets: BTreeMap<UnitId, MonsterId>,
}

impl World {
    /// Creates an idle world bound to the provided tables and balance.
    #[must_use]
    pub fn new(roster: RosterTable, recipes: RecipeTable, balance: Balance) -> Self {
        Self {
            banner: WELCOME_BANNER,
            roster,
            recipes,
            balance,
            clock: Duration::ZERO,
            session: 0,
            timeline: Timeline::new(),
            waves: WaveState::new(),
            spawner: SpawnerState::default(),
            monsters: MonsterRegistry::new(),
            inventory: Inventory::new(),
            targets: BTreeMap::new(),
        }
    }

    /// Moves the clock forward, advancing monsters and unit timers by the gap.
    fn advance_clock(&mut self, to: Duration) {
        let dt = to.saturating_sub(self.clock);
        if dt.is_zero() {
            return;
        }

        if self.waves.phase != WavePhase::GameOver {
            self.monsters.advance(
                dt,
                self.balance.session.monster_speed,
                &self.balance.session.path,
            );
        }
        self.inventory.advance(dt);
        self.clock = to;
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession => waves::start(world, out_events),
        Command::Restart => waves::restart(world, out_events),
        Command::Tick { now } => {
            if now < world.clock {
                debug!(?now, clock = ?world.clock, "ignoring tick from the past");
                return;
            }
            out_events.push(Event::TimeAdvanced { now });

            while let Some((fire_at, action)) = world.timeline.pop_due(now) {
                world.advance_clock(fire_at);
                waves::on_timer(world, action, out_events);
            }
            world.advance_clock(now);
            waves::evaluate_population(world, out_events);
        }
        Command::AdvanceWave { wave } => waves::advance(world, wave, out_events),
        Command::AttackMonster {
            attacker,
            monster,
            damage,
        } => combat::apply_attack(world, attacker, monster, damage, out_events),
        Command::SettleDeath { monster } => combat::settle_death(world, monster, out_events),
        Command::GrantCharacter { character } => {
            let Some(definition) = world.roster.get(&character) else {
                debug!(character = %character, "ignoring grant of unknown character");
                return;
            };
            let unit = world.inventory.grant(definition);
            out_events.push(Event::UnitGranted { unit, character });
        }
        Command::DeployUnit { unit } => {
            if world.inventory.set_deployed(unit, true) {
                out_events.push(Event::UnitDeployed { unit });
            }
        }
        Command::RecallUnit { unit } => {
            if world.inventory.set_deployed(unit, false) {
                let _ = world.targets.remove(&unit);
                out_events.push(Event::UnitRecalled { unit });
            }
        }
        Command::CraftRecipe { recipe } => crafting::craft(world, recipe, out_events),
        Command::EvolveCharacter { character } => {
            crafting::evolve(world, &character, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use squad_defence_core::{
        Balance, MonsterId, MonsterView, RecipeId, RecipeTable, RosterTable, UnitId, UnitView,
        WavePhase, WaveStatus,
    };
    use squad_defence_system_combine::{CombineEngine, RecipeHint};

    use super::{Vec2, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current simulation clock.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.clock
    }

    /// Current lifecycle phase of the wave scheduler.
    #[must_use]
    pub fn phase(world: &World) -> WavePhase {
        world.waves.phase
    }

    /// Counters of the current wave and session.
    #[must_use]
    pub fn wave_status(world: &World) -> WaveStatus {
        WaveStatus {
            phase: world.waves.phase,
            wave: world.waves.wave,
            spawned: world.spawner.spawned,
            quota: world.spawner.quota,
            killed: world.waves.killed,
            total_killed: world.waves.total_killed,
            active: u32::try_from(world.monsters.len()).unwrap_or(u32::MAX),
        }
    }

    /// Time left until the current wave ends, if a wave timer is armed.
    #[must_use]
    pub fn wave_countdown(world: &World) -> Option<Duration> {
        let handle = world.waves.end_timer?;
        world
            .timeline
            .fire_time(handle)
            .map(|fire_at| fire_at.saturating_sub(world.clock))
    }

    /// Time left until the next spawn, if one is pending.
    #[must_use]
    pub fn spawn_countdown(world: &World) -> Option<Duration> {
        let handle = world.spawner.pending?;
        world
            .timeline
            .fire_time(handle)
            .map(|fire_at| fire_at.saturating_sub(world.clock))
    }

    /// Captures a read-only view of the active monsters.
    #[must_use]
    pub fn monster_view(world: &World) -> MonsterView {
        MonsterView::from_snapshots(world.monsters.snapshots())
    }

    /// Cached world position of an active monster.
    #[must_use]
    pub fn monster_position(world: &World, monster: MonsterId) -> Option<Vec2> {
        world.monsters.position(monster)
    }

    /// Captures a read-only view of every unit the player owns.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.inventory.snapshots())
    }

    /// Monster the unit attacked most recently, while it is still active.
    #[must_use]
    pub fn target_of(world: &World, unit: UnitId) -> Option<MonsterId> {
        world.targets.get(&unit).copied()
    }

    /// Character definitions the world was created with.
    #[must_use]
    pub fn roster(world: &World) -> &RosterTable {
        &world.roster
    }

    /// Recipes the world was created with.
    #[must_use]
    pub fn recipes(world: &World) -> &RecipeTable {
        &world.recipes
    }

    /// Balance the world was created with.
    #[must_use]
    pub fn balance(world: &World) -> &Balance {
        &world.balance
    }

    /// Shortfall of the recipe against the current inventory.
    #[must_use]
    pub fn recipe_hint(world: &World, recipe: &RecipeId) -> Option<RecipeHint> {
        let recipe = world.recipes.get(recipe)?;
        let engine = CombineEngine::new(&world.roster, &world.recipes);
        Some(engine.recipe_hint(recipe, &world.inventory.materials()))
    }

    /// Recipes the current inventory can craft, in declaration order.
    ///
    /// Recipes whose result is missing from the roster are never listed since
    /// crafting them always fails.
    #[must_use]
    pub fn craftable(world: &World) -> Vec<RecipeId> {
        let engine = CombineEngine::new(&world.roster, &world.recipes);
        engine
            .craftable(&world.inventory.materials())
            .into_iter()
            .filter(|recipe| world.roster.get(recipe.result()).is_some())
            .map(|recipe| recipe.id().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squad_defence_core::{SessionRules, WaveCurve, WaveNumber};

    fn quiet_balance() -> Balance {
        Balance {
            curve: WaveCurve {
                base_monster_count: 3,
                monster_count_step: 0,
                max_monster_count: 3,
                base_spawn_interval_ms: 100,
                spawn_interval_step_ms: 0,
                min_spawn_interval_ms: 100,
                boss_every: 0,
                ..WaveCurve::default()
            },
            session: SessionRules {
                wave_duration_ms: 1_000,
                spawn_window_ms: 500,
                population_cap: 50,
                final_wave: 0,
                ..SessionRules::default()
            },
        }
    }

    fn world() -> World {
        World::new(RosterTable::default(), RecipeTable::default(), quiet_balance())
    }

    #[test]
    fn new_world_is_idle_and_greets() {
        let world = world();
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::phase(&world), WavePhase::Idle);
        assert_eq!(query::wave_countdown(&world), None);
        assert!(query::monster_view(&world).is_empty());
    }

    #[test]
    fn start_spawns_first_monster_and_arms_both_timers() {
        let mut world = world();
        let mut events = Vec::new();

        apply(&mut world, Command::StartSession, &mut events);

        assert_eq!(query::phase(&world), WavePhase::Spawning);
        assert_eq!(query::monster_view(&world).len(), 1);
        assert_eq!(query::wave_countdown(&world), Some(Duration::from_millis(1_000)));
        assert_eq!(query::spawn_countdown(&world), Some(Duration::from_millis(100)));
    }

    #[test]
    fn ticks_from_the_past_are_ignored() {
        let mut world = world();
        let mut events = Vec::new();
        apply(&mut world, Command::StartSession, &mut events);
        apply(
            &mut world,
            Command::Tick {
                now: Duration::from_millis(250),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                now: Duration::from_millis(100),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::now(&world), Duration::from_millis(250));
    }

    #[test]
    fn wave_timer_fires_at_its_absolute_time() {
        let mut world = world();
        let mut events = Vec::new();
        apply(&mut world, Command::StartSession, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                now: Duration::from_millis(1_050),
            },
            &mut events,
        );

        assert!(events.contains(&Event::WaveAdvanced {
            from: WaveNumber::FIRST,
            to: WaveNumber::new(2),
        }));
        assert_eq!(query::wave_status(&world).wave, WaveNumber::new(2));
        assert_eq!(query::wave_countdown(&world), Some(Duration::from_millis(950)));
    }
}
