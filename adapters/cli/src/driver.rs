//! Scripted player that drives a world through a full session.

use std::{collections::VecDeque, fmt, time::Duration};

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use squad_defence_core::{
    CharacterId, Command, Event, GameOverReason, MonsterId, Rarity, UnitId, WaveNumber,
};
use squad_defence_system_unit_combat::UnitCombat;
use squad_defence_world::{self as world, query, World};
use tracing::{debug, info};

const MAX_CRAFTS_PER_STEP: usize = 16;

/// Tunables of the scripted player.
#[derive(Clone, Debug)]
pub(crate) struct DriverConfig {
    pub(crate) seed: u64,
    pub(crate) duration: Duration,
    pub(crate) tick: Duration,
    pub(crate) settle_delay: Duration,
    pub(crate) summons_per_wave: u32,
    pub(crate) field_size: usize,
}

/// Final state of a driven session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    elapsed: Duration,
    wave: WaveNumber,
    total_killed: u32,
    crafted: u32,
    units: usize,
    outcome: Option<GameOverReason>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "elapsed: {:.1}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "wave reached: {}", self.wave.get())?;
        writeln!(f, "monsters killed: {}", self.total_killed)?;
        writeln!(f, "recipes crafted: {}", self.crafted)?;
        writeln!(f, "units owned: {}", self.units)?;
        match self.outcome {
            Some(GameOverReason::PopulationCap { active, cap }) => {
                write!(f, "outcome: overrun ({active} monsters, cap {cap})")
            }
            Some(GameOverReason::FinalWaveCompleted) => write!(f, "outcome: victory"),
            None => write!(f, "outcome: still holding"),
        }
    }
}

/// Summons, crafts, deploys and attacks on behalf of the player.
#[derive(Debug)]
pub(crate) struct Driver {
    world: World,
    combat: UnitCombat,
    rng: ChaCha8Rng,
    summon_pool: Vec<CharacterId>,
    settles: Vec<(Duration, MonsterId)>,
    config: DriverConfig,
    crafted: u32,
    outcome: Option<GameOverReason>,
}

impl Driver {
    pub(crate) fn new(world: World, config: DriverConfig) -> Self {
        let summon_pool = query::roster(&world)
            .iter()
            .filter(|definition| definition.rarity() == Rarity::Common && !definition.is_unique())
            .map(|definition| definition.id().clone())
            .collect();
        Self {
            world,
            combat: UnitCombat::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            summon_pool,
            settles: Vec::new(),
            config,
            crafted: 0,
            outcome: None,
        }
    }

    /// Plays until the game ends or the configured duration elapses.
    pub(crate) fn run(mut self) -> Summary {
        self.submit(Command::StartSession);

        let mut now = Duration::ZERO;
        while now < self.config.duration && self.outcome.is_none() {
            now = now.saturating_add(self.config.tick).min(self.config.duration);
            self.submit(Command::Tick { now });
            self.settle_due(now);
            self.auto_craft();
            self.arrange_field();
            self.attack();
        }

        self.summary()
    }

    fn submit(&mut self, command: Command) {
        let mut queue = VecDeque::from([command]);
        let mut events = Vec::new();
        while let Some(command) = queue.pop_front() {
            events.clear();
            world::apply(&mut self.world, command, &mut events);
            for event in &events {
                self.observe(event, &mut queue);
            }
        }
    }

    fn observe(&mut self, event: &Event, queue: &mut VecDeque<Command>) {
        match event {
            Event::WaveStarted { wave, boss, quota } => {
                info!(wave = wave.get(), boss, quota, "summoning reinforcements");
                for _ in 0..self.config.summons_per_wave {
                    if let Some(character) = self.summon_pool.choose(&mut self.rng) {
                        queue.push_back(Command::GrantCharacter {
                            character: character.clone(),
                        });
                    }
                }
            }
            Event::MonsterDying { monster, .. } => {
                let at = query::now(&self.world).saturating_add(self.config.settle_delay);
                self.settles.push((at, *monster));
            }
            Event::RecipeCrafted {
                recipe, character, ..
            } => {
                self.crafted = self.crafted.saturating_add(1);
                info!(recipe = %recipe, character = %character, "crafted");
            }
            Event::GameOver { reason, .. } => self.outcome = Some(*reason),
            Event::SessionRestarted => self.settles.clear(),
            _ => {}
        }
    }

    fn settle_due(&mut self, now: Duration) {
        let mut due = Vec::new();
        self.settles.retain(|(at, monster)| {
            if *at <= now {
                due.push(*monster);
                false
            } else {
                true
            }
        });
        for monster in due {
            self.submit(Command::SettleDeath { monster });
        }
    }

    fn auto_craft(&mut self) {
        for _ in 0..MAX_CRAFTS_PER_STEP {
            let Some(recipe) = query::craftable(&self.world).into_iter().next() else {
                break;
            };
            self.submit(Command::CraftRecipe { recipe });
        }
    }

    /// Fills the field with the strongest units, swapping out weaker ones.
    fn arrange_field(&mut self) {
        let units = query::unit_view(&self.world);
        let mut field: Vec<(u32, UnitId)> = units
            .deployed()
            .map(|unit| (unit.stats.attack, unit.id))
            .collect();
        let mut bench: Vec<(u32, UnitId)> = units
            .inventory()
            .map(|unit| (unit.stats.attack, unit.id))
            .collect();
        bench.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut commands = Vec::new();
        for (attack, unit) in bench {
            if field.len() < self.config.field_size {
                field.push((attack, unit));
                commands.push(Command::DeployUnit { unit });
                continue;
            }

            let Some((index, &(weakest_attack, weakest))) = field
                .iter()
                .enumerate()
                .min_by_key(|(_, (attack, id))| (*attack, *id))
            else {
                break;
            };
            if attack <= weakest_attack {
                break;
            }
            debug!(recalled = weakest.get(), deployed = unit.get(), "swapping field unit");
            field[index] = (attack, unit);
            commands.push(Command::RecallUnit { unit: weakest });
            commands.push(Command::DeployUnit { unit });
        }

        for command in commands {
            self.submit(command);
        }
    }

    fn attack(&mut self) {
        let units = query::unit_view(&self.world);
        let monsters = query::monster_view(&self.world);
        let mut commands = Vec::new();
        self.combat
            .handle(query::phase(&self.world), &units, &monsters, &mut commands);
        for command in commands {
            self.submit(command);
        }
    }

    fn summary(&self) -> Summary {
        let status = query::wave_status(&self.world);
        Summary {
            elapsed: query::now(&self.world),
            wave: status.wave,
            total_killed: status.total_killed,
            crafted: self.crafted,
            units: query::unit_view(&self.world).len(),
            outcome: self.outcome,
        }
    }
}
