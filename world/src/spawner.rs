//! Timer-driven spawn stream of the current wave.

use squad_defence_core::{Event, MonsterStats, SpawnStop, WavePhase};
use tracing::debug;

use crate::{
    timeline::{TimerAction, TimerHandle},
    waves, World,
};

/// Spawn bookkeeping of the current wave.
#[derive(Debug, Default)]
pub(crate) struct SpawnerState {
    pub(crate) pending: Option<TimerHandle>,
    pub(crate) spawned: u32,
    pub(crate) quota: u32,
}

impl SpawnerState {
    pub(crate) fn reset(&mut self, quota: u32) {
        self.pending = None;
        self.spawned = 0;
        self.quota = quota;
    }
}

/// Performs one spawn step and re-arms the stream while the wave allows it.
pub(crate) fn spawn_next(world: &mut World, out: &mut Vec<Event>) {
    world.spawner.pending = None;
    if world.waves.phase != WavePhase::Spawning {
        return;
    }

    let elapsed = world.clock.saturating_sub(world.waves.started_at);
    if elapsed >= world.balance.session.spawn_window() {
        stop(world, SpawnStop::WindowElapsed, out);
        return;
    }
    if world.spawner.spawned >= world.spawner.quota {
        stop(world, SpawnStop::QuotaReached, out);
        return;
    }

    let wave = world.waves.wave;
    let stats = world.balance.curve.monster_stats_for_wave(wave);
    spawn_monster(world, stats, false, out);
    if world.waves.phase != WavePhase::Spawning {
        return;
    }

    if world.spawner.spawned >= world.spawner.quota {
        stop(world, SpawnStop::QuotaReached, out);
        return;
    }

    let interval = world.balance.curve.spawn_interval_for_wave(wave);
    let fire_at = world.clock.saturating_add(interval);
    world.spawner.pending = Some(world.timeline.schedule(
        fire_at,
        TimerAction::SpawnNext {
            session: world.session,
            wave,
        },
    ));
}

/// Spawns the single boss of a boss wave.
pub(crate) fn spawn_boss(world: &mut World, out: &mut Vec<Event>) {
    let stats = world.balance.curve.boss_stats_for_wave(world.waves.wave);
    spawn_monster(world, stats, true, out);
}

fn spawn_monster(world: &mut World, stats: MonsterStats, boss: bool, out: &mut Vec<Event>) {
    let wave = world.waves.wave;
    let monster = world
        .monsters
        .spawn(wave, stats, boss, &world.balance.session.path);
    world.spawner.spawned = world.spawner.spawned.saturating_add(1);
    debug!(
        monster = monster.get(),
        wave = wave.get(),
        boss,
        hp = stats.hp,
        "monster spawned"
    );
    out.push(Event::MonsterSpawned { monster, wave, boss });
    waves::evaluate_population(world, out);
}

fn stop(world: &mut World, reason: SpawnStop, out: &mut Vec<Event>) {
    world.waves.phase = WavePhase::Holding;
    debug!(
        wave = world.waves.wave.get(),
        spawned = world.spawner.spawned,
        ?reason,
        "spawning stopped"
    );
    out.push(Event::SpawningStopped {
        wave: world.waves.wave,
        spawned: world.spawner.spawned,
        reason,
    });
}
