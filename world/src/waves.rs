//! Wave lifecycle: session start, fixed-duration wave end, restart and game over.

use std::time::Duration;

use squad_defence_core::{Event, GameOverReason, SpawnStop, WaveNumber, WavePhase};
use tracing::{debug, info, warn};

use crate::{
    spawner,
    timeline::{TimerAction, TimerHandle},
    World,
};

/// Scheduler state of the running session.
#[derive(Debug)]
pub(crate) struct WaveState {
    pub(crate) phase: WavePhase,
    pub(crate) wave: WaveNumber,
    pub(crate) started_at: Duration,
    pub(crate) end_timer: Option<TimerHandle>,
    pub(crate) killed: u32,
    pub(crate) total_killed: u32,
}

impl WaveState {
    pub(crate) fn new() -> Self {
        Self {
            phase: WavePhase::Idle,
            wave: WaveNumber::FIRST,
            started_at: Duration::ZERO,
            end_timer: None,
            killed: 0,
            total_killed: 0,
        }
    }
}

/// Starts the first wave. Only an idle world can be started.
pub(crate) fn start(world: &mut World, out: &mut Vec<Event>) {
    if world.waves.phase != WavePhase::Idle {
        debug!(phase = ?world.waves.phase, "ignoring start request for an active session");
        return;
    }
    begin_session(world, out);
}

/// Discards the running session and starts a fresh one exactly once.
pub(crate) fn restart(world: &mut World, out: &mut Vec<Event>) {
    cancel_timers(world);
    world.monsters.clear();
    world.targets.clear();
    world.inventory.clear();
    world.session = world.session.wrapping_add(1);
    world.waves.phase = WavePhase::Idle;
    info!(session = world.session, "session restarted");
    out.push(Event::SessionRestarted);
    begin_session(world, out);
}

fn begin_session(world: &mut World, out: &mut Vec<Event>) {
    cancel_timers(world);
    world.waves.wave = WaveNumber::FIRST;
    world.waves.total_killed = 0;
    begin_wave(world, out);
}

fn begin_wave(world: &mut World, out: &mut Vec<Event>) {
    let now = world.clock;
    let wave = world.waves.wave;
    let boss = world.balance.curve.is_boss_wave(wave);
    let quota = world.balance.curve.spawn_quota(wave);
    let ends_at = now.saturating_add(world.balance.session.wave_duration());

    world.waves.started_at = now;
    world.waves.killed = 0;
    world.waves.end_timer = Some(world.timeline.schedule(
        ends_at,
        TimerAction::EndWave {
            session: world.session,
            wave,
        },
    ));
    world.spawner.reset(quota);

    info!(wave = wave.get(), boss, quota, "wave started");
    out.push(Event::WaveStarted { wave, boss, quota });

    if boss {
        world.waves.phase = WavePhase::Holding;
        spawner::spawn_boss(world, out);
        if world.waves.phase.is_running() {
            out.push(Event::SpawningStopped {
                wave,
                spawned: world.spawner.spawned,
                reason: SpawnStop::BossWave,
            });
        }
    } else {
        world.waves.phase = WavePhase::Spawning;
        spawner::spawn_next(world, out);
    }
}

/// Ends `wave` and moves to the next one, at most once per wave.
pub(crate) fn advance(world: &mut World, wave: WaveNumber, out: &mut Vec<Event>) {
    if !world.waves.phase.is_running() || world.waves.wave != wave {
        debug!(
            requested = wave.get(),
            current = world.waves.wave.get(),
            phase = ?world.waves.phase,
            "ignoring stale wave advance"
        );
        return;
    }

    world.waves.phase = WavePhase::Ending;
    cancel_timers(world);

    world.waves.phase = WavePhase::Transitioning;
    if world
        .balance
        .session
        .final_wave()
        .is_some_and(|last| wave >= last)
    {
        game_over(world, GameOverReason::FinalWaveCompleted, out);
        return;
    }

    let next = wave.next();
    world.waves.wave = next;
    info!(from = wave.get(), to = next.get(), "wave advanced");
    out.push(Event::WaveAdvanced { from: wave, to: next });
    begin_wave(world, out);
}

/// Executes a fired timer, discarding actions armed by older sessions or waves.
pub(crate) fn on_timer(world: &mut World, action: TimerAction, out: &mut Vec<Event>) {
    match action {
        TimerAction::EndWave { session, wave } => {
            if session != world.session {
                return;
            }
            world.waves.end_timer = None;
            advance(world, wave, out);
        }
        TimerAction::SpawnNext { session, wave } => {
            if session != world.session || wave != world.waves.wave {
                return;
            }
            world.spawner.pending = None;
            spawner::spawn_next(world, out);
        }
    }
}

/// Ends the game when the active population exceeds the configured cap.
pub(crate) fn evaluate_population(world: &mut World, out: &mut Vec<Event>) {
    if !world.waves.phase.is_running() {
        return;
    }

    let active = u32::try_from(world.monsters.len()).unwrap_or(u32::MAX);
    let cap = world.balance.session.population_cap;
    if active > cap {
        game_over(world, GameOverReason::PopulationCap { active, cap }, out);
    }
}

fn game_over(world: &mut World, reason: GameOverReason, out: &mut Vec<Event>) {
    cancel_timers(world);
    world.waves.phase = WavePhase::GameOver;
    warn!(wave = world.waves.wave.get(), ?reason, "game over");
    out.push(Event::GameOver {
        wave: world.waves.wave,
        reason,
    });
}

/// Cancels the wave-end and spawn timers together with anything else armed.
fn cancel_timers(world: &mut World) {
    if let Some(handle) = world.waves.end_timer.take() {
        let _ = world.timeline.cancel(handle);
    }
    if let Some(handle) = world.spawner.pending.take() {
        let _ = world.timeline.cancel(handle);
    }
    world.timeline.cancel_all();
}
