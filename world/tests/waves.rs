use std::{sync::mpsc, thread, time::Duration};

use squad_defence_core::{
    Balance, CharacterDefinition, CharacterId, Command, Event, GameOverReason, Party, Rarity,
    RecipeTable, RosterTable, SessionRules, SpawnStop, UnitStats, WaveCurve, WaveNumber,
    WavePhase,
};
use squad_defence_world::{self as world, query, World};

fn balance(quota: u32, interval_ms: u64, window_ms: u64, cap: u32) -> Balance {
    Balance {
        curve: WaveCurve {
            base_monster_count: quota,
            monster_count_step: 0,
            max_monster_count: quota,
            base_spawn_interval_ms: interval_ms,
            spawn_interval_step_ms: 0,
            min_spawn_interval_ms: interval_ms,
            boss_every: 0,
            base_hp: 10,
            hp_growth: 1.0,
            ..WaveCurve::default()
        },
        session: SessionRules {
            wave_duration_ms: 1_000,
            spawn_window_ms: window_ms,
            population_cap: cap,
            final_wave: 0,
            ..SessionRules::default()
        },
    }
}

fn roster() -> RosterTable {
    RosterTable::from_definitions(vec![CharacterDefinition::new(
        CharacterId::new("recruit"),
        "Recruit",
        Party::new("KUK"),
        Rarity::Common,
        false,
        UnitStats {
            attack: 5,
            attack_interval: Duration::from_millis(500),
        },
    )])
}

fn started(balance: Balance) -> (World, Vec<Event>) {
    let mut world = World::new(roster(), RecipeTable::default(), balance);
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartSession, &mut events);
    (world, events)
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            now: Duration::from_millis(millis),
        },
        &mut events,
    );
    events
}

fn command(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn spawned_in(events: &[Event], wave: WaveNumber) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::MonsterSpawned { wave: w, .. } if *w == wave))
        .count()
}

#[test]
fn spawning_stops_once_the_quota_is_met() {
    let (mut world, mut events) = started(balance(3, 100, 10_000, 50));
    events.extend(tick(&mut world, 900));

    assert_eq!(spawned_in(&events, WaveNumber::FIRST), 3);
    assert!(events.contains(&Event::SpawningStopped {
        wave: WaveNumber::FIRST,
        spawned: 3,
        reason: SpawnStop::QuotaReached,
    }));
    let status = query::wave_status(&world);
    assert_eq!(status.phase, WavePhase::Holding);
    assert_eq!(status.spawned, 3);
    assert_eq!(status.quota, 3);
    assert_eq!(query::spawn_countdown(&world), None);
}

#[test]
fn spawning_stops_when_the_window_elapses() {
    let (mut world, mut events) = started(balance(10, 100, 350, 50));
    events.extend(tick(&mut world, 900));

    // Spawns at 0, 100, 200 and 300 ms fall inside the window; 400 ms does not.
    assert_eq!(spawned_in(&events, WaveNumber::FIRST), 4);
    assert!(events.contains(&Event::SpawningStopped {
        wave: WaveNumber::FIRST,
        spawned: 4,
        reason: SpawnStop::WindowElapsed,
    }));
    assert!(query::wave_status(&world).spawned <= query::wave_status(&world).quota);
}

#[test]
fn wave_end_does_not_wait_for_kills_or_spawns() {
    let (mut world, _) = started(balance(10, 100, 10_000, 50));

    let events = tick(&mut world, 1_000);

    assert!(events.contains(&Event::WaveAdvanced {
        from: WaveNumber::FIRST,
        to: WaveNumber::new(2),
    }));
    let status = query::wave_status(&world);
    assert_eq!(status.wave, WaveNumber::new(2));
    assert_eq!(status.killed, 0);
    assert_eq!(status.spawned, 1);
}

#[test]
fn every_fifth_wave_spawns_exactly_one_boss() {
    let mut balance = balance(3, 100, 500, 100);
    balance.curve.boss_every = 5;
    let (mut world, mut events) = started(balance);

    for wave in 1..5 {
        events.extend(command(
            &mut world,
            Command::AdvanceWave {
                wave: WaveNumber::new(wave),
            },
        ));
    }
    events.extend(tick(&mut world, 900));

    let boss_wave = WaveNumber::new(5);
    assert_eq!(spawned_in(&events, boss_wave), 1);
    assert!(events.contains(&Event::WaveStarted {
        wave: boss_wave,
        boss: true,
        quota: 1,
    }));
    assert!(events.contains(&Event::SpawningStopped {
        wave: boss_wave,
        spawned: 1,
        reason: SpawnStop::BossWave,
    }));
    let bosses: Vec<_> = query::monster_view(&world)
        .iter()
        .filter(|monster| monster.boss)
        .map(|monster| monster.wave)
        .collect();
    assert_eq!(bosses, vec![boss_wave]);
    assert_eq!(query::phase(&world), WavePhase::Holding);
}

#[test]
fn exceeding_the_population_cap_ends_the_game_before_the_wave_timer() {
    let (mut world, _) = started(balance(10, 100, 10_000, 2));

    let events = tick(&mut world, 500);

    assert!(events.contains(&Event::GameOver {
        wave: WaveNumber::FIRST,
        reason: GameOverReason::PopulationCap { active: 3, cap: 2 },
    }));
    assert_eq!(query::phase(&world), WavePhase::GameOver);
    assert_eq!(query::wave_countdown(&world), None);
    assert_eq!(query::spawn_countdown(&world), None);

    let later = tick(&mut world, 5_000);
    assert_eq!(later, vec![Event::TimeAdvanced { now: Duration::from_secs(5) }]);
    assert_eq!(query::monster_view(&world).len(), 3);
}

#[test]
fn restart_mid_spawn_discards_the_old_session() {
    let (mut world, _) = started(balance(10, 100, 10_000, 50));
    let _ = tick(&mut world, 150);
    let granted = command(
        &mut world,
        Command::GrantCharacter {
            character: CharacterId::new("recruit"),
        },
    );
    let Some(Event::UnitGranted { unit, .. }) = granted.first().cloned() else {
        panic!("grant did not produce a unit: {granted:?}");
    };
    let doomed = query::monster_view(&world)
        .iter()
        .next()
        .map(|monster| monster.id)
        .expect("monster spawned");
    let _ = command(
        &mut world,
        Command::AttackMonster {
            attacker: unit,
            monster: doomed,
            damage: 100,
        },
    );

    let restart = command(&mut world, Command::Restart);

    assert_eq!(restart.first(), Some(&Event::SessionRestarted));
    assert!(restart.contains(&Event::WaveStarted {
        wave: WaveNumber::FIRST,
        boss: false,
        quota: 10,
    }));
    let fresh = query::monster_view(&world);
    assert_eq!(fresh.len(), 1);
    assert!(fresh.iter().all(|monster| monster.id > doomed));
    assert!(query::unit_view(&world).is_empty());
    assert_eq!(query::target_of(&world, unit), None);
    assert_eq!(query::monster_position(&world, doomed), None);

    let settle = command(&mut world, Command::SettleDeath { monster: doomed });
    assert!(settle.is_empty());

    let events = tick(&mut world, 400);
    let status = query::wave_status(&world);
    assert_eq!(status.wave, WaveNumber::FIRST);
    assert_eq!(status.total_killed, 0);
    let observed = spawned_in(&restart, WaveNumber::FIRST) + spawned_in(&events, WaveNumber::FIRST);
    assert_eq!(u32::try_from(observed).expect("small count"), status.spawned);
    // Restarted at 150 ms: spawns at 150, 250 and 350 ms.
    assert_eq!(status.spawned, 3);
}

#[test]
fn manual_advance_and_timer_advance_each_wave_once() {
    let (mut world, mut events) = started(balance(3, 100, 500, 50));

    events.extend(command(
        &mut world,
        Command::AdvanceWave {
            wave: WaveNumber::FIRST,
        },
    ));
    events.extend(command(
        &mut world,
        Command::AdvanceWave {
            wave: WaveNumber::FIRST,
        },
    ));
    events.extend(tick(&mut world, 999));

    let from_first = events
        .iter()
        .filter(|event| {
            matches!(event, Event::WaveAdvanced { from, .. } if *from == WaveNumber::FIRST)
        })
        .count();
    assert_eq!(from_first, 1);
    assert_eq!(query::wave_status(&world).wave, WaveNumber::new(2));

    let boundary = tick(&mut world, 1_000);
    assert!(boundary.contains(&Event::WaveAdvanced {
        from: WaveNumber::new(2),
        to: WaveNumber::new(3),
    }));
}

#[test]
fn start_is_ignored_while_a_session_runs() {
    let (mut world, _) = started(balance(3, 100, 500, 50));
    let _ = tick(&mut world, 250);
    let before = query::wave_status(&world);

    let events = command(&mut world, Command::StartSession);

    assert!(events.is_empty());
    assert_eq!(query::wave_status(&world), before);
}

#[test]
fn final_wave_completion_ends_the_game_until_restart() {
    let mut balance = balance(2, 100, 500, 50);
    balance.session.final_wave = 2;
    let (mut world, _) = started(balance);

    let _ = tick(&mut world, 1_000);
    let events = tick(&mut world, 2_000);

    assert!(events.contains(&Event::GameOver {
        wave: WaveNumber::new(2),
        reason: GameOverReason::FinalWaveCompleted,
    }));
    assert_eq!(query::phase(&world), WavePhase::GameOver);
    assert!(command(&mut world, Command::StartSession).is_empty());
    assert!(command(
        &mut world,
        Command::AdvanceWave {
            wave: WaveNumber::new(2)
        }
    )
    .is_empty());

    let _ = command(&mut world, Command::Restart);
    assert_eq!(query::phase(&world), WavePhase::Spawning);
    assert_eq!(query::wave_status(&world).wave, WaveNumber::FIRST);
}

#[test]
fn monsters_walk_the_path_between_ticks() {
    let (mut world, _) = started(balance(1, 100, 500, 50));
    let monster = query::monster_view(&world)
        .iter()
        .next()
        .map(|snapshot| snapshot.id)
        .expect("first monster");
    let origin = query::monster_position(&world, monster).expect("cached position");

    let _ = tick(&mut world, 500);

    let moved = query::monster_position(&world, monster).expect("cached position");
    assert_ne!(origin, moved);
    let progress = query::monster_view(&world)
        .iter()
        .next()
        .map(|snapshot| snapshot.progress)
        .expect("first monster");
    assert!(progress > 0.0 && progress < 1.0);
}

#[test]
fn zero_length_waves_still_let_ticks_return() {
    let (sender, receiver) = mpsc::channel();
    let _worker = thread::spawn(move || {
        let mut rules = balance(3, 100, 0, u32::MAX);
        rules.session.wave_duration_ms = 0;
        let (mut world, _) = started(rules);
        let events = tick(&mut world, 10);
        let _ = sender.send((query::wave_status(&world).wave, events));
    });

    let (wave, events) = receiver
        .recv_timeout(Duration::from_secs(10))
        .expect("tick returned");

    let advances = events
        .iter()
        .filter(|event| matches!(event, Event::WaveAdvanced { .. }))
        .count();
    assert_eq!(advances, 10);
    assert_eq!(wave, WaveNumber::new(11));
    assert_eq!(spawned_in(&events, WaveNumber::new(5)), 0);
}
