//! Attack resolution and the death settle callback.

use squad_defence_core::{Event, MonsterId, UnitId, BASIC_ATTACK_SKILL};
use tracing::debug;

use crate::{monsters::AttackOutcome, World};

/// Applies an attack from a unit to a monster.
pub(crate) fn apply_attack(
    world: &mut World,
    attacker: UnitId,
    monster: MonsterId,
    damage: u32,
    out: &mut Vec<Event>,
) {
    let Some(interval) = world.inventory.attack_interval(attacker) else {
        debug!(attacker = attacker.get(), "ignoring attack from unknown unit");
        return;
    };
    let Some(target) = world.monsters.get_mut(monster) else {
        debug!(monster = monster.get(), "ignoring attack on absent monster");
        return;
    };

    let outcome = target.take_damage(attacker, damage);
    if outcome == AttackOutcome::Ignored {
        return;
    }

    let _ = world.targets.insert(attacker, monster);
    world
        .inventory
        .arm_cooldown(attacker, BASIC_ATTACK_SKILL, interval);

    match outcome {
        AttackOutcome::Damaged { dealt, remaining } => {
            out.push(Event::MonsterDamaged {
                monster,
                attacker,
                damage: dealt,
                remaining,
            });
        }
        AttackOutcome::Latched { dealt } => {
            out.push(Event::MonsterDamaged {
                monster,
                attacker,
                damage: dealt,
                remaining: 0,
            });
            out.push(Event::MonsterDying {
                monster,
                killer: attacker,
            });
        }
        AttackOutcome::Ignored => {}
    }
}

/// Removes a dying monster and credits the kill to the current wave.
pub(crate) fn settle_death(world: &mut World, monster: MonsterId, out: &mut Vec<Event>) {
    let killer = match world.monsters.get(monster).map(|entry| entry.killer()) {
        Some(Some(killer)) => killer,
        Some(None) => {
            debug!(monster = monster.get(), "ignoring settle for a living monster");
            return;
        }
        None => {
            debug!(monster = monster.get(), "ignoring settle for an absent monster");
            return;
        }
    };
    let Some(removed) = world.monsters.remove(monster) else {
        return;
    };

    world.waves.killed = world.waves.killed.saturating_add(1);
    world.waves.total_killed = world.waves.total_killed.saturating_add(1);
    world.targets.retain(|_, target| *target != monster);

    debug!(
        monster = monster.get(),
        killer = killer.get(),
        killed = world.waves.killed,
        "monster killed"
    );
    out.push(Event::MonsterKilled {
        monster,
        wave: removed.wave(),
        killer,
    });
}
