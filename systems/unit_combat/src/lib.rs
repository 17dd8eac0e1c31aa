#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits attack commands for deployed units.
//!
//! Every deployed unit whose basic attack is off cooldown strikes the living
//! monster with the lowest hit points, breaking ties by identifier. Damage
//! already queued during the same pass is subtracted from the candidates so
//! that several ready units spread out instead of piling onto one corpse.

use squad_defence_core::{
    Command, MonsterId, MonsterSnapshot, MonsterView, UnitView, WavePhase, BASIC_ATTACK_SKILL,
};

/// Damage dealt by an attack after the monster's defense mitigates it.
///
/// Defense scales damage by `100 / (100 + defense)`; every hit deals at least one point.
#[must_use]
pub fn mitigated_damage(attack: u32, defense: u32) -> u32 {
    let scaled = u64::from(attack) * 100 / (100 + u64::from(defense));
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    id: MonsterId,
    hp: u32,
    defense: u32,
}

impl From<&MonsterSnapshot> for Candidate {
    fn from(snapshot: &MonsterSnapshot) -> Self {
        Self {
            id: snapshot.id,
            hp: snapshot.hp,
            defense: snapshot.defense,
        }
    }
}

/// Unit combat system that queues attack commands for ready units.
#[derive(Debug, Default)]
pub struct UnitCombat {
    candidates: Vec<Candidate>,
    scratch: Vec<Command>,
}

impl UnitCombat {
    /// Creates a new unit combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::AttackMonster` entries for deployed units that are ready.
    pub fn handle(
        &mut self,
        phase: WavePhase,
        units: &UnitView,
        monsters: &MonsterView,
        out: &mut Vec<Command>,
    ) {
        if !phase.is_running() {
            return;
        }

        self.candidates.clear();
        self.candidates.extend(
            monsters
                .iter()
                .filter(|snapshot| !snapshot.dying && snapshot.hp > 0)
                .map(Candidate::from),
        );
        if self.candidates.is_empty() {
            return;
        }

        self.scratch.clear();
        for unit in units.deployed() {
            if !unit.cooldown(BASIC_ATTACK_SKILL).is_zero() {
                continue;
            }

            let Some(target) = self
                .candidates
                .iter_mut()
                .filter(|candidate| candidate.hp > 0)
                .min_by_key(|candidate| (candidate.hp, candidate.id))
            else {
                break;
            };

            let damage = mitigated_damage(unit.stats.attack, target.defense);
            target.hp = target.hp.saturating_sub(damage);
            self.scratch.push(Command::AttackMonster {
                attacker: unit.id,
                monster: target.id,
                damage,
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
