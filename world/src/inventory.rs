//! Character instances owned by the player.

use std::{collections::BTreeMap, time::Duration};

use squad_defence_core::{Buff, CharacterDefinition, CharacterId, UnitId, UnitSnapshot, UnitStats};
use squad_defence_system_combine::Material;

#[derive(Clone, Debug)]
struct Unit {
    character: CharacterId,
    stats: UnitStats,
    skill_cooldowns: BTreeMap<String, Duration>,
    buffs: Vec<Buff>,
    deployed: bool,
}

impl Unit {
    fn from_definition(definition: &CharacterDefinition) -> Self {
        Self {
            character: definition.id().clone(),
            stats: definition.stats(),
            skill_cooldowns: BTreeMap::new(),
            buffs: Vec::new(),
            deployed: false,
        }
    }

    fn advance(&mut self, dt: Duration) {
        self.skill_cooldowns.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(dt);
            !remaining.is_zero()
        });
        self.buffs.retain_mut(|buff| {
            buff.remaining = buff.remaining.saturating_sub(dt);
            !buff.remaining.is_zero()
        });
    }
}

/// Registry of character instances keyed by identifier.
///
/// Iteration follows ascending identifiers, which is acquisition order and
/// therefore the candidate order used by recipe allocation.
#[derive(Debug)]
pub(crate) struct Inventory {
    units: BTreeMap<UnitId, Unit>,
    next_unit_id: UnitId,
}

impl Inventory {
    pub(crate) fn new() -> Self {
        Self {
            units: BTreeMap::new(),
            next_unit_id: UnitId::new(0),
        }
    }

    /// Adds an undeployed instance with the definition's base stats.
    pub(crate) fn grant(&mut self, definition: &CharacterDefinition) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get().wrapping_add(1));
        let _ = self.units.insert(id, Unit::from_definition(definition));
        id
    }

    /// Flips the deployment flag. Returns `false` for unknown units or no-op changes.
    pub(crate) fn set_deployed(&mut self, id: UnitId, deployed: bool) -> bool {
        match self.units.get_mut(&id) {
            Some(unit) if unit.deployed != deployed => {
                unit.deployed = deployed;
                true
            }
            _ => false,
        }
    }

    /// Arms the skill cooldown of the unit to the given duration.
    pub(crate) fn arm_cooldown(&mut self, id: UnitId, skill: &str, cooldown: Duration) {
        if let Some(unit) = self.units.get_mut(&id) {
            if cooldown.is_zero() {
                let _ = unit.skill_cooldowns.remove(skill);
            } else {
                let _ = unit.skill_cooldowns.insert(skill.to_owned(), cooldown);
            }
        }
    }

    pub(crate) fn attack_interval(&self, id: UnitId) -> Option<Duration> {
        self.units.get(&id).map(|unit| unit.stats.attack_interval)
    }

    /// Undeployed instances in ascending identifier order.
    pub(crate) fn materials(&self) -> Vec<Material<'_>> {
        self.units
            .iter()
            .filter(|(_, unit)| !unit.deployed)
            .map(|(id, unit)| Material {
                unit: *id,
                character: &unit.character,
            })
            .collect()
    }

    /// Removes every listed instance.
    pub(crate) fn consume(&mut self, ids: &[UnitId]) {
        for id in ids {
            let _ = self.units.remove(id);
        }
    }

    /// Drops every instance; the id counter is preserved.
    pub(crate) fn clear(&mut self) {
        self.units.clear();
    }

    /// Counts down skill cooldowns and buff durations.
    pub(crate) fn advance(&mut self, dt: Duration) {
        if dt.is_zero() {
            return;
        }
        for unit in self.units.values_mut() {
            unit.advance(dt);
        }
    }

    pub(crate) fn snapshots(&self) -> Vec<UnitSnapshot> {
        self.units
            .iter()
            .map(|(id, unit)| UnitSnapshot {
                id: *id,
                character: unit.character.clone(),
                stats: unit.stats,
                skill_cooldowns: unit.skill_cooldowns.clone(),
                buffs: unit.buffs.clone(),
                deployed: unit.deployed,
            })
            .collect()
    }
}
