//! Active monster arena and the id-indexed position cache.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use squad_defence_core::{MonsterId, MonsterSnapshot, MonsterStats, PathLayout, UnitId, WaveNumber};

/// Result of applying one attack to a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AttackOutcome {
    /// The monster was already dying; nothing changed.
    Ignored,
    /// Hit points dropped but the monster survives.
    Damaged { dealt: u32, remaining: u32 },
    /// Hit points reached zero and the dying latch closed.
    Latched { dealt: u32 },
}

/// Authoritative state of a single monster.
#[derive(Clone, Debug)]
pub(crate) struct Monster {
    id: MonsterId,
    hp: u32,
    max_hp: u32,
    defense: u32,
    damage: u32,
    wave: WaveNumber,
    size_multiplier: f32,
    progress: f32,
    boss: bool,
    /// Dying latch; holds the unit that landed the final hit once closed.
    killer: Option<UnitId>,
}

impl Monster {
    fn new(id: MonsterId, wave: WaveNumber, stats: MonsterStats, boss: bool) -> Self {
        Self {
            id,
            hp: stats.hp,
            max_hp: stats.hp,
            defense: stats.defense,
            damage: stats.damage,
            wave,
            size_multiplier: stats.size_multiplier,
            progress: 0.0,
            boss,
            killer: None,
        }
    }

    pub(crate) fn is_dying(&self) -> bool {
        self.killer.is_some()
    }

    pub(crate) fn killer(&self) -> Option<UnitId> {
        self.killer
    }

    pub(crate) fn wave(&self) -> WaveNumber {
        self.wave
    }

    /// Subtracts damage, closing the dying latch when hit points reach zero.
    pub(crate) fn take_damage(&mut self, attacker: UnitId, damage: u32) -> AttackOutcome {
        if self.is_dying() {
            return AttackOutcome::Ignored;
        }

        let remaining = self.hp.saturating_sub(damage);
        let dealt = self.hp - remaining;
        self.hp = remaining;
        if remaining == 0 {
            self.killer = Some(attacker);
            AttackOutcome::Latched { dealt }
        } else {
            AttackOutcome::Damaged { dealt, remaining }
        }
    }

    fn snapshot(&self) -> MonsterSnapshot {
        MonsterSnapshot {
            id: self.id,
            hp: self.hp,
            max_hp: self.max_hp,
            defense: self.defense,
            damage: self.damage,
            wave: self.wave,
            size_multiplier: self.size_multiplier,
            progress: self.progress,
            dying: self.is_dying(),
            boss: self.boss,
        }
    }
}

/// Registry that stores monsters, their projected positions and allocates ids.
///
/// Identifiers keep increasing across session restarts so a stale id held by
/// an adapter can never address a monster of a newer session.
#[derive(Debug)]
pub(crate) struct MonsterRegistry {
    entries: BTreeMap<MonsterId, Monster>,
    positions: BTreeMap<MonsterId, Vec2>,
    next_monster_id: MonsterId,
}

impl MonsterRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            positions: BTreeMap::new(),
            next_monster_id: MonsterId::new(0),
        }
    }

    /// Creates a monster at the start of the path and caches its position.
    pub(crate) fn spawn(
        &mut self,
        wave: WaveNumber,
        stats: MonsterStats,
        boss: bool,
        layout: &PathLayout,
    ) -> MonsterId {
        let id = self.next_monster_id;
        self.next_monster_id = MonsterId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, Monster::new(id, wave, stats, boss));
        let _ = self.positions.insert(id, project(layout, 0.0));
        id
    }

    pub(crate) fn get(&self, id: MonsterId) -> Option<&Monster> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.entries.get_mut(&id)
    }

    /// Removes the monster together with its position cache entry.
    pub(crate) fn remove(&mut self, id: MonsterId) -> Option<Monster> {
        let _ = self.positions.remove(&id);
        self.entries.remove(&id)
    }

    /// Drops every monster; the id counter is preserved.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn position(&self, id: MonsterId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    /// Moves living monsters along the loop and refreshes their cached positions.
    pub(crate) fn advance(&mut self, dt: Duration, speed: f32, layout: &PathLayout) {
        let delta = speed * dt.as_secs_f32();
        if delta <= 0.0 {
            return;
        }

        for monster in self.entries.values_mut() {
            if monster.is_dying() {
                continue;
            }
            monster.progress = (monster.progress + delta).rem_euclid(1.0);
            let _ = self
                .positions
                .insert(monster.id, project(layout, monster.progress));
        }
    }

    pub(crate) fn snapshots(&self) -> Vec<MonsterSnapshot> {
        self.entries.values().map(Monster::snapshot).collect()
    }
}

/// Projects loop progress onto the rectangular path, starting at the top-left
/// corner and travelling clockwise.
pub(crate) fn project(layout: &PathLayout, progress: f32) -> Vec2 {
    let width = layout.width.max(0.0);
    let height = layout.height.max(0.0);
    let perimeter = 2.0 * (width + height);
    if perimeter <= 0.0 {
        return Vec2::ZERO;
    }

    let half = Vec2::new(width / 2.0, height / 2.0);
    let mut distance = progress.rem_euclid(1.0) * perimeter;
    if distance < width {
        return Vec2::new(-half.x + distance, half.y);
    }
    distance -= width;
    if distance < height {
        return Vec2::new(half.x, half.y - distance);
    }
    distance -= height;
    if distance < width {
        return Vec2::new(half.x - distance, -half.y);
    }
    distance -= width;
    Vec2::new(-half.x, -half.y + distance.min(height))
}
