//! Balance configuration: wave scaling curves and session rules.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::WaveNumber;

/// Shortest gap between two timer firings derived from the balance.
///
/// Re-armed timers always land strictly after the instant that fired them, so
/// a single tick can only fire a bounded number of them.
pub const MIN_TIMER_GAP_MS: u64 = 1;

/// Combat statistics assigned to a freshly spawned monster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterStats {
    /// Starting and maximum hit points.
    pub hp: u32,
    /// Flat defense consulted by attackers when mitigating damage.
    pub defense: u32,
    /// Damage the monster deals.
    pub damage: u32,
    /// Visual scale relative to a regular monster.
    pub size_multiplier: f32,
}

/// Monotonic scaling curves that derive wave parameters from the wave number.
///
/// Every accessor is non-decreasing in difficulty as the wave number grows:
/// counts and stats never shrink and spawn intervals never lengthen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveCurve {
    /// Monsters spawned during wave one.
    pub base_monster_count: u32,
    /// Additional monsters per subsequent wave.
    pub monster_count_step: u32,
    /// Upper bound on monsters per wave.
    pub max_monster_count: u32,
    /// Spawn interval during wave one, in milliseconds.
    pub base_spawn_interval_ms: u64,
    /// Interval reduction per subsequent wave, in milliseconds.
    pub spawn_interval_step_ms: u64,
    /// Shortest interval the curve may reach, in milliseconds.
    pub min_spawn_interval_ms: u64,
    /// Every n-th wave is a boss wave; zero disables boss waves.
    pub boss_every: u32,
    /// Hit points of a wave-one monster.
    pub base_hp: u32,
    /// Multiplicative hit point growth per wave; values below one are treated as one.
    pub hp_growth: f64,
    /// Defense of a wave-one monster.
    pub base_defense: u32,
    /// Additional defense per subsequent wave.
    pub defense_step: u32,
    /// Damage of a wave-one monster.
    pub base_damage: u32,
    /// Additional damage per subsequent wave.
    pub damage_step: u32,
    /// Hit point multiplier applied to bosses.
    pub boss_hp_multiplier: f64,
    /// Flat defense added to bosses.
    pub boss_defense_bonus: u32,
    /// Damage multiplier applied to bosses.
    pub boss_damage_multiplier: u32,
    /// Visual scale of bosses.
    pub boss_size_multiplier: f32,
}

impl Default for WaveCurve {
    fn default() -> Self {
        Self {
            base_monster_count: 20,
            monster_count_step: 2,
            max_monster_count: 60,
            base_spawn_interval_ms: 1_000,
            spawn_interval_step_ms: 25,
            min_spawn_interval_ms: 300,
            boss_every: 5,
            base_hp: 120,
            hp_growth: 1.18,
            base_defense: 0,
            defense_step: 2,
            base_damage: 1,
            damage_step: 1,
            boss_hp_multiplier: 25.0,
            boss_defense_bonus: 15,
            boss_damage_multiplier: 5,
            boss_size_multiplier: 2.5,
        }
    }
}

impl WaveCurve {
    /// Reports whether the wave spawns a single boss instead of a monster stream.
    #[must_use]
    pub fn is_boss_wave(&self, wave: WaveNumber) -> bool {
        self.boss_every != 0 && wave.get() % self.boss_every == 0
    }

    /// Number of regular monsters the curve assigns to the wave.
    #[must_use]
    pub fn monsters_per_wave(&self, wave: WaveNumber) -> u32 {
        let ceiling = self.max_monster_count.max(self.base_monster_count);
        self.base_monster_count
            .saturating_add(self.monster_count_step.saturating_mul(wave.index()))
            .min(ceiling)
    }

    /// Number of spawns the wave may perform: one on boss waves.
    #[must_use]
    pub fn spawn_quota(&self, wave: WaveNumber) -> u32 {
        if self.is_boss_wave(wave) {
            1
        } else {
            self.monsters_per_wave(wave)
        }
    }

    /// Delay between two consecutive spawns of the wave, at least [`MIN_TIMER_GAP_MS`].
    #[must_use]
    pub fn spawn_interval_for_wave(&self, wave: WaveNumber) -> Duration {
        let reduction = self
            .spawn_interval_step_ms
            .saturating_mul(u64::from(wave.index()));
        let millis = self
            .base_spawn_interval_ms
            .saturating_sub(reduction)
            .max(self.min_spawn_interval_ms)
            .max(MIN_TIMER_GAP_MS);
        Duration::from_millis(millis)
    }

    /// Statistics of a regular monster spawned during the wave.
    #[must_use]
    pub fn monster_stats_for_wave(&self, wave: WaveNumber) -> MonsterStats {
        let exponent = i32::try_from(wave.index()).unwrap_or(i32::MAX);
        let growth = self.hp_growth.max(1.0).powi(exponent);
        MonsterStats {
            hp: scale_hp(self.base_hp, growth),
            defense: self
                .base_defense
                .saturating_add(self.defense_step.saturating_mul(wave.index())),
            damage: self
                .base_damage
                .saturating_add(self.damage_step.saturating_mul(wave.index())),
            size_multiplier: 1.0,
        }
    }

    /// Statistics of the boss spawned at the start of a boss wave.
    #[must_use]
    pub fn boss_stats_for_wave(&self, wave: WaveNumber) -> MonsterStats {
        let regular = self.monster_stats_for_wave(wave);
        MonsterStats {
            hp: scale_hp(regular.hp, self.boss_hp_multiplier.max(1.0)),
            defense: regular.defense.saturating_add(self.boss_defense_bonus),
            damage: regular
                .damage
                .saturating_mul(self.boss_damage_multiplier.max(1)),
            size_multiplier: self.boss_size_multiplier.max(1.0),
        }
    }
}

fn scale_hp(base: u32, factor: f64) -> u32 {
    let scaled = (f64::from(base) * factor).round();
    if !scaled.is_finite() || scaled >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    (scaled as u32).max(1)
}

/// Closed rectangular loop monsters travel along, centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathLayout {
    /// Horizontal extent of the loop in world units.
    pub width: f32,
    /// Vertical extent of the loop in world units.
    pub height: f32,
}

impl Default for PathLayout {
    fn default() -> Self {
        Self {
            width: 16.0,
            height: 9.0,
        }
    }
}

/// Session-wide rules shared by every wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRules {
    /// Fixed length of every wave, in milliseconds.
    pub wave_duration_ms: u64,
    /// Portion of the wave during which monsters may spawn, in milliseconds.
    pub spawn_window_ms: u64,
    /// Active monster count that, once exceeded, ends the game.
    pub population_cap: u32,
    /// Last playable wave; zero means the session never ends by wave count.
    pub final_wave: u32,
    /// Monster travel speed in path laps per second.
    pub monster_speed: f32,
    /// Loop that monster progress is projected onto.
    pub path: PathLayout,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            wave_duration_ms: 40_000,
            spawn_window_ms: 20_000,
            population_cap: 100,
            final_wave: 40,
            monster_speed: 0.05,
            path: PathLayout::default(),
        }
    }
}

impl SessionRules {
    /// Fixed length of every wave, never shorter than one millisecond.
    #[must_use]
    pub const fn wave_duration(&self) -> Duration {
        if self.wave_duration_ms < MIN_TIMER_GAP_MS {
            Duration::from_millis(MIN_TIMER_GAP_MS)
        } else {
            Duration::from_millis(self.wave_duration_ms)
        }
    }

    /// Portion of the wave during which monsters may spawn.
    #[must_use]
    pub const fn spawn_window(&self) -> Duration {
        Duration::from_millis(self.spawn_window_ms)
    }

    /// Last playable wave, if the session is bounded.
    #[must_use]
    pub const fn final_wave(&self) -> Option<WaveNumber> {
        if self.final_wave == 0 {
            None
        } else {
            Some(WaveNumber::new(self.final_wave))
        }
    }
}

/// Complete balance configuration handed to the world.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balance {
    /// Wave scaling curves.
    pub curve: WaveCurve,
    /// Session rules.
    pub session: SessionRules,
}
