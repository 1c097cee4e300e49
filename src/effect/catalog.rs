//! Effect catalog
//!
//! Every effect the controller can run, plus the two pick lists (the main
//! random pool and the repeated-interaction pool). Content mode swaps or
//! removes entries before a pick.

use rand::Rng;

use crate::settings::{ContentMode, Settings};
use crate::sim::SimRng;
use crate::tuning::ControllerTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Cosmetic sequence played by the host, no simulation
    OneShot,
    /// Simulation without a dismiss control
    ContinuousSimulation,
    /// Simulation that captures input and offers a dismiss control
    InteractiveSimulation,
}

/// When an effect ends on its own
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationPolicy {
    /// Controller ends it after the entry's tuned one-shot duration
    Tuned,
    /// The kernel arms its own duration timer
    KernelTimed,
    /// The kernel decides (coast to stop, match over)
    SelfTerminating,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectDescriptor {
    pub name: &'static str,
    pub kind: EffectKind,
    pub duration: DurationPolicy,
}

impl EffectDescriptor {
    const fn new(name: &'static str, kind: EffectKind, duration: DurationPolicy) -> Self {
        Self {
            name,
            kind,
            duration,
        }
    }

    pub fn is_simulation(&self) -> bool {
        self.kind != EffectKind::OneShot
    }

    /// Only interactive kernels get a close button
    pub fn has_dismiss_control(&self) -> bool {
        self.kind == EffectKind::InteractiveSimulation
    }

    /// Deadline the controller enforces itself, if any
    pub fn controller_deadline_ms(&self, tuning: &ControllerTuning) -> Option<f64> {
        match self.duration {
            DurationPolicy::Tuned => Some(tuning.one_shot_duration(self.name)),
            DurationPolicy::KernelTimed | DurationPolicy::SelfTerminating => None,
        }
    }
}

use DurationPolicy::*;
use EffectKind::*;

pub const EMOJI_RAIN: &str = "emoji-rain";
pub const MATRIX_RAIN: &str = "matrix-rain";
pub const SPIN_MADNESS: &str = "spin-madness";
pub const ASCII_TUX: &str = "ascii-tux";
pub const ASCII_WAIFU: &str = "ascii-waifu";
pub const RETRO_TERMINAL: &str = "retro-terminal";
pub const WARP_SPEED: &str = "warp-speed";
pub const SCREEN_MELT: &str = "screen-melt";
pub const RETRO_PONG: &str = "retro-pong";
pub const ELEMENT_EATER: &str = "element-eater";
pub const FIREWORKS: &str = "fireworks";
pub const GRAVITY: &str = "gravity";

/// Every known effect
pub static CATALOG: &[EffectDescriptor] = &[
    EffectDescriptor::new(EMOJI_RAIN, OneShot, Tuned),
    EffectDescriptor::new(MATRIX_RAIN, OneShot, Tuned),
    EffectDescriptor::new(SPIN_MADNESS, OneShot, Tuned),
    EffectDescriptor::new(ASCII_TUX, OneShot, Tuned),
    EffectDescriptor::new(ASCII_WAIFU, OneShot, Tuned),
    EffectDescriptor::new(RETRO_TERMINAL, OneShot, Tuned),
    EffectDescriptor::new(WARP_SPEED, ContinuousSimulation, SelfTerminating),
    EffectDescriptor::new(SCREEN_MELT, OneShot, Tuned),
    EffectDescriptor::new(RETRO_PONG, InteractiveSimulation, SelfTerminating),
    EffectDescriptor::new(ELEMENT_EATER, OneShot, Tuned),
    EffectDescriptor::new(FIREWORKS, ContinuousSimulation, KernelTimed),
    EffectDescriptor::new(GRAVITY, OneShot, Tuned),
];

const RANDOM_POOL: &[&str] = &[
    EMOJI_RAIN,
    MATRIX_RAIN,
    SPIN_MADNESS,
    ASCII_TUX,
    RETRO_TERMINAL,
    WARP_SPEED,
    SCREEN_MELT,
    RETRO_PONG,
    ELEMENT_EATER,
    FIREWORKS,
];

const INTERACTION_POOL: &[&str] = &[
    EMOJI_RAIN,
    MATRIX_RAIN,
    SPIN_MADNESS,
    ASCII_TUX,
    RETRO_TERMINAL,
    WARP_SPEED,
    GRAVITY,
    RETRO_PONG,
];

/// Look up an effect by name
pub fn find(name: &str) -> Option<&'static EffectDescriptor> {
    CATALOG.iter().find(|d| d.name == name)
}

/// A filtered pick list
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<&'static EffectDescriptor>,
}

impl Catalog {
    fn from_names(names: &[&str]) -> Self {
        Self {
            entries: names.iter().filter_map(|n| find(n)).collect(),
        }
    }

    /// Main random pool. Restricted mode swaps the tux art for the waifu art in place.
    pub fn random_pool(mode: ContentMode) -> Self {
        let names: Vec<&str> = RANDOM_POOL
            .iter()
            .map(|&name| match (mode, name) {
                (ContentMode::Restricted, ASCII_TUX) => ASCII_WAIFU,
                _ => name,
            })
            .collect();
        Self::from_names(&names)
    }

    /// Pool used after the repeated-interaction threshold. Restricted mode drops the tux art.
    pub fn interaction_pool(mode: ContentMode) -> Self {
        let names: Vec<&str> = INTERACTION_POOL
            .iter()
            .copied()
            .filter(|&name| !(mode == ContentMode::Restricted && name == ASCII_TUX))
            .collect();
        Self::from_names(&names)
    }

    /// Keep only one-shot entries (reduced motion)
    pub fn without_simulations(mut self) -> Self {
        self.entries.retain(|d| !d.is_simulation());
        self
    }

    /// Pool filtered for the current settings
    pub fn for_settings(settings: &Settings) -> Self {
        let pool = Self::random_pool(settings.content_mode);
        if settings.reduced_motion {
            pool.without_simulations()
        } else {
            pool
        }
    }

    pub fn entries(&self) -> &[&'static EffectDescriptor] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|d| d.name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|d| d.name == name)
    }

    /// Uniform random pick
    pub fn pick(&self, rng: &mut SimRng) -> Option<&'static EffectDescriptor> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.entries.len());
        Some(self.entries[idx])
    }
}

/// Resolve a trigger request: known names run as asked, anything else is a random pick
pub fn resolve(
    name: Option<&str>,
    settings: &Settings,
    rng: &mut SimRng,
) -> Option<&'static EffectDescriptor> {
    if let Some(name) = name {
        if let Some(desc) = find(name) {
            return Some(desc);
        }
        log::debug!("Unknown effect '{}', picking at random", name);
    }
    Catalog::for_settings(settings).pick(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::seeded_rng;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_are_unique() {
        let names: HashSet<_> = CATALOG.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn test_restricted_swaps_in_place() {
        let standard = Catalog::random_pool(ContentMode::Standard).names();
        let restricted = Catalog::random_pool(ContentMode::Restricted).names();
        assert_eq!(standard.len(), 10);
        assert_eq!(restricted.len(), 10);
        let idx = standard.iter().position(|n| *n == ASCII_TUX).unwrap();
        assert_eq!(restricted[idx], ASCII_WAIFU);
        assert!(!restricted.contains(&ASCII_TUX));
    }

    #[test]
    fn test_restricted_removes_from_interaction_pool() {
        let standard = Catalog::interaction_pool(ContentMode::Standard);
        let restricted = Catalog::interaction_pool(ContentMode::Restricted);
        assert_eq!(standard.entries().len(), 8);
        assert_eq!(restricted.entries().len(), 7);
        assert!(!restricted.contains(ASCII_TUX));
        assert!(!restricted.contains(ASCII_WAIFU));
    }

    #[test]
    fn test_unknown_name_falls_back_to_random() {
        let mut rng = seeded_rng(1);
        let settings = Settings::default();
        let desc = resolve(Some("does-not-exist"), &settings, &mut rng).unwrap();
        assert!(Catalog::random_pool(ContentMode::Standard).contains(desc.name));
    }

    #[test]
    fn test_known_name_resolves_exactly() {
        let mut rng = seeded_rng(2);
        let desc = resolve(Some(RETRO_PONG), &Settings::default(), &mut rng).unwrap();
        assert_eq!(desc.kind, EffectKind::InteractiveSimulation);
        assert!(desc.has_dismiss_control());
    }

    #[test]
    fn test_random_picks_cover_pool() {
        let mut rng = seeded_rng(3);
        let pool = Catalog::random_pool(ContentMode::Standard);
        let seen: HashSet<_> = (0..1000)
            .filter_map(|_| pool.pick(&mut rng))
            .map(|d| d.name)
            .collect();
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_reduced_motion_skips_simulations() {
        let mut rng = seeded_rng(4);
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        for _ in 0..200 {
            let desc = resolve(None, &settings, &mut rng).unwrap();
            assert!(!desc.is_simulation());
        }
    }

    #[test]
    fn test_deadlines() {
        let tuning = ControllerTuning::default();
        assert_eq!(find(MATRIX_RAIN).unwrap().controller_deadline_ms(&tuning), Some(5000.0));
        assert_eq!(find(EMOJI_RAIN).unwrap().controller_deadline_ms(&tuning), Some(4000.0));
        assert_eq!(find(FIREWORKS).unwrap().controller_deadline_ms(&tuning), None);
        assert_eq!(find(WARP_SPEED).unwrap().controller_deadline_ms(&tuning), None);
    }

    #[test]
    fn test_one_shot_deadlines_follow_tuning() {
        let mut tuning = ControllerTuning::default();
        assert_eq!(find(ELEMENT_EATER).unwrap().controller_deadline_ms(&tuning), Some(1200.0));

        tuning.one_shot_durations.insert(MATRIX_RAIN.to_string(), 2500.0);
        tuning.one_shot_durations.remove(GRAVITY);
        tuning.one_shot_ms = 3000.0;
        assert_eq!(find(MATRIX_RAIN).unwrap().controller_deadline_ms(&tuning), Some(2500.0));
        assert_eq!(find(GRAVITY).unwrap().controller_deadline_ms(&tuning), Some(3000.0));
    }
}
