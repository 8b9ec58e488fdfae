//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SubsystemRng instances derived
//! from the single master seed of the session.
//!
//! Each subsystem gets its own RNG stream per turn, seeded from
//! (master_seed, subsystem_index, turn). This means:
//!   - Adding a new subsystem never changes existing subsystems' streams.
//!   - A deferred settlement draws the same numbers it would have drawn
//!     had it run immediately.

use crate::types::Turn;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single subsystem.
pub struct SubsystemRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create a subsystem RNG from the master seed and a stable
    /// subsystem index. The index must never change once assigned.
    pub fn new(master_seed: u64, subsystem_index: u64) -> Self {
        let derived_seed = master_seed ^ (subsystem_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a float in [lo, hi).
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Roll a usize in [0, n).
    pub fn next_index(&mut self, n: usize) -> usize {
        assert!(n > 0, "n must be > 0");
        (self.inner.next_u64() % n as u64) as usize
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// All subsystem RNGs for a single session, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// The stream a subsystem uses during one turn.
    pub fn for_subsystem_at_turn(&self, slot: SubsystemSlot, turn: Turn) -> SubsystemRng {
        let turn_seed = self.master_seed ^ (u64::from(turn).wrapping_mul(0xbf58_476d_1ce4_e5b9));
        SubsystemRng::new(turn_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable subsystem slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every subsystem's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    Events = 0,
    Economics = 1,
    Population = 2,
    Consumption = 3,
    Support = 4,
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Economics => "economics",
            Self::Population => "population",
            Self::Consumption => "consumption",
            Self::Support => "support",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_slot_and_turn_replays_the_same_stream() {
        let bank = RngBank::new(12345);
        let mut a = bank.for_subsystem_at_turn(SubsystemSlot::Population, 4);
        let mut b = bank.for_subsystem_at_turn(SubsystemSlot::Population, 4);
        for _ in 0..16 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn turns_get_distinct_streams() {
        let bank = RngBank::new(12345);
        let mut a = bank.for_subsystem_at_turn(SubsystemSlot::Support, 1);
        let mut b = bank.for_subsystem_at_turn(SubsystemSlot::Support, 2);
        let draws_a: Vec<u64> = (0..8).map(|_| a.next_f64().to_bits()).collect();
        let draws_b: Vec<u64> = (0..8).map(|_| b.next_f64().to_bits()).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn range_stays_in_bounds() {
        let mut rng = RngBank::new(7).for_subsystem_at_turn(SubsystemSlot::Events, 1);
        for _ in 0..1_000 {
            let x = rng.range_f64(-0.01, 0.01);
            assert!((-0.01..0.01).contains(&x), "out of range: {x}");
        }
    }
}
