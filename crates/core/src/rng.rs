//! Seeded randomness for ball colors and bomb rolls.
//!
//! A 32-bit LCG: cheap, and a round is fully reproducible from its seed,
//! which the tests and benches rely on.

const MULTIPLIER: u32 = 1_664_525;
const INCREMENT: u32 = 1_013_904_223;

/// Linear congruential generator (Numerical Recipes constants, modulus 2^32).
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Seed 0 is mapped to 1.
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state
    }

    /// Uniform-ish value in `0..max`, or 0 when `max` is 0.
    ///
    /// Scales by the high bits; the low bits of an LCG have short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        match max {
            0 => 0,
            _ => (u64::from(self.next_u32()) * u64::from(max) >> 32) as u32,
        }
    }

    /// True with probability `percent`/100. Zero never consumes a value.
    pub fn chance(&mut self, percent: u32) -> bool {
        percent > 0 && self.next_range(100) < percent
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}
