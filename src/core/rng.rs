use std::collections::VecDeque;

use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Every random draw the engine makes goes through this trait.
pub trait RandomSource: Send + Sync {
    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f64;
    /// Uniform integer in `[low, high]`.
    fn between(&mut self, low: i64, high: i64) -> i64;
    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;
}

/// Unseeded source used in real play.
pub struct EntropyDice {
    rng: StdRng,
}

impl EntropyDice {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropyDice {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyDice {
    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn between(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

/// Replays queued draws. When a queue runs dry, unit draws return `0.999`
/// (no event, every roll fails) and integer draws return the low bound.
#[derive(Debug, Default, Clone)]
pub struct ScriptedDice {
    units: VecDeque<f64>,
    ints: VecDeque<i64>,
    units_drawn: usize,
    ints_drawn: usize,
}

impl ScriptedDice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = f64>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn with_ints(mut self, ints: impl IntoIterator<Item = i64>) -> Self {
        self.ints.extend(ints);
        self
    }

    pub fn units_drawn(&self) -> usize {
        self.units_drawn
    }

    pub fn ints_drawn(&self) -> usize {
        self.ints_drawn
    }
}

impl RandomSource for ScriptedDice {
    fn unit(&mut self) -> f64 {
        self.units_drawn += 1;
        self.units.pop_front().unwrap_or(0.999).clamp(0.0, 0.999_999)
    }

    fn between(&mut self, low: i64, high: i64) -> i64 {
        self.ints_drawn += 1;
        let value = self.ints.pop_front().unwrap_or(low);
        value.clamp(low, high.max(low))
    }

    fn index(&mut self, len: usize) -> usize {
        let last = len.saturating_sub(1) as i64;
        self.between(0, last) as usize
    }
}

/// ECS resource holding the run's single random source.
#[derive(Resource)]
pub struct Dice(Box<dyn RandomSource>);

impl Dice {
    pub fn new(source: impl RandomSource + 'static) -> Self {
        Self(Box::new(source))
    }

    pub fn entropy() -> Self {
        Self::new(EntropyDice::new())
    }

    pub fn source(&mut self) -> &mut dyn RandomSource {
        self.0.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_dice_replays_in_order_then_falls_back() {
        let mut dice = ScriptedDice::new().with_units([0.1, 0.5]).with_ints([7]);
        assert_eq!(dice.unit(), 0.1);
        assert_eq!(dice.unit(), 0.5);
        assert_eq!(dice.unit(), 0.999);
        assert_eq!(dice.between(1, 10), 7);
        assert_eq!(dice.between(1, 10), 1);
        assert_eq!(dice.units_drawn(), 3);
        assert_eq!(dice.ints_drawn(), 2);
    }

    #[test]
    fn scripted_ints_are_clamped_into_range() {
        let mut dice = ScriptedDice::new().with_ints([500, -3, 9]);
        assert_eq!(dice.between(5, 15), 15);
        assert_eq!(dice.between(5, 15), 5);
        assert_eq!(dice.index(3), 2);
    }

    #[test]
    fn entropy_dice_stays_in_bounds() {
        let mut dice = EntropyDice::new();
        for _ in 0..200 {
            let unit = dice.unit();
            assert!((0.0..1.0).contains(&unit));
            let value = dice.between(5, 15);
            assert!((5..=15).contains(&value));
            assert!(dice.index(5) < 5);
        }
    }
}
