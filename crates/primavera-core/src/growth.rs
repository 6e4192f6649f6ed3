//! Growth lifecycle: phases, timing parameters and the observer hooks fired
//! into the (external) audio layer.

use crate::constants::{
    AVERAGE_LEAF_DURATION, ENTER_FRACTION, JITTER_STRENGTH, LEAF_STAGGER_DELAY, LEAVE_FRACTION,
    MIN_DURATION_FRACTION,
};
use crate::error::PlantError;
use std::cell::RefCell;
use std::rc::Rc;

/// Where a plant is in its grow cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GrowthPhase {
    #[default]
    Uninitialized,
    /// Instances placed, clock anchored, no tick seen yet.
    Generated,
    Animating,
    /// `progress` reached the total duration; the settle hook has fired.
    Settled,
}

/// Receives growth lifecycle events. All methods default to doing nothing.
pub trait GrowthObserver {
    /// A leaf's local time moved past zero for the first time this cycle.
    fn on_leaf_grow(&mut self, _index: usize) {}
    /// First tick after a (re)generation.
    fn on_plant_grow_start(&mut self) {}
    /// Growth is complete. Fires once per generation.
    fn on_plant_grow_end(&mut self) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl GrowthObserver for NoopObserver {}

impl<O: GrowthObserver> GrowthObserver for Rc<RefCell<O>> {
    fn on_leaf_grow(&mut self, index: usize) {
        self.borrow_mut().on_leaf_grow(index);
    }
    fn on_plant_grow_start(&mut self) {
        self.borrow_mut().on_plant_grow_start();
    }
    fn on_plant_grow_end(&mut self) {
        self.borrow_mut().on_plant_grow_end();
    }
}

/// Per-leaf animation timing, all in frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthTiming {
    pub average_leaf_duration: f32,
    /// Lower bound on a leaf's duration as a fraction of the average.
    pub min_duration_fraction: f32,
    /// Delay between consecutive leaves starting.
    pub stagger_delay: f32,
    pub enter_fraction: f32,
    pub leave_fraction: f32,
    pub jitter_strength: f32,
}

impl Default for GrowthTiming {
    fn default() -> Self {
        Self {
            average_leaf_duration: AVERAGE_LEAF_DURATION,
            min_duration_fraction: MIN_DURATION_FRACTION,
            stagger_delay: LEAF_STAGGER_DELAY,
            enter_fraction: ENTER_FRACTION,
            leave_fraction: LEAVE_FRACTION,
            jitter_strength: JITTER_STRENGTH,
        }
    }
}

impl GrowthTiming {
    pub fn validate(&self) -> Result<(), PlantError> {
        if !(self.average_leaf_duration.is_finite() && self.average_leaf_duration > 0.0) {
            return Err(PlantError::InvalidTiming("average leaf duration must be positive"));
        }
        if !(0.0..=1.0).contains(&self.min_duration_fraction) {
            return Err(PlantError::InvalidTiming("min duration fraction must be in [0, 1]"));
        }
        if !(self.stagger_delay.is_finite() && self.stagger_delay >= 0.0) {
            return Err(PlantError::InvalidTiming("stagger delay must not be negative"));
        }
        if self.enter_fraction < 0.0 || self.leave_fraction < 0.0 {
            return Err(PlantError::InvalidTiming("transition fractions must not be negative"));
        }
        let transitions = self.enter_fraction + self.leave_fraction;
        if transitions <= 0.0 || transitions > 1.0 {
            return Err(PlantError::InvalidTiming("enter + leave must be in (0, 1]"));
        }
        if !self.jitter_strength.is_finite() {
            return Err(PlantError::InvalidTiming("jitter strength must be finite"));
        }
        Ok(())
    }

    /// Bigger leaves take longer, never less than the minimum fraction.
    #[inline]
    pub fn leaf_duration(&self, scale: f32) -> f32 {
        (self.average_leaf_duration * self.min_duration_fraction)
            .max(self.average_leaf_duration * scale)
    }

    #[inline]
    pub fn stagger(&self, index: usize) -> f32 {
        index as f32 * self.stagger_delay
    }
}

/// Local 0..1 time of a leaf given the plant's progress.
///
/// Clamps to 0 before the stagger and for zero durations, so the result is
/// never negative or NaN.
#[inline]
pub fn leaf_local_time(progress: f32, stagger: f32, duration: f32) -> f32 {
    if duration.is_nan() || duration <= 0.0 {
        return 0.0;
    }
    ((progress - stagger).max(0.0).min(duration) / duration).clamp(0.0, 1.0)
}
