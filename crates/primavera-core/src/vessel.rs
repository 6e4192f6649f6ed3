//! Closed-form distance field of the rounded-cylinder vessel.
//!
//! The vessel is never rendered from here; it only bounds how far a leaf may
//! reach. Coordinates are vessel-centred: the body spans `y` in
//! `[-height / 2, height / 2]`.

use crate::constants::{VESSEL_BEVEL_RADIUS, VESSEL_HEIGHT, VESSEL_RADIUS, VESSEL_SDF_PADDING};
use crate::error::PlantError;
use glam::{Vec2, Vec3};

/// Read-only dimensions of the container the plant grows in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VesselBounds {
    pub height: f32,
    pub radius: f32,
    pub bevel_radius: f32,
}

impl Default for VesselBounds {
    fn default() -> Self {
        Self {
            height: VESSEL_HEIGHT,
            radius: VESSEL_RADIUS,
            bevel_radius: VESSEL_BEVEL_RADIUS,
        }
    }
}

impl VesselBounds {
    /// Validated constructor.
    pub fn new(height: f32, radius: f32, bevel_radius: f32) -> Result<Self, PlantError> {
        let bounds = Self {
            height,
            radius,
            bevel_radius,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), PlantError> {
        let fail = |reason| PlantError::InvalidVessel {
            reason,
            height: self.height,
            radius: self.radius,
            bevel: self.bevel_radius,
        };
        if !(self.height.is_finite() && self.radius.is_finite() && self.bevel_radius.is_finite()) {
            return Err(fail("dimensions must be finite"));
        }
        if self.height <= 0.0 || self.radius <= 0.0 {
            return Err(fail("height and radius must be positive"));
        }
        if self.bevel_radius < 0.0 {
            return Err(fail("bevel radius must not be negative"));
        }
        if self.bevel_radius > self.radius {
            return Err(fail("bevel radius exceeds outer radius"));
        }
        if self.bevel_radius * 2.0 > self.height {
            return Err(fail("bevel radius exceeds half the height"));
        }
        Ok(())
    }

    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    pub fn inner_radius(&self) -> f32 {
        self.radius - self.bevel_radius
    }

    /// Same vessel shrunk uniformly by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            height: self.height * factor,
            radius: self.radius * factor,
            bevel_radius: self.bevel_radius * factor,
        }
    }

    /// Signed distance to the vessel wall, negative inside.
    pub fn distance(&self, p: Vec3) -> f32 {
        sd_rounded_cylinder(p, self.radius, self.bevel_radius, self.half_height())
    }

    /// Distance used for leaf bounding: the wall pulled inwards by the padding.
    pub fn padded_distance(&self, p: Vec3) -> f32 {
        self.scaled(VESSEL_SDF_PADDING).distance(p)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.distance(p) < 0.0
    }
}

/// Rounded cylinder centred at the origin with its axis along `y`.
#[inline]
pub fn sd_rounded_cylinder(p: Vec3, outer_radius: f32, bevel_radius: f32, half_height: f32) -> f32 {
    let inner_radius = outer_radius - bevel_radius;
    let d = Vec2::new(
        Vec2::new(p.x, p.z).length() - inner_radius,
        p.y.abs() - half_height + bevel_radius,
    );
    d.x.max(d.y).min(0.0) + d.max(Vec2::ZERO).length() - bevel_radius
}

/// Sphere-trace from `origin` along `direction` towards the wall of `sdf`.
///
/// Runs exactly `steps` iterations with no convergence check; each step
/// advances by the negated distance, so a point inside walks out to the wall
/// and a point outside walks back in.
pub fn march_to_wall(sdf: impl Fn(Vec3) -> f32, origin: Vec3, direction: Vec3, steps: usize) -> Vec3 {
    let mut ray = origin;
    for _ in 0..steps {
        let step = -sdf(ray);
        ray += direction * step;
    }
    ray
}
