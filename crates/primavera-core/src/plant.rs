//! The plant: a random stem inside the vessel, leaf instances placed along it
//! and bounded by the vessel wall, and a frame-clocked grow/wither animation.
//!
//! Placement is computed once per [`Plant::generate`] into an immutable
//! [`LeafLayout`] (parallel arrays indexed by instance id) that replaces the
//! previous one wholesale. Every [`Plant::update`] rewrites the per-instance
//! transform buffer from that layout and the current frame.

use crate::bezier::CubicBezier;
use crate::constants::{
    LEAF_BASE_OFFSET, LEAF_PLACEMENT_JITTER, LEAF_SCALE_CAP, LEAF_SPACING_FACTOR,
    LEAVES_PER_SEGMENT, JITTER_FREQ_BASE, JITTER_FREQ_SPAN, JITTER_SIZE_FLOOR, RAY_MARCH_STEPS,
    STEM_CAP_OFFSET, STEM_SEGMENTS,
};
use crate::easing::growth_envelope;
use crate::error::PlantError;
use crate::growth::{leaf_local_time, GrowthObserver, GrowthPhase, GrowthTiming};
use crate::jitter::JitterNoise;
use crate::leaf::{LeafGeometry, LeafShape};
use crate::vessel::{march_to_wall, VesselBounds};
use glam::{Mat3, Mat4, Quat, Vec3};
use rand::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::sync::Arc;

/// Everything needed to build a plant.
#[derive(Clone, Debug)]
pub struct PlantConfig {
    pub vessel: VesselBounds,
    pub stem_segments: usize,
    pub leaves_per_segment: usize,
    pub leaf_shape: LeafShape,
    pub timing: GrowthTiming,
    /// Upper bound on a leaf's bind scale; slightly above 1 for fullness.
    pub scale_cap: f32,
    pub ray_march_steps: usize,
    /// Fixed seed for reproducible plants; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Regenerate in the same update that reports settling.
    pub regenerate_on_settle: bool,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            vessel: VesselBounds::default(),
            stem_segments: STEM_SEGMENTS,
            leaves_per_segment: LEAVES_PER_SEGMENT,
            leaf_shape: LeafShape::default(),
            timing: GrowthTiming::default(),
            scale_cap: LEAF_SCALE_CAP,
            ray_march_steps: RAY_MARCH_STEPS,
            seed: None,
            regenerate_on_settle: false,
        }
    }
}

impl PlantConfig {
    pub fn leaf_count(&self) -> usize {
        self.stem_segments * self.leaves_per_segment
    }

    pub fn validate(&self) -> Result<(), PlantError> {
        self.vessel.validate()?;
        if self.stem_segments == 0 || self.leaves_per_segment == 0 {
            return Err(PlantError::InvalidLayout {
                stem_segments: self.stem_segments,
                leaves_per_segment: self.leaves_per_segment,
            });
        }
        self.leaf_shape.validate()?;
        self.timing.validate()?;
        if !(self.scale_cap.is_finite() && self.scale_cap > 0.0) {
            return Err(PlantError::InvalidLeafShape("scale cap must be positive"));
        }
        Ok(())
    }
}

/// Immutable per-generation placement of every leaf instance.
#[derive(Clone, Debug)]
pub struct LeafLayout {
    pub stem: CubicBezier,
    pub bind_transforms: Vec<Mat4>,
    pub bind_scales: Vec<f32>,
    pub durations: Vec<f32>,
    pub staggers: Vec<f32>,
    /// Frame at which every leaf has finished its envelope.
    pub total_duration: f32,
    pub start_frame: f32,
}

impl LeafLayout {
    pub fn len(&self) -> usize {
        self.bind_transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bind_transforms.is_empty()
    }
}

/// Read-only view of one leaf instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafInstance {
    pub bind_transform: Mat4,
    pub transform: Mat4,
    pub bind_scale: f32,
    pub scale: f32,
    pub duration: f32,
    pub stagger: f32,
}

pub struct Plant {
    config: PlantConfig,
    leaf: Arc<LeafGeometry>,
    model: Mat4,
    rng: StdRng,
    noise: JitterNoise,
    observer: Box<dyn GrowthObserver>,
    layout: Option<Arc<LeafLayout>>,
    transforms: Vec<Mat4>,
    scales: Vec<f32>,
    appeared: Vec<bool>,
    phase: GrowthPhase,
    progress: f32,
}

impl Plant {
    pub fn new(config: PlantConfig, observer: Box<dyn GrowthObserver>) -> Result<Self, PlantError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, observer, rng)
    }

    /// Build with an injected random source; the jitter noise is seeded from it.
    pub fn with_rng(
        config: PlantConfig,
        observer: Box<dyn GrowthObserver>,
        mut rng: StdRng,
    ) -> Result<Self, PlantError> {
        config.validate()?;
        let leaf = Arc::new(LeafGeometry::new(config.leaf_shape)?);
        let noise = JitterNoise::new(rng.gen());
        let count = config.leaf_count();
        let model = Mat4::from_translation(Vec3::new(0.0, -config.vessel.half_height(), 0.0));
        log::info!(
            "[plant] vessel h={:.1} r={:.1} bevel={:.1} leaves={}",
            config.vessel.height,
            config.vessel.radius,
            config.vessel.bevel_radius,
            count
        );
        Ok(Self {
            config,
            leaf,
            model,
            rng,
            noise,
            observer,
            layout: None,
            transforms: vec![Mat4::ZERO; count],
            scales: vec![0.0; count],
            appeared: vec![false; count],
            phase: GrowthPhase::Uninitialized,
            progress: 0.0,
        })
    }

    pub fn set_observer(&mut self, observer: Box<dyn GrowthObserver>) {
        self.observer = observer;
    }

    /// Rebuild stem and leaf placement and restart the growth clock at `frame`.
    ///
    /// On error the previous generation stays in place.
    pub fn generate(&mut self, frame: f32) -> Result<(), PlantError> {
        check_frame(frame)?;
        let stem = generate_stem(&self.config.vessel, &mut self.rng);
        if stem.is_degenerate() {
            return Err(PlantError::DegenerateStem);
        }
        let layout = place_leaves(&self.config, &self.leaf, stem, &self.model, frame, &mut self.rng)?;
        log::debug!(
            "[plant] generated leaves={} stem_length={:.2} total_duration={:.1} start={:.1}",
            layout.len(),
            layout.stem.arc_length(),
            layout.total_duration,
            frame
        );
        self.layout = Some(Arc::new(layout));
        self.appeared.iter_mut().for_each(|a| *a = false);
        self.phase = GrowthPhase::Generated;
        self.pose(0.0);
        Ok(())
    }

    /// Advance the animation to `frame`, rewrite all instance transforms and
    /// fire lifecycle hooks. Returns the phase after the tick.
    pub fn update(&mut self, frame: f32) -> Result<GrowthPhase, PlantError> {
        check_frame(frame)?;
        let Some(layout) = self.layout.clone() else {
            return Ok(self.phase);
        };
        if self.phase == GrowthPhase::Generated {
            self.phase = GrowthPhase::Animating;
            self.observer.on_plant_grow_start();
        }

        let progress = (frame - layout.start_frame).min(layout.total_duration);
        self.pose(progress);

        if self.phase == GrowthPhase::Animating {
            for i in 0..layout.len() {
                if !self.appeared[i] && progress > layout.staggers[i] {
                    self.appeared[i] = true;
                    self.observer.on_leaf_grow(i);
                }
            }
            if progress >= layout.total_duration {
                self.phase = GrowthPhase::Settled;
                log::info!("[plant] settled after {:.1} frames", layout.total_duration);
                self.observer.on_plant_grow_end();
                if self.config.regenerate_on_settle {
                    self.generate(frame)?;
                }
            }
        }
        Ok(self.phase)
    }

    fn pose(&mut self, progress: f32) {
        self.progress = progress;
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        let timing = &self.config.timing;
        for i in 0..layout.len() {
            let t = leaf_local_time(progress, layout.staggers[i], layout.durations[i]);
            let scale = growth_envelope(t, timing.enter_fraction, timing.leave_fraction);
            let jitter = jitter_angle(&self.noise, t, scale, timing.jitter_strength);
            self.scales[i] = scale;
            self.transforms[i] = layout.bind_transforms[i]
                * Mat4::from_scale(Vec3::splat(scale))
                * Mat4::from_rotation_x(jitter);
        }
    }

    pub fn config(&self) -> &PlantConfig {
        &self.config
    }

    pub fn phase(&self) -> GrowthPhase {
        self.phase
    }

    /// Progress of the latest tick in frames, capped at the total duration.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn total_duration(&self) -> Option<f32> {
        self.layout.as_ref().map(|l| l.total_duration)
    }

    pub fn leaf_geometry(&self) -> &Arc<LeafGeometry> {
        &self.leaf
    }

    /// Current placement snapshot, shared with whoever renders it.
    pub fn layout(&self) -> Option<Arc<LeafLayout>> {
        self.layout.clone()
    }

    pub fn stem(&self) -> Option<&CubicBezier> {
        self.layout.as_deref().map(|l| &l.stem)
    }

    /// Guide polyline through the stem, evenly spaced by arc length.
    pub fn stem_polyline(&self) -> Vec<Vec3> {
        self.stem()
            .map(|s| s.sample_uniform(self.config.stem_segments))
            .unwrap_or_default()
    }

    /// Centres the plant (stem space runs 0..height) inside the vessel.
    pub fn model_matrix(&self) -> Mat4 {
        self.model
    }

    pub fn instance_count(&self) -> usize {
        self.transforms.len()
    }

    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    /// Transform buffer as 16 column-major floats per instance.
    pub fn transforms_f32(&self) -> &[f32] {
        bytemuck::cast_slice(&self.transforms)
    }

    pub fn instance_scales(&self) -> &[f32] {
        &self.scales
    }

    pub fn instance(&self, index: usize) -> Option<LeafInstance> {
        let layout = self.layout.as_ref()?;
        Some(LeafInstance {
            bind_transform: *layout.bind_transforms.get(index)?,
            transform: self.transforms[index],
            bind_scale: layout.bind_scales[index],
            scale: self.scales[index],
            duration: layout.durations[index],
            stagger: layout.staggers[index],
        })
    }
}

fn check_frame(frame: f32) -> Result<(), PlantError> {
    if frame.is_finite() {
        Ok(())
    } else {
        Err(PlantError::InvalidFrame(frame))
    }
}

/// Random stem from near the bottom cap to near the top cap, in stem space
/// (`y` from 0 to `height`).
pub fn generate_stem<R: Rng + ?Sized>(vessel: &VesselBounds, rng: &mut R) -> CubicBezier {
    let h = vessel.height;
    let h2 = vessel.half_height();
    let on_circle = |radius: f32, angle: f32, y: f32| {
        Vec3::new(radius * angle.cos(), y, radius * angle.sin())
    };

    // anchors share a radius, each at its own angle
    let anchor_radius = rng.gen::<f32>() * vessel.inner_radius();
    let anchor0 = on_circle(anchor_radius, rng.gen::<f32>() * TAU, 0.0);
    let anchor1 = on_circle(anchor_radius, rng.gen::<f32>() * TAU, h);

    let cap_offset = vessel.bevel_radius * STEM_CAP_OFFSET;
    let angle = rng.gen::<f32>() * TAU;
    let y = rng.gen::<f32>() * (h2 - cap_offset) + cap_offset;
    let control0 = on_circle(rng.gen::<f32>() * vessel.radius, angle, y);
    let angle = rng.gen::<f32>() * TAU;
    let y = rng.gen::<f32>() * (h2 - cap_offset) + h2;
    let control1 = on_circle(rng.gen::<f32>() * vessel.radius, angle, y);

    CubicBezier::new(anchor0, control0, control1, anchor1)
}

/// Scale that keeps a leaf from `base` towards `tip` inside the padded vessel.
///
/// Marches a fixed number of sphere-tracing steps towards the wall and
/// compares the reachable distance with the authored extent.
pub fn bound_leaf_scale(
    vessel: &VesselBounds,
    base: Vec3,
    tip: Vec3,
    extent_length: f32,
    scale_cap: f32,
    steps: usize,
) -> f32 {
    if extent_length <= f32::EPSILON {
        return scale_cap;
    }
    let Some(direction) = (tip - base).try_normalize() else {
        return scale_cap;
    };
    let end = march_to_wall(|p| vessel.padded_distance(p), base, direction, steps);
    (end.distance(base) / extent_length).min(scale_cap)
}

/// Rotation whose local `-z` looks along `forward` with `y` as close to `up`
/// as possible. Degenerate inputs fall back to a fixed frame.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(z) = (-forward).try_normalize() else {
        log::warn!("[plant] zero-length forward, using identity orientation");
        return Quat::IDENTITY;
    };
    let x = up
        .cross(z)
        .try_normalize()
        .or_else(|| Vec3::X.cross(z).try_normalize())
        .or_else(|| Vec3::Y.cross(z).try_normalize())
        .unwrap_or(Vec3::X);
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

/// Leaf wobble about its local `x` axis for local time `t` at envelope `scale`.
fn jitter_angle(noise: &JitterNoise, t: f32, scale: f32, strength: f32) -> f32 {
    let s2 = scale * scale;
    let size = (1.0 - s2) * (1.0 - JITTER_SIZE_FLOOR) + JITTER_SIZE_FLOOR;
    let freq = JITTER_FREQ_BASE + JITTER_FREQ_SPAN * (1.0 - s2);
    noise.sample(t * freq, t * freq) * strength * size
}

/// Place every leaf along `stem`, bound it by the vessel and derive its timing.
pub fn place_leaves<R: Rng + ?Sized>(
    config: &PlantConfig,
    leaf: &LeafGeometry,
    stem: CubicBezier,
    model: &Mat4,
    start_frame: f32,
    rng: &mut R,
) -> Result<LeafLayout, PlantError> {
    let count = config.leaf_count();
    let timing = &config.timing;
    let max_offset = (config.vessel.height / count as f32) * LEAF_PLACEMENT_JITTER;
    let extent_length = leaf.extent.length();
    // authored blade runs along +y; turn it onto the look direction
    let to_leaf_axis = Quat::from_rotation_x(-FRAC_PI_2);
    let mut up = Vec3::Z;

    let mut layout = LeafLayout {
        stem,
        bind_transforms: Vec::with_capacity(count),
        bind_scales: Vec::with_capacity(count),
        durations: Vec::with_capacity(count),
        staggers: Vec::with_capacity(count),
        total_duration: 0.0,
        start_frame,
    };

    for i in 0..count {
        let t = i as f32 / (count as f32 * LEAF_SPACING_FACTOR) + LEAF_BASE_OFFSET;
        let offset = rng.gen::<f32>() * max_offset - max_offset * 0.5;
        let mt = layout.stem.map(t + offset);
        let position = layout.stem.point_at(mt);
        let tangent = layout.stem.tangent_at(mt).unwrap_or_else(|| {
            log::warn!("[plant] leaf {} sits on a cusp, defaulting tangent to +y", i);
            Vec3::Y
        });

        up = Quat::from_rotation_y(rng.gen_range(-PI..PI)) * up;
        let rotation = look_rotation(tangent, up) * to_leaf_axis;
        let placement = Mat4::from_rotation_translation(rotation, position);

        let world = *model * placement;
        let base = world.transform_point3(Vec3::ZERO);
        let tip = world.transform_point3(leaf.extent);
        let scale = bound_leaf_scale(
            &config.vessel,
            base,
            tip,
            extent_length,
            config.scale_cap,
            config.ray_march_steps,
        );

        let bind = placement * Mat4::from_scale(Vec3::splat(scale));
        if !bind.is_finite() {
            return Err(PlantError::NonFiniteTransform { index: i });
        }

        let duration = timing.leaf_duration(scale);
        let stagger = timing.stagger(i);
        layout.total_duration = layout.total_duration.max(duration + stagger);
        layout.bind_transforms.push(bind);
        layout.bind_scales.push(scale);
        layout.durations.push(duration);
        layout.staggers.push(stagger);
    }
    Ok(layout)
}
