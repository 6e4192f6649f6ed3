use crate::constants::ARC_LENGTH_STEPS;
use glam::Vec3;

/// Cubic Bézier segment with a precomputed arc-length table.
///
/// The table stores the cumulative chord length at `ARC_LENGTH_STEPS + 1`
/// uniform `t` samples so that [`CubicBezier::map`] can turn a uniform-speed
/// parameter into the curve parameter that covers the same fraction of the
/// total length.
#[derive(Clone, Debug)]
pub struct CubicBezier {
    pub anchor0: Vec3,
    pub control0: Vec3,
    pub control1: Vec3,
    pub anchor1: Vec3,
    arc_lengths: Vec<f32>,
}

impl CubicBezier {
    pub fn new(anchor0: Vec3, control0: Vec3, control1: Vec3, anchor1: Vec3) -> Self {
        let mut curve = Self {
            anchor0,
            control0,
            control1,
            anchor1,
            arc_lengths: Vec::with_capacity(ARC_LENGTH_STEPS + 1),
        };
        let mut prev = curve.point_at(0.0);
        let mut total = 0.0_f32;
        curve.arc_lengths.push(0.0);
        for i in 1..=ARC_LENGTH_STEPS {
            let p = curve.point_at(i as f32 / ARC_LENGTH_STEPS as f32);
            total += prev.distance(p);
            curve.arc_lengths.push(total);
            prev = p;
        }
        // rounding in the blend gives coincident points a few ulps of length
        let magnitude = [anchor0, control0, control1, anchor1]
            .iter()
            .map(|p| p.abs().max_element())
            .fold(1.0_f32, f32::max);
        if curve.hull_extent() <= f32::EPSILON * magnitude {
            curve.arc_lengths.iter_mut().for_each(|len| *len = 0.0);
        }
        curve
    }

    /// Largest distance between any two of the four control points.
    pub fn hull_extent(&self) -> f32 {
        let points = [self.anchor0, self.control0, self.control1, self.anchor1];
        let mut extent = 0.0_f32;
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                extent = extent.max(a.distance(*b));
            }
        }
        extent
    }

    /// True when the curve collapses to a point.
    pub fn is_degenerate(&self) -> bool {
        self.arc_length() <= f32::EPSILON
    }

    /// Position on the curve at parameter `t` in \[0, 1\].
    pub fn point_at(&self, t: f32) -> Vec3 {
        let t2 = t * t;
        let t3 = t2 * t;
        let b0 = -t3 + 3.0 * t2 - 3.0 * t + 1.0;
        let b1 = 3.0 * t3 - 6.0 * t2 + 3.0 * t;
        let b2 = -3.0 * t3 + 3.0 * t2;
        let b3 = t3;
        self.anchor0 * b0 + self.control0 * b1 + self.control1 * b2 + self.anchor1 * b3
    }

    /// First derivative at `t`. Not normalized.
    pub fn velocity_at(&self, t: f32) -> Vec3 {
        let t2 = t * t;
        let d0 = -3.0 * t2 + 6.0 * t - 3.0;
        let d1 = 9.0 * t2 - 12.0 * t + 3.0;
        let d2 = -9.0 * t2 + 6.0 * t;
        let d3 = 3.0 * t2;
        self.anchor0 * d0 + self.control0 * d1 + self.control1 * d2 + self.anchor1 * d3
    }

    /// Unit tangent at `t`, or `None` where the velocity vanishes.
    pub fn tangent_at(&self, t: f32) -> Option<Vec3> {
        self.velocity_at(t).try_normalize()
    }

    pub fn arc_length(&self) -> f32 {
        self.arc_lengths[ARC_LENGTH_STEPS]
    }

    pub fn arc_lengths(&self) -> &[f32] {
        &self.arc_lengths
    }

    /// Inverse arc-length mapping: uniform-speed `u` -> curve parameter `t`.
    ///
    /// `u` is clamped to \[0, 1\]. A curve with no length maps linearly.
    pub fn map(&self, u: f32) -> f32 {
        map_arc_length(&self.arc_lengths, u)
    }

    /// Point at uniform-speed parameter `u`.
    pub fn point_at_distance(&self, u: f32) -> Vec3 {
        self.point_at(self.map(u))
    }

    /// `count + 1` points spaced evenly by arc length, base to tip.
    pub fn sample_uniform(&self, count: usize) -> Vec<Vec3> {
        let count = count.max(1);
        (0..=count)
            .map(|i| self.point_at_distance(i as f32 / count as f32))
            .collect()
    }
}

/// Inverse of a cumulative arc-length table sampled at uniform parameters.
///
/// Returns the parameter in \[0, 1\] that covers `u` of the total length.
/// Inside a segment of (near) zero length the lower sample's parameter is
/// returned; a table with no length maps linearly.
pub fn map_arc_length(lengths: &[f32], u: f32) -> f32 {
    let u = u.clamp(0.0, 1.0);
    let Some(&total) = lengths.last() else {
        return u;
    };
    let steps = lengths.len() - 1;
    if steps == 0 || total <= f32::EPSILON {
        return u;
    }
    let target = u * total;
    // first entry that reaches the target length
    let index = lengths.partition_point(|&len| len < target);
    if index == 0 {
        return 0.0;
    }
    if index > steps {
        return 1.0;
    }
    let after = lengths[index];
    if after == target {
        return index as f32 / steps as f32;
    }
    let low = index - 1;
    let before = lengths[low];
    let segment = after - before;
    if segment <= f32::EPSILON {
        return low as f32 / steps as f32;
    }
    (low as f32 + (target - before) / segment) / steps as f32
}
