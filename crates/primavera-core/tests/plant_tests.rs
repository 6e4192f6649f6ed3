// Host-side tests for stem generation, leaf placement and the growth engine.

use glam::Vec3;
use primavera_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Recorder {
    starts: usize,
    ends: usize,
    leaves: Vec<usize>,
    events: Vec<&'static str>,
}

impl GrowthObserver for Recorder {
    fn on_leaf_grow(&mut self, index: usize) {
        self.leaves.push(index);
        self.events.push("leaf");
    }
    fn on_plant_grow_start(&mut self) {
        self.starts += 1;
        self.events.push("start");
    }
    fn on_plant_grow_end(&mut self) {
        self.ends += 1;
        self.events.push("end");
    }
}

fn config(seed: u64) -> PlantConfig {
    PlantConfig {
        vessel: VesselBounds::new(50.0, 20.0, 13.0).unwrap(),
        stem_segments: 18,
        leaves_per_segment: 2,
        seed: Some(seed),
        ..PlantConfig::default()
    }
}

fn make_plant(seed: u64) -> (Plant, Rc<RefCell<Recorder>>) {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let plant = Plant::new(config(seed), Box::new(recorder.clone())).unwrap();
    (plant, recorder)
}

#[test]
fn end_to_end_grow_cycle() {
    let (mut plant, rec) = make_plant(42);
    assert_eq!(plant.instance_count(), 36);

    plant.generate(0.0).unwrap();
    let total = plant.total_duration().unwrap();
    assert!(total > 0.0);

    plant.update(0.0).unwrap();
    assert!(plant.instance_scales().iter().all(|&s| s == 0.0));

    plant.update(total / 2.0).unwrap();
    assert!(plant.instance_scales().iter().any(|&s| s == 1.0));
    assert_eq!(rec.borrow().ends, 0);

    let phase = plant.update(total + 1.0).unwrap();
    assert_eq!(phase, GrowthPhase::Settled);
    assert_eq!(rec.borrow().ends, 1);
    assert!(plant.instance_scales().iter().all(|&s| s.abs() < 1e-4));
}

#[test]
fn instance_count_is_stable_across_generations() {
    let (mut plant, _) = make_plant(1);
    for frame in 0..5 {
        plant.generate(frame as f32 * 100.0).unwrap();
        assert_eq!(plant.instance_count(), 36);
        assert_eq!(plant.layout().unwrap().len(), 36);
        assert_eq!(plant.transforms_f32().len(), 36 * 16);
    }
}

#[test]
fn completion_fires_once_per_generation() {
    let (mut plant, rec) = make_plant(3);
    plant.generate(10.0).unwrap();
    let total = plant.total_duration().unwrap();

    plant.update(10.0 + total - 1.0).unwrap();
    assert_eq!(rec.borrow().ends, 0);
    for extra in 0..5 {
        plant.update(10.0 + total + extra as f32).unwrap();
    }
    assert_eq!(rec.borrow().ends, 1);

    plant.generate(1000.0).unwrap();
    let total = plant.total_duration().unwrap();
    plant.update(1000.0 + total).unwrap();
    plant.update(1000.0 + total + 50.0).unwrap();
    assert_eq!(rec.borrow().ends, 2);
    assert_eq!(rec.borrow().starts, 2);
}

#[test]
fn lifecycle_events_fire_in_order() {
    let (mut plant, rec) = make_plant(9);
    plant.generate(0.0).unwrap();
    let total = plant.total_duration().unwrap();
    let mut frame = 0.0;
    while frame <= total + 2.0 {
        plant.update(frame).unwrap();
        frame += 1.0;
    }
    let rec = rec.borrow();
    assert_eq!(rec.events.first(), Some(&"start"));
    assert_eq!(rec.events.last(), Some(&"end"));
    assert_eq!(rec.leaves, (0..36).collect::<Vec<_>>());
}

#[test]
fn jumping_past_the_end_still_reports_every_leaf() {
    let (mut plant, rec) = make_plant(11);
    plant.generate(0.0).unwrap();
    plant.update(1.0e6).unwrap();
    let rec = rec.borrow();
    assert_eq!(rec.events.len(), 1 + 36 + 1);
    assert_eq!(rec.events[0], "start");
    assert_eq!(rec.events[37], "end");
}

#[test]
fn phases_follow_the_cycle() {
    let (mut plant, rec) = make_plant(5);
    assert_eq!(plant.phase(), GrowthPhase::Uninitialized);
    assert_eq!(plant.update(10.0).unwrap(), GrowthPhase::Uninitialized);
    assert_eq!(rec.borrow().starts, 0);

    plant.generate(0.0).unwrap();
    assert_eq!(plant.phase(), GrowthPhase::Generated);
    assert_eq!(plant.update(1.0).unwrap(), GrowthPhase::Animating);
    let total = plant.total_duration().unwrap();
    assert_eq!(plant.update(total).unwrap(), GrowthPhase::Settled);

    // regenerating restarts the clock
    plant.generate(total).unwrap();
    assert_eq!(plant.phase(), GrowthPhase::Generated);
    plant.update(total + 1.0).unwrap();
    assert!(plant.progress() <= 1.0 + 1e-4);
}

#[test]
fn envelope_per_instance_matches_its_timing() {
    let (mut plant, _) = make_plant(21);
    plant.generate(0.0).unwrap();
    for index in [0usize, 7, 35] {
        let leaf = plant.instance(index).unwrap();
        plant.update(leaf.stagger).unwrap();
        assert_eq!(plant.instance(index).unwrap().scale, 0.0);
        plant.update(leaf.stagger + leaf.duration / 2.0).unwrap();
        assert_eq!(plant.instance(index).unwrap().scale, 1.0);
        plant.update(leaf.stagger + leaf.duration).unwrap();
        assert!(plant.instance(index).unwrap().scale.abs() < 1e-4);
        plant.generate(0.0).unwrap();
    }
}

#[test]
fn durations_and_total_follow_bind_scale() {
    let (mut plant, _) = make_plant(8);
    plant.generate(0.0).unwrap();
    let layout = plant.layout().unwrap();
    let timing = GrowthTiming::default();
    let mut total: f32 = 0.0;
    for i in 0..layout.len() {
        let scale = layout.bind_scales[i];
        assert!(scale.is_finite() && scale <= LEAF_SCALE_CAP);
        assert_eq!(layout.durations[i], timing.leaf_duration(scale));
        assert_eq!(layout.staggers[i], i as f32 * timing.stagger_delay);
        total = total.max(layout.durations[i] + layout.staggers[i]);
    }
    assert_eq!(layout.total_duration, total);
}

#[test]
fn leaves_based_inside_stay_inside_the_padded_vessel() {
    let (mut plant, _) = make_plant(13);
    let vessel = plant.config().vessel;
    let extent = plant.leaf_geometry().extent;
    for frame in 0..4 {
        plant.generate(frame as f32).unwrap();
        let model = plant.model_matrix();
        let layout = plant.layout().unwrap();
        for bind in &layout.bind_transforms {
            let world = model * *bind;
            let base = world.transform_point3(Vec3::ZERO);
            if vessel.padded_distance(base) >= 0.0 {
                continue;
            }
            let tip = world.transform_point3(extent);
            assert!(
                vessel.padded_distance(tip) <= 1e-3,
                "leaf tip {tip:?} pokes through the padded wall"
            );
        }
    }
}

#[test]
fn bound_scale_shrinks_long_leaves_and_caps_short_ones() {
    let vessel = VesselBounds::default();
    let long = bound_leaf_scale(&vessel, Vec3::ZERO, Vec3::new(0.0, 0.0, 30.0), 30.0, 1.2, 4);
    assert!(long < 1.0, "long leaf scale {long}");
    assert!(long > 0.0);

    let short = bound_leaf_scale(&vessel, Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 1.0, 1.2, 4);
    assert_eq!(short, 1.2);
}

#[test]
fn stem_stays_within_the_vessel_cylinder() {
    let vessel = VesselBounds::default();
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
        let stem = generate_stem(&vessel, &mut rng);
        assert_eq!(stem.anchor0.y, 0.0);
        assert_eq!(stem.anchor1.y, vessel.height);
        let r0 = Vec3::new(stem.anchor0.x, 0.0, stem.anchor0.z).length();
        assert!(r0 <= vessel.inner_radius() + 1e-4);
        for p in stem.sample_uniform(30) {
            assert!(Vec3::new(p.x, 0.0, p.z).length() <= vessel.radius + 1e-3);
            assert!(p.y >= -1e-3 && p.y <= vessel.height + 1e-3);
        }
    }
}

#[test]
fn stem_polyline_runs_anchor_to_anchor() {
    let (mut plant, _) = make_plant(17);
    assert!(plant.stem_polyline().is_empty());
    plant.generate(0.0).unwrap();
    let line = plant.stem_polyline();
    let stem = plant.stem().unwrap();
    assert_eq!(line.len(), 19);
    assert_eq!(line[0], stem.anchor0);
    assert!(line[18].distance(stem.anchor1) < 1e-3);
}

#[test]
fn seeded_plants_are_reproducible() {
    let (mut a, _) = make_plant(1234);
    let (mut b, _) = make_plant(1234);
    let (mut c, _) = make_plant(4321);
    a.generate(0.0).unwrap();
    b.generate(0.0).unwrap();
    c.generate(0.0).unwrap();
    a.update(120.0).unwrap();
    b.update(120.0).unwrap();
    c.update(120.0).unwrap();
    assert_eq!(a.transforms(), b.transforms());
    assert_ne!(a.stem().unwrap().control0, c.stem().unwrap().control0);
}

#[test]
fn regeneration_swaps_the_whole_layout() {
    let (mut plant, _) = make_plant(77);
    plant.generate(0.0).unwrap();
    let first = plant.layout().unwrap();
    plant.generate(50.0).unwrap();
    let second = plant.layout().unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.start_frame, 0.0);
    assert_eq!(second.start_frame, 50.0);
    // the old snapshot is untouched
    assert_eq!(first.len(), 36);
}

#[test]
fn regenerate_on_settle_restarts_growth() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let cfg = PlantConfig {
        regenerate_on_settle: true,
        ..config(5)
    };
    let mut plant = Plant::new(cfg, Box::new(recorder.clone())).unwrap();
    plant.generate(0.0).unwrap();
    let total = plant.total_duration().unwrap();
    let first = plant.layout().unwrap();

    let phase = plant.update(total + 1.0).unwrap();
    assert_eq!(phase, GrowthPhase::Generated);
    assert_eq!(recorder.borrow().ends, 1);
    let second = plant.layout().unwrap();
    assert_eq!(second.start_frame, total + 1.0);
    assert!(!std::sync::Arc::ptr_eq(&first, &second));

    plant.update(total + 2.0).unwrap();
    assert_eq!(recorder.borrow().starts, 2);
}

#[test]
fn invalid_configs_fail_at_construction() {
    let bad_vessel = PlantConfig {
        vessel: VesselBounds {
            height: 50.0,
            radius: 10.0,
            bevel_radius: 13.0,
        },
        ..PlantConfig::default()
    };
    assert!(matches!(
        Plant::new(bad_vessel, Box::new(NoopObserver)),
        Err(PlantError::InvalidVessel { .. })
    ));

    let no_leaves = PlantConfig {
        leaves_per_segment: 0,
        ..PlantConfig::default()
    };
    assert!(matches!(
        Plant::new(no_leaves, Box::new(NoopObserver)),
        Err(PlantError::InvalidLayout { .. })
    ));
}

#[test]
fn look_rotation_aligns_forward_and_survives_degenerate_up() {
    let forward = Vec3::new(0.3, 0.9, -0.2).normalize();
    let q = look_rotation(forward, Vec3::Z);
    assert!((q * Vec3::NEG_Z - forward).length() < 1e-4);

    let parallel = look_rotation(Vec3::Z, Vec3::Z);
    assert!((parallel * Vec3::NEG_Z - Vec3::Z).length() < 1e-4);

    assert_eq!(look_rotation(Vec3::ZERO, Vec3::Y), glam::Quat::IDENTITY);
}

#[test]
fn leaves_point_along_the_stem() {
    let (mut plant, _) = make_plant(31);
    plant.generate(0.0).unwrap();
    let layout = plant.layout().unwrap();
    let stem = plant.stem().unwrap();
    for bind in &layout.bind_transforms {
        let position = bind.transform_point3(Vec3::ZERO);
        let Some(axis) = bind.transform_vector3(Vec3::Y).try_normalize() else {
            continue;
        };
        // find the closest stem sample and compare with its tangent
        let (t, _) = (0..=200)
            .map(|k| k as f32 / 200.0)
            .map(|t| (t, stem.point_at(t).distance(position)))
            .fold((0.0, f32::MAX), |best, cur| if cur.1 < best.1 { cur } else { best });
        let tangent = stem.tangent_at(t).unwrap_or(Vec3::Y);
        assert!(axis.dot(tangent) > 0.9, "leaf axis {axis:?} vs tangent {tangent:?}");
    }
}

#[test]
fn non_finite_frames_are_rejected_without_settling() {
    let (mut plant, rec) = make_plant(19);
    plant.generate(0.0).unwrap();
    plant.update(10.0).unwrap();
    for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        assert!(matches!(plant.update(bad), Err(PlantError::InvalidFrame(_))));
    }
    assert_eq!(plant.phase(), GrowthPhase::Animating);
    assert_eq!(plant.progress(), 10.0);
    assert_eq!(rec.borrow().ends, 0);

    let before = plant.layout().unwrap();
    assert!(matches!(plant.generate(f32::NAN), Err(PlantError::InvalidFrame(_))));
    assert!(std::sync::Arc::ptr_eq(&before, &plant.layout().unwrap()));
}
