use anyhow::{bail, Context};
use glam::Vec3;
use instant::Instant;
use primavera_core::{
    CueKind, CueParams, FrameClock, GrowthPhase, Plant, PlantConfig, SoundCues, NOMINAL_FRAME_MS,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Frames simulated per cycle before giving up on a plant that never settles.
const MAX_FRAMES_PER_CYCLE: u32 = 100_000;

struct Args {
    seed: Option<u64>,
    cycles: u32,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(s) if s != "-" => Some(s.parse().with_context(|| format!("bad seed {s:?}"))?),
        _ => None,
    };
    let cycles = match args.next() {
        Some(c) => c.parse().with_context(|| format!("bad cycle count {c:?}"))?,
        None => 3,
    };
    Ok(Args { seed, cycles })
}

#[derive(Default, Debug)]
struct CycleSummary {
    frames: f32,
    total_duration: f32,
    plucks: usize,
    min_scale: f32,
    max_scale: f32,
    highest_tip: f32,
}

/// Scale range and the highest leaf tip of the current placement, in vessel space.
fn inspect_layout(plant: &Plant, summary: &mut CycleSummary) {
    let Some(layout) = plant.layout() else {
        return;
    };
    let extent = plant.leaf_geometry().extent;
    let model = plant.model_matrix();
    summary.total_duration = layout.total_duration;
    summary.min_scale = layout.bind_scales.iter().copied().fold(f32::MAX, f32::min);
    summary.max_scale = layout.bind_scales.iter().copied().fold(0.0, f32::max);
    summary.highest_tip = layout
        .bind_transforms
        .iter()
        .map(|bind| (model * *bind).transform_point3(extent))
        .map(|tip: Vec3| tip.y)
        .fold(f32::MIN, f32::max);
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = parse_args()?;
    let cues = Rc::new(RefCell::new(SoundCues::new(
        CueParams::default(),
        args.seed.unwrap_or_default(),
    )));
    let queue = cues.borrow().queue();
    let config = PlantConfig {
        seed: args.seed,
        ..PlantConfig::default()
    };
    let mut plant = Plant::new(config, Box::new(cues)).context("building plant")?;
    let mut clock = FrameClock::default();
    let frame_step = Duration::from_secs_f32(NOMINAL_FRAME_MS / 1000.0);
    let started = Instant::now();

    for cycle in 0..args.cycles {
        plant.generate(clock.frames()).context("generating plant")?;
        let mut summary = CycleSummary::default();
        inspect_layout(&plant, &mut summary);
        let cycle_start = clock.frames();

        let mut frames = 0;
        loop {
            let phase = plant.update(clock.advance(frame_step))?;
            for cue in queue.borrow_mut().drain(..) {
                match cue.kind {
                    CueKind::Pluck => {
                        summary.plucks += 1;
                        log::debug!(
                            "[cue] pluck leaf={:?} {:.1} Hz vel={:.2}",
                            cue.leaf_index,
                            cue.frequency_hz,
                            cue.velocity
                        );
                    }
                    kind => log::info!("[cue] {:?} {:.1} Hz", kind, cue.frequency_hz),
                }
            }
            if phase == GrowthPhase::Settled {
                break;
            }
            frames += 1;
            if frames > MAX_FRAMES_PER_CYCLE {
                bail!("cycle {cycle} did not settle after {MAX_FRAMES_PER_CYCLE} frames");
            }
        }
        summary.frames = clock.frames() - cycle_start;

        log::info!(
            "[cycle {}] frames={:.0} total={:.1} plucks={} scale={:.2}..{:.2} highest_tip={:.2}",
            cycle,
            summary.frames,
            summary.total_duration,
            summary.plucks,
            summary.min_scale,
            summary.max_scale,
            summary.highest_tip
        );
    }

    log::info!(
        "simulated {} cycles ({:.0} frames) in {:?}",
        args.cycles,
        clock.frames(),
        started.elapsed()
    );
    Ok(())
}
