#![cfg(target_arch = "wasm32")]
//! Browser bindings: the page owns the canvas, the GL programs and the audio
//! graph; this module owns the plant and hands out flat buffers and cues.

use anyhow::Context;
use glam::{Quat, Vec3};
use js_sys::{Float32Array, Function, Uint32Array};
use primavera_core::{
    Camera, CueKind, CueParams, DrawUniforms, FrameClock, GrowthObserver, GrowthPhase, Plant,
    PlantConfig, SoundCue, SoundCues, VesselBounds,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("primavera-web starting");
    Ok(())
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Forwards growth events to optional page callbacks and queues sound cues.
struct JsObserver {
    on_leaf_grow: Option<Function>,
    on_grow_start: Option<Function>,
    on_grow_end: Option<Function>,
    cues: SoundCues,
}

impl JsObserver {
    fn call(callback: &Option<Function>, arg: JsValue) {
        if let Some(f) = callback {
            if let Err(e) = f.call1(&JsValue::NULL, &arg) {
                log::error!("[observer] callback failed: {:?}", e);
            }
        }
    }
}

impl GrowthObserver for JsObserver {
    fn on_leaf_grow(&mut self, index: usize) {
        self.cues.on_leaf_grow(index);
        Self::call(&self.on_leaf_grow, JsValue::from(index as u32));
    }

    fn on_plant_grow_start(&mut self) {
        self.cues.on_plant_grow_start();
        Self::call(&self.on_grow_start, JsValue::UNDEFINED);
    }

    fn on_plant_grow_end(&mut self) {
        self.cues.on_plant_grow_end();
        Self::call(&self.on_grow_end, JsValue::UNDEFINED);
    }
}

fn phase_name(phase: GrowthPhase) -> &'static str {
    match phase {
        GrowthPhase::Uninitialized => "uninitialized",
        GrowthPhase::Generated => "generated",
        GrowthPhase::Animating => "animating",
        GrowthPhase::Settled => "settled",
    }
}

fn cue_code(kind: CueKind) -> f32 {
    match kind {
        CueKind::Drone => 0.0,
        CueKind::Pluck => 1.0,
        CueKind::Bell => 2.0,
    }
}

fn build_plant(
    height: f32,
    radius: f32,
    bevel: f32,
    seed: Option<u64>,
    observer: Rc<RefCell<JsObserver>>,
) -> anyhow::Result<Plant> {
    let vessel = VesselBounds::new(height, radius, bevel).context("vessel dimensions")?;
    let config = PlantConfig {
        vessel,
        seed,
        regenerate_on_settle: true,
        ..PlantConfig::default()
    };
    Plant::new(config, Box::new(observer)).context("building plant")
}

/// One plant in one vessel, driven from `requestAnimationFrame`.
#[wasm_bindgen]
pub struct PlantHandle {
    plant: Plant,
    clock: FrameClock,
    last_timestamp_ms: Option<f64>,
    camera: Camera,
    observer: Rc<RefCell<JsObserver>>,
    cues: Rc<RefCell<Vec<SoundCue>>>,
}

#[wasm_bindgen]
impl PlantHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(height: f32, radius: f32, bevel: f32, seed: Option<f64>) -> Result<PlantHandle, JsValue> {
        let seed = seed.map(|s| s as u64);
        let cues = SoundCues::new(CueParams::default(), seed.unwrap_or_default());
        let queue = cues.queue();
        let observer = Rc::new(RefCell::new(JsObserver {
            on_leaf_grow: None,
            on_grow_start: None,
            on_grow_end: None,
            cues,
        }));
        let plant = build_plant(height, radius, bevel, seed, observer.clone()).map_err(|e| {
            log::error!("[plant] {:#}", e);
            js_err(format!("{:#}", e))
        })?;
        Ok(PlantHandle {
            plant,
            clock: FrameClock::default(),
            last_timestamp_ms: None,
            camera: Camera::default(),
            observer,
            cues: queue,
        })
    }

    pub fn set_on_leaf_grow(&mut self, callback: Option<Function>) {
        self.observer.borrow_mut().on_leaf_grow = callback;
    }

    pub fn set_on_grow_start(&mut self, callback: Option<Function>) {
        self.observer.borrow_mut().on_grow_start = callback;
    }

    pub fn set_on_grow_end(&mut self, callback: Option<Function>) {
        self.observer.borrow_mut().on_grow_end = callback;
    }

    pub fn generate(&mut self) -> Result<(), JsValue> {
        self.plant.generate(self.clock.frames()).map_err(js_err)
    }

    /// Advance to an explicit frame number.
    pub fn update(&mut self, frame: f32) -> Result<String, JsValue> {
        let phase = self.plant.update(frame).map_err(js_err)?;
        Ok(phase_name(phase).to_string())
    }

    /// Advance the frame clock from a `requestAnimationFrame` timestamp and update.
    pub fn tick(&mut self, timestamp_ms: f64) -> Result<String, JsValue> {
        if let Some(prev) = self.last_timestamp_ms.replace(timestamp_ms) {
            self.clock.advance_ms((timestamp_ms - prev) as f32);
        }
        self.update(self.clock.frames())
    }

    pub fn phase(&self) -> String {
        phase_name(self.plant.phase()).to_string()
    }

    pub fn instance_count(&self) -> usize {
        self.plant.instance_count()
    }

    /// Per-instance matrices, 16 column-major floats each.
    pub fn transforms(&self) -> Float32Array {
        Float32Array::from(self.plant.transforms_f32())
    }

    pub fn leaf_positions(&self) -> Float32Array {
        Float32Array::from(self.plant.leaf_geometry().mesh.positions_f32())
    }

    pub fn leaf_normals(&self) -> Float32Array {
        Float32Array::from(self.plant.leaf_geometry().mesh.normals_f32())
    }

    pub fn leaf_uvs(&self) -> Float32Array {
        Float32Array::from(self.plant.leaf_geometry().mesh.uvs_f32())
    }

    pub fn leaf_indices(&self) -> Uint32Array {
        Uint32Array::from(self.plant.leaf_geometry().mesh.indices.as_slice())
    }

    pub fn model_matrix(&self) -> Float32Array {
        Float32Array::from(&self.plant.model_matrix().to_cols_array()[..])
    }

    pub fn stem_polyline(&self) -> Float32Array {
        let points = self.plant.stem_polyline();
        Float32Array::from(bytemuck::cast_slice::<Vec3, f32>(&points))
    }

    /// World, view, projection and normal matrices followed by the eye
    /// position: 67 floats for a scene rotated by the arcball quaternion.
    pub fn uniforms(&mut self, width: u32, height: u32, qx: f32, qy: f32, qz: f32, qw: f32) -> Float32Array {
        self.camera.set_viewport(width, height);
        let u = DrawUniforms::new(&self.camera, Quat::from_xyzw(qx, qy, qz, qw));
        let mut out = Vec::with_capacity(16 * 4 + 3);
        out.extend_from_slice(&u.plant_world(self.plant.model_matrix()).to_cols_array());
        out.extend_from_slice(&u.view.to_cols_array());
        out.extend_from_slice(&u.projection.to_cols_array());
        out.extend_from_slice(&u.world_inverse_transpose.to_cols_array());
        out.extend_from_slice(&u.camera_position.to_array());
        Float32Array::from(out.as_slice())
    }

    /// Pending sound cues as `[kind, frequency_hz, velocity]` triples
    /// (kind 0 drone, 1 pluck, 2 bell). Clears the queue.
    pub fn drain_cues(&mut self) -> Float32Array {
        let drained: Vec<f32> = self
            .cues
            .borrow_mut()
            .drain(..)
            .flat_map(|c| [cue_code(c.kind), c.frequency_hz, c.velocity])
            .collect();
        Float32Array::from(drained.as_slice())
    }
}
