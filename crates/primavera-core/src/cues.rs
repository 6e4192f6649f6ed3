use crate::constants::{BELL_FREQUENCY_HZ, DRONE_NOTES_MIDI, PLUCK_LEAF_STRIDE};
use crate::growth::GrowthObserver;
use rand::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Pentatonic degrees, including the octave, that the leaf plucks walk through.
pub const C_MAJOR_PENTATONIC: &[i32] = &[0, 2, 4, 7, 9, 12];

/// Which instrument a cue is meant for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CueKind {
    /// Retune the sustained base oscillator.
    Drone,
    /// Short percussive note for a leaf appearing.
    Pluck,
    /// Metallic hit when the plant has finished growing.
    Bell,
}

/// A sound request produced from a growth event.
///
/// Fields:
/// - `kind`: target instrument
/// - `frequency_hz`: pitch in Hertz (already converted from MIDI)
/// - `velocity`: normalized loudness 0..1
/// - `leaf_index`: the leaf that triggered a pluck
#[derive(Clone, Debug, PartialEq)]
pub struct SoundCue {
    pub kind: CueKind,
    pub frequency_hz: f32,
    pub velocity: f32,
    pub leaf_index: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct CueParams {
    /// Only every n-th leaf plucks.
    pub leaf_stride: usize,
    pub scale: &'static [i32],
    pub root_midi: i32,
}

impl Default for CueParams {
    fn default() -> Self {
        Self {
            leaf_stride: PLUCK_LEAF_STRIDE,
            scale: C_MAJOR_PENTATONIC,
            root_midi: 71, // B4
        }
    }
}

/// Growth observer that turns lifecycle events into [`SoundCue`]s.
///
/// Cues accumulate in a shared queue; the audio side drains it once per
/// frame through a handle from [`SoundCues::queue`].
pub struct SoundCues {
    params: CueParams,
    rng: StdRng,
    queue: Rc<RefCell<Vec<SoundCue>>>,
}

impl SoundCues {
    pub fn new(params: CueParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
            queue: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn queue(&self) -> Rc<RefCell<Vec<SoundCue>>> {
        self.queue.clone()
    }

    fn push(&self, cue: SoundCue) {
        self.queue.borrow_mut().push(cue);
    }
}

impl GrowthObserver for SoundCues {
    fn on_leaf_grow(&mut self, index: usize) {
        let stride = self.params.leaf_stride.max(1);
        if index % stride != 0 || self.params.scale.is_empty() {
            return;
        }
        let step = index / stride;
        let degree = self.params.scale[step % self.params.scale.len()];
        let midi = self.params.root_midi + degree;
        let velocity = 0.5 + self.rng.gen::<f32>() * 0.5;
        self.push(SoundCue {
            kind: CueKind::Pluck,
            frequency_hz: midi_to_hz(midi as f32),
            velocity,
            leaf_index: Some(index),
        });
    }

    fn on_plant_grow_start(&mut self) {
        let midi = *DRONE_NOTES_MIDI.choose(&mut self.rng).unwrap_or(&DRONE_NOTES_MIDI[0]);
        self.push(SoundCue {
            kind: CueKind::Drone,
            frequency_hz: midi_to_hz(midi as f32),
            velocity: 1.0,
            leaf_index: None,
        });
    }

    fn on_plant_grow_end(&mut self) {
        self.push(SoundCue {
            kind: CueKind::Bell,
            frequency_hz: BELL_FREQUENCY_HZ,
            velocity: 1.0,
            leaf_index: None,
        });
    }
}

pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * (2.0_f32).powf((midi - 69.0) / 12.0)
}
