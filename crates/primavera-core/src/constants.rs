// Shared geometry/animation tuning constants used by the core and both frontends.

// Vessel
pub const VESSEL_HEIGHT: f32 = 50.0;
pub const VESSEL_RADIUS: f32 = 20.0;
pub const VESSEL_BEVEL_RADIUS: f32 = 13.0;
pub const VESSEL_SDF_PADDING: f32 = 0.93; // leaves stop short of the glass

// Plant layout
pub const STEM_SEGMENTS: usize = 18;
pub const LEAVES_PER_SEGMENT: usize = 2;
pub const LEAF_SPACING_FACTOR: f32 = 1.2; // >1 keeps the top of the stem bare
pub const LEAF_BASE_OFFSET: f32 = 0.03; // skip the very base of the stem
pub const LEAF_PLACEMENT_JITTER: f32 = 0.015; // fraction of the average leaf spacing
pub const STEM_CAP_OFFSET: f32 = 0.1; // fraction of the bevel radius kept clear at the caps

// Leaf bounding
pub const LEAF_SCALE_CAP: f32 = 1.2;
pub const RAY_MARCH_STEPS: usize = 4;

// Growth timing (in frames)
pub const AVERAGE_LEAF_DURATION: f32 = 300.0;
pub const MIN_DURATION_FRACTION: f32 = 0.75;
pub const LEAF_STAGGER_DELAY: f32 = 2.5;
pub const ENTER_FRACTION: f32 = 0.2;
pub const LEAVE_FRACTION: f32 = 0.2;

// Timelapse jitter
pub const JITTER_STRENGTH: f32 = 0.5;
pub const JITTER_SIZE_FLOOR: f32 = 0.2; // jitter left over at full size
pub const JITTER_FREQ_BASE: f32 = 1.0;
pub const JITTER_FREQ_SPAN: f32 = 5.0;

// Frame clock
pub const NOMINAL_FRAME_MS: f32 = 16.0;
pub const MAX_FRAME_DELTA_MS: f32 = 32.0; // cap after stalls/backgrounding

// Curves
pub const ARC_LENGTH_STEPS: usize = 100;

// Camera
pub const CAMERA_DISTANCE: f32 = 120.0;
pub const CAMERA_NEAR: f32 = 90.0;
pub const CAMERA_FAR: f32 = 150.0;
pub const CAMERA_FOVY: f32 = std::f32::consts::FRAC_PI_4;

// Sound cues
pub const DRONE_NOTES_MIDI: [i32; 5] = [59, 52, 57, 50, 54]; // B3 E3 A3 D3 F#3
pub const PLUCK_LEAF_STRIDE: usize = 5;
pub const BELL_FREQUENCY_HZ: f32 = 100.0;
