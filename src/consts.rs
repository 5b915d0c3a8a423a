// Runtime parameters
pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_HEIGHT: u32 = 768;
pub const DEFAULT_FOV_DEGREES: f64 = 60.0;

// Scheduler parameters
pub const FALLBACK_WORKERS: usize = 4;
pub const QUEUE_WAIT_MILLIS: u64 = 10;

// Surface epsilon for box face classification
pub const FACE_EPSILON: f64 = 1.0e-3;
