//! Core compile-time constants for the monitor.
//!
//!  * Frame geometry is fixed by the sensor firmware and the trained model.
//!  * Protocol bytes match what the sensor expects on the wire.
//!  * Derived constants are expressed as `const` arithmetic so the compiler
//!    checks them.

/* --------------------------------------------------------------------- */
/*  Frame geometry                                                       */

/// Time steps in one acquisition frame.
pub const FRAME_STEPS: usize = 200;

/// Mel bands per time step.
pub const MEL_BANDS: usize = 40;

/// Channels per (step, band) cell.
pub const FRAME_CHANNELS: usize = 1;

/// Integers the sensor sends per frame (200 × 40).
pub const FRAME_LEN: usize = FRAME_STEPS * MEL_BANDS * FRAME_CHANNELS;

/// Sub-frames fed to the model as one batch.
pub const SUB_FRAMES: usize = 3;

/// Time steps per sub-frame.
pub const SUB_FRAME_STEPS: usize = 64;

/// Steps consumed by the splitter; rows `[192, 200)` are dropped.
pub const CONSUMED_STEPS: usize = SUB_FRAMES * SUB_FRAME_STEPS;

/* --------------------------------------------------------------------- */
/*  Scoring                                                              */

/// Rows kept in the sliding score window (three cycles of three sub-frames).
pub const HISTORY_DEPTH: usize = 9;

/// Raw activations are reported as pseudo-percentages.
pub const SCORE_SCALE: f64 = 100.0;

/* --------------------------------------------------------------------- */
/*  Serial protocol                                                      */

/// Request byte asking the sensor for one filtered mel frame.
pub const TRIGGER_BYTE: u8 = b'3';

/// Framing character marking the last line of a frame.
pub const END_OF_FRAME: char = 'e';

/// Longest wire form of one value and its comma (`-2147483648,`).
pub const MAX_TOKEN_BYTES: usize = 12;

/// Default serial speed.
pub const DEFAULT_BAUD_RATE: u32 = 921_600;

/// Default device-level read timeout (milliseconds).
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;

/// Default pause between cycles (milliseconds).
pub const DEFAULT_PERIOD_MS: u64 = 1_000;

const _: () = assert!(CONSUMED_STEPS <= FRAME_STEPS);
