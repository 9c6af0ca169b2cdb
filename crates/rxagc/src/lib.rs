//! # rxagc: Automatic Gain Control for Digital Receivers
//!
//! This crate provides a closed-loop automatic gain control
//! (AGC) for a digital receiver with a variable-gain amplifier
//! in front of its analog-to-digital converter. Given a periodic
//! measurement of the received signal level, in dB relative to
//! full scale (dBFs), it adjusts the amplifier gain so that the
//! digitized signal converges to a configured *operating point*.
//!
//! ## Example
//!
//! You will first need a way to set (and, ideally, read back)
//! the gain of your amplifier. Implement
//! [`GainHardware`] for it, or wrap a pair of closures in
//! [`Callbacks`].
//!
//! ```
//! use rxagc::{AgcBuilder, AgcOutcome, DbfsCalculator, GainHardware};
//!
//! // stand-in for a real tuner driver
//! #[derive(Default)]
//! struct Tuner {
//!     gain_db: u32,
//! }
//!
//! impl GainHardware for Tuner {
//!     fn set_gain(&mut self, gain_db: u32) {
//!         self.gain_db = gain_db;
//!     }
//!
//!     fn get_gain(&mut self) -> Option<u32> {
//!         Some(self.gain_db)
//!     }
//! }
//!
//! let mut agc = AgcBuilder::new(-12)   // operating point, dBFs
//!     .with_filter_coefficient(0.8)    // loop gain, 0.001 ≤ alpha < 0.999
//!     .with_deadband(1)                // dB
//!     .with_blanking_limit(1)          // measurements to skip after a change
//!     .with_enabled(true)
//!     .build(Tuner { gain_db: 24 })
//!     .expect("valid parameters");
//!
//! // your receiver measures the average magnitude of each
//! // block of 8-bit samples
//! let dbfs = DbfsCalculator::new(8).unwrap();
//! let level = dbfs.magnitude_to_dbfs(4);
//! assert_eq!(level, -30);
//!
//! match agc.accept(level) {
//!     AgcOutcome::Adjusted { gain_db } => assert_eq!(gain_db, 38),
//!     other => panic!("unexpected {:?}", other),
//! }
//! assert_eq!(agc.hardware().gain_db, 38);
//! ```
//!
//! ## The control loop
//!
//! Each call to [`Agc::accept()`] runs one step of the loop:
//!
//! 1. **Reconciliation.** The hardware gain is read back. If
//!    somebody else changed it, the AGC adopts the new value.
//! 2. **Blanking.** If the gain was adjusted recently, the
//!    measurement is ignored. See [`Blanking`].
//! 3. **Control law.** The gain error between the operating
//!    point and the measurement is zeroed inside the deadband
//!    or against a gain rail, then filtered into the gain with
//!    a first-order low-pass filter.
//! 4. **Adjustment.** Only if the error was nonzero, the new
//!    gain is written to the hardware and blanking begins.
//!
//! The gain is confined to `0..=`[`MAX_GAIN_DB`] at all times.
//!
//! Each `Agc` is an independent value with no global state.
//! Create as many as you have amplifiers.

mod agc;
mod blanking;
mod builder;
mod dbfs;
mod hardware;
mod status;

pub use agc::{
    Agc, AgcError, AgcOutcome, FILTER_COEFFICIENT_RANGE, MAX_BLANKING_LIMIT, MAX_DEADBAND_DB,
    MAX_GAIN_DB,
};
pub use blanking::Blanking;
pub use builder::AgcBuilder;
pub use dbfs::{DbfsCalculator, DbfsError, MAX_WORD_LENGTH, MIN_WORD_LENGTH};
pub use hardware::{Callbacks, Detached, GainHardware};
pub use status::AgcStatus;
