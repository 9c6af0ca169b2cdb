//! Automatic gain control
//!
//! This is the microprocessor-controlled AGC described in
//! * F. Harris and G. Smith, "On the Design, Implementation,
//!   and Performance of a Microprocessor-Controlled AGC System
//!   for a Digital Receiver," IEEE MILCOM 1988
//! * R. Lyons, "Understanding Digital Signal Processing," 3rd ed.,
//!   section 13.30
//!
//! Let `R` be the operating point, `x(n)` the signal level
//! before the variable-gain amplifier, and `g(n)` the gain of
//! that amplifier, all in dB. The AGC measures the amplified
//! level `y(n)` and updates the gain with
//!
//! ```txt
//! y(n)   = x(n) + g(n)
//! e(n)   = R - y(n)
//! g(n+1) = g(n) + alpha * e(n)
//! ```
//!
//! The error `e(n)` is zeroed inside a deadband around the
//! operating point and when the amplifier is already pinned
//! against the rail it would be pushed into.

#[cfg(not(test))]
use log::{debug, info, trace, warn};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as info;
#[cfg(test)]
use std::println as trace;
#[cfg(test)]
use std::println as warn;

use thiserror::Error;

use crate::blanking::Blanking;
use crate::hardware::GainHardware;
use crate::status::AgcStatus;

/// Maximum adjustable amplifier gain (dB)
///
/// The IF amplifier provides gains from zero to this value.
pub const MAX_GAIN_DB: u32 = 46;

/// Largest permitted deadband (dB)
pub const MAX_DEADBAND_DB: u32 = 10;

/// Largest permitted blanking limit (measurements)
pub const MAX_BLANKING_LIMIT: u32 = 10;

/// Permitted range of the filter coefficient, `[min, max)`
pub const FILTER_COEFFICIENT_RANGE: (f32, f32) = (0.001, 0.999);

// defaults applied by initialization
const DEFAULT_GAIN_DB: u32 = 24;
pub(crate) const DEFAULT_DEADBAND_DB: u32 = 1;
pub(crate) const DEFAULT_BLANKING_LIMIT: u32 = 1;
pub(crate) const DEFAULT_ALPHA: f32 = 0.8;

/// A rejected AGC configuration request
///
/// A rejected request never changes the state of the AGC.
#[derive(Error, Clone, Copy, Debug, PartialEq)]
pub enum AgcError {
    /// Filter coefficient is not in `[0.001, 0.999)`
    #[error("AGC filter coefficient {0} is outside [0.001, 0.999)")]
    FilterCoefficientOutOfRange(f32),

    /// Deadband exceeds the maximum
    #[error("AGC deadband {0} dB exceeds the maximum of 10 dB")]
    DeadbandOutOfRange(u32),

    /// Blanking limit exceeds the maximum
    #[error("AGC blanking limit {0} exceeds the maximum of 10 measurements")]
    BlankingLimitOutOfRange(u32),

    /// `enable()` called on a running AGC
    #[error("AGC is already enabled")]
    AlreadyEnabled,

    /// `disable()` called on a stopped AGC
    #[error("AGC is already disabled")]
    AlreadyDisabled,
}

/// Result of one measurement
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::IntoStaticStr)]
pub enum AgcOutcome {
    /// The AGC is disabled and ignored the measurement
    #[strum(serialize = "disabled")]
    Disabled,

    /// The measurement fell inside a blanking interval
    #[strum(serialize = "blanked")]
    Blanked,

    /// The control law ran but made no adjustment
    ///
    /// No hardware write was issued.
    #[strum(serialize = "held")]
    Held {
        /// Current gain (dB)
        gain_db: u32,
    },

    /// The gain was adjusted and written to the hardware
    #[strum(serialize = "adjusted")]
    Adjusted {
        /// New gain (dB)
        gain_db: u32,
    },
}

impl AgcOutcome {
    /// Short name of the outcome
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// True if the gain was changed
    pub fn is_adjusted(&self) -> bool {
        matches!(self, AgcOutcome::Adjusted { .. })
    }
}

/// Automatic gain control
///
/// The `Agc` drives a variable-gain amplifier so that the
/// amplified signal level converges to an *operating point*
/// in dBFs. Feed it one level measurement at a time with
/// [`accept()`](#method.accept), typically once per block of
/// received samples.
///
/// The amplifier is reached through the [`GainHardware`]
/// `H`. The AGC starts out disabled; call
/// [`enable()`](#method.enable) to close the loop.
///
/// ```
/// use rxagc::{Agc, AgcOutcome, Detached};
///
/// let mut agc = Agc::new(-12, Detached);
/// agc.enable().unwrap();
/// assert_eq!(agc.accept(-30), AgcOutcome::Adjusted { gain_db: 38 });
/// assert_eq!(agc.accept(-30), AgcOutcome::Blanked);
/// ```
///
/// The engine is a plain value with no interior mutability.
/// If several threads must share it, wrap the whole engine
/// in a single `Mutex`.
#[derive(Clone, Debug)]
pub struct Agc<H> {
    // true if the loop is closed
    enabled: bool,

    // target post-amplification level (dBFs)
    operating_point_db_fs: i32,

    // half-width of the no-adjustment window (dB)
    deadband_db: u32,

    // control law gain: lower → slower, more stable
    alpha: f32,

    // our belief about the amplifier gain (dB)
    gain_db: u32,

    // filter memory; gain_db is its truncation
    filtered_gain_db: f32,

    // signal level before amplification, for diagnostics
    normalized_signal_db_fs: i32,

    // measurements to ignore after an adjustment
    blanking_limit: u32,

    blanking: Blanking,

    hardware: H,
}

impl<H> Agc<H>
where
    H: GainHardware,
{
    /// Create and initialize an AGC
    ///
    /// The AGC will attempt to hold the amplified signal at
    /// `operating_point_db_fs`. Full scale is 0 dBFs; all
    /// other levels are negative.
    ///
    /// All other parameters take their defaults: a deadband
    /// of 1 dB, a blanking limit of 1, a filter coefficient of
    /// 0.8, and an initial gain of 24 dB. The new AGC is
    /// disabled.
    pub fn new(operating_point_db_fs: i32, hardware: H) -> Self {
        Self {
            enabled: false,
            operating_point_db_fs,
            deadband_db: DEFAULT_DEADBAND_DB,
            alpha: DEFAULT_ALPHA,
            gain_db: DEFAULT_GAIN_DB,
            filtered_gain_db: DEFAULT_GAIN_DB as f32,
            normalized_signal_db_fs: -(DEFAULT_GAIN_DB as i32),
            blanking_limit: DEFAULT_BLANKING_LIMIT,
            blanking: Blanking::Active,
            hardware,
        }
    }

    /// Re-initialize
    ///
    /// Returns every parameter to its default, installs new
    /// `hardware`, and disables the AGC. The previous hardware
    /// is returned.
    pub fn initialize(&mut self, operating_point_db_fs: i32, hardware: H) -> H {
        let old = std::mem::replace(self, Self::new(operating_point_db_fs, hardware));
        old.hardware
    }

    /// Set the operating point (dBFs)
    pub fn set_operating_point(&mut self, operating_point_db_fs: i32) {
        self.operating_point_db_fs = operating_point_db_fs;
    }

    /// Set the filter coefficient
    ///
    /// The coefficient sets the time constant of the
    /// first-order gain filter. Small values converge slowly
    /// but are very stable. The coefficient must lie within
    /// `[0.001, 0.999)`.
    pub fn set_filter_coefficient(&mut self, alpha: f32) -> Result<(), AgcError> {
        let (min, max) = FILTER_COEFFICIENT_RANGE;
        if alpha >= min && alpha < max {
            self.alpha = alpha;
            Ok(())
        } else {
            Err(AgcError::FilterCoefficientOutOfRange(alpha))
        }
    }

    /// Set the deadband (dB)
    ///
    /// No adjustment is made while the gain error is within
    /// `±deadband_db`. This prevents the gain from chattering
    /// around the operating point. At most 10 dB.
    pub fn set_deadband(&mut self, deadband_db: u32) -> Result<(), AgcError> {
        if deadband_db <= MAX_DEADBAND_DB {
            self.deadband_db = deadband_db;
            Ok(())
        } else {
            Err(AgcError::DeadbandOutOfRange(deadband_db))
        }
    }

    /// Set the blanking limit (measurements)
    ///
    /// After each adjustment, the next `limit` measurements
    /// are ignored while the hardware settles. Zero disables
    /// blanking; at most 10. Any blanking interval in progress
    /// is cancelled.
    pub fn set_blanking_limit(&mut self, limit: u32) -> Result<(), AgcError> {
        if limit <= MAX_BLANKING_LIMIT {
            self.blanking_limit = limit;
            self.blanking.reset();
            Ok(())
        } else {
            Err(AgcError::BlankingLimitOutOfRange(limit))
        }
    }

    /// Close the control loop
    ///
    /// Fails if the AGC is already enabled.
    pub fn enable(&mut self) -> Result<(), AgcError> {
        if self.enabled {
            return Err(AgcError::AlreadyEnabled);
        }

        self.blanking.reset();
        self.enabled = true;
        info!("agc: enabled at {} dB gain", self.gain_db);
        Ok(())
    }

    /// Open the control loop
    ///
    /// The gain is left wherever it is. Fails if the AGC is
    /// already disabled.
    pub fn disable(&mut self) -> Result<(), AgcError> {
        if !self.enabled {
            return Err(AgcError::AlreadyDisabled);
        }

        self.enabled = false;
        info!("agc: disabled at {} dB gain", self.gain_db);
        Ok(())
    }

    /// True if the control loop is closed
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Process a signal level measurement
    ///
    /// `signal_level_db_fs` is the level of the received
    /// signal *after* the variable-gain amplifier, usually
    /// the average magnitude of a block of samples.
    ///
    /// If the AGC is enabled, it first reads back the hardware
    /// gain in case somebody else changed it. Unless the
    /// measurement falls in a blanking interval, the control
    /// law runs and any resulting change is written to the
    /// hardware.
    pub fn accept(&mut self, signal_level_db_fs: i32) -> AgcOutcome {
        if !self.enabled {
            return AgcOutcome::Disabled;
        }

        self.reconcile();

        if !self.blanking.gate(self.blanking_limit) {
            trace!("agc: blanked: ignoring {} dBFs", signal_level_db_fs);
            return AgcOutcome::Blanked;
        }

        self.run(signal_level_db_fs)
    }

    /// Operating point (dBFs)
    pub fn operating_point(&self) -> i32 {
        self.operating_point_db_fs
    }

    /// Filter coefficient
    pub fn filter_coefficient(&self) -> f32 {
        self.alpha
    }

    /// Deadband (dB)
    pub fn deadband(&self) -> u32 {
        self.deadband_db
    }

    /// Blanking limit (measurements)
    pub fn blanking_limit(&self) -> u32 {
        self.blanking_limit
    }

    /// Blanking state
    pub fn blanking(&self) -> Blanking {
        self.blanking
    }

    /// Current amplifier gain (dB)
    ///
    /// This is the AGC's belief, which tracks the hardware
    /// whenever the hardware gain can be read back.
    pub fn gain(&self) -> u32 {
        self.gain_db
    }

    /// Unrounded gain filter state (dB)
    pub fn filtered_gain(&self) -> f32 {
        self.filtered_gain_db
    }

    /// Estimated signal level before amplification (dBFs)
    ///
    /// Updated each time the control law runs.
    pub fn normalized_signal(&self) -> i32 {
        self.normalized_signal_db_fs
    }

    /// Hardware capabilities
    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    /// Hardware capabilities (mutable)
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    /// Snapshot of the AGC state, for diagnostics
    pub fn status(&self) -> AgcStatus {
        AgcStatus {
            enabled: self.enabled,
            blanking: self.blanking,
            blanking_limit: self.blanking_limit,
            alpha: self.alpha,
            deadband_db: self.deadband_db,
            operating_point_db_fs: self.operating_point_db_fs,
            gain_db: self.gain_db,
            filtered_gain_db: self.filtered_gain_db,
            normalized_signal_db_fs: self.normalized_signal_db_fs,
        }
    }

    // Adopt the hardware gain if someone else changed it
    //
    // Readings outside the adjustable range are discarded,
    // and the AGC's own belief stands. An adopted reading
    // also replaces the filter memory, so that the gain
    // stays the truncation of the filtered gain.
    fn reconcile(&mut self) {
        match self.hardware.get_gain() {
            Some(gain_db) if gain_db > MAX_GAIN_DB => {
                warn!(
                    "agc: discarding hardware gain reading of {} dB (max {} dB)",
                    gain_db, MAX_GAIN_DB
                );
            }
            Some(gain_db) if gain_db != self.gain_db => {
                debug!(
                    "agc: hardware gain changed out-of-band: {} → {} dB",
                    self.gain_db, gain_db
                );
                self.gain_db = gain_db;
                self.filtered_gain_db = gain_db as f32;
            }
            _ => {}
        }
    }

    // Run the control law on one measurement
    fn run(&mut self, signal_level_db_fs: i32) -> AgcOutcome {
        self.normalized_signal_db_fs = signal_level_db_fs.saturating_sub(self.gain_db as i32);

        let mut gain_error = self.operating_point_db_fs as i64 - signal_level_db_fs as i64;

        // don't push an amplifier that is already on the rail
        if self.gain_db == MAX_GAIN_DB && gain_error > 0 {
            gain_error = 0;
        } else if self.gain_db == 0 && gain_error < 0 {
            gain_error = 0;
        }

        if gain_error.unsigned_abs() <= self.deadband_db as u64 {
            gain_error = 0;
        }

        // accumulate in float so that small errors still converge
        self.filtered_gain_db += self.alpha * gain_error as f32;
        self.filtered_gain_db = f32::clamp(self.filtered_gain_db, 0.0, MAX_GAIN_DB as f32);
        self.gain_db = self.filtered_gain_db as u32;

        trace!(
            "agc: level {} dBFs, error {} dB, gain {} dB (filtered {:.2})",
            signal_level_db_fs,
            gain_error,
            self.gain_db,
            self.filtered_gain_db
        );

        if gain_error == 0 {
            return AgcOutcome::Held {
                gain_db: self.gain_db,
            };
        }

        debug!("agc: adjusted gain to {} dB", self.gain_db);
        self.hardware.set_gain(self.gain_db);
        self.blanking.arm();
        AgcOutcome::Adjusted {
            gain_db: self.gain_db,
        }
    }
}
