//! AGC diagnostics

use std::fmt;

use crate::blanking::Blanking;

/// Snapshot of the AGC state
///
/// Obtained from [`Agc::status()`](crate::Agc::status). The
/// `Display` implementation renders a human-readable table
/// which is suitable for a diagnostic dump.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgcStatus {
    /// True if the control loop is closed
    pub enabled: bool,

    /// Blanking state
    pub blanking: Blanking,

    /// Blanking limit (measurements)
    pub blanking_limit: u32,

    /// Filter coefficient
    pub alpha: f32,

    /// Deadband (dB)
    pub deadband_db: u32,

    /// Operating point (dBFs)
    pub operating_point_db_fs: i32,

    /// Amplifier gain (dB)
    pub gain_db: u32,

    /// Unrounded gain filter state (dB)
    pub filtered_gain_db: f32,

    /// Signal level before amplification (dBFs)
    pub normalized_signal_db_fs: i32,
}

impl fmt::Display for AgcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--------------------------------------------")?;
        writeln!(f, "AGC Internal Information")?;
        writeln!(f, "--------------------------------------------")?;
        writeln!(
            f,
            "AGC Enabled                 : {}",
            if self.enabled { "Yes" } else { "No" }
        )?;
        writeln!(
            f,
            "Blanking                    : {} ({} ticks)",
            self.blanking.as_str(),
            self.blanking.counter()
        )?;
        writeln!(f, "Blanking Limit              : {} ticks", self.blanking_limit)?;
        writeln!(f, "Lowpass Filter Coefficient  : {:.3}", self.alpha)?;
        writeln!(f, "Deadband                    : {} dB", self.deadband_db)?;
        writeln!(f, "Operating Point             : {} dBFs", self.operating_point_db_fs)?;
        writeln!(
            f,
            "Gain                        : {} dB ({:.2} filtered)",
            self.gain_db, self.filtered_gain_db
        )?;
        write!(
            f,
            "RSSI (Before Amp)           : {} dBFs",
            self.normalized_signal_db_fs
        )
    }
}
