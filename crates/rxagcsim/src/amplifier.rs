//! Simulated variable-gain amplifier

use log::trace;

use rxagc::{GainHardware, MAX_GAIN_DB};

/// A variable-gain amplifier in front of a 16-bit ADC
///
/// Samples are scaled by the current gain and clipped to the
/// `i16` range, just as a real converter would clip an
/// overdriven input.
#[derive(Clone, Debug, PartialEq)]
pub struct Amplifier {
    gain_db: u32,
    gain_linear: f32,
}

impl Amplifier {
    /// New amplifier with the given gain (dB)
    ///
    /// The gain is capped at `MAX_GAIN_DB`.
    pub fn new(gain_db: u32) -> Self {
        let mut out = Self {
            gain_db: 0,
            gain_linear: 1.0,
        };
        out.set(gain_db);
        out
    }

    /// Current gain (dB)
    pub fn gain_db(&self) -> u32 {
        self.gain_db
    }

    /// Amplify and digitize one sample
    #[inline]
    pub fn amplify(&self, input: i16) -> i16 {
        let out = input as f32 * self.gain_linear;
        f32::clamp(out.round(), i16::MIN as f32, i16::MAX as f32) as i16
    }

    fn set(&mut self, gain_db: u32) {
        self.gain_db = u32::min(gain_db, MAX_GAIN_DB);
        self.gain_linear = f32::powf(10.0, self.gain_db as f32 / 20.0);
    }
}

impl GainHardware for Amplifier {
    fn set_gain(&mut self, gain_db: u32) {
        trace!("amplifier: gain {} → {} dB", self.gain_db, gain_db);
        self.set(gain_db);
    }

    fn get_gain(&mut self) -> Option<u32> {
        Some(self.gain_db)
    }
}
