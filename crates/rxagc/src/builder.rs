use crate::agc::{
    Agc, AgcError, DEFAULT_ALPHA, DEFAULT_BLANKING_LIMIT, DEFAULT_DEADBAND_DB,
};
use crate::hardware::GainHardware;

/// Builds an automatic gain control
///
/// The builder comes with the same defaults as
/// [`Agc::new()`](struct.Agc.html#method.new). All you really
/// need to provide is the operating point.
///
/// ```
/// use rxagc::{AgcBuilder, Detached};
///
/// let agc = AgcBuilder::new(-20)
///     .with_filter_coefficient(0.25)   // slower loop, 0.001 ≤ alpha < 0.999
///     .with_deadband(2)                // dB, ≤ 10
///     .with_blanking_limit(3)          // measurements, ≤ 10
///     .with_enabled(true)
///     .build(Detached)
///     .expect("valid AGC parameters");
/// assert!(agc.is_enabled());
/// assert_eq!(agc.deadband(), 2);
/// ```
///
/// Values are validated when the AGC is built, using the
/// same rules as the `Agc` setters.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct AgcBuilder {
    operating_point_db_fs: i32,
    alpha: f32,
    deadband_db: u32,
    blanking_limit: u32,
    enabled: bool,
}

impl AgcBuilder {
    /// New AGC with "sensible" defaults
    ///
    /// The AGC will try to hold the amplified signal at the
    /// given operating point, in dBFs.
    pub fn new(operating_point_db_fs: i32) -> Self {
        Self {
            operating_point_db_fs,
            alpha: DEFAULT_ALPHA,
            deadband_db: DEFAULT_DEADBAND_DB,
            blanking_limit: DEFAULT_BLANKING_LIMIT,
            enabled: false,
        }
    }

    /// Build the AGC
    ///
    /// Binds the AGC to the given `hardware`. Fails if any
    /// parameter is out of range.
    pub fn build<H>(&self, hardware: H) -> Result<Agc<H>, AgcError>
    where
        H: GainHardware,
    {
        let mut agc = Agc::new(self.operating_point_db_fs, hardware);
        agc.set_filter_coefficient(self.alpha)?;
        agc.set_deadband(self.deadband_db)?;
        agc.set_blanking_limit(self.blanking_limit)?;
        if self.enabled {
            agc.enable()?;
        }
        Ok(agc)
    }

    /// Operating point (dBFs)
    pub fn with_operating_point(&mut self, operating_point_db_fs: i32) -> &mut Self {
        self.operating_point_db_fs = operating_point_db_fs;
        self
    }

    /// Gain filter coefficient
    ///
    /// Controls how fast the gain is permitted to move
    /// towards the operating point. Must be within
    /// `[0.001, 0.999)`.
    pub fn with_filter_coefficient(&mut self, alpha: f32) -> &mut Self {
        self.alpha = alpha;
        self
    }

    /// Deadband (dB)
    pub fn with_deadband(&mut self, deadband_db: u32) -> &mut Self {
        self.deadband_db = deadband_db;
        self
    }

    /// Blanking limit (measurements)
    ///
    /// Number of measurements to ignore after every gain
    /// adjustment. Zero disables blanking.
    pub fn with_blanking_limit(&mut self, limit: u32) -> &mut Self {
        self.blanking_limit = limit;
        self
    }

    /// Start the AGC enabled
    pub fn with_enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = enabled;
        self
    }

    /// Operating point (dBFs)
    pub fn operating_point(&self) -> i32 {
        self.operating_point_db_fs
    }

    /// Gain filter coefficient
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

    /// True if the AGC starts enabled
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

impl std::default::Default for AgcBuilder {
    fn default() -> Self {
        Self::new(-12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;

    use crate::hardware::Detached;

    #[test]
    fn test_defaults_match_agc() {
        let built = AgcBuilder::default().build(Detached).unwrap();
        let fresh = Agc::new(-12, Detached);
        assert_eq!(built.status(), fresh.status());
    }

    #[test]
    fn test_defaults_shared() {
        let builder = AgcBuilder::new(-3);
        assert_eq!(builder.filter_coefficient(), DEFAULT_ALPHA);
        assert_eq!(builder.deadband(), DEFAULT_DEADBAND_DB);
        assert_eq!(builder.blanking_limit(), DEFAULT_BLANKING_LIMIT);
        assert!(!builder.enabled());
    }

    #[test]
    fn test_build() {
        let agc = AgcBuilder::new(-30)
            .with_operating_point(-24)
            .with_filter_coefficient(0.1)
            .with_deadband(0)
            .with_blanking_limit(0)
            .build(Detached)
            .unwrap();
        assert!(!agc.is_enabled());
        assert_eq!(agc.operating_point(), -24);
        assert_approx_eq!(agc.filter_coefficient(), 0.1f32);
        assert_eq!(agc.deadband(), 0);
        assert_eq!(agc.blanking_limit(), 0);
    }

    #[test]
    fn test_build_rejects() {
        let mut builder = AgcBuilder::default();
        builder.with_deadband(11);
        assert_eq!(
            builder.build(Detached).unwrap_err(),
            AgcError::DeadbandOutOfRange(11)
        );

        let mut builder = AgcBuilder::default();
        builder.with_blanking_limit(20);
        assert_eq!(
            builder.build(Detached).unwrap_err(),
            AgcError::BlankingLimitOutOfRange(20)
        );

        let mut builder = AgcBuilder::default();
        builder.with_filter_coefficient(1.0);
        assert_eq!(
            builder.build(Detached).unwrap_err(),
            AgcError::FilterCoefficientOutOfRange(1.0)
        );
    }
}
