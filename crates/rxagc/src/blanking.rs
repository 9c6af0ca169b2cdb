//! Post-adjustment blanking
//!
//! Changing the gain of a real receiver is rarely clean. On
//! the RTL2832U, for example, toggling the I²C repeater to
//! reach the tuner produces a burst of garbage in the sample
//! stream. If the AGC reacts to those samples it chases its
//! own transient and falls into a limit cycle.
//!
//! The blanking state machine suppresses the control law for
//! a fixed number of measurements after every adjustment:
//!
//! ```txt
//!              adjustment
//!   +--------+ =========> +---------------------+
//!   | Active |            | Blanked { counter } | ==+ counter + 1 < limit
//!   +--------+ <========= +---------------------+ <=+
//!              counter + 1 >= limit
//! ```
//!
//! With a limit of `B`, the `B` measurements following an
//! adjustment are ignored and measurement `B + 1` is
//! evaluated normally. A limit of zero disables blanking.

#[cfg(not(test))]
use log::debug;

#[cfg(test)]
use std::println as debug;

/// Blanking state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum_macros::IntoStaticStr)]
pub enum Blanking {
    /// The control law runs on every measurement
    #[default]
    #[strum(serialize = "active")]
    Active,

    /// The control law is suppressed
    ///
    /// `counter` is the number of measurements which have
    /// already been ignored. It is always less than the
    /// blanking limit.
    #[strum(serialize = "blanked")]
    Blanked {
        /// Measurements ignored so far
        counter: u32,
    },
}

impl Blanking {
    /// Start blanking after a gain adjustment
    pub fn arm(&mut self) {
        *self = Blanking::Blanked { counter: 0 };
    }

    /// Return to the `Active` state immediately
    pub fn reset(&mut self) {
        *self = Blanking::Active;
    }

    /// True if the control law is being suppressed
    pub fn is_blanked(&self) -> bool {
        matches!(self, Blanking::Blanked { .. })
    }

    /// Number of measurements ignored in this interval
    pub fn counter(&self) -> u32 {
        match self {
            Blanking::Active => 0,
            Blanking::Blanked { counter } => *counter,
        }
    }

    /// Short name of the state
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Gate one measurement
    ///
    /// Advances the state machine by one measurement with the
    /// given blanking `limit`. Returns `true` if the control
    /// law may run on this measurement, or `false` if the
    /// measurement must be ignored.
    ///
    /// The measurement which completes the interval is itself
    /// ignored; the control law resumes on the next one.
    pub fn gate(&mut self, limit: u32) -> bool {
        match *self {
            Blanking::Active => true,
            Blanking::Blanked { counter } if counter < limit => {
                let counter = counter + 1;
                if counter >= limit {
                    debug!("agc: blanking: complete after {} measurements", counter);
                    *self = Blanking::Active;
                } else {
                    *self = Blanking::Blanked { counter };
                }
                false
            }
            Blanking::Blanked { .. } => {
                // only reachable with a limit of zero
                *self = Blanking::Active;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // count suppressed measurements until the gate opens
    fn suppressed_count(limit: u32) -> u32 {
        let mut uut = Blanking::default();
        uut.arm();
        let mut count = 0;
        while !uut.gate(limit) {
            count += 1;
            assert!(count <= limit, "blanking never ended");
        }
        count
    }

    #[test]
    fn test_active_always_runs() {
        let mut uut = Blanking::Active;
        for limit in 0..=10 {
            assert!(uut.gate(limit));
            assert_eq!(uut, Blanking::Active);
        }
    }

    #[test]
    fn test_limit_one() {
        let mut uut = Blanking::Active;
        uut.arm();
        assert_eq!(uut, Blanking::Blanked { counter: 0 });
        assert!(uut.is_blanked());

        // completes the interval, but is still ignored
        assert!(!uut.gate(1));
        assert_eq!(uut, Blanking::Active);

        assert!(uut.gate(1));
    }

    #[test]
    fn test_limit_three() {
        let mut uut = Blanking::Active;
        uut.arm();
        assert!(!uut.gate(3));
        assert_eq!(uut, Blanking::Blanked { counter: 1 });
        assert_eq!(uut.counter(), 1);
        assert!(!uut.gate(3));
        assert_eq!(uut, Blanking::Blanked { counter: 2 });
        assert!(!uut.gate(3));
        assert_eq!(uut, Blanking::Active);
        assert!(uut.gate(3));
    }

    #[test]
    fn test_limit_zero_never_blanks() {
        let mut uut = Blanking::Active;
        uut.arm();
        assert!(uut.gate(0));
        assert_eq!(uut, Blanking::Active);
    }

    #[test]
    fn test_suppressed_count_matches_limit() {
        for limit in 0..=10 {
            assert_eq!(suppressed_count(limit), limit);
        }
    }

    #[test]
    fn test_reset_and_names() {
        let mut uut = Blanking::Blanked { counter: 4 };
        assert_eq!(uut.as_str(), "blanked");
        uut.reset();
        assert_eq!(uut.as_str(), "active");
        assert_eq!(uut.counter(), 0);
        assert!(!uut.is_blanked());
    }
}
