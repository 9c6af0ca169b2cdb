//! Hardware gain capabilities
//!
//! The [`Agc`](crate::Agc) never touches an amplifier directly.
//! Instead, the caller supplies a [`GainHardware`] which knows
//! how to set and read back the gain of the variable-gain
//! amplifier. Either capability may be missing:
//!
//! * Without `set_gain()`, the AGC computes gains but never
//!   changes anything in the hardware.
//!
//! * Without `get_gain()`, the AGC has no way to learn that
//!   somebody else changed the gain behind its back. Its own
//!   belief about the gain is taken as authoritative.

use std::fmt;

/// Variable-gain amplifier access
///
/// Both methods have default implementations which behave as
/// though the capability were absent. Implement only what
/// your hardware supports.
pub trait GainHardware {
    /// Request an amplifier gain, in dB
    ///
    /// Called at most once per
    /// [`accept()`](crate::Agc::accept), and only when the AGC
    /// has actually adjusted its gain. The value is always
    /// within `0..=MAX_GAIN_DB`.
    fn set_gain(&mut self, _gain_db: u32) {}

    /// Read back the amplifier gain, in dB
    ///
    /// Returns `None` if the gain cannot be read. Readings
    /// greater than [`MAX_GAIN_DB`](crate::MAX_GAIN_DB) are
    /// discarded by the AGC.
    fn get_gain(&mut self) -> Option<u32> {
        None
    }
}

/// No hardware coupling
///
/// The AGC runs its control law but never drives a real
/// amplifier and never learns about out-of-band changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Detached;

impl GainHardware for Detached {}

/// Callback-driven hardware access
///
/// Wraps a pair of independently-optional closures. This is
/// convenient when the amplifier is owned elsewhere and can
/// only be reached through a handle captured by a closure.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use rxagc::{Agc, Callbacks};
///
/// let tuner = Rc::new(Cell::new(24u32));
/// let set = tuner.clone();
/// let get = tuner.clone();
/// let hw = Callbacks::new()
///     .with_set_gain(move |g| set.set(g))
///     .with_get_gain(move || get.get());
///
/// let mut agc = Agc::new(-12, hw);
/// agc.enable().expect("fresh AGC is disabled");
/// agc.accept(-30);
/// assert_eq!(tuner.get(), 38);
/// ```
#[derive(Default)]
pub struct Callbacks<'a> {
    set_gain: Option<Box<dyn FnMut(u32) + 'a>>,
    get_gain: Option<Box<dyn FnMut() -> u32 + 'a>>,
}

impl<'a> Callbacks<'a> {
    /// No callbacks registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the gain-setting callback
    pub fn with_set_gain<F>(mut self, set_gain: F) -> Self
    where
        F: FnMut(u32) + 'a,
    {
        self.set_gain = Some(Box::new(set_gain));
        self
    }

    /// Register the gain-reading callback
    pub fn with_get_gain<F>(mut self, get_gain: F) -> Self
    where
        F: FnMut() -> u32 + 'a,
    {
        self.get_gain = Some(Box::new(get_gain));
        self
    }
}

impl<'a> GainHardware for Callbacks<'a> {
    fn set_gain(&mut self, gain_db: u32) {
        if let Some(cb) = self.set_gain.as_mut() {
            cb(gain_db);
        }
    }

    fn get_gain(&mut self) -> Option<u32> {
        self.get_gain.as_mut().map(|cb| cb())
    }
}

impl<'a> fmt::Debug for Callbacks<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("set_gain", &self.set_gain.is_some())
            .field("get_gain", &self.get_gain.is_some())
            .finish()
    }
}

impl<H> GainHardware for &mut H
where
    H: GainHardware + ?Sized,
{
    fn set_gain(&mut self, gain_db: u32) {
        (**self).set_gain(gain_db)
    }

    fn get_gain(&mut self) -> Option<u32> {
        (**self).get_gain()
    }
}

impl<H> GainHardware for Box<H>
where
    H: GainHardware + ?Sized,
{
    fn set_gain(&mut self, gain_db: u32) {
        (**self).set_gain(gain_db)
    }

    fn get_gain(&mut self) -> Option<u32> {
        (**self).get_gain()
    }
}
