//! Decibels relative to full scale
//!
//! Converts the magnitude of a finite-word-length quantity,
//! such as the average magnitude of a block of ADC samples,
//! into dBFs for use with [`Agc::accept()`](crate::Agc::accept).

use thiserror::Error;

/// Smallest supported word length (bits)
pub const MIN_WORD_LENGTH: u32 = 2;

/// Largest supported word length (bits)
pub const MAX_WORD_LENGTH: u32 = 32;

/// An unsupported word length
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbfsError {
    /// Word length is not in `2..=32`
    #[error("word length of {0} bits is outside 2..=32")]
    WordLengthOutOfRange(u32),
}

/// Magnitude to dBFs converter
///
/// Samples are assumed to be signed, so the full-scale
/// magnitude for a word length of `N` bits is `2^(N-1)`.
///
/// ```
/// use rxagc::DbfsCalculator;
///
/// // an 8-bit ADC, such as the RTL2832U
/// let dbfs = DbfsCalculator::new(8).unwrap();
/// assert_eq!(dbfs.magnitude_to_dbfs(128), 0);
/// assert_eq!(dbfs.magnitude_to_dbfs(64), -6);
/// assert_eq!(dbfs.magnitude_to_dbfs(0), -42);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DbfsCalculator {
    word_length: u32,
    full_scale: f64,
}

impl DbfsCalculator {
    /// Converter for the given word length
    ///
    /// `word_length` is the width, in bits, of each signed
    /// sample.
    pub fn new(word_length: u32) -> Result<Self, DbfsError> {
        if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&word_length) {
            return Err(DbfsError::WordLengthOutOfRange(word_length));
        }

        Ok(Self {
            word_length,
            full_scale: (1u64 << (word_length - 1)) as f64,
        })
    }

    /// Word length (bits)
    pub fn word_length(&self) -> u32 {
        self.word_length
    }

    /// Full-scale magnitude
    pub fn full_scale(&self) -> u32 {
        self.full_scale as u32
    }

    /// Lowest reportable level (dBFs)
    ///
    /// This is the level of a one-LSB signal.
    pub fn floor_db_fs(&self) -> i32 {
        self.magnitude_to_dbfs(1)
    }

    /// Convert a signal magnitude to dBFs
    ///
    /// Returns `20 log10(magnitude / full_scale)`, rounded to
    /// the nearest dB. Magnitudes at or above full scale are
    /// 0 dBFs. A magnitude of zero reports the
    /// [floor](#method.floor_db_fs).
    pub fn magnitude_to_dbfs(&self, magnitude: u32) -> i32 {
        let magnitude = u32::max(magnitude, 1) as f64;
        let db = 20.0 * f64::log10(magnitude / self.full_scale);
        f64::min(db.round(), 0.0) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_length_range() {
        assert_eq!(DbfsCalculator::new(0), Err(DbfsError::WordLengthOutOfRange(0)));
        assert_eq!(DbfsCalculator::new(1), Err(DbfsError::WordLengthOutOfRange(1)));
        assert_eq!(DbfsCalculator::new(33), Err(DbfsError::WordLengthOutOfRange(33)));
        assert!(DbfsCalculator::new(2).is_ok());
        assert!(DbfsCalculator::new(32).is_ok());
    }

    #[test]
    fn test_sixteen_bit() {
        let uut = DbfsCalculator::new(16).unwrap();
        assert_eq!(uut.word_length(), 16);
        assert_eq!(uut.full_scale(), 32768);
        assert_eq!(uut.magnitude_to_dbfs(32768), 0);
        assert_eq!(uut.magnitude_to_dbfs(u32::MAX), 0);
        assert_eq!(uut.magnitude_to_dbfs(16384), -6);
        assert_eq!(uut.magnitude_to_dbfs(3277), -20);
        assert_eq!(uut.magnitude_to_dbfs(328), -40);
        assert_eq!(uut.floor_db_fs(), -90);
        assert_eq!(uut.magnitude_to_dbfs(0), -90);
    }

    #[test]
    fn test_monotonic() {
        let uut = DbfsCalculator::new(12).unwrap();
        let mut last = uut.floor_db_fs();
        for mag in 0..=uut.full_scale() {
            let db = uut.magnitude_to_dbfs(mag);
            assert!(db >= last);
            assert!(db <= 0);
            last = db;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            DbfsError::WordLengthOutOfRange(40).to_string(),
            "word length of 40 bits is outside 2..=32"
        );
    }
}
