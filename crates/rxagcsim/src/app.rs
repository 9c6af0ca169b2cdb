//! Block-by-block AGC simulation
//!
//! ```txt
//!            +-----------+     +------------+     +-------+
//!  i16 ====> | Amplifier | ==> | mean |x|   | ==> |  Agc  |
//!            +-----------+     | → dBFs     |     +-------+
//!                 /\           +------------+        ||
//!                 ||================ set_gain ========||
//! ```
//!
//! Input samples are grouped into blocks. Each block is
//! amplified with the gain that was in effect when the block
//! began, and the level of the amplified block is one
//! measurement for the AGC.

use log::debug;

use rxagc::{Agc, AgcOutcome, DbfsCalculator};

use crate::amplifier::Amplifier;

/// Run the simulation
///
/// Consumes `input` in blocks of `block_len` samples, feeding
/// one level measurement per block to the `agc`. Levels are
/// computed with `dbfs`. A trailing partial block is also
/// measured. Unless `quiet`, prints one line per block.
///
/// Returns the number of blocks processed.
pub fn run<I>(
    block_len: usize,
    quiet: bool,
    agc: &mut Agc<Amplifier>,
    dbfs: &DbfsCalculator,
    input: I,
) -> u64
where
    I: Iterator<Item = i16>,
{
    let mut input = input.peekable();
    let mut block = Vec::with_capacity(block_len);
    let mut count = 0u64;

    while input.peek().is_some() {
        block.clear();
        block.extend(input.by_ref().take(block_len));

        let level = block_level(agc.hardware(), dbfs, &block);
        let outcome = agc.accept(level);
        if let AgcOutcome::Adjusted { gain_db } = outcome {
            debug!("block {}: gain now {} dB", count, gain_db);
        }

        if !quiet {
            println!(
                "{:>8} {:>5} {:>9} {:>3}",
                count,
                level,
                outcome.as_str(),
                agc.hardware().gain_db()
            );
        }

        count += 1;
    }

    count
}

/// Final report
///
/// The AGC status dump, followed by the gain the amplifier is
/// actually running at. The two differ when the loop is open.
pub fn report(agc: &Agc<Amplifier>) -> String {
    format!(
        "{}\nAmplifier Gain              : {} dB",
        agc.status(),
        agc.hardware().gain_db()
    )
}

// Level of one amplified block, in dBFs
//
// Uses the mean absolute value of the amplified samples.
fn block_level(amp: &Amplifier, dbfs: &DbfsCalculator, block: &[i16]) -> i32 {
    if block.is_empty() {
        return dbfs.floor_db_fs();
    }

    let sum: u64 = block
        .iter()
        .map(|sa| (amp.amplify(*sa) as i32).unsigned_abs() as u64)
        .sum();
    dbfs.magnitude_to_dbfs((sum / block.len() as u64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rxagc::AgcBuilder;

    // square wave at the given amplitude
    fn square(amplitude: i16, len: usize) -> impl Iterator<Item = i16> {
        (0..len).map(move |i| if i % 2 == 0 { amplitude } else { -amplitude })
    }

    #[test]
    fn test_block_level() {
        let dbfs = DbfsCalculator::new(16).unwrap();
        let amp = Amplifier::new(0);
        let block: Vec<i16> = square(3277, 64).collect();
        assert_eq!(block_level(&amp, &dbfs, &block), -20);

        // 20 dB of gain: right at full scale
        let amp = Amplifier::new(20);
        assert_eq!(block_level(&amp, &dbfs, &block), 0);

        assert_eq!(block_level(&amp, &dbfs, &[]), -90);
    }

    #[test]
    fn test_converges() {
        // -60 dBFs source; -12 dBFs operating point needs 48 dB,
        // so the AGC should pin at the top rail
        let mut agc = AgcBuilder::new(-12)
            .with_enabled(true)
            .build(Amplifier::new(24))
            .unwrap();
        let dbfs = DbfsCalculator::new(16).unwrap();
        let blocks = run(100, true, &mut agc, &dbfs, square(33, 100 * 40));
        assert_eq!(blocks, 40);
        assert_eq!(agc.gain(), 46);

        // -40 dBFs source settles near -12 dBFs
        let mut agc = AgcBuilder::new(-12)
            .with_enabled(true)
            .build(Amplifier::new(0))
            .unwrap();
        run(100, true, &mut agc, &dbfs, square(328, 100 * 40));
        let block: Vec<i16> = square(328, 100).collect();
        let level = block_level(agc.hardware(), &dbfs, &block);
        assert!((level - -12).abs() <= 1, "settled at {} dBFs", level);
    }

    #[test]
    fn test_partial_block_and_open_loop() {
        let mut agc = AgcBuilder::new(-12).build(Amplifier::new(10)).unwrap();
        let dbfs = DbfsCalculator::new(16).unwrap();
        let blocks = run(64, true, &mut agc, &dbfs, square(1000, 130));
        assert_eq!(blocks, 3);
        assert_eq!(agc.hardware().gain_db(), 10);
    }

    #[test]
    fn test_report_shows_amplifier_gain() {
        let mut agc = AgcBuilder::new(-12).build(Amplifier::new(10)).unwrap();
        let dbfs = DbfsCalculator::new(16).unwrap();
        run(64, true, &mut agc, &dbfs, square(1000, 256));
        assert_eq!(agc.gain(), 24);

        let text = report(&agc);
        assert!(text.starts_with(&agc.status().to_string()));
        assert!(text.ends_with("Amplifier Gain              : 10 dB"));
    }
}
