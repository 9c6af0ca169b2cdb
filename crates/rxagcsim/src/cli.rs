use std::fmt::Display;

use clap::{error::ErrorKind, value_parser, CommandFactory, Parser};

/// Standard input filename
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program accepts raw PCM samples in signed 16-bit (i16) format, passes them through a simulated variable-gain amplifier, and runs an automatic gain control loop on the result. One line is printed for each block of samples.

See --help for more details.
"#;

const USAGE_LONG: &str = r#"
This program accepts raw PCM samples in signed 16-bit (i16) format, passes them through a simulated variable-gain amplifier, and runs an automatic gain control loop on the result. One line is printed for each block of samples.

The amplifier provides 0 to 46 dB of gain and clips at full scale. For every --block-len samples, the average magnitude of the amplified block is converted to dBFs and given to the AGC, which may adjust the amplifier gain before the next block.

You can pipe in an audio file with sox

    sox input.wav -t raw -e signed -b 16 -c 1 - \
        | rxagcsim --operating-point -12

Each output line contains

    BLOCK  LEVEL(dBFs)  OUTCOME  GAIN(dB)

where OUTCOME is one of "held", "adjusted", "blanked", or "disabled." An AGC status report is printed when the input is exhausted.
"#;

const ADVANCED: &str = "Advanced AGC Options";

pub const TERMINAL_INPUT: &str = "standard input is a terminal.

rxagcsim simulates an amplifier driven by the AGC and needs raw
i16 samples to amplify. Pipe them in from sox, rtl_sdr, or
similar, or name a capture file with --file.";

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print NOTHING, not even per-block results
    #[arg(short, long)]
    pub quiet: bool,

    /// Input file (or "-" for stdin)
    ///
    /// The input must be one-channel (mono), signed 16-bit
    /// native-endian samples.
    #[arg(long, default_value_t = STDIN_FILE.to_string())]
    pub file: String,

    /// AGC operating point (dBFs)
    ///
    /// The AGC will try to hold the amplified signal at this
    /// level. Full scale is 0 dBFs.
    #[arg(short, long, default_value_t = -12, allow_negative_numbers = true)]
    pub operating_point: i32,

    /// Samples per level measurement
    #[arg(short, long, default_value_t = 1024)]
    #[arg(value_parser = value_parser!(u32).range(1..))]
    pub block_len: u32,

    /// Start with the AGC disabled (gain stays fixed)
    #[arg(long)]
    pub open_loop: bool,

    /// Starting amplifier gain (dB)
    ///
    /// The AGC adopts this gain from the amplifier on its first
    /// measurement. With --open-loop it never does, and the AGC
    /// status keeps reporting its own 24 dB.
    #[arg(long, default_value_t = 24)]
    #[arg(value_parser = value_parser!(u32).range(0..=46))]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub initial_gain: u32,

    /// Gain filter coefficient (0.001 ≤ ALPHA < 0.999)
    #[arg(long, default_value_t = 0.8)]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub alpha: f32,

    /// Deadband around the operating point (dB)
    #[arg(long, default_value_t = 1)]
    #[arg(value_parser = value_parser!(u32).range(0..=10))]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub deadband: u32,

    /// Blocks to ignore after each gain change
    #[arg(long, default_value_t = 1)]
    #[arg(value_parser = value_parser!(u32).range(0..=10))]
    #[arg(hide_short_help = true)]
    #[arg(help_heading = ADVANCED)]
    pub blanking_limit: u32,
}

impl Args {
    /// Return true if the user requests input from stdin
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }
}

/// A program-level error with exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Create new error with a custom exit code
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error,
            exit_code: code,
        }
    }

    /// Print this error to the terminal
    ///
    /// Errors from clap are printed verbatim. Other types of errors
    /// are printed indirectly via clap's fancy formatter.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print this error to the terminal and exit
    pub fn exit(&self) -> ! {
        drop(self.print());
        std::process::exit(self.exit_code);
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}
