use std::io;

use anyhow::{anyhow, Context};
use byteorder::{NativeEndian, ReadBytesExt};
use clap::Parser;
use log::{info, LevelFilter};

use rxagc::{AgcBuilder, DbfsCalculator};

mod amplifier;
mod app;
mod cli;

use amplifier::Amplifier;
use cli::{Args, CliError};

fn main() {
    match rxagcsim() {
        Ok(()) => {}
        Err(cli_error) => cli_error.exit(),
    }
}

fn rxagcsim() -> Result<(), CliError> {
    // Parse options and start logging
    let args = Args::try_parse()?;
    log_setup(&args);

    // create the AGC and the amplifier it drives
    let mut agc = AgcBuilder::new(args.operating_point)
        .with_filter_coefficient(args.alpha)
        .with_deadband(args.deadband)
        .with_blanking_limit(args.blanking_limit)
        .with_enabled(!args.open_loop)
        .build(Amplifier::new(args.initial_gain))
        .context("Invalid AGC options")?;
    let dbfs = DbfsCalculator::new(16).context("Unsupported sample format")?;

    // file setup: locks stdin in case we need it
    let stdin = io::stdin();
    let stdin_handle = stdin.lock();
    let mut inbuf = file_setup(&args, stdin_handle)?;

    // processing: read i16 from the input source
    let blocks = app::run(
        args.block_len as usize,
        args.quiet,
        &mut agc,
        &dbfs,
        std::iter::from_fn(|| inbuf.read_i16::<NativeEndian>().ok()),
    );
    info!("processed {} blocks", blocks);

    if !args.quiet {
        println!("{}", app::report(&agc));
    }

    Ok(())
}

fn log_setup(args: &Args) {
    if args.quiet {
        // no logging
        return;
    } else if std::env::var_os("RUST_LOG").is_none() {
        // parameter controls
        let log_filter = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        pretty_env_logger::formatted_builder()
            .filter_module("rxagc", log_filter)
            .filter_module("rxagcsim", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}

fn file_setup<'stdin>(
    args: &Args,
    stdin: std::io::StdinLock<'stdin>,
) -> Result<Box<dyn io::BufRead + 'stdin>, anyhow::Error> {
    if args.input_is_stdin() {
        info!("AGC simulator reading standard input");
        if !is_terminal(&std::io::stdin()) {
            Ok(Box::new(io::BufReader::new(stdin)))
        } else {
            Err(anyhow!(cli::TERMINAL_INPUT))
        }
    } else {
        info!("AGC simulator reading file: \"{}\"", &args.file);
        Ok(Box::new(io::BufReader::new(
            std::fs::File::open(&args.file)
                .with_context(|| format!("Unable to open --file \"{}\"", args.file))?,
        )))
    }
}

#[cfg(not(target_os = "windows"))]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::fd::AsRawFd,
{
    terminal_size::terminal_size_using_fd(stream.as_raw_fd()).is_some()
}

#[cfg(target_os = "windows")]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::windows::io::AsRawHandle,
{
    terminal_size::terminal_size_using_handle(stream.as_raw_handle()).is_some()
}
