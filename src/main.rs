
pub use rustfft::num_complex as num_complex;
/// Floating point type used for signal processing.
pub type Sample = f32;
/// Complex floating point type used for signal processing.
pub type ComplexSample = num_complex::Complex<Sample>;

mod configuration;
use configuration::Parser;
mod input;
mod render;
mod scope;
#[cfg(test)]
mod testsignal;

use anyhow::Context;

fn main() {
    env_logger::init();
    let cli = configuration::Cli::parse();

    if let Err(err) = run(&cli) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: &configuration::Cli) -> anyhow::Result<()> {
    anyhow::ensure!(cli.sps > 0, "samples per symbol must be positive");

    let mut fft_planner = rustfft::FftPlanner::new();

    let mut sink = scope::ScopeSink::with_renderer(
        &mut fft_planner,
        cli.mode,
        cli.sps,
        &cli.gnuplot,
    )?;

    if let Some(freq) = cli.center_freq {
        sink.set_center_freq(freq);
    }
    if let Some(freq) = cli.relative_freq {
        sink.set_relative_freq(freq);
    }
    if let Some(freq) = cli.offset_freq {
        sink.set_offset(freq);
    }
    if let Some(width) = cli.width {
        sink.set_width(width);
    }

    let mut reader: Box<dyn std::io::Read> = if cli.input == "-" {
        Box::new(std::io::stdin().lock())
    } else {
        let file = std::fs::File::open(&cli.input)
            .with_context(|| format!("opening {}", cli.input))?;
        Box::new(std::io::BufReader::new(file))
    };

    // Hand samples to the sink in scheduler-sized blocks, re-offering
    // whatever the sink did not consume, the same way a streaming graph
    // runtime advances its cursor by the reported count.
    if cli.mode.takes_symbols() {
        let mut block = vec![0.0 as Sample; cli.block_size];
        loop {
            let count = input::read_symbol_block(&mut reader, &mut block)?;
            if count == 0 {
                break;
            }
            let mut remaining = &block[..count];
            while !remaining.is_empty() {
                let consumed = sink.process_symbols(remaining);
                remaining = &remaining[consumed..];
            }
        }
    } else {
        let mut block = vec![ComplexSample::ZERO; cli.block_size];
        loop {
            let count = input::read_iq_block(&mut reader, &mut block)?;
            if count == 0 {
                break;
            }
            let mut remaining = &block[..count];
            while !remaining.is_empty() {
                let consumed = sink.process_iq(remaining);
                remaining = &remaining[consumed..];
            }
        }
    }

    sink.shutdown();
    Ok(())
}
