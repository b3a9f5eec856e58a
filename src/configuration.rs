
pub use clap::Parser;

use crate::render::gnuplot::GNUPLOT;
use crate::scope::{PlotMode, DEFAULT_SPS};

/// Live diagnostic plots for a demodulated sample stream.
///
/// Reads raw little-endian samples from a file or standard input and
/// renders the selected view through gnuplot. The eye and symbol views
/// take float32 symbols; the constellation, fft and mixer views take
/// interleaved float32 I/Q pairs.
#[derive(Parser)]
pub struct Cli {
    /// View to render.
    #[arg(long, value_enum)]
    pub mode: PlotMode,

    /// Samples per symbol, used to split the eye diagram into traces.
    #[arg(long, default_value_t = DEFAULT_SPS)]
    pub sps: usize,

    /// Input file of raw samples, or - for standard input.
    #[arg(long, default_value = "-")]
    pub input: String,

    /// Samples offered to the sink per read, like one scheduler block.
    #[arg(long, default_value_t = 4096)]
    pub block_size: usize,

    /// Path of the gnuplot executable.
    #[arg(long, default_value = GNUPLOT)]
    pub gnuplot: String,

    /// Tuned center frequency in Hertz.
    /// Annotated on the fft display and, together with --width,
    /// switches the frequency axis to absolute MHz.
    #[arg(long)]
    pub center_freq: Option<f64>,

    /// Frequency of the displayed channel relative to the center,
    /// in Hertz.
    #[arg(long)]
    pub relative_freq: Option<f64>,

    /// Display frequency offset in Hertz.
    #[arg(long)]
    pub offset_freq: Option<f64>,

    /// Displayed span width in Hertz.
    #[arg(long)]
    pub width: Option<f64>,
}
