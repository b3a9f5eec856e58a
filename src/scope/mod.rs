//! Scope sink pipeline: window buffering, per-mode transforms and
//! frame submission to the renderer.

use rustfft;

use crate::render::gnuplot::{GnuplotProcess, SpawnError};
use crate::render::{FrameSink, RenderFrame, Series, SeriesStyle};
use crate::{ComplexSample, Sample};

pub mod accumulator;
pub mod calibration;
pub mod spectrum;

use accumulator::SampleAccumulator;
use calibration::FrequencyCalibration;
use spectrum::{PowerSpectrumState, SpectrumAnalyzer};

/// Bins in one spectrum display window.
const FFT_BINS: usize = 512;
/// Weight of one window in the fft-mode magnitude average.
const FFT_AVG: Sample = 0.25;
/// Weight of one window in the mixer-mode magnitude average.
const MIX_AVG: Sample = 0.15;
/// Completed eye windows rendered once per this many completions.
const EYE_DECIMATION: u64 = 20;
/// Fft work calls feeding the buffer once per this many invocations.
const FFT_DECIMATION: u64 = 50;

/// Default samples per symbol for the eye diagram.
pub const DEFAULT_SPS: usize = 10;

/// Which live view a pipeline instance produces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum PlotMode {
    /// Overlaid symbol-period traces of the demodulated signal.
    Eye,
    /// I/Q scatter of complex samples.
    Constellation,
    /// Raw symbol values against sample index.
    Symbol,
    /// Averaged power spectrum of complex baseband.
    Fft,
    /// Power spectrum with a spectral balance readout.
    Mixer,
}

impl PlotMode {
    /// Window capacity in samples.
    fn window_size(self, sps: usize) -> usize {
        match self {
            PlotMode::Eye => 100 * sps,
            PlotMode::Constellation => 1000,
            PlotMode::Symbol => 2400,
            PlotMode::Fft | PlotMode::Mixer => FFT_BINS,
        }
    }

    /// True for modes fed real-valued symbols rather than I/Q samples.
    pub fn takes_symbols(self) -> bool {
        matches!(self, PlotMode::Eye | PlotMode::Symbol)
    }

    fn spectral(self) -> bool {
        matches!(self, PlotMode::Fft | PlotMode::Mixer)
    }

    /// Magnitude averaging weight for the spectral modes.
    fn power_avg_weight(self) -> Sample {
        match self {
            PlotMode::Mixer => MIX_AVG,
            _ => FFT_AVG,
        }
    }
}

/// Spectral machinery carried by the Fft and Mixer modes only.
struct Spectral {
    analyzer: SpectrumAnalyzer,
    power: PowerSpectrumState,
    /// DC-centered normalized bin frequencies, fixed per FFT size.
    bin_freqs: Vec<f64>,
}

/// One scope pipeline bound to a single plot mode for its lifetime.
///
/// Accumulates incoming sample blocks into fixed windows, transforms
/// each rendered window per mode and submits the resulting frame.
/// Reports the consumed sample count back so the streaming caller can
/// advance its cursor; offering the unconsumed tail again is the
/// caller's job.
pub struct ScopeSink {
    mode: PlotMode,
    /// Samples per symbol; sizes the eye diagram sub-traces.
    sps: usize,
    accumulator: SampleAccumulator<ComplexSample>,
    calibration: FrequencyCalibration,
    /// Present for the Fft and Mixer modes only.
    spectral: Option<Spectral>,
    /// Completed windows since construction.
    windows_completed: u64,
    /// process_iq invocations, for the Fft call-site decimation.
    work_calls: u64,
    /// Scratch for widening real symbol blocks to complex samples.
    symbol_scratch: Vec<ComplexSample>,
    sink: Box<dyn FrameSink>,
}

impl ScopeSink {
    /// Build a pipeline submitting frames to the given sink.
    pub fn new(
        fft_planner: &mut rustfft::FftPlanner<Sample>,
        mode: PlotMode,
        sps: usize,
        sink: Box<dyn FrameSink>,
    ) -> Self {
        let capacity = mode.window_size(sps);
        let spectral = if mode.spectral() {
            Some(Spectral {
                analyzer: SpectrumAnalyzer::new(fft_planner, FFT_BINS),
                power: PowerSpectrumState::new(FFT_BINS, mode.power_avg_weight()),
                bin_freqs: spectrum::shifted_bin_frequencies(FFT_BINS),
            })
        } else {
            None
        };
        log::info!("{:?} scope: window of {} samples", mode, capacity);
        Self {
            mode,
            sps,
            accumulator: SampleAccumulator::new(capacity),
            calibration: FrequencyCalibration::default(),
            spectral,
            windows_completed: 0,
            work_calls: 0,
            symbol_scratch: Vec::new(),
            sink,
        }
    }

    /// Build a pipeline rendering through a gnuplot process.
    pub fn with_renderer(
        fft_planner: &mut rustfft::FftPlanner<Sample>,
        mode: PlotMode,
        sps: usize,
        gnuplot_path: &str,
    ) -> Result<Self, SpawnError> {
        let sink = Box::new(GnuplotProcess::spawn(gnuplot_path)?);
        Ok(Self::new(fft_planner, mode, sps, sink))
    }

    /// Consume a block of real-valued symbols (Eye and Symbol modes),
    /// returning how many were taken.
    pub fn process_symbols(&mut self, block: &[Sample]) -> usize {
        debug_assert!(self.mode.takes_symbols());
        let mut scratch = std::mem::take(&mut self.symbol_scratch);
        scratch.clear();
        scratch.extend(block.iter().map(|&re| ComplexSample::new(re, 0.0)));
        let consumed = self.process_iq(&scratch);
        self.symbol_scratch = scratch;
        consumed
    }

    /// Consume a block of samples, returning how many were taken.
    pub fn process_iq(&mut self, block: &[ComplexSample]) -> usize {
        if self.mode == PlotMode::Fft {
            // The spectrum display only samples the stream: most work
            // calls claim their whole block without buffering anything.
            self.work_calls += 1;
            if self.work_calls % FFT_DECIMATION != 0 {
                return block.len();
            }
        }

        let (consumed, window) = self.accumulator.feed(block);
        if let Some(window) = window {
            self.windows_completed += 1;
            if self.mode == PlotMode::Eye
                && self.windows_completed % EYE_DECIMATION != 0
            {
                // Most completed eye windows are discarded to cap the
                // render rate independent of the sample rate.
                return consumed;
            }
            let frame = self.transform(&window);
            self.sink.submit(&frame);
        }
        consumed
    }

    pub fn set_center_freq(&mut self, freq: f64) {
        self.calibration.set_center_freq(freq);
    }

    pub fn set_relative_freq(&mut self, freq: f64) {
        self.calibration.set_relative_freq(freq);
    }

    pub fn set_offset(&mut self, freq: f64) {
        self.calibration.set_offset(freq);
    }

    pub fn set_width(&mut self, width: f64) {
        self.calibration.set_width(width);
    }

    /// Stop the renderer. Any partially filled window is discarded.
    pub fn shutdown(&mut self) {
        if self.accumulator.buffered() > 0 {
            log::debug!(
                "discarding {} buffered samples at shutdown",
                self.accumulator.buffered()
            );
        }
        self.sink.shutdown();
    }

    fn transform(&mut self, window: &[ComplexSample]) -> RenderFrame {
        match self.mode {
            PlotMode::Eye => self.eye_frame(window),
            PlotMode::Constellation => Self::constellation_frame(window),
            PlotMode::Symbol => Self::symbol_frame(window),
            PlotMode::Fft | PlotMode::Mixer => self.spectrum_frame(window),
        }
    }

    fn frame_with_common_header() -> RenderFrame {
        let mut frame = RenderFrame::new();
        frame.directive("set terminal x11 noraise");
        frame.directive("set key off");
        frame
    }

    /// One line trace per symbol period, overlaid by the renderer.
    fn eye_frame(&self, window: &[ComplexSample]) -> RenderFrame {
        let mut frame = Self::frame_with_common_header();
        frame.directive("set yrange [-4:4]");
        frame.directive("set title \"Datascope\"");
        for group in window.chunks_exact(self.sps) {
            let mut trace = Series::new(SeriesStyle::Lines);
            for sample in group {
                trace.push_value(sample.re as f64);
            }
            frame.push_series(trace);
        }
        frame
    }

    fn constellation_frame(window: &[ComplexSample]) -> RenderFrame {
        let mut frame = Self::frame_with_common_header();
        frame.directive("set size square");
        frame.directive("set xrange [-1:1]");
        frame.directive("set yrange [-1:1]");
        frame.directive("set title \"Constellation\"");
        let mut points = Series::new(SeriesStyle::Points);
        for sample in window {
            points.push_pair(sample.re as f64, sample.im as f64);
        }
        frame.push_series(points);
        frame
    }

    fn symbol_frame(window: &[ComplexSample]) -> RenderFrame {
        let mut frame = Self::frame_with_common_header();
        frame.directive("set yrange [-4:4]");
        frame.directive("set title \"Symbol\"");
        let mut dots = Series::new(SeriesStyle::Dots);
        for sample in window {
            dots.push_value(sample.re as f64);
        }
        frame.push_series(dots);
        frame
    }

    /// Shared Fft/Mixer transform: windowed FFT, running magnitude
    /// average, then one log-power trace over the calibrated axis.
    fn spectrum_frame(&mut self, window: &[ComplexSample]) -> RenderFrame {
        let mode = self.mode;
        let calibration = &self.calibration;
        let spectral = self
            .spectral
            .as_mut()
            .expect("spectral modes carry analyzer state");

        let result = spectral.analyzer.analyze(window);
        spectral.power.update(result);
        if mode == PlotMode::Mixer {
            spectral.power.update_balance();
        }

        let axis: Vec<f64> = spectral
            .bin_freqs
            .iter()
            .map(|&freq| calibration.bin_to_axis(freq))
            .collect();
        let mut line = Series::new(SeriesStyle::Lines);
        for (&freq, &avg) in axis.iter().zip(spectral.power.magnitudes().iter()) {
            line.push_pair(freq, spectrum::power_db(avg) as f64);
        }

        let mut frame = Self::frame_with_common_header();
        frame.directive("unset arrow; unset title");
        frame.directive(&format!(
            "set xrange [{:.6}:{:.6}]",
            axis[0],
            axis[axis.len() - 1]
        ));
        frame.directive("set xlabel \"Frequency\"");
        frame.directive("set ylabel \"Power(dB)\"");
        frame.directive("set grid");
        frame.directive("set yrange [-100:0]");
        if mode == PlotMode::Mixer {
            frame.directive(&format!(
                "set title \"Mixer: balance {:3.0} (smaller is better)\"",
                (spectral.power.balance() * 1000.0).abs()
            ));
        } else {
            frame.directive("set title \"Spectrum\"");
            if calibration.has_center() {
                let tuned = calibration.tuned_mhz();
                frame.directive(&format!(
                    "set arrow from {:.6}, graph 0 to {:.6}, graph 1 nohead",
                    tuned, tuned
                ));
                frame.directive(&format!(
                    "set title \"Spectrum: tuned to {:.6} Mhz\"",
                    tuned
                ));
            }
        }
        frame.push_series(line);
        frame
    }
}
