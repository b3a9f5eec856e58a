//! Windowed FFT analysis and running spectral statistics.

use std::sync::Arc;

use rustfft;

use crate::{ComplexSample, Sample};

/// Weight of one analyzed window in the balance average.
const BAL_AVG: Sample = 0.05;
/// Bins at or below this average magnitude stay out of the balance sum.
const BAL_THRESHOLD: Sample = 1e-5;
/// Magnitude floor so log power stays defined for silent bins.
const MAG_FLOOR: Sample = 1e-10;

/// Blackman-windowed FFT sized for one spectrum display window.
///
/// The 1/(0.42*N) display normalization is folded into the taps.
pub struct SpectrumAnalyzer {
    fft_plan: Arc<dyn rustfft::Fft<Sample>>,
    taps: Vec<Sample>,
    /// FFT work buffer; holds the DC-centered spectrum after analyze().
    buffer: Vec<ComplexSample>,
}

impl SpectrumAnalyzer {
    pub fn new(
        fft_planner: &mut rustfft::FftPlanner<Sample>,
        size: usize,
    ) -> Self {
        let scale = 1.0 / (0.42 * size as Sample);
        Self {
            fft_plan: fft_planner.plan_fft_forward(size),
            taps: blackman(size).iter().map(|tap| tap * scale).collect(),
            buffer: vec![ComplexSample::ZERO; size],
        }
    }

    /// Transform one full window into its DC-centered spectrum.
    pub fn analyze(&mut self, window: &[ComplexSample]) -> &[ComplexSample] {
        for ((out, &tap), &sample) in self
            .buffer
            .iter_mut()
            .zip(self.taps.iter())
            .zip(window.iter())
        {
            *out = sample * tap;
        }
        self.fft_plan.process(&mut self.buffer);
        // fftshift: rotate the zero-frequency bin to the middle.
        let half = self.buffer.len() / 2;
        self.buffer.rotate_right(half);
        &self.buffer
    }
}

/// Symmetric Blackman window taps.
pub fn blackman(size: usize) -> Vec<Sample> {
    let denom = (size - 1) as f64;
    (0..size)
        .map(|n| {
            let x = 2.0 * std::f64::consts::PI * n as f64 / denom;
            // The formula is exactly 0 at the endpoints but the float
            // representation of 0.42 and 0.08 can produce -epsilon.
            (0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()).max(0.0) as Sample
        })
        .collect()
}

/// DC-centered bin frequency axis in cycles per sample,
/// ordered like fftshift(fftfreq(size)).
pub fn shifted_bin_frequencies(size: usize) -> Vec<f64> {
    let half_up = (size + 1) / 2;
    let mut freqs: Vec<f64> = (0..size)
        .map(|bin| {
            let k = if bin < half_up {
                bin as isize
            } else {
                bin as isize - size as isize
            };
            k as f64 / size as f64
        })
        .collect();
    freqs.rotate_right(size / 2);
    freqs
}

/// Running per-bin magnitude average and spectral balance.
///
/// Owned by one pipeline instance, persists across windows and is
/// never reset after construction.
pub struct PowerSpectrumState {
    avg_pwr: Vec<Sample>,
    /// Weight of one new window in the magnitude average.
    avg_weight: Sample,
    balance: Sample,
}

impl PowerSpectrumState {
    pub fn new(bins: usize, avg_weight: Sample) -> Self {
        Self {
            avg_pwr: vec![0.0; bins],
            avg_weight,
            balance: 0.0,
        }
    }

    /// Fold one DC-centered spectrum into the per-bin averages.
    pub fn update(&mut self, spectrum: &[ComplexSample]) {
        let weight = self.avg_weight;
        for (avg, bin) in self.avg_pwr.iter_mut().zip(spectrum.iter()) {
            *avg = (1.0 - weight) * *avg + weight * bin.norm();
        }
    }

    /// Fold the current signed power split into the balance average.
    ///
    /// The power imbalance is the above-center sum minus the
    /// below-center sum, so a spectrum with magnitudes symmetric
    /// around the center leaves the balance at zero. Bins at or below
    /// the threshold are ignored.
    pub fn update_balance(&mut self) {
        let center = self.avg_pwr.len() / 2;
        let mut below = 0.0;
        let mut above = 0.0;
        for (bin, &avg) in self.avg_pwr.iter().enumerate() {
            if avg <= BAL_THRESHOLD {
                continue;
            }
            if bin < center {
                below += avg;
            } else if bin > center {
                above += avg;
            }
        }
        self.balance = (1.0 - BAL_AVG) * self.balance + BAL_AVG * (above - below);
    }

    /// Per-bin average magnitudes in DC-centered order.
    pub fn magnitudes(&self) -> &[Sample] {
        &self.avg_pwr
    }

    /// Running spectral balance. A smaller magnitude means the power
    /// is better centered on the tuned frequency.
    pub fn balance(&self) -> Sample {
        self.balance
    }
}

/// Average magnitude to display power in dB, guarded against silence.
pub fn power_db(magnitude: Sample) -> Sample {
    20.0 * magnitude.max(MAG_FLOOR).log10()
}
