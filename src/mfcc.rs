//! Mel-frequency cepstral coefficients.
//!
//! Centred STFT with a periodic Hann window, power spectrum, Slaney mel
//! filterbank, decibel scaling with an 80 dB floor below the peak, then an
//! orthonormal DCT-II of which the first `n_mfcc` rows are kept.

use std::f64::consts::PI;
use std::sync::Arc;

use ndarray::{Array1, Array2, s};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

pub const N_FFT: usize = 2048;
pub const HOP_LENGTH: usize = 512;
pub const N_MELS: usize = 128;
const AMIN: f32 = 1e-10;
const TOP_DB: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MfccParams {
    pub sample_rate: u32,
    pub n_mfcc: usize,
    pub n_fft: usize,
    pub hop_length: usize,
    pub n_mels: usize,
}

impl MfccParams {
    pub fn new(sample_rate: u32, n_mfcc: usize) -> Self {
        Self {
            sample_rate,
            n_mfcc,
            n_fft: N_FFT,
            hop_length: HOP_LENGTH,
            n_mels: N_MELS,
        }
    }

    pub fn freq_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Frames produced for `len` samples with centre padding.
    pub fn frame_count(&self, len: usize) -> usize {
        1 + len / self.hop_length
    }
}

/// Precomputed window, filterbank, DCT basis and FFT plan.
pub struct MfccEngine {
    params: MfccParams,
    window: Vec<f32>,
    mel_basis: Array2<f32>,
    dct_basis: Array2<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl MfccEngine {
    pub fn new(params: MfccParams) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(params.n_fft);
        Self {
            window: hann_window(params.n_fft),
            mel_basis: mel_filterbank(params.sample_rate, params.n_fft, params.n_mels),
            dct_basis: dct_ortho_basis(params.n_mfcc, params.n_mels),
            fft,
            params,
        }
    }

    pub fn params(&self) -> MfccParams {
        self.params
    }

    /// Mel power spectrogram, `n_mels x frames`.
    pub fn mel_spectrogram(&self, samples: &[f32]) -> Array2<f32> {
        let MfccParams {
            n_fft,
            hop_length,
            n_mels,
            ..
        } = self.params;
        let pad = n_fft / 2;
        let mut padded = vec![0.0f32; samples.len() + 2 * pad];
        padded[pad..pad + samples.len()].copy_from_slice(samples);

        let frames = self.params.frame_count(samples.len());
        let freq_bins = self.params.freq_bins();
        let mut mel = Array2::<f32>::zeros((n_mels, frames));
        let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];
        let mut power = Array1::<f32>::zeros(freq_bins);

        for frame in 0..frames {
            let start = frame * hop_length;
            for (i, value) in buffer.iter_mut().enumerate() {
                *value = Complex::new(padded[start + i] * self.window[i], 0.0);
            }
            self.fft.process(&mut buffer);
            for (k, bin) in power.iter_mut().enumerate() {
                *bin = buffer[k].norm_sqr();
            }
            mel.column_mut(frame).assign(&self.mel_basis.dot(&power));
        }

        mel
    }

    /// MFCC matrix, `n_mfcc x frames`.
    pub fn compute(&self, samples: &[f32]) -> Array2<f32> {
        let mel = self.mel_spectrogram(samples);
        let log_mel = power_to_db(&mel);
        self.dct_basis.dot(&log_mel)
    }
}

/// Periodic Hann window.
pub fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (0.5 - 0.5 * ((2.0 * PI * i as f64) / len as f64).cos()) as f32)
        .collect()
}

pub fn hz_to_mel(hz: f64) -> f64 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = 6.4f64.ln() / 27.0;

    if hz >= min_log_hz {
        min_log_mel + (hz / min_log_hz).ln() / logstep
    } else {
        hz / f_sp
    }
}

pub fn mel_to_hz(mel: f64) -> f64 {
    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = 6.4f64.ln() / 27.0;

    if mel >= min_log_mel {
        min_log_hz * (logstep * (mel - min_log_mel)).exp()
    } else {
        f_sp * mel
    }
}

/// Band edges in Hz: `n_mels + 2` points evenly spaced in mel over `0..sr/2`.
fn mel_points(sample_rate: u32, n_mels: usize) -> Vec<f64> {
    let max_mel = hz_to_mel(sample_rate as f64 / 2.0);
    (0..n_mels + 2)
        .map(|i| mel_to_hz(max_mel * i as f64 / (n_mels + 1) as f64))
        .collect()
}

/// Centre frequency of every mel band.
pub fn mel_band_centers(sample_rate: u32, n_mels: usize) -> Vec<f64> {
    mel_points(sample_rate, n_mels)[1..=n_mels].to_vec()
}

/// Triangular filters with Slaney area normalisation, `n_mels x (n_fft/2 + 1)`.
pub fn mel_filterbank(sample_rate: u32, n_fft: usize, n_mels: usize) -> Array2<f32> {
    let freq_bins = n_fft / 2 + 1;
    let fft_freqs: Vec<f64> = (0..freq_bins)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect();
    let points = mel_points(sample_rate, n_mels);
    let widths: Vec<f64> = points.windows(2).map(|w| w[1] - w[0]).collect();

    let mut filterbank = Array2::<f32>::zeros((n_mels, freq_bins));
    for m in 0..n_mels {
        let enorm = 2.0 / (points[m + 2] - points[m]);
        for (k, freq) in fft_freqs.iter().enumerate() {
            let lower = (freq - points[m]) / widths[m];
            let upper = (points[m + 2] - freq) / widths[m + 1];
            filterbank[[m, k]] = (lower.min(upper).max(0.0) * enorm) as f32;
        }
    }
    filterbank
}

/// `10 * log10(S)` relative to a reference of 1, floored at `max - 80 dB`.
pub fn power_to_db(power: &Array2<f32>) -> Array2<f32> {
    let log_spec = power.mapv(|value| 10.0 * value.max(AMIN).log10());
    let peak = log_spec.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let floor = peak - TOP_DB;
    log_spec.mapv(|value| value.max(floor))
}

/// Orthonormal DCT-II rows `0..n_out` over `n_in` inputs.
pub fn dct_ortho_basis(n_out: usize, n_in: usize) -> Array2<f32> {
    let mut basis = Array2::<f32>::zeros((n_out, n_in));
    let n = n_in as f64;
    for k in 0..n_out {
        let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
        let mut row = basis.slice_mut(s![k, ..]);
        for (i, value) in row.iter_mut().enumerate() {
            let angle = PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n);
            *value = (scale * angle.cos()) as f32;
        }
    }
    basis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (2.0 * std::f32::consts::PI * freq * n as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn frame_count_follows_hop() {
        let engine = MfccEngine::new(MfccParams::new(44_100, 20));
        let mfcc = engine.compute(&tone(440.0, 44_100, 44_100));
        assert_eq!(mfcc.shape(), &[20, 1 + 44_100 / HOP_LENGTH]);
        assert!(mfcc.iter().all(|value| value.is_finite()));
    }

    #[test]
    fn short_signal_still_yields_one_frame() {
        let engine = MfccEngine::new(MfccParams::new(44_100, 20));
        let mfcc = engine.compute(&[0.25; 10]);
        assert_eq!(mfcc.shape(), &[20, 1]);
    }

    #[test]
    fn silence_is_flat_at_the_floor() {
        let engine = MfccEngine::new(MfccParams::new(44_100, 20));
        let mfcc = engine.compute(&vec![0.0; 4096]);
        let expected_c0 = -100.0 * (N_MELS as f32).sqrt();
        for frame in 0..mfcc.ncols() {
            assert!((mfcc[[0, frame]] - expected_c0).abs() < 0.1);
            for k in 1..20 {
                assert!(mfcc[[k, frame]].abs() < 0.05, "c{k} = {}", mfcc[[k, frame]]);
            }
        }
    }

    #[test]
    fn tone_energy_lands_in_matching_band() {
        let engine = MfccEngine::new(MfccParams::new(44_100, 20));
        let mel = engine.mel_spectrogram(&tone(1000.0, 44_100, 8192));
        let middle = mel.column(mel.ncols() / 2);
        let (peak_band, _) = middle
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, v)| if *v > best.1 { (i, *v) } else { best });
        let center = mel_band_centers(44_100, N_MELS)[peak_band];
        assert!((center - 1000.0).abs() / 1000.0 < 0.1, "{center}");
    }

    #[test]
    fn filterbank_is_non_negative() {
        let fb = mel_filterbank(44_100, N_FFT, N_MELS);
        assert_eq!(fb.shape(), &[N_MELS, N_FFT / 2 + 1]);
        assert!(fb.iter().all(|value| *value >= 0.0));
        assert!(fb.rows().into_iter().all(|row| row.sum() > 0.0));
    }

    #[test]
    fn mel_scale_round_trips() {
        for hz in [0.0, 440.0, 1000.0, 8000.0, 22_050.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
    }

    #[test]
    fn dct_basis_is_orthonormal() {
        let basis = dct_ortho_basis(N_MELS, N_MELS);
        let gram = basis.dot(&basis.t());
        for i in 0..N_MELS {
            for j in 0..N_MELS {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((gram[[i, j]] - expected).abs() < 1e-4);
            }
        }
    }
}
