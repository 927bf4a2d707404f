//! Loading audio files as mono waveforms at a fixed sample rate.
//!
//! Any container/codec symphonia understands is accepted. Channels are
//! averaged to mono and the result is resampled with a sinc interpolator.

use std::fs::File;
use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::DatasetError;

/// Mono samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decodes `path` and resamples it to `target_rate`.
pub fn load(path: &Path, target_rate: u32) -> Result<Waveform, DatasetError> {
    let decoded = decode(path)?;
    let samples = resample(&decoded.samples, decoded.sample_rate, target_rate)
        .map_err(|message| DatasetError::extraction(path, message))?;
    Ok(Waveform {
        samples,
        sample_rate: target_rate,
    })
}

/// Decodes every packet of the first audio track to mono f32.
pub fn decode(path: &Path) -> Result<Waveform, DatasetError> {
    let file = File::open(path).map_err(|err| DatasetError::extraction(path, err))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|value| value.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| DatasetError::extraction(path, err))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DatasetError::extraction(path, "no supported audio track"))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|err| DatasetError::extraction(path, err))?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(DatasetError::extraction(path, err)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                if sample_rate.is_none() {
                    sample_rate = Some(spec.rate);
                }
                let channels = spec.channels.count().max(1);
                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                if channels == 1 {
                    samples.extend_from_slice(buffer.samples());
                } else {
                    samples.extend(
                        buffer
                            .samples()
                            .chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
                    );
                }
            }
            // A corrupt packet is skipped, the rest of the stream is still usable.
            Err(SymphoniaError::DecodeError(err)) => {
                debug!(path = %path.display(), error = err, "skipping undecodable packet");
            }
            Err(err) => return Err(DatasetError::extraction(path, err)),
        }
    }

    let sample_rate =
        sample_rate.ok_or_else(|| DatasetError::extraction(path, "sample rate unknown"))?;
    debug!(
        path = %path.display(),
        samples = samples.len(),
        sample_rate,
        "decoded audio"
    );
    Ok(Waveform {
        samples,
        sample_rate,
    })
}

/// Resamples a mono signal in one pass.
///
/// The output has exactly `ceil(len * to / from)` samples and is aligned
/// with the input: the filter delay is trimmed from the front and the
/// delay line is flushed to recover the tail.
pub fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, String> {
    if input.is_empty() || from_rate == to_rate {
        return Ok(input.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let expected = (input.len() as f64 * ratio).ceil() as usize;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, input.len(), 1)
        .map_err(|err| err.to_string())?;
    let delay = resampler.output_delay();

    let mut output = resampler
        .process(&[input], None)
        .map_err(|err| err.to_string())?
        .into_iter()
        .next()
        .unwrap_or_default();
    while output.len() < delay + expected {
        let flushed = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|err| err.to_string())?
            .into_iter()
            .next()
            .unwrap_or_default();
        if flushed.is_empty() {
            break;
        }
        output.extend(flushed);
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected, 0.0);
    Ok(output)
}
