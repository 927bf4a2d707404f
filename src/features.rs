use std::path::Path;
use std::time::Instant;

use ndarray::Array2;
use serde::Serialize;
use tracing::debug;

use crate::audio;
use crate::config::ExtractionSettings;
use crate::error::DatasetError;
use crate::mfcc::{MfccEngine, MfccParams};

/// Coefficients x frames. Row count is fixed by the extractor, column
/// count depends on the waveform length.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: Array2<f32>,
}

impl FeatureMatrix {
    pub fn new(values: Array2<f32>) -> Self {
        Self { values }
    }

    pub fn coefficient_count(&self) -> usize {
        self.values.nrows()
    }

    pub fn frame_count(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    pub fn shape(&self) -> FeatureShape {
        FeatureShape {
            coefficients: self.coefficient_count(),
            frames: self.frame_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureShape {
    pub coefficients: usize,
    pub frames: usize,
}

pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<FeatureMatrix, DatasetError>;
}

/// Loads audio at a fixed rate and computes its MFCC matrix.
pub struct MfccExtractor {
    settings: ExtractionSettings,
    engine: MfccEngine,
}

impl MfccExtractor {
    pub fn new(settings: ExtractionSettings) -> Result<Self, DatasetError> {
        settings.validate()?;
        let engine = MfccEngine::new(MfccParams::new(
            settings.sample_rate,
            settings.coefficient_count,
        ));
        Ok(Self { settings, engine })
    }

    pub fn settings(&self) -> ExtractionSettings {
        self.settings
    }
}

impl FeatureExtractor for MfccExtractor {
    fn extract(&self, path: &Path) -> Result<FeatureMatrix, DatasetError> {
        let start = Instant::now();
        let waveform = audio::load(path, self.settings.sample_rate)?;
        if waveform.samples.is_empty() {
            return Err(DatasetError::extraction(path, "audio contains no samples"));
        }
        if waveform.samples.iter().any(|sample| !sample.is_finite()) {
            return Err(DatasetError::extraction(path, "audio contains non-finite samples"));
        }

        let matrix = FeatureMatrix::new(self.engine.compute(&waveform.samples));
        debug!(
            path = %path.display(),
            duration_s = format!("{:.2}", waveform.duration_seconds()),
            coefficients = matrix.coefficient_count(),
            frames = matrix.frame_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "features extracted"
        );
        Ok(matrix)
    }
}
