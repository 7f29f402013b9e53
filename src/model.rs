//! Loading of serialized classifier artifacts.
//!
//! An artifact is a JSON document holding the reference points of a k-NN
//! model over binary symptom vectors:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "k": 3,
//!   "metric": "l1",
//!   "n_features": 25,
//!   "points": [{ "features": [1, 0, ...], "class": 3 }]
//! }
//! ```

use dx_helpers::{DataPoint, L1Dist, L2Dist};
use k_nn::KnnClassifier;
use log::info;
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::classifier::Classifier;
use crate::error::{ArtifactError, ClassifierError, ModelError};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Manhattan distance; Hamming distance on 0/1 vectors.
    L1,
    /// Euclidean distance.
    L2,
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::L1 => write!(f, "L1"),
            Metric::L2 => write!(f, "L2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub features: Vec<f64>,
    pub class: usize,
}

/// On-disk form of a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub k: usize,
    pub metric: Metric,
    pub n_features: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub points: Vec<ReferencePoint>,
}

impl ModelArtifact {
    pub fn new(k: usize, metric: Metric, n_features: usize, points: Vec<ReferencePoint>) -> Self {
        ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            k,
            metric,
            n_features,
            description: None,
            points,
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), ArtifactError> {
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }

    /// Validates the artifact and builds the classifier it describes.
    pub fn into_model(self) -> Result<KnnModel, ArtifactError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.format_version,
                supported: ARTIFACT_FORMAT_VERSION,
            });
        }
        if self.points.is_empty() {
            return Err(ArtifactError::Empty);
        }
        if let Some((index, point)) = self
            .points
            .iter()
            .enumerate()
            .find(|(_, p)| p.features.len() != self.n_features)
        {
            return Err(ArtifactError::FeatureCount {
                index,
                declared: self.n_features,
                actual: point.features.len(),
            });
        }

        let k = self.k;
        let metric = self.metric;
        let data: Vec<DataPoint<usize, f64>> = self
            .points
            .into_iter()
            .map(|p| DataPoint::new(Array1::from(p.features), p.class))
            .collect();

        let classifier: Box<dyn Classifier> = match metric {
            Metric::L1 => Box::new(KnnClassifier::new(k, data, L1Dist)?),
            Metric::L2 => Box::new(KnnClassifier::new(k, data, L2Dist)?),
        };
        Ok(KnnModel {
            classifier,
            metric,
            k,
        })
    }
}

/// A k-NN classifier restored from an artifact, with its metric erased.
pub struct KnnModel {
    classifier: Box<dyn Classifier>,
    metric: Metric,
    k: usize,
}

impl KnnModel {
    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

impl std::fmt::Debug for KnnModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnnModel")
            .field("metric", &self.metric)
            .field("k", &self.k)
            .field("n_features", &self.classifier.n_features())
            .finish()
    }
}

impl Classifier for KnnModel {
    fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<usize>, ClassifierError> {
        self.classifier.predict(features)
    }

    fn name(&self) -> String {
        format!("k-NN ({}, k={})", self.metric, self.k)
    }

    fn n_features(&self) -> Option<usize> {
        self.classifier.n_features()
    }
}

/// Loads a classifier artifact once at startup.
///
/// Any failure (missing file, unreadable JSON, inconsistent contents) is
/// reported as [`ModelError::ModelUnavailable`].
pub fn load_model(path: impl AsRef<Path>) -> Result<KnnModel, ModelError> {
    let path = path.as_ref();
    let unavailable = |reason: ArtifactError| ModelError::ModelUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| unavailable(e.into()))?;
    let model = ModelArtifact::from_reader(BufReader::new(file))
        .and_then(ModelArtifact::into_model)
        .map_err(unavailable)?;

    info!("loaded {} from {}", model.name(), path.display());
    Ok(model)
}
