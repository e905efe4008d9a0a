//! `neighbors` namespace: k-nearest-neighbor estimators over a linfa-nn
//! ball tree.
//!
//! The index borrows its points, so it is rebuilt from the stored training
//! rows on every `predict` call.
use std::collections::BTreeMap;

use linfa_nn::{distance::L2Dist, BallTree, NearestNeighbour};
use ndarray::{Array1, Array2};

use crate::error::DelegationError;
use crate::models::estimator_trait::{Estimator, EstimatorKind};
use crate::models::utils::LabelEncoder;
use crate::params::{ensure_empty, Params};
use crate::registry::Namespace;

pub const NAMESPACE: &str = "neighbors";

pub fn namespace() -> Namespace {
    Namespace::new(NAMESPACE)
        .with_model("KNeighborsRegressor", k_neighbors_regressor)
        .with_model("KNeighborsClassifier", k_neighbors_classifier)
}

fn read_n_neighbors(name: &str, params: &Params) -> Result<usize, DelegationError> {
    let mut reader = params.reader(name);
    let k = reader.usize("n_neighbors", 5)?;
    reader.finish()?;
    if k == 0 {
        return Err(DelegationError::invalid(name, "n_neighbors", "must be >= 1"));
    }
    Ok(k)
}

/// Training rows plus the per-row targets they vote with.
struct Memory<T> {
    points: Array2<f64>,
    targets: Vec<T>,
}

impl<T> Memory<T> {
    fn new(name: &str, x: &Array2<f64>, targets: Vec<T>, k: usize) -> Result<Self, DelegationError> {
        if x.nrows() != targets.len() {
            return Err(DelegationError::backend(
                name,
                "fit",
                format!(
                    "found input variables with inconsistent numbers of samples: [{}, {}]",
                    x.nrows(),
                    targets.len()
                ),
            ));
        }
        if x.nrows() < k {
            return Err(DelegationError::backend(
                name,
                "fit",
                format!("expected n_neighbors <= n_samples, got {} > {}", k, x.nrows()),
            ));
        }
        Ok(Self {
            points: x.to_owned(),
            targets,
        })
    }

    /// Indices of the `k` nearest training rows for every row of `x`.
    fn neighbors(&self, name: &str, x: &Array2<f64>, k: usize) -> Result<Vec<Vec<usize>>, DelegationError> {
        if x.ncols() != self.points.ncols() {
            return Err(DelegationError::backend(
                name,
                "predict",
                format!(
                    "X has {} features, but the estimator was fitted with {}",
                    x.ncols(),
                    self.points.ncols()
                ),
            ));
        }
        let index = BallTree::new()
            .from_batch(&self.points, L2Dist)
            .map_err(|e| DelegationError::backend(name, "predict", e))?;

        x.rows()
            .into_iter()
            .map(|row| {
                index
                    .k_nearest(row, k)
                    .map(|found| found.into_iter().map(|(_, idx)| idx).collect())
                    .map_err(|e| DelegationError::backend(name, "predict", e))
            })
            .collect()
    }
}

/// Mean of the neighbors' targets.
pub struct KNeighborsRegressor {
    n_neighbors: usize,
    memory: Option<Memory<f64>>,
}

pub fn k_neighbors_regressor(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    Ok(Box::new(KNeighborsRegressor {
        n_neighbors: read_n_neighbors("KNeighborsRegressor", params)?,
        memory: None,
    }))
}

impl Estimator for KNeighborsRegressor {
    fn name(&self) -> &str {
        "KNeighborsRegressor"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        ensure_empty(self.name(), extra)?;
        self.memory = Some(Memory::new(self.name(), x, y.to_vec(), self.n_neighbors)?);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>, DelegationError> {
        ensure_empty(self.name(), extra)?;
        let memory = self
            .memory
            .as_ref()
            .ok_or_else(|| DelegationError::not_fitted(self.name()))?;
        let neighbors = memory.neighbors(self.name(), x, self.n_neighbors)?;
        Ok(neighbors
            .iter()
            .map(|idx| idx.iter().map(|&i| memory.targets[i]).sum::<f64>() / idx.len() as f64)
            .collect())
    }
}

/// Majority vote among the neighbors; ties go to the smallest label.
pub struct KNeighborsClassifier {
    n_neighbors: usize,
    fitted: Option<(LabelEncoder, Memory<usize>)>,
}

pub fn k_neighbors_classifier(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    Ok(Box::new(KNeighborsClassifier {
        n_neighbors: read_n_neighbors("KNeighborsClassifier", params)?,
        fitted: None,
    }))
}

impl Estimator for KNeighborsClassifier {
    fn name(&self) -> &str {
        "KNeighborsClassifier"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Classifier
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        ensure_empty(self.name(), extra)?;
        let encoder = LabelEncoder::fit(self.name(), y)?;
        let encoded = encoder.transform(self.name(), y)?.to_vec();
        let memory = Memory::new(self.name(), x, encoded, self.n_neighbors)?;
        self.fitted = Some((encoder, memory));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>, DelegationError> {
        ensure_empty(self.name(), extra)?;
        let (encoder, memory) = self
            .fitted
            .as_ref()
            .ok_or_else(|| DelegationError::not_fitted(self.name()))?;
        let neighbors = memory.neighbors(self.name(), x, self.n_neighbors)?;

        let encoded = neighbors
            .iter()
            .map(|idx| {
                let mut votes: BTreeMap<usize, usize> = BTreeMap::new();
                for &i in idx {
                    *votes.entry(memory.targets[i]).or_insert(0) += 1;
                }
                // BTreeMap iterates in ascending class order; keep the first max.
                votes
                    .into_iter()
                    .fold((0usize, 0usize), |best, (class, count)| {
                        if count > best.1 {
                            (class, count)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect::<Array1<usize>>();
        Ok(encoder.inverse_transform(&encoded))
    }
}
