use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};

use crate::error::DelegationError;
use crate::models::estimator_trait::{Estimator, EstimatorKind};
use crate::models::utils::{sample_weights, LabelEncoder};
use crate::params::{ensure_empty, Params};
use crate::registry::Namespace;

pub const NAMESPACE: &str = "tree";

pub fn namespace() -> Namespace {
    Namespace::new(NAMESPACE).with_model("DecisionTreeClassifier", decision_tree_classifier)
}

/// CART classification tree from linfa-trees.
pub struct DecisionTreeClassifier {
    split_quality: SplitQuality,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    fitted: Option<(LabelEncoder, DecisionTree<f64, usize>)>,
}

pub fn decision_tree_classifier(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    let name = "DecisionTreeClassifier";
    let mut reader = params.reader(name);
    let split_quality = match reader.choice("criterion", &["gini", "entropy"], "gini")? {
        "entropy" => SplitQuality::Entropy,
        _ => SplitQuality::Gini,
    };
    let max_depth = reader.optional_usize("max_depth")?;
    let min_samples_split = reader.usize("min_samples_split", 2)?;
    let min_samples_leaf = reader.usize("min_samples_leaf", 1)?;
    reader.finish()?;
    if min_samples_split < 2 {
        return Err(DelegationError::invalid(name, "min_samples_split", "must be >= 2"));
    }
    if min_samples_leaf < 1 {
        return Err(DelegationError::invalid(name, "min_samples_leaf", "must be >= 1"));
    }

    Ok(Box::new(DecisionTreeClassifier {
        split_quality,
        max_depth,
        min_samples_split,
        min_samples_leaf,
        fitted: None,
    }))
}

impl Estimator for DecisionTreeClassifier {
    fn name(&self) -> &str {
        "DecisionTreeClassifier"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Classifier
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        let mut reader = extra.reader(self.name());
        let weights = sample_weights(self.name(), reader.floats("sample_weight")?, x.nrows())?;
        reader.finish()?;

        let encoder = LabelEncoder::fit(self.name(), y)?;
        let mut dataset = Dataset::new(x.to_owned(), encoder.transform(self.name(), y)?);
        if let Some(weights) = weights {
            dataset = dataset.with_weights(weights.iter().map(|&w| w as f32).collect());
        }

        // linfa counts samples by weight; with unit weights these are row counts.
        let model = DecisionTree::params()
            .split_quality(self.split_quality)
            .max_depth(self.max_depth)
            .min_weight_split(self.min_samples_split as f32)
            .min_weight_leaf(self.min_samples_leaf as f32)
            .fit(&dataset)
            .map_err(|e| DelegationError::backend("DecisionTreeClassifier", "fit", e))?;
        self.fitted = Some((encoder, model));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>, DelegationError> {
        ensure_empty(self.name(), extra)?;
        let (encoder, model) = self
            .fitted
            .as_ref()
            .ok_or_else(|| DelegationError::not_fitted(self.name()))?;
        let encoded: Array1<usize> = model.predict(x);
        Ok(encoder.inverse_transform(&encoded))
    }
}
