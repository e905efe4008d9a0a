//! `ensemble` namespace: gradient boosted trees from the gbdt crate.
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};

use crate::error::DelegationError;
use crate::models::estimator_trait::{Estimator, EstimatorKind};
use crate::models::utils::{check_n_classes, check_n_samples, sample_weights, LabelEncoder};
use crate::params::{ensure_empty, Params};
use crate::registry::Namespace;

pub const NAMESPACE: &str = "ensemble";

pub fn namespace() -> Namespace {
    Namespace::new(NAMESPACE)
        .with_model("GradientBoostingRegressor", gradient_boosting_regressor)
        .with_model("GradientBoostingClassifier", gradient_boosting_classifier)
}

#[derive(Debug, Clone)]
struct BoostingParams {
    learning_rate: f32,
    n_estimators: usize,
    max_depth: u32,
    subsample: f64,
    min_samples_leaf: usize,
}

impl BoostingParams {
    fn read(name: &str, params: &Params) -> Result<Self, DelegationError> {
        let mut reader = params.reader(name);
        let learning_rate = reader.positive_f64("learning_rate", 0.1)? as f32;
        let n_estimators = reader.usize("n_estimators", 100)?;
        let max_depth = reader.u32("max_depth", 3)?;
        let subsample = reader.positive_f64("subsample", 1.0)?;
        if subsample > 1.0 {
            return Err(DelegationError::invalid(name, "subsample", "must be in (0, 1]"));
        }
        let min_samples_leaf = reader.usize("min_samples_leaf", 1)?;
        reader.finish()?;
        Ok(Self {
            learning_rate,
            n_estimators,
            max_depth,
            subsample,
            min_samples_leaf,
        })
    }

    fn config(&self, feature_size: usize, loss: &str) -> Config {
        let mut config = Config::new();
        config.set_feature_size(feature_size);
        config.set_shrinkage(self.learning_rate);
        config.set_max_depth(self.max_depth);
        config.set_iterations(self.n_estimators);
        config.set_data_sample_ratio(self.subsample);
        config.set_min_leaf_size(self.min_samples_leaf);
        config.set_training_optimization_level(2);
        config.set_debug(false);
        config.set_loss(loss);
        config
    }
}

/// Convert rows of `x` into gbdt training samples carrying `labels` and
/// optional per-sample weights.
fn training_data(x: &Array2<f64>, labels: &[f32], weights: Option<&[f64]>) -> DataVec {
    let mut train_x = DataVec::new();
    for (i, row) in x.rows().into_iter().enumerate() {
        let features = row.iter().map(|&v| v as f32).collect::<Vec<f32>>();
        let weight = weights.map_or(1.0, |w| w[i] as f32);
        train_x.push(Data::new_training_data(features, weight, labels[i], None));
    }
    train_x
}

fn test_data(x: &Array2<f64>) -> DataVec {
    let mut test_x = DataVec::new();
    for row in x.rows() {
        let features = row.iter().map(|&v| v as f32).collect::<Vec<f32>>();
        test_x.push(Data::new_test_data(features, None));
    }
    test_x
}

/// Shape checks and the `sample_weight` extra shared by both fits.
fn read_fit_extra(
    name: &str,
    x: &Array2<f64>,
    y: &Array1<f64>,
    extra: &Params,
) -> Result<Option<Vec<f64>>, DelegationError> {
    check_n_samples(name, x, y)?;
    let mut reader = extra.reader(name);
    let weights = sample_weights(name, reader.floats("sample_weight")?, x.nrows())?;
    reader.finish()?;
    Ok(weights)
}

/// Gradient boosting on squared error.
pub struct GradientBoostingRegressor {
    params: BoostingParams,
    model: Option<GBDT>,
}

pub fn gradient_boosting_regressor(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    Ok(Box::new(GradientBoostingRegressor {
        params: BoostingParams::read("GradientBoostingRegressor", params)?,
        model: None,
    }))
}

impl Estimator for GradientBoostingRegressor {
    fn name(&self) -> &str {
        "GradientBoostingRegressor"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        let weights = read_fit_extra(self.name(), x, y, extra)?;
        let labels = y.iter().map(|&v| v as f32).collect::<Vec<f32>>();
        let mut train_x = training_data(x, &labels, weights.as_deref());

        let mut gbdt = GBDT::new(&self.params.config(x.ncols(), "SquaredError"));
        gbdt.fit(&mut train_x);
        self.model = Some(gbdt);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>, DelegationError> {
        ensure_empty(self.name(), extra)?;
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| DelegationError::not_fitted(self.name()))?;
        let predictions = model.predict(&test_data(x));
        Ok(predictions.into_iter().map(f64::from).collect())
    }
}

/// Binary gradient boosting on log-likelihood loss. gbdt expects labels of
/// -1 / 1 and predicts the probability of the positive class.
pub struct GradientBoostingClassifier {
    params: BoostingParams,
    fitted: Option<(LabelEncoder, GBDT)>,
}

pub fn gradient_boosting_classifier(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    Ok(Box::new(GradientBoostingClassifier {
        params: BoostingParams::read("GradientBoostingClassifier", params)?,
        fitted: None,
    }))
}

impl Estimator for GradientBoostingClassifier {
    fn name(&self) -> &str {
        "GradientBoostingClassifier"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Classifier
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        let weights = read_fit_extra(self.name(), x, y, extra)?;
        let encoder = LabelEncoder::fit(self.name(), y)?;
        check_n_classes(self.name(), &encoder, 2, Some(2))?;
        let labels = encoder
            .transform(self.name(), y)?
            .iter()
            .map(|&c| if c == 1 { 1.0 } else { -1.0 })
            .collect::<Vec<f32>>();
        let mut train_x = training_data(x, &labels, weights.as_deref());

        let mut gbdt = GBDT::new(&self.params.config(x.ncols(), "LogLikelyhood"));
        gbdt.fit(&mut train_x);
        self.fitted = Some((encoder, gbdt));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>, DelegationError> {
        ensure_empty(self.name(), extra)?;
        let (encoder, model) = self
            .fitted
            .as_ref()
            .ok_or_else(|| DelegationError::not_fitted(self.name()))?;
        let probabilities = model.predict(&test_data(x));
        let encoded = probabilities
            .into_iter()
            .map(|p| usize::from(p >= 0.5))
            .collect::<Array1<usize>>();
        Ok(encoder.inverse_transform(&encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_matrix() -> Array2<f64> {
        Array2::from_shape_vec(
            (8, 2),
            vec![
                1.0, 0.0, //
                1.1, 0.1, //
                0.9, 0.2, //
                1.2, 0.0, //
                0.0, 1.0, //
                0.1, 1.1, //
                0.2, 0.9, //
                0.0, 1.2, //
            ],
        )
        .unwrap()
    }

    #[test]
    fn regressor_predicts_one_value_per_row() {
        let x = feature_matrix();
        let y = Array1::from_vec(vec![1.0, 1.1, 0.9, 1.2, 5.0, 5.1, 4.9, 5.2]);

        let mut model = gradient_boosting_regressor(&Params::new().with("n_estimators", 20)).unwrap();
        model.fit(&x, &y, &Params::new()).unwrap();
        let predictions = model.predict(&x, &Params::new()).unwrap();
        assert_eq!(predictions.len(), x.nrows());
        assert!(predictions.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn classifier_returns_caller_labels() {
        let x = feature_matrix();
        let y = Array1::from_vec(vec![3.0, 3.0, 3.0, 3.0, 7.0, 7.0, 7.0, 7.0]);

        let mut model = gradient_boosting_classifier(&Params::new().with("n_estimators", 10)).unwrap();
        model.fit(&x, &y, &Params::new()).unwrap();
        let predictions = model.predict(&x, &Params::new()).unwrap();
        assert_eq!(predictions.len(), x.nrows());
        assert!(predictions.iter().all(|&v| v == 3.0 || v == 7.0));
    }

    #[test]
    fn classifier_is_binary_only() {
        let x = feature_matrix();
        let y = Array1::from_vec(vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0]);
        let mut model = gradient_boosting_classifier(&Params::new()).unwrap();
        assert!(model.fit(&x, &y, &Params::new()).is_err());
    }

    #[test]
    fn sample_weight_length_is_checked() {
        let x = feature_matrix();
        let y = Array1::from_vec(vec![1.0; 8]);
        let extra = Params::new().with("sample_weight", vec![1.0, 2.0]);
        let mut model = gradient_boosting_regressor(&Params::new()).unwrap();
        assert!(model.fit(&x, &y, &extra).is_err());
    }

    #[test]
    fn mismatched_targets_fail_fit() {
        let x = feature_matrix();
        let short = Array1::from_vec(vec![1.0, 0.0]);

        let mut regressor = gradient_boosting_regressor(&Params::new()).unwrap();
        let err = regressor.fit(&x, &short, &Params::new()).unwrap_err();
        assert!(matches!(err, DelegationError::Backend { .. }));

        let mut classifier = gradient_boosting_classifier(&Params::new()).unwrap();
        let err = classifier.fit(&x, &short, &Params::new()).unwrap_err();
        assert!(matches!(err, DelegationError::Backend { .. }));
    }

    #[test]
    fn sample_weight_pulls_predictions_toward_heavy_rows() {
        // Rows sharing a feature value cannot be split apart, so each leaf
        // predicts their weighted mean.
        let x = Array2::from_shape_vec((4, 1), vec![0.0, 0.0, 1.0, 1.0]).unwrap();
        let y = Array1::from_vec(vec![0.0, 10.0, 0.0, 10.0]);
        let query = Array2::from_shape_vec((1, 1), vec![0.0]).unwrap();
        let params = Params::new().with("n_estimators", 10);

        let mut plain = gradient_boosting_regressor(&params).unwrap();
        plain.fit(&x, &y, &Params::new()).unwrap();
        let unweighted = plain.predict(&query, &Params::new()).unwrap()[0];

        let extra = Params::new().with("sample_weight", vec![1.0, 9.0, 1.0, 9.0]);
        let mut weighted_model = gradient_boosting_regressor(&params).unwrap();
        weighted_model.fit(&x, &y, &extra).unwrap();
        let weighted = weighted_model.predict(&query, &Params::new()).unwrap()[0];

        assert!((unweighted - 5.0).abs() < 0.5, "unweighted {}", unweighted);
        assert!(weighted > 8.0, "weighted {}", weighted);
    }

    #[test]
    fn max_depth_must_fit_backend_type() {
        let params = Params::new().with("max_depth", u32::MAX as i64 + 1);
        assert!(matches!(
            gradient_boosting_regressor(&params),
            Err(DelegationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn subsample_above_one_is_rejected() {
        let params = Params::new().with("subsample", 1.5);
        assert!(gradient_boosting_regressor(&params).is_err());
    }
}
