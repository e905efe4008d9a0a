use linfa::prelude::*;
use linfa_bayes::{GaussianNb, MultinomialNb};
use ndarray::{Array1, Array2};

use crate::error::DelegationError;
use crate::models::estimator_trait::{Estimator, EstimatorKind};
use crate::models::utils::{check_n_classes, LabelEncoder};
use crate::params::{ensure_empty, Params};
use crate::registry::Namespace;

pub const NAMESPACE: &str = "naive_bayes";

pub fn namespace() -> Namespace {
    Namespace::new(NAMESPACE)
        .with_model("GaussianNB", gaussian_nb)
        .with_model("MultinomialNB", multinomial_nb)
}

pub struct GaussianNbEstimator {
    var_smoothing: f64,
    fitted: Option<(LabelEncoder, GaussianNb<f64, usize>)>,
}

pub fn gaussian_nb(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    let mut reader = params.reader("GaussianNB");
    let var_smoothing = reader.f64("var_smoothing", 1e-9)?;
    reader.finish()?;
    if var_smoothing < 0.0 {
        return Err(DelegationError::invalid("GaussianNB", "var_smoothing", "must be >= 0"));
    }
    Ok(Box::new(GaussianNbEstimator {
        var_smoothing,
        fitted: None,
    }))
}

impl Estimator for GaussianNbEstimator {
    fn name(&self) -> &str {
        "GaussianNB"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Classifier
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        ensure_empty(self.name(), extra)?;
        let encoder = LabelEncoder::fit(self.name(), y)?;
        check_n_classes(self.name(), &encoder, 1, None)?;
        let dataset = Dataset::new(x.to_owned(), encoder.transform(self.name(), y)?);
        let model = GaussianNb::params()
            .var_smoothing(self.var_smoothing)
            .fit(&dataset)
            .map_err(|e| DelegationError::backend("GaussianNB", "fit", e))?;
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

/// Multinomial naive Bayes for count features.
pub struct MultinomialNbEstimator {
    alpha: f64,
    fitted: Option<(LabelEncoder, MultinomialNb<f64, usize>)>,
}

pub fn multinomial_nb(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    let mut reader = params.reader("MultinomialNB");
    let alpha = reader.positive_f64("alpha", 1.0)?;
    reader.finish()?;
    Ok(Box::new(MultinomialNbEstimator { alpha, fitted: None }))
}

impl Estimator for MultinomialNbEstimator {
    fn name(&self) -> &str {
        "MultinomialNB"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Classifier
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        ensure_empty(self.name(), extra)?;
        if let Some(bad) = x.iter().find(|&&v| v < 0.0) {
            return Err(DelegationError::backend(
                self.name(),
                "fit",
                format!("negative values in data passed to MultinomialNB (found {})", bad),
            ));
        }
        let encoder = LabelEncoder::fit(self.name(), y)?;
        let dataset = Dataset::new(x.to_owned(), encoder.transform(self.name(), y)?);
        let model = MultinomialNb::params()
            .alpha(self.alpha)
            .fit(&dataset)
            .map_err(|e| DelegationError::backend("MultinomialNB", "fit", e))?;
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
