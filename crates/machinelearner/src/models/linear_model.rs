//! `linear_model` namespace: ordinary least squares, the elastic-net family
//! and logistic regression, backed by linfa-linear, linfa-elasticnet and
//! linfa-logistic.
use linfa::prelude::*;
use linfa_elasticnet::ElasticNet;
use linfa_linear::{FittedLinearRegression, LinearRegression};
use linfa_logistic::{
    FittedLogisticRegression, LogisticRegression, MultiFittedLogisticRegression,
    MultiLogisticRegression,
};
use ndarray::{concatenate, Array1, Array2, Axis};

use crate::error::DelegationError;
use crate::models::estimator_trait::{Estimator, EstimatorKind};
use crate::models::utils::{check_n_classes, check_n_samples, LabelEncoder};
use crate::params::{ensure_empty, Params};
use crate::registry::Namespace;

pub const NAMESPACE: &str = "linear_model";

pub fn namespace() -> Namespace {
    Namespace::new(NAMESPACE)
        .with_model("LinearRegression", linear_regression)
        .with_model("Ridge", ridge)
        .with_model("Lasso", lasso)
        .with_model("ElasticNet", elastic_net)
        .with_model("LogisticRegression", logistic_regression)
}

/// Ordinary least squares.
pub struct LinearRegressionEstimator {
    fit_intercept: bool,
    model: Option<FittedLinearRegression<f64>>,
}

pub fn linear_regression(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    let mut reader = params.reader("LinearRegression");
    let fit_intercept = reader.bool("fit_intercept", true)?;
    reader.finish()?;
    Ok(Box::new(LinearRegressionEstimator {
        fit_intercept,
        model: None,
    }))
}

impl Estimator for LinearRegressionEstimator {
    fn name(&self) -> &str {
        "LinearRegression"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        ensure_empty(self.name(), extra)?;
        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let model = LinearRegression::new()
            .with_intercept(self.fit_intercept)
            .fit(&dataset)
            .map_err(|e| DelegationError::backend("LinearRegression", "fit", e))?;
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>, DelegationError> {
        ensure_empty(self.name(), extra)?;
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| DelegationError::not_fitted(self.name()))?;
        Ok(model.predict(x))
    }
}

/// L2-penalized least squares minimizing `||y - Xw||² + alpha * ||w||²`.
///
/// Solved directly as ordinary least squares on the centered rows stacked
/// with `sqrt(alpha) * I` against zero targets, so the intercept is never
/// penalized.
pub struct RidgeEstimator {
    alpha: f64,
    fit_intercept: bool,
    fitted: Option<(Array1<f64>, f64)>,
}

pub fn ridge(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    let name = "Ridge";
    let mut reader = params.reader(name);
    let alpha = reader.f64("alpha", 1.0)?;
    if alpha < 0.0 {
        return Err(DelegationError::invalid(name, "alpha", "must be >= 0"));
    }
    let fit_intercept = reader.bool("fit_intercept", true)?;
    // Only iterative solvers use these; the direct solve validates and ignores them.
    reader.u32("max_iter", 1000)?;
    reader.positive_f64("tol", 1e-4)?;
    reader.finish()?;
    Ok(Box::new(RidgeEstimator {
        alpha,
        fit_intercept,
        fitted: None,
    }))
}

impl Estimator for RidgeEstimator {
    fn name(&self) -> &str {
        "Ridge"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        ensure_empty(self.name(), extra)?;
        check_n_samples(self.name(), x, y)?;
        let n_features = x.ncols();
        let (x_offset, y_offset) = match (self.fit_intercept, x.mean_axis(Axis(0)), y.mean()) {
            (false, _, _) => (Array1::zeros(n_features), 0.0),
            (true, Some(x_mean), Some(y_mean)) => (x_mean, y_mean),
            (true, _, _) => {
                return Err(DelegationError::backend(self.name(), "fit", "cannot fit on zero samples"))
            }
        };

        let x_centered = x - &x_offset;
        let y_centered = y - y_offset;
        let penalty_rows = Array2::<f64>::eye(n_features) * self.alpha.sqrt();
        let penalty_targets = Array1::<f64>::zeros(n_features);
        let records = concatenate(Axis(0), &[x_centered.view(), penalty_rows.view()])
            .map_err(|e| DelegationError::backend(self.name(), "fit", e))?;
        let targets = concatenate(Axis(0), &[y_centered.view(), penalty_targets.view()])
            .map_err(|e| DelegationError::backend(self.name(), "fit", e))?;

        let model = LinearRegression::new()
            .with_intercept(false)
            .fit(&Dataset::new(records, targets))
            .map_err(|e| DelegationError::backend(self.name(), "fit", e))?;
        let coef = model.params().to_owned();
        let intercept = y_offset - x_offset.dot(&coef);
        self.fitted = Some((coef, intercept));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>, DelegationError> {
        ensure_empty(self.name(), extra)?;
        let (coef, intercept) = self
            .fitted
            .as_ref()
            .ok_or_else(|| DelegationError::not_fitted(self.name()))?;
        if x.ncols() != coef.len() {
            return Err(DelegationError::backend(
                self.name(),
                "predict",
                format!(
                    "X has {} features, but the estimator was fitted with {}",
                    x.ncols(),
                    coef.len()
                ),
            ));
        }
        Ok(x.dot(coef) + *intercept)
    }
}

/// Lasso and ElasticNet map onto linfa's elastic net, Lasso with a fixed
/// `l1_ratio` of 1.
pub struct ElasticNetEstimator {
    name: &'static str,
    penalty: f64,
    l1_ratio: f64,
    fit_intercept: bool,
    max_iter: u32,
    tol: f64,
    model: Option<ElasticNet<f64>>,
}

fn elastic_net_family(
    name: &'static str,
    params: &Params,
    fixed_l1_ratio: Option<f64>,
) -> Result<Box<dyn Estimator>, DelegationError> {
    let mut reader = params.reader(name);
    let penalty = reader.f64("alpha", 1.0)?;
    if penalty < 0.0 {
        return Err(DelegationError::invalid(name, "alpha", "must be >= 0"));
    }
    let l1_ratio = match fixed_l1_ratio {
        Some(ratio) => ratio,
        None => {
            let ratio = reader.f64("l1_ratio", 0.5)?;
            if !(0.0..=1.0).contains(&ratio) {
                return Err(DelegationError::invalid(name, "l1_ratio", "must be in [0, 1]"));
            }
            ratio
        }
    };
    let fit_intercept = reader.bool("fit_intercept", true)?;
    let max_iter = reader.u32("max_iter", 1000)?;
    let tol = reader.positive_f64("tol", 1e-4)?;
    reader.finish()?;

    Ok(Box::new(ElasticNetEstimator {
        name,
        penalty,
        l1_ratio,
        fit_intercept,
        max_iter,
        tol,
        model: None,
    }))
}

pub fn lasso(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    elastic_net_family("Lasso", params, Some(1.0))
}

pub fn elastic_net(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    elastic_net_family("ElasticNet", params, None)
}

impl Estimator for ElasticNetEstimator {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        ensure_empty(self.name, extra)?;
        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let model = ElasticNet::<f64>::params()
            .penalty(self.penalty)
            .l1_ratio(self.l1_ratio)
            .with_intercept(self.fit_intercept)
            .max_iterations(self.max_iter)
            .tolerance(self.tol)
            .fit(&dataset)
            .map_err(|e| DelegationError::backend(self.name, "fit", e))?;
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>, DelegationError> {
        ensure_empty(self.name, extra)?;
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| DelegationError::not_fitted(self.name))?;
        Ok(model.predict(x))
    }
}

enum FittedLogistic {
    Binary(FittedLogisticRegression<f64, usize>),
    Multinomial(MultiFittedLogisticRegression<f64, usize>),
}

/// Logistic regression; two classes use the binary model, more classes the
/// multinomial one.
pub struct LogisticRegressionEstimator {
    c: f64,
    max_iter: usize,
    tol: f64,
    fit_intercept: bool,
    fitted: Option<(LabelEncoder, FittedLogistic)>,
}

pub fn logistic_regression(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    let mut reader = params.reader("LogisticRegression");
    // `C` is the inverse of the regularization strength linfa calls `alpha`.
    let c = reader.positive_f64("C", 1.0)?;
    let max_iter = reader.usize("max_iter", 100)?;
    let tol = reader.positive_f64("tol", 1e-4)?;
    let fit_intercept = reader.bool("fit_intercept", true)?;
    reader.finish()?;
    Ok(Box::new(LogisticRegressionEstimator {
        c,
        max_iter,
        tol,
        fit_intercept,
        fitted: None,
    }))
}

impl Estimator for LogisticRegressionEstimator {
    fn name(&self) -> &str {
        "LogisticRegression"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Classifier
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        ensure_empty(self.name(), extra)?;
        let encoder = LabelEncoder::fit(self.name(), y)?;
        check_n_classes(self.name(), &encoder, 2, None)?;
        let dataset = Dataset::new(x.to_owned(), encoder.transform(self.name(), y)?);

        let fitted = if encoder.n_classes() == 2 {
            let model = LogisticRegression::default()
                .alpha(1.0 / self.c)
                .max_iterations(self.max_iter as u64)
                .gradient_tolerance(self.tol)
                .with_intercept(self.fit_intercept)
                .fit(&dataset)
                .map_err(|e| DelegationError::backend("LogisticRegression", "fit", e))?;
            FittedLogistic::Binary(model)
        } else {
            let model = MultiLogisticRegression::default()
                .alpha(1.0 / self.c)
                .max_iterations(self.max_iter as u64)
                .gradient_tolerance(self.tol)
                .with_intercept(self.fit_intercept)
                .fit(&dataset)
                .map_err(|e| DelegationError::backend("LogisticRegression", "fit", e))?;
            FittedLogistic::Multinomial(model)
        };
        self.fitted = Some((encoder, fitted));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>, DelegationError> {
        ensure_empty(self.name(), extra)?;
        let (encoder, fitted) = self
            .fitted
            .as_ref()
            .ok_or_else(|| DelegationError::not_fitted(self.name()))?;
        let encoded: Array1<usize> = match fitted {
            FittedLogistic::Binary(model) => model.predict(x),
            FittedLogistic::Multinomial(model) => model.predict(x),
        };
        Ok(encoder.inverse_transform(&encoded))
    }
}
