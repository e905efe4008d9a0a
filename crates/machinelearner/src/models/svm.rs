use linfa::prelude::*;
use linfa_svm::{Svm, SvmParams};
use ndarray::{Array1, Array2};

use crate::error::DelegationError;
use crate::models::estimator_trait::{Estimator, EstimatorKind};
use crate::models::utils::{check_n_classes, LabelEncoder};
use crate::params::{ensure_empty, ParamReader, Params};
use crate::registry::Namespace;

pub const NAMESPACE: &str = "svm";

pub fn namespace() -> Namespace {
    Namespace::new(NAMESPACE)
        .with_model("SVC", svc)
        .with_model("SVR", svr)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kernel {
    Linear,
    Gaussian { gamma: f64 },
    Polynomial { coef0: f64, degree: f64 },
}

impl Kernel {
    fn read(reader: &mut ParamReader<'_>) -> Result<Self, DelegationError> {
        let kernel = reader.choice("kernel", &["linear", "rbf", "poly"], "rbf")?;
        let gamma = reader.positive_f64("gamma", 1.0)?;
        let degree = reader.positive_f64("degree", 3.0)?;
        let coef0 = reader.f64("coef0", 1.0)?;
        Ok(match kernel {
            "linear" => Kernel::Linear,
            "poly" => Kernel::Polynomial { coef0, degree },
            _ => Kernel::Gaussian { gamma },
        })
    }

    fn apply<T>(&self, params: SvmParams<f64, T>) -> SvmParams<f64, T> {
        match *self {
            Kernel::Linear => params.linear_kernel(),
            // linfa divides the squared distance by its parameter.
            Kernel::Gaussian { gamma } => params.gaussian_kernel(1.0 / gamma),
            Kernel::Polynomial { coef0, degree } => params.polynomial_kernel(coef0, degree),
        }
    }
}

/// Binary support vector classifier.
pub struct SvcEstimator {
    c: f64,
    tol: f64,
    kernel: Kernel,
    fitted: Option<(LabelEncoder, Svm<f64, bool>)>,
}

pub fn svc(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    let mut reader = params.reader("SVC");
    let c = reader.positive_f64("C", 1.0)?;
    let tol = reader.positive_f64("tol", 1e-3)?;
    let kernel = Kernel::read(&mut reader)?;
    reader.finish()?;
    Ok(Box::new(SvcEstimator {
        c,
        tol,
        kernel,
        fitted: None,
    }))
}

impl Estimator for SvcEstimator {
    fn name(&self) -> &str {
        "SVC"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Classifier
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        ensure_empty(self.name(), extra)?;
        let encoder = LabelEncoder::fit(self.name(), y)?;
        check_n_classes(self.name(), &encoder, 2, Some(2))?;
        // The larger label is the positive class.
        let targets = encoder.transform(self.name(), y)?.mapv(|c| c == 1);
        let dataset = Dataset::new(x.to_owned(), targets);

        let params = Svm::<f64, bool>::params()
            .eps(self.tol)
            .pos_neg_weights(self.c, self.c);
        let model = self
            .kernel
            .apply(params)
            .fit(&dataset)
            .map_err(|e| DelegationError::backend("SVC", "fit", e))?;
        self.fitted = Some((encoder, model));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>, DelegationError> {
        ensure_empty(self.name(), extra)?;
        let (encoder, model) = self
            .fitted
            .as_ref()
            .ok_or_else(|| DelegationError::not_fitted(self.name()))?;
        let predictions: Array1<bool> = model.predict(x);
        Ok(encoder.inverse_transform(&predictions.mapv(usize::from)))
    }
}

/// Epsilon support vector regression.
pub struct SvrEstimator {
    c: f64,
    epsilon: f64,
    kernel: Kernel,
    model: Option<Svm<f64, f64>>,
}

pub fn svr(params: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    let mut reader = params.reader("SVR");
    let c = reader.positive_f64("C", 1.0)?;
    let epsilon = reader.positive_f64("epsilon", 0.1)?;
    let kernel = Kernel::read(&mut reader)?;
    reader.finish()?;
    Ok(Box::new(SvrEstimator {
        c,
        epsilon,
        kernel,
        model: None,
    }))
}

impl Estimator for SvrEstimator {
    fn name(&self) -> &str {
        "SVR"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<(), DelegationError> {
        ensure_empty(self.name(), extra)?;
        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let params = Svm::<f64, f64>::params().c_svr(self.c, Some(self.epsilon));
        let model = self
            .kernel
            .apply(params)
            .fit(&dataset)
            .map_err(|e| DelegationError::backend("SVR", "fit", e))?;
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
