//! Model handles: resolve an estimator by name once, then forward every
//! `fit` / `predict` / `score` call to it.
use std::fmt;
use std::ops::{Deref, DerefMut};

use log::{debug, warn};
use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::models::{Estimator, EstimatorKind};
use crate::params::Params;
use crate::registry::Registry;

/// Owns one resolved estimator for its whole lifetime.
pub struct BaseModel {
    base_model: String,
    model_params: Params,
    namespace: String,
    model: Box<dyn Estimator>,
}

impl BaseModel {
    /// Resolve `base_model` in the built-in registry and construct it with
    /// `params`.
    ///
    /// # Errors
    /// * `Error::Resolution` if no namespace defines `base_model`.
    /// * `Error::Delegation` if the estimator rejects `params`.
    pub fn new(base_model: &str, params: Params) -> Result<Self> {
        Self::with_registry(Registry::global(), base_model, params)
    }

    /// Like [`BaseModel::new`] but searching `registry`.
    pub fn with_registry(registry: &Registry, base_model: &str, params: Params) -> Result<Self> {
        let resolved = registry.resolve(base_model)?;
        let model = (resolved.factory)(&params)?;
        debug!(
            "Constructed {} {} from '{}' with {} parameter(s)",
            model.kind(),
            base_model,
            resolved.namespace,
            params.len()
        );
        Ok(Self {
            base_model: base_model.to_string(),
            model_params: params,
            namespace: resolved.namespace.to_string(),
            model,
        })
    }

    /// Fit the underlying estimator. Returns the handle for chaining.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<&mut Self> {
        self.model.fit(x, y, extra)?;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>, extra: &Params) -> Result<Array1<f64>> {
        Ok(self.model.predict(x, extra)?)
    }

    /// Score as defined by the underlying estimator (R² for regressors,
    /// mean accuracy for classifiers unless the estimator overrides it).
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>, extra: &Params) -> Result<f64> {
        Ok(self.model.score(x, y, extra)?)
    }

    /// The model name this handle was constructed with.
    pub fn base_model(&self) -> &str {
        &self.base_model
    }

    pub fn model_params(&self) -> &Params {
        &self.model_params
    }

    /// Namespace the model was resolved from.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn estimator(&self) -> &dyn Estimator {
        self.model.as_ref()
    }

    pub fn kind(&self) -> EstimatorKind {
        self.model.kind()
    }
}

impl fmt::Debug for BaseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseModel")
            .field("base_model", &self.base_model)
            .field("namespace", &self.namespace)
            .field("model_params", &self.model_params)
            .finish()
    }
}

fn warn_on_kind_mismatch(model: &BaseModel, expected: EstimatorKind) {
    if model.kind() != expected {
        warn!(
            "'{}' is a {} but was wrapped as a {}",
            model.base_model(),
            model.kind(),
            expected
        );
    }
}

macro_rules! typed_handle {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name(BaseModel);

        impl $name {
            pub fn new(base_model: &str, params: Params) -> Result<Self> {
                Self::with_registry(Registry::global(), base_model, params)
            }

            pub fn with_registry(registry: &Registry, base_model: &str, params: Params) -> Result<Self> {
                let model = BaseModel::with_registry(registry, base_model, params)?;
                warn_on_kind_mismatch(&model, $kind);
                Ok(Self(model))
            }

            /// The kind this wrapper was declared for.
            pub fn expected_kind(&self) -> EstimatorKind {
                $kind
            }

            pub fn into_inner(self) -> BaseModel {
                self.0
            }
        }

        impl Deref for $name {
            type Target = BaseModel;

            fn deref(&self) -> &BaseModel {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut BaseModel {
                &mut self.0
            }
        }
    };
}

typed_handle!(
    /// Handle declared to wrap a regressor.
    Regressor,
    EstimatorKind::Regressor
);

typed_handle!(
    /// Handle declared to wrap a classifier.
    Classifier,
    EstimatorKind::Classifier
);
