//! machinelearner: resolve estimators by name and drive them through a
//! uniform `fit` / `predict` / `score` surface.
//!
//! A model name such as `"LinearRegression"` is looked up across an ordered
//! list of namespaces (`linear_model`, `ensemble`, `svm`, ...). The first
//! namespace defining the name wins, and the resulting handle forwards every
//! call to the backing implementation from the linfa crates or gbdt.
//!
//! The SVM namespace sits behind the `svm` feature (on by default).
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod model_selection;
pub mod models;
pub mod params;
pub mod registry;

pub use config::ModelConfig;
pub use error::{DelegationError, Error, ResolutionError, Result};
pub use model::{BaseModel, Classifier, Regressor};
pub use models::{Estimator, EstimatorKind};
pub use params::{ParamValue, Params};
pub use registry::{Namespace, Registry};
