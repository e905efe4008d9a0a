pub mod ensemble;
pub mod linear_model;
pub mod naive_bayes;
pub mod neighbors;
#[cfg(feature = "svm")]
pub mod svm;
pub mod tree;
pub mod utils;

pub mod estimator_trait;

pub use estimator_trait::{Estimator, EstimatorKind, Factory};

use crate::registry::Namespace;

/// Namespaces searched when resolving a model name, highest priority first.
pub const SEARCH_ORDER: [&str; 10] = [
    "linear_model",
    "ensemble",
    "neural_network",
    "svm",
    "neighbors",
    "tree",
    "discriminant_analysis",
    "gaussian_process",
    "naive_bayes",
    "kernel_ridge",
];

/// Build the namespace called `name`. Namespaces without a backing crate in
/// this build come back empty but are still searched.
pub fn builtin_namespace(name: &'static str) -> Namespace {
    match name {
        linear_model::NAMESPACE => linear_model::namespace(),
        ensemble::NAMESPACE => ensemble::namespace(),
        #[cfg(feature = "svm")]
        svm::NAMESPACE => svm::namespace(),
        neighbors::NAMESPACE => neighbors::namespace(),
        tree::NAMESPACE => tree::namespace(),
        naive_bayes::NAMESPACE => naive_bayes::namespace(),
        _ => Namespace::new(name),
    }
}
