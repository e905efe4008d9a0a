//! Integration tests for resolving model names across namespaces.

use machinelearner::models::SEARCH_ORDER;
use machinelearner::{
    BaseModel, DelegationError, Error, Estimator, EstimatorKind, Namespace, Params, Registry,
};
use ndarray::{arr2, Array1, Array2};

// ---------------------------------------------------------------------------
// Built-in registry
// ---------------------------------------------------------------------------

#[test]
fn every_builtin_model_resolves_to_its_namespace() {
    let registry = Registry::builtin();
    for (namespace, model) in registry.model_names() {
        let handle = BaseModel::new(model, Params::new())
            .unwrap_or_else(|e| panic!("{} should construct with defaults: {}", model, e));
        assert_eq!(handle.namespace(), namespace);
        assert_eq!(handle.base_model(), model);
        assert_eq!(handle.estimator().name(), model);
    }
}

#[test]
fn builtin_namespaces_are_searched_in_priority_order() {
    let names = Registry::global().namespace_names();
    assert_eq!(names, SEARCH_ORDER.to_vec());
    assert_eq!(names.first().map(String::as_str), Some("linear_model"));
    assert_eq!(names.last().map(String::as_str), Some("kernel_ridge"));
}

#[test]
fn no_such_model_raises_resolution_error() {
    let err = BaseModel::new("NoSuchModel", Params::new()).unwrap_err();
    match &err {
        Error::Resolution(resolution) => {
            assert_eq!(resolution.name, "NoSuchModel");
            assert_eq!(resolution.searched.len(), SEARCH_ORDER.len());
        }
        other => panic!("expected resolution error, got {:?}", other),
    }
    assert!(err.to_string().contains("NoSuchModel"));
}

#[test]
fn invalid_constructor_params_are_delegation_errors() {
    let params = Params::new().with("n_estimators", "many");
    match BaseModel::new("GradientBoostingRegressor", params) {
        Err(Error::Delegation(DelegationError::InvalidParameter { key, .. })) => {
            assert_eq!(key, "n_estimators")
        }
        other => panic!("expected invalid parameter, got {:?}", other),
    }
}

#[test]
fn handle_keeps_its_constructor_params() {
    let params = Params::new().with("alpha", 0.25);
    let handle = BaseModel::new("Lasso", params.clone()).unwrap();
    assert_eq!(handle.model_params(), &params);
    assert_eq!(handle.kind(), EstimatorKind::Regressor);
}

// ---------------------------------------------------------------------------
// Synthetic collisions
// ---------------------------------------------------------------------------

struct Constant {
    value: f64,
}

impl Estimator for Constant {
    fn name(&self) -> &str {
        "Shared"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }

    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>, _extra: &Params) -> Result<(), DelegationError> {
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>, _extra: &Params) -> Result<Array1<f64>, DelegationError> {
        Ok(Array1::from_elem(x.nrows(), self.value))
    }
}

fn early(_: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    Ok(Box::new(Constant { value: 1.0 }))
}

fn late(_: &Params) -> Result<Box<dyn Estimator>, DelegationError> {
    Ok(Box::new(Constant { value: 2.0 }))
}

#[test]
fn collision_resolves_to_earliest_namespace() {
    let registry = Registry::new()
        .with_namespace(Namespace::new("high_priority").with_model("Shared", early))
        .with_namespace(Namespace::new("low_priority").with_model("Shared", late));

    let mut handle = BaseModel::with_registry(&registry, "Shared", Params::new()).unwrap();
    assert_eq!(handle.namespace(), "high_priority");

    let x = arr2(&[[0.0], [1.0]]);
    let pred = handle
        .fit(&x, &Array1::zeros(2), &Params::new())
        .unwrap()
        .predict(&x, &Params::new())
        .unwrap();
    assert_eq!(pred.to_vec(), vec![1.0, 1.0]);

    let collisions = registry.collisions();
    assert_eq!(collisions.len(), 1);
    assert_eq!(collisions[0].model, "Shared");
    assert_eq!(collisions[0].namespaces, vec!["high_priority", "low_priority"]);
}

#[test]
fn custom_namespace_can_extend_builtin_registry() {
    let registry = Registry::builtin().with_namespace(Namespace::new("custom").with_model("Shared", late));
    let handle = BaseModel::with_registry(&registry, "Shared", Params::new()).unwrap();
    assert_eq!(handle.namespace(), "custom");

    // Built-in names still resolve first.
    let linear = BaseModel::with_registry(&registry, "LinearRegression", Params::new()).unwrap();
    assert_eq!(linear.namespace(), "linear_model");
}

#[test]
fn builtin_name_shadowed_by_earlier_custom_namespace() {
    let registry = Registry::new()
        .with_namespace(Namespace::new("override").with_model("LinearRegression", early))
        .with_namespace(machinelearner::models::linear_model::namespace());
    let handle = BaseModel::with_registry(&registry, "LinearRegression", Params::new()).unwrap();
    assert_eq!(handle.namespace(), "override");
    assert_eq!(registry.collisions()[0].model, "LinearRegression");
}
