//! Integration tests checking that handles forward to the backing crates
//! without changing their results.

use linfa::prelude::*;
use linfa_bayes::GaussianNb;
use linfa_elasticnet::ElasticNet;
use linfa_linear::LinearRegression;
use machinelearner::{BaseModel, DelegationError, Error, Params, Regressor};
use ndarray::{arr1, arr2, Array1, Array2};

fn regression_data() -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((12, 2), |(i, j)| i as f64 + 0.5 * j as f64 * (i % 3) as f64);
    let y = x
        .rows()
        .into_iter()
        .map(|row| 3.0 * row[0] - 2.0 * row[1] + 1.0)
        .collect::<Array1<f64>>();
    (x, y)
}

fn assert_close(a: &Array1<f64>, b: &Array1<f64>, tol: f64) {
    assert_eq!(a.len(), b.len());
    for (lhs, rhs) in a.iter().zip(b.iter()) {
        assert!((lhs - rhs).abs() < tol, "{} vs {}", lhs, rhs);
    }
}

// ---------------------------------------------------------------------------
// Scenario: LinearRegression on a tiny dataset
// ---------------------------------------------------------------------------

#[test]
fn linear_regression_scenario_predicts_next_point() {
    let x = arr2(&[[1.0], [2.0], [3.0]]);
    let y = arr1(&[1.0, 2.0, 3.0]);

    let mut model = BaseModel::new("LinearRegression", Params::new()).unwrap();
    let pred = model
        .fit(&x, &y, &Params::new())
        .unwrap()
        .predict(&arr2(&[[4.0]]), &Params::new())
        .unwrap();

    let direct = LinearRegression::new()
        .fit(&Dataset::new(x.clone(), y.clone()))
        .unwrap()
        .predict(&arr2(&[[4.0]]));

    assert!((pred[0] - 4.0).abs() < 1e-6);
    assert_close(&pred, &direct, 1e-12);
}

// ---------------------------------------------------------------------------
// Round trips against direct use of the backing crate
// ---------------------------------------------------------------------------

#[test]
fn linear_regression_matches_direct_fit() {
    let (x, y) = regression_data();
    let mut model = BaseModel::new("LinearRegression", Params::new().with("fit_intercept", false)).unwrap();
    model.fit(&x, &y, &Params::new()).unwrap();

    let direct = LinearRegression::new()
        .with_intercept(false)
        .fit(&Dataset::new(x.clone(), y.clone()))
        .unwrap();

    assert_close(&model.predict(&x, &Params::new()).unwrap(), &direct.predict(&x), 1e-12);
}

#[test]
fn ridge_satisfies_penalized_normal_equations() {
    let (x, y) = regression_data();
    let alpha = 2.5;
    let mut model = Regressor::new("Ridge", Params::new().with("alpha", alpha)).unwrap();
    model.fit(&x, &y, &Params::new()).unwrap();

    // Recover the intercept and coefficients from predictions at the origin
    // and at each unit vector.
    let origin = Array2::zeros((1, 2));
    let intercept = model.predict(&origin, &Params::new()).unwrap()[0];
    let coef = (0..2)
        .map(|j| {
            let mut unit = Array2::zeros((1, 2));
            unit[[0, j]] = 1.0;
            model.predict(&unit, &Params::new()).unwrap()[0] - intercept
        })
        .collect::<Array1<f64>>();

    // Minimizer of ||y - Xw - b||² + alpha ||w||²:
    // Xcᵀ (yc - Xc w) = alpha w, and b = mean(y) - mean(X) w.
    let x_mean = x.mean_axis(ndarray::Axis(0)).unwrap();
    let y_mean = y.mean().unwrap();
    let xc = &x - &x_mean;
    let residual = (&y - y_mean) - xc.dot(&coef);
    assert_close(&xc.t().dot(&residual), &(&coef * alpha), 1e-8);
    assert!((intercept - (y_mean - x_mean.dot(&coef))).abs() < 1e-8);

    let mut weak = Regressor::new("Ridge", Params::new().with("alpha", 0.1)).unwrap();
    weak.fit(&x, &y, &Params::new()).unwrap();
    assert!(weak.score(&x, &y, &Params::new()).unwrap() > 0.9);
}

#[test]
fn lasso_matches_direct_elastic_net() {
    let (x, y) = regression_data();
    let mut model = Regressor::new("Lasso", Params::new().with("alpha", 0.1)).unwrap();
    model.fit(&x, &y, &Params::new()).unwrap();

    let direct = ElasticNet::<f64>::params()
        .penalty(0.1)
        .l1_ratio(1.0)
        .with_intercept(true)
        .max_iterations(1000)
        .tolerance(1e-4)
        .fit(&Dataset::new(x.clone(), y.clone()))
        .unwrap();

    assert_close(&model.predict(&x, &Params::new()).unwrap(), &direct.predict(&x), 1e-12);
}

#[test]
fn gaussian_nb_matches_direct_fit() {
    let x = arr2(&[
        [1.0, 1.0],
        [1.2, 0.8],
        [0.9, 1.1],
        [4.0, 4.0],
        [4.2, 3.9],
        [3.8, 4.1],
    ]);
    let labels = arr1(&[0usize, 0, 0, 1, 1, 1]);
    let y = labels.mapv(|v| v as f64);

    let mut model = BaseModel::new("GaussianNB", Params::new()).unwrap();
    model.fit(&x, &y, &Params::new()).unwrap();

    let direct = GaussianNb::params()
        .fit(&Dataset::new(x.clone(), labels))
        .unwrap();
    let direct_pred: Array1<usize> = direct.predict(&x);

    assert_eq!(
        model.predict(&x, &Params::new()).unwrap(),
        direct_pred.mapv(|v| v as f64)
    );
    assert_eq!(model.score(&x, &y, &Params::new()).unwrap(), 1.0);
}

// ---------------------------------------------------------------------------
// Classifiers keep the caller's label values
// ---------------------------------------------------------------------------

#[test]
fn decision_tree_returns_caller_labels() {
    let x = arr2(&[[0.0], [0.5], [1.0], [5.0], [5.5], [6.0], [10.0], [10.5]]);
    let y = arr1(&[-3.0, -3.0, -3.0, 0.5, 0.5, 0.5, 12.0, 12.0]);

    let mut model = BaseModel::new("DecisionTreeClassifier", Params::new()).unwrap();
    model.fit(&x, &y, &Params::new()).unwrap();
    assert_eq!(model.predict(&x, &Params::new()).unwrap(), y);
    assert_eq!(model.score(&x, &y, &Params::new()).unwrap(), 1.0);
}

#[test]
fn logistic_regression_scores_separable_data() {
    let x = arr2(&[[-3.0], [-2.0], [-1.5], [-1.0], [1.0], [1.5], [2.0], [3.0]]);
    let y = arr1(&[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);

    let mut model = BaseModel::new("LogisticRegression", Params::new()).unwrap();
    model.fit(&x, &y, &Params::new()).unwrap();
    let pred = model.predict(&x, &Params::new()).unwrap();
    assert!(pred.iter().all(|&v| v == 0.0 || v == 1.0));
    assert!(model.score(&x, &y, &Params::new()).unwrap() >= 0.75);
}

// ---------------------------------------------------------------------------
// Errors surface unchanged
// ---------------------------------------------------------------------------

#[test]
fn predict_before_fit_is_not_fitted() {
    let model = BaseModel::new("KNeighborsRegressor", Params::new()).unwrap();
    match model.predict(&arr2(&[[1.0]]), &Params::new()) {
        Err(Error::Delegation(DelegationError::NotFitted { estimator })) => {
            assert_eq!(estimator, "KNeighborsRegressor")
        }
        other => panic!("expected NotFitted, got {:?}", other),
    }
}

#[test]
fn unexpected_fit_keyword_is_rejected() {
    let (x, y) = regression_data();
    let mut model = BaseModel::new("LinearRegression", Params::new()).unwrap();
    let extra = Params::new().with("sample_weight", vec![1.0; 12]);
    match model.fit(&x, &y, &extra) {
        Err(Error::Delegation(DelegationError::UnexpectedParameter { key, .. })) => {
            assert_eq!(key, "sample_weight")
        }
        Err(other) => panic!("expected UnexpectedParameter, got {:?}", other),
        Ok(_) => panic!("expected UnexpectedParameter, got Ok"),
    }
}

#[test]
fn score_rejects_keywords() {
    let (x, y) = regression_data();
    let mut model = BaseModel::new("LinearRegression", Params::new()).unwrap();
    model.fit(&x, &y, &Params::new()).unwrap();
    assert!(model.score(&x, &y, &Params::new().with("multioutput", "raw")).is_err());
}

#[test]
fn sample_weight_reaches_gradient_boosting() {
    let x = arr2(&[[0.0], [0.0], [1.0], [1.0]]);
    let y = arr1(&[0.0, 10.0, 0.0, 10.0]);
    let query = arr2(&[[0.0]]);
    let params = Params::new().with("n_estimators", 10);

    let mut plain = BaseModel::new("GradientBoostingRegressor", params.clone()).unwrap();
    plain.fit(&x, &y, &Params::new()).unwrap();
    let unweighted = plain.predict(&query, &Params::new()).unwrap()[0];

    let mut weighted = BaseModel::new("GradientBoostingRegressor", params).unwrap();
    let extra = Params::new().with("sample_weight", vec![1.0, 9.0, 1.0, 9.0]);
    weighted.fit(&x, &y, &extra).unwrap();
    let heavy = weighted.predict(&query, &Params::new()).unwrap()[0];

    assert!(heavy > unweighted + 2.0, "{} vs {}", heavy, unweighted);
}

#[test]
fn mismatched_sample_counts_are_delegation_errors() {
    let x = arr2(&[[0.0], [1.0], [2.0], [3.0]]);
    let y = arr1(&[0.0, 1.0]);
    for name in ["GradientBoostingRegressor", "GradientBoostingClassifier", "Ridge"] {
        let mut model = BaseModel::new(name, Params::new()).unwrap();
        match model.fit(&x, &y, &Params::new()) {
            Err(Error::Delegation(DelegationError::Backend { estimator, .. })) => assert_eq!(estimator, name),
            Err(other) => panic!("{}: expected Backend, got {:?}", name, other),
            Ok(_) => panic!("{}: expected Backend, got Ok", name),
        }
    }
}
