use anyhow::{anyhow, Context, Result};
use ndarray::{Array1, Array2};

use machinelearner::model_selection::train_test_split;
use machinelearner::Params;

use crate::run::data::read_table;
use crate::run::input::RunConfig;
use crate::run::output::write_predictions;

/// Outcome of a single run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub model: String,
    pub namespace: String,
    pub n_train: usize,
    pub n_test: usize,
    /// Default metric of the estimator, when targets for the test rows exist.
    pub score: Option<f64>,
    pub predictions: Array1<f64>,
}

fn evaluation_data(config: &RunConfig) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>, Option<Array1<f64>>)> {
    let train = read_table(&config.train_data, &config.target_column)?;
    let y_train = train.y.ok_or_else(|| {
        anyhow!(
            "Training data {} has no '{}' column",
            config.train_data,
            config.target_column
        )
    })?;

    match &config.test_data {
        Some(test_path) => {
            let test = read_table(test_path, &config.target_column)?;
            if test.feature_names != train.feature_names {
                return Err(anyhow!(
                    "Feature columns of {} do not match training data: {:?} vs {:?}",
                    test_path,
                    test.feature_names,
                    train.feature_names
                ));
            }
            Ok((train.x, y_train, test.x, test.y))
        }
        None => {
            let (x_train, x_test, y_train, y_test) =
                train_test_split(&train.x, &y_train, config.test_size, config.seed)
                    .context("Failed to split training data")?;
            log::info!(
                "No test data given; held out {} of {} rows (seed {})",
                x_test.nrows(),
                x_train.nrows() + x_test.nrows(),
                config.seed
            );
            Ok((x_train, y_train, x_test, Some(y_test)))
        }
    }
}

/// Build the configured model, fit it, predict the test rows and score them.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let mut model = config
        .model
        .build()
        .with_context(|| format!("Failed to build model '{}'", config.model.model_type))?;
    log::info!(
        "Using {} from namespace '{}' ({})",
        model.base_model(),
        model.namespace(),
        model.kind()
    );

    let (x_train, y_train, x_test, y_test) = evaluation_data(config)?;
    log::info!(
        "Fitting on {} rows x {} features",
        x_train.nrows(),
        x_train.ncols()
    );

    let no_extra = Params::new();
    model.fit(&x_train, &y_train, &no_extra)?;
    let predictions = model.predict(&x_test, &no_extra)?;

    let score = match &y_test {
        Some(y) => {
            let score = model.score(&x_test, y, &no_extra)?;
            log::info!("Score on {} test rows: {:.4}", x_test.nrows(), score);
            Some(score)
        }
        None => None,
    };

    write_predictions(&predictions, y_test.as_ref(), config.output_file.as_deref())?;

    Ok(RunSummary {
        model: model.base_model().to_string(),
        namespace: model.namespace().to_string(),
        n_train: x_train.nrows(),
        n_test: x_test.nrows(),
        score,
        predictions,
    })
}
