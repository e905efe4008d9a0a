use clap::{Arg, Command, ValueHint};
use std::path::PathBuf;

pub mod data;
pub mod input;
pub mod output;
pub mod runner;

/// Arguments of the `run` subcommand.
pub fn command() -> Command {
    Command::new("run")
        .about("Fit a model on a data file and score it on held-out rows")
        .arg(
            Arg::new("config")
                .help("Path to run configuration file")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("train_data")
                .short('d')
                .long("train_data")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to training data (*.csv or *.tsv). Overrides the training \
                     data file specified in the configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("test_data")
                .short('t')
                .long("test_data")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to test data. When absent, a fraction of the training \
                     data is held out instead.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("model_type")
                .short('m')
                .long("model_type")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Model name to resolve, e.g. 'Ridge'. Overrides the model type \
                     (and drops its params) from the configuration file.",
                )
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("target_column")
                .long("target")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Name of the target column. Defaults to 'target'.")
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("output_file")
                .short('o')
                .long("output_file")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Path to write predictions (*.tsv or *.csv). Defaults to stdout.")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("test_size")
                .long("test-size")
                .value_parser(clap::value_parser!(f64))
                .help("Held-out fraction used when no test data is given.")
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(clap::value_parser!(u64))
                .help("Seed for the train/test shuffle.")
                .value_hint(ValueHint::Other),
        )
}
