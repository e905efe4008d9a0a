use anyhow::Result;
use clap::{ArgMatches, Command};
use log::LevelFilter;
use std::path::PathBuf;

use machinelearner::Registry;
use machinelearner_cli::run::{self, input::RunConfig, runner};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("MACHINELEARNER_LOG", "error,machinelearner=info"))
        .init();

    let matches = Command::new("machinelearner")
        .version(clap::crate_version!())
        .author("Justin Sing <justincsing@gmail.com>")
        .about("Fit, predict and score estimators resolved by name")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("List the namespaces and models in search order"),
        )
        .subcommand(run::command())
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("list", _)) => handle_list(),
        Some(("run", sub_m)) => handle_run(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_list() -> Result<()> {
    let registry = Registry::global();
    for namespace in registry.namespaces() {
        let models: Vec<&str> = namespace.model_names().collect();
        if models.is_empty() {
            println!("{}: (empty)", namespace.name());
        } else {
            println!("{}: {}", namespace.name(), models.join(", "));
        }
    }
    for collision in registry.collisions() {
        println!(
            "warning: '{}' is defined in {:?}; the first one wins",
            collision.model, collision.namespaces
        );
    }
    Ok(())
}

fn handle_run(matches: &ArgMatches) -> Result<()> {
    let config_path: &PathBuf = matches
        .get_one("config")
        .ok_or_else(|| anyhow::anyhow!("A configuration file is required"))?;
    log::info!("[machinelearner::run] Using config: {:?}", config_path);

    let config = RunConfig::from_arguments(config_path, matches)?;

    match runner::run(&config) {
        Ok(summary) => {
            eprintln!(
                "[machinelearner::run] {} ({}) fitted on {} rows, predicted {} rows{}",
                summary.model,
                summary.namespace,
                summary.n_train,
                summary.n_test,
                summary
                    .score
                    .map(|s| format!(", score {:.4}", s))
                    .unwrap_or_default()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Run failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
