use clap::{arg, ArgAction, Command};
use serde_json::json;
use siteopt::application::{best_outcome, outcome_to_dto, routes_to_solution, RoutesDto};
use siteopt::infrastructure::{logging, read_json, write_json, DatasetSource};
use siteopt::{evaluate_detailed, BackendKind, RunConfig, SolveRunner, SolverKind};
use std::path::PathBuf;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn cli() -> Command {
    Command::new("siteopt")
        .about("Routes manufacturing sub-operations to cities at minimum cost")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .arg(arg!(-v --verbose ... "Increase logging verbosity").global(true))
        .subcommand(
            Command::new("solve")
                .about("Solves a dataset with one or more solvers")
                .arg(arg!(<DATASET> "Path to a dataset json file, or an instance name like 5,10,10-0 or example"))
                .arg(
                    arg!(-c --config <PATH> "TOML run configuration")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-s --solver <NAME> "Solver to run (dp, greedy, random, mip, mip-per-operation); repeatable")
                        .required(false)
                        .action(ArgAction::Append)
                        .value_parser(clap::value_parser!(SolverKind)),
                )
                .arg(
                    arg!(--backend <NAME> "Integer-programming backend (auto, microlp, coin_cbc, highs)")
                        .required(false)
                        .value_parser(clap::value_parser!(BackendKind)),
                )
                .arg(
                    arg!(--"time-limit" <SECONDS> "Wall-clock budget per integer-programming model")
                        .required(false)
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(arg!(--parallel "Solve per-operation models in parallel"))
                .arg(
                    arg!(--seed <SEED> "Seed for the random solver")
                        .required(false)
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--coef <COEF> "Override the distances coefficient")
                        .required(false)
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(--"data-dir" <DIR> "Directory holding named instances")
                        .required(false)
                        .default_value("data")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-o --output <PATH> "Write the report here instead of stdout")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Computes the cost of a routing")
                .arg(arg!(<DATASET> "Path to a dataset json file, or an instance name like 5,10,10-0 or example"))
                .arg(
                    arg!(<SOLUTION> "Path to a json routing: operation -> sub-operation -> city")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--coef <COEF> "Override the distances coefficient")
                        .required(false)
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(--"data-dir" <DIR> "Directory holding named instances")
                        .required(false)
                        .default_value("data")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();
    logging::init(Some(logging::directive_for_verbosity(
        matches.get_count("verbose"),
    )));

    if let Err(e) = match matches.subcommand() {
        Some(("solve", sub_m)) => solve(sub_m),
        Some(("evaluate", sub_m)) => evaluate(sub_m),
        _ => Err("Invalid subcommand".into()),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn dataset_source(sub_m: &clap::ArgMatches) -> Result<DatasetSource, Box<dyn std::error::Error>> {
    let dataset = sub_m
        .get_one::<String>("DATASET")
        .ok_or("missing DATASET")?;
    let data_dir = sub_m
        .get_one::<PathBuf>("data-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("data"));
    Ok(DatasetSource::resolve(dataset, data_dir))
}

fn solve(sub_m: &clap::ArgMatches) -> CliResult {
    let mut config = match sub_m.get_one::<PathBuf>("config") {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::new(),
    };
    if let Some(solvers) = sub_m.get_many::<SolverKind>("solver") {
        config = config.with_solvers(solvers.copied().collect());
    }
    if let Some(&backend) = sub_m.get_one::<BackendKind>("backend") {
        config = config.with_backend(backend);
    }
    if let Some(&seconds) = sub_m.get_one::<f64>("time-limit") {
        config = config.with_time_limit_secs(seconds);
    }
    if sub_m.get_flag("parallel") {
        config = config.with_parallel(true);
    }
    if let Some(&seed) = sub_m.get_one::<u64>("seed") {
        config = config.with_random_seed(seed);
    }
    if let Some(&coef) = sub_m.get_one::<f64>("coef") {
        config = config.with_distances_coef(coef);
    }
    config.validate()?;

    let source = dataset_source(sub_m)?;
    let problem = source.load(config.distances_coef)?;
    let outcomes = SolveRunner::new(config).run(&problem);
    let best = best_outcome(&outcomes);

    let report = json!({
        "dataset": source.path(),
        "best": best.map(|i| outcomes[i].solver.to_string()),
        "results": outcomes
            .iter()
            .map(|outcome| outcome_to_dto(&problem, outcome))
            .collect::<Vec<_>>(),
    });
    write_json(sub_m.get_one::<PathBuf>("output").map(PathBuf::as_path), &report)?;

    match best {
        Some(_) => Ok(()),
        None => Err("no solver produced a feasible routing".into()),
    }
}

fn evaluate(sub_m: &clap::ArgMatches) -> CliResult {
    let problem = dataset_source(sub_m)?.load(sub_m.get_one::<f64>("coef").copied())?;
    let solution_path = sub_m
        .get_one::<PathBuf>("SOLUTION")
        .ok_or("missing SOLUTION")?;
    let routes: RoutesDto = read_json(solution_path)?;
    let solution = routes_to_solution(&problem, &routes)?;
    let cost = evaluate_detailed(&problem, &solution)?;

    write_json(
        None,
        &json!({
            "cost": cost.total(),
            "processing_cost": cost.processing,
            "logistics_cost": cost.logistics,
        }),
    )?;
    Ok(())
}
