use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use footprint_moo::config::load_config;
use footprint_moo::evaluator::LayoutEvaluator;
use footprint_moo::optimizers::nsga2::NSGA2Optimizer;
use footprint_moo::optimizers::Optimizer;
use footprint_moo::plot::plot_arrangement;
use footprint_moo::report::{build_arrangements, save_arrangements, summary_table, Arrangement, OptimizationResults};
use footprint_moo::solution::{LayoutOptimizerParams, SolutionsRuntimeLayoutProcessor};
use footprint_moo::termination::{MaxGenerations, NoImprovementTermination, Termination};
use footprint_moo::{LayoutError, Ratio, Result};

#[derive(Parser)]
#[command(name = "footprint-moo")]
#[command(about = "Search building layouts minimizing bounding area and path length")]
#[command(version)]
struct Cli {
    /// Problem configuration (JSON)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Directory receiving results and plots
    #[arg(short, long, default_value = "Results")]
    output: PathBuf,

    /// Population size, overrides the configuration
    #[arg(long)]
    population: Option<usize>,

    /// Number of generations, overrides the configuration
    #[arg(long)]
    generations: Option<usize>,

    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Skip rendering arrangement plots
    #[arg(long)]
    no_plots: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(population) = cli.population {
        config.optimizer.population_size = population;
    }
    if let Some(generations) = cli.generations {
        config.optimizer.generations = generations;
    }
    if cli.seed.is_some() {
        config.optimizer.seed = cli.seed;
    }

    let settings = config.optimizer.clone();
    let problem = Arc::new(config.to_problem()?);

    info!(
        buildings = problem.n_rectangles(),
        paths = problem.connections().len(),
        population = settings.population_size,
        generations = settings.generations,
        "problem loaded"
    );

    let mut evaluator = LayoutEvaluator::new(problem.clone());
    if let Some(workers) = settings.workers {
        evaluator = evaluator.with_workers(workers);
    }

    let params = LayoutOptimizerParams::new(settings.population_size, Ratio(1, 2), Ratio(3, 10), Box::new(evaluator.clone()));
    let mut optimizer = NSGA2Optimizer::new(params, settings.seed);
    let mut processor = SolutionsRuntimeLayoutProcessor::new(Box::new(evaluator));

    let mut termination: Box<dyn Termination> = match settings.stall_generations {
        Some(stall) => Box::new(NoImprovementTermination::new(stall, settings.generations)),
        None => Box::new(MaxGenerations(settings.generations)),
    };

    optimizer.optimize(termination.as_mut(), &mut processor)?;

    let best_solutions = optimizer.best_solutions();
    info!(evaluations = processor.n_eval(), solutions = best_solutions.len(), "optimization finished");

    std::fs::create_dir_all(&cli.output)?;

    let results = OptimizationResults::from_solutions(optimizer.name(), &best_solutions);
    let results_path = cli.output.join("optimization_results.json");
    results.save(&results_path)?;
    info!("Optimization results saved to {}.", results_path.display());

    let arrangements = build_arrangements(&problem, &results)?;
    let arrangements_path = cli.output.join("arrangement_results.json");
    save_arrangements(&arrangements, &arrangements_path)?;
    info!("Arrangement results saved to {}.", arrangements_path.display());

    println!("{}", summary_table(&arrangements));

    if !cli.no_plots {
        let plots_dir = cli.output.join("plots");
        std::fs::create_dir_all(&plots_dir)?;

        plot_all(arrangements, plots_dir.clone())?;
        info!("Plots saved to {}", plots_dir.display());
    }

    Ok(())
}

/// Render every arrangement on the blocking pool of a tokio runtime
fn plot_all(arrangements: Vec<Arrangement>, plots_dir: PathBuf) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread().build()?;

    runtime.block_on(async move {
        let mut tasks = vec![];

        for arrangement in arrangements {
            let path = plots_dir.join(format!("arrangement_{}.svg", arrangement.arrangement_id));

            tasks.push(tokio::task::spawn_blocking(move || plot_arrangement(&arrangement, &path)));
        }

        for task in tasks {
            task.await.map_err(|e| LayoutError::Plot(e.to_string()))??;
        }

        Ok(())
    })
}
