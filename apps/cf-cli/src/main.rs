use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use cf_project::{CellDef, ExperimentDef, build_cell, build_experiment, load_cell, load_experiment};
use cf_spm::{RunOptions, Simulation};

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "cellflow CLI - battery cell simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate cell and experiment file syntax and contents
    Validate {
        /// Path to the cell YAML file (built-in template if omitted)
        #[arg(long)]
        cell: Option<PathBuf>,
        /// Path to the experiment YAML file (built-in template if omitted)
        #[arg(long)]
        experiment: Option<PathBuf>,
    },
    /// Run an experiment and report the result
    Run {
        /// Path to the cell YAML file (built-in template if omitted)
        #[arg(long)]
        cell: Option<PathBuf>,
        /// Path to the experiment YAML file (built-in template if omitted)
        #[arg(long)]
        experiment: Option<PathBuf>,
        /// Write the solved trajectory as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Use dense Jacobian assembly instead of banded
        #[arg(long)]
        dense: bool,
        /// Re-evaluate the governing balances after the run
        #[arg(long)]
        verify: bool,
    },
    /// Probe the residual Jacobian bandwidth and sparsity
    Bandwidth {
        /// Path to the cell YAML file (built-in template if omitted)
        #[arg(long)]
        cell: Option<PathBuf>,
    },
    /// Print a built-in configuration template to stdout
    Template {
        #[arg(value_enum)]
        kind: TemplateKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TemplateKind {
    Cell,
    Experiment,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("{0}")]
    Project(#[from] cf_project::ProjectError),
    #[error("{0}")]
    Spm(#[from] cf_spm::SpmError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { cell, experiment } => cmd_validate(cell.as_deref(), experiment.as_deref()),
        Commands::Run {
            cell,
            experiment,
            output,
            dense,
            verify,
        } => cmd_run(cell.as_deref(), experiment.as_deref(), output.as_deref(), dense, verify),
        Commands::Bandwidth { cell } => cmd_bandwidth(cell.as_deref()),
        Commands::Template { kind } => cmd_template(kind),
    }
}

fn cell_def(path: Option<&Path>) -> Result<CellDef, CliError> {
    Ok(match path {
        Some(p) => load_cell(p)?,
        None => CellDef::default(),
    })
}

fn experiment_def(path: Option<&Path>) -> Result<ExperimentDef, CliError> {
    Ok(match path {
        Some(p) => load_experiment(p)?,
        None => ExperimentDef::default(),
    })
}

fn cmd_validate(cell: Option<&Path>, experiment: Option<&Path>) -> Result<(), CliError> {
    let cell = cell_def(cell)?;
    let exp = experiment_def(experiment)?;
    build_cell(&cell)?;
    build_experiment(&exp)?;
    println!("ok: cell '{}' and experiment '{}' are valid", cell.name, exp.mode);
    Ok(())
}

fn cmd_run(
    cell: Option<&Path>,
    experiment: Option<&Path>,
    output: Option<&Path>,
    dense: bool,
    verify: bool,
) -> Result<(), CliError> {
    let cell = cell_def(cell)?;
    let exp_def = experiment_def(experiment)?;

    let sim = Simulation::new(build_cell(&cell)?)?;
    let exp = build_experiment(&exp_def)?;

    let opts = RunOptions {
        banded: !dense,
        ..RunOptions::default()
    };

    tracing::info!(cell = %cell.name, mode = %exp_def.mode, "starting run");
    let mut sol = sim.run(&exp, &opts)?;

    println!("{}", sol.report());
    println!(
        "steps = {}, rejected = {}, residual evals = {}, jacobians = {}",
        sol.stats.steps, sol.stats.rejected, sol.stats.residual_evals, sol.stats.jacobian_evals
    );

    if verify {
        let ok = sol.verify();
        println!("verify: {}", if ok { "pass" } else { "FAIL" });
    }

    if let Some(path) = output {
        write_csv(path, &mut sol)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_bandwidth(cell: Option<&Path>) -> Result<(), CliError> {
    let cell = cell_def(cell)?;
    let sim = Simulation::new(build_cell(&cell)?)?;
    let bw = sim.j_pattern();
    let n = sim.layout.len();
    println!("state size     = {n}");
    println!("lower bandwidth = {}", bw.lower);
    println!("upper bandwidth = {}", bw.upper);
    println!("nonzeros        = {} of {}", bw.nnz(), n * n);
    Ok(())
}

fn cmd_template(kind: TemplateKind) -> Result<(), CliError> {
    let text = match kind {
        TemplateKind::Cell => serde_yaml::to_string(&CellDef::default())?,
        TemplateKind::Experiment => serde_yaml::to_string(&ExperimentDef::default())?,
    };
    print!("{text}");
    Ok(())
}

fn write_csv(path: &Path, sol: &mut cf_spm::Solution) -> Result<(), CliError> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "t_s,voltage_v,current_a,current_c,power_w")?;
    let post = sol.post();
    for ev in &post.events {
        writeln!(
            file,
            "{},{},{},{},{}",
            ev.time_s, ev.voltage_v, ev.current_a, ev.current_c, ev.power_w
        )?;
    }
    Ok(())
}
