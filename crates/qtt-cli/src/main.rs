//! qtt Command-Line Interface
//!
//! Transpile circuits for a device from the shell: repeated seeded
//! transpilation, noise-aware re-layout and dynamical decoupling.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, cost, transpile, version};

/// qtt - best-of-N transpilation with re-layout and dynamical decoupling
#[derive(Parser)]
#[command(name = "qtt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transpile one circuit or a batch of circuits for a backend
    Transpile {
        /// Input file: a JSON circuit object or an array of them
        #[arg(short, long)]
        input: String,

        /// Built-in backend name, or a JSON/YAML backend description
        #[arg(short, long, env = "QTT_BACKEND", default_value = "fake_lagos")]
        backend: String,

        /// Options file (YAML or JSON); flags override its values
        #[arg(short, long, env = "QTT_CONFIG")]
        config: Option<String>,

        /// Optimization level (0-3)
        #[arg(short = 'O', long)]
        optimization_level: Option<u8>,

        /// Transpilation attempts per circuit
        #[arg(short = 'n', long)]
        num_transpilations: Option<usize>,

        /// Seed of each attempt, in order (repeat the flag)
        #[arg(long = "seed")]
        seeds: Vec<u64>,

        /// Re-lay the result out onto the lowest-error qubits
        #[arg(long)]
        mapomatic: bool,

        /// Pad idle windows with X-X dynamical decoupling
        #[arg(long)]
        dd: bool,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the weighted depth + CX cost of circuits
    Cost {
        /// Input file: a JSON circuit object or an array of them
        #[arg(short, long)]
        input: String,

        /// Weight of the circuit depth
        #[arg(long, default_value = "1.0")]
        weight_depth: f64,

        /// Weight of each CX gate
        #[arg(long, default_value = "20.0")]
        weight_cnot: f64,
    },

    /// List built-in backends
    Backends,

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Transpile {
            input,
            backend,
            config,
            optimization_level,
            num_transpilations,
            seeds,
            mapomatic,
            dd,
            output,
        } => {
            let request = transpile::Request {
                input,
                backend,
                config,
                optimization_level,
                num_transpilations,
                seeds,
                mapomatic,
                dd,
                output,
            };
            transpile::execute(&request)
        }

        Commands::Cost {
            input,
            weight_depth,
            weight_cnot,
        } => cost::execute(&input, weight_depth, weight_cnot),

        Commands::Backends => backends::execute(),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
