use cache_simulator::generator::{ScriptConfig, ScriptGenerator};
use cache_simulator::input::ScriptReader;
use cache_simulator::models::SimulationConfig;
use cache_simulator::runner::{self, SimulationRunner};
use cache_simulator::stats::SimulationStats;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// probe-lru simulator CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Subcommands for the CLI
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the 4-entry walkthrough and print the cache after each step
    Demo,

    /// Replay a script, cross-checking every result against the lru crate
    Replay {
        /// Script file (`put,k,v` / `get,k` / `remove,k` lines)
        #[arg(short, long, value_name = "PATH")]
        script: PathBuf,

        /// Cache capacity (number of entries)
        #[arg(short, long, default_value = "4")]
        capacity: usize,

        /// Index slots; defaults to twice the capacity
        #[arg(short, long)]
        table_size: Option<usize>,

        /// Print every operation and the resulting cache state
        #[arg(long)]
        trace: bool,
    },

    /// Generate a random workload script
    Generate {
        /// Output file
        #[arg(short, long, default_value = "ops.csv")]
        output: PathBuf,

        /// Number of operations
        #[arg(long, default_value = "100000")]
        count: usize,

        /// Number of distinct keys
        #[arg(long, default_value = "10000")]
        keys: u32,

        /// Percentage of keys that are popular
        #[arg(long, default_value = "20", value_parser = clap::value_parser!(u8).range(0..=100))]
        hot_keys: u8,

        /// Percentage of traffic that targets popular keys
        #[arg(long, default_value = "80", value_parser = clap::value_parser!(u8).range(0..=100))]
        hot_traffic: u8,

        /// Percentage of operations that are puts
        #[arg(long, default_value = "30", value_parser = clap::value_parser!(u8).range(0..=100))]
        put_ratio: u8,

        /// Percentage of operations that are removes
        #[arg(long, default_value = "5", value_parser = clap::value_parser!(u8).range(0..=100))]
        remove_ratio: u8,

        /// Seed for a reproducible script
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a workload at one or more table sizes and report statistics
    Simulate {
        /// Script file; a seeded workload is generated when omitted
        #[arg(short, long, value_name = "PATH")]
        script: Option<PathBuf>,

        /// Cache capacity (number of entries)
        #[arg(short, long, default_value = "1000")]
        capacity: usize,

        /// Index slot counts to compare; defaults to twice the capacity
        #[arg(short, long, value_name = "SIZES", num_args = 1.., value_delimiter = ',')]
        table_sizes: Option<Vec<usize>>,

        /// Use the scrambling hasher instead of key mod table_size
        #[arg(long)]
        scrambled: bool,

        /// Seed for the generated workload
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Export results to CSV file
        #[arg(long, value_name = "PATH")]
        output_csv: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match args.command.unwrap_or(Commands::Demo) {
        Commands::Demo => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            runner::run_demo(&mut out)?;
            Ok(())
        }

        Commands::Replay {
            script,
            capacity,
            table_size,
            trace,
        } => {
            let runner = SimulationRunner::new(SimulationConfig {
                capacity,
                table_size,
                scrambled: false,
            });
            let ops = ScriptReader::open(&script)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let result = if trace {
                runner.run_traced(ops, Some(&mut out as &mut dyn Write))?
            } else {
                runner.run(ops)?
            };
            println!(
                "Replayed {} operations: {} hits, {} misses, {} evictions, {} live entries",
                result.total_ops, result.hits, result.misses, result.evictions, result.final_len
            );
            check_divergences(result.divergences)
        }

        Commands::Generate {
            output,
            count,
            keys,
            hot_keys,
            hot_traffic,
            put_ratio,
            remove_ratio,
            seed,
        } => {
            let config = ScriptConfig {
                ops: count,
                keys,
                hot_keys_percent: hot_keys,
                hot_traffic_percent: hot_traffic,
                put_percent: put_ratio,
                remove_percent: remove_ratio,
                seed,
            };
            ScriptGenerator::new(config).write_file(&output)?;
            Ok(())
        }

        Commands::Simulate {
            script,
            capacity,
            table_sizes,
            scrambled,
            seed,
            output_csv,
        } => {
            let table_sizes: Vec<Option<usize>> = match table_sizes {
                Some(sizes) if !sizes.is_empty() => sizes.into_iter().map(Some).collect(),
                _ => vec![None],
            };

            println!("Cache Simulation");
            println!("===============");
            match &script {
                Some(path) => println!("Script: {}", path.display()),
                None => println!("Script: generated (seed {seed})"),
            }
            println!("Cache capacity: {capacity} entries");
            println!(
                "Hasher: {}",
                if scrambled { "scrambled" } else { "identity" }
            );

            let mut stats = SimulationStats::new();
            for table_size in table_sizes {
                let runner = SimulationRunner::new(SimulationConfig {
                    capacity,
                    table_size,
                    scrambled,
                });
                let result = match &script {
                    Some(path) => runner.run(ScriptReader::open(path)?)?,
                    None => {
                        let ops = ScriptGenerator::new(ScriptConfig {
                            seed: Some(seed),
                            ..Default::default()
                        })
                        .generate();
                        runner.run(ops.into_iter().map(Ok))?
                    }
                };
                info!(
                    table_size = result.table_size,
                    duration = ?result.duration,
                    "run completed"
                );
                stats.record(result);
            }

            stats.print_summary();

            if let Some(csv_path) = output_csv {
                match stats.export_csv(&csv_path) {
                    Ok(()) => println!("\nResults exported to: {}", csv_path.display()),
                    Err(e) => error!("failed to export CSV: {e}"),
                }
            }

            check_divergences(stats.divergences())
        }
    }
}

/// Fails the run if the cache disagreed with the reference model
fn check_divergences(divergences: usize) -> Result<(), Box<dyn std::error::Error>> {
    if divergences > 0 {
        error!(divergences, "cache results diverged from the lru reference");
        return Err(format!("{divergences} divergences from the reference cache").into());
    }
    Ok(())
}
