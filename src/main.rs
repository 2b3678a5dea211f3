use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use rush_hour_gen::config::AppConfig;
use rush_hour_gen::generator::Generator;
use rush_hour_gen::level::{Level, LevelFile};
use rush_hour_gen::solver::{shortest_path_len, DEFAULT_MAX_DEPTH};
use rush_hour_gen::{solve_with, Outcome, SearchLimits};

/// Generate Rush Hour levels of a given difficulty and check existing ones.
#[derive(Parser)]
#[command(name = "rush-hour-gen", about = "Generate and solve Rush Hour levels")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate levels that need at least a given number of moves
    Generate {
        /// Number of levels to generate
        #[arg(long, default_value_t = 5)]
        count: usize,

        /// Minimum moves required (overrides the config file)
        #[arg(long)]
        difficulty: Option<usize>,

        /// Output file
        #[arg(long, default_value = "new_levels.json")]
        output: PathBuf,

        /// Seed for reproducible levels
        #[arg(long)]
        seed: Option<u64>,

        /// Path to TOML configuration file
        #[arg(long, default_value = "generator.toml")]
        config: PathBuf,
    },
    /// Solve every level in a levels file
    Solve {
        file: PathBuf,

        /// Stop expanding boards this many moves from the start
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Confirm each result with an independent uncapped search
        #[arg(long)]
        cross_check: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Generate {
            count,
            difficulty,
            output,
            seed,
            config,
        } => generate(count, difficulty, &output, seed, &config),
        Command::Solve {
            file,
            max_depth,
            cross_check,
        } => solve_file(&file, max_depth, cross_check),
    }
}

fn generate(
    count: usize,
    difficulty: Option<usize>,
    output: &Path,
    seed: Option<u64>,
    config: &Path,
) -> Result<()> {
    let mut app_config = AppConfig::load_or_default(config)
        .with_context(|| format!("loading config from {}", config.display()))?;
    if let Some(difficulty) = difficulty {
        app_config.generator.min_moves = difficulty;
    }

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut generator =
        Generator::new(app_config.generator, rng).context("invalid generator settings")?;

    info!(
        "generating {} levels with minimum {} moves...",
        count,
        generator.config().min_moves
    );

    let mut file = LevelFile::default();
    for i in 1..=count {
        info!("generating level {i}...");
        match generator.generate() {
            Some(level) => {
                info!("level {i} is solvable in {} moves", level.min_moves);
                file.levels.push(Level::from_generated(&level, i));
            }
            None => warn!("could not generate level {i} within the attempt limit"),
        }
    }

    file.save(output)?;
    info!("saved {} levels to {}", file.levels.len(), output.display());
    Ok(())
}

fn solve_file(path: &Path, max_depth: usize, cross_check: bool) -> Result<()> {
    let file = LevelFile::load(path)?;
    let limits = SearchLimits { max_depth };

    for level in &file.levels {
        let board = level.to_board()?;

        println!("---- level {}", level.id);
        println!("{}", board);
        println!("----");

        let solution = solve_with(&board, limits);
        match &solution.outcome {
            Outcome::Solved { moves, path } => {
                println!("Found a solution in {} moves:", moves);
                println!("{}", path.iter().join(" "));
                if *moves != level.min_moves {
                    warn!(
                        "level {} records {} moves but needs {}",
                        level.id, level.min_moves, moves
                    );
                }
            }
            Outcome::Unsolvable => println!("No solution found"),
            Outcome::DepthLimited => {
                println!("No solution within {} moves", limits.max_depth)
            }
        }
        println!(
            "Visited {} board positions (generated {} total).",
            solution.stats.expanded, solution.stats.generated
        );
        println!();

        if cross_check {
            let reference = shortest_path_len(&board);
            let agrees = match solution.outcome {
                Outcome::Solved { moves, .. } => reference == Some(moves),
                Outcome::Unsolvable => reference.is_none(),
                // the reference search has no ceiling, only a longer answer is consistent
                Outcome::DepthLimited => reference.map_or(true, |moves| moves > max_depth),
            };
            if !agrees {
                bail!(
                    "level {}: search found {:?} moves, reference search found {:?}",
                    level.id,
                    solution.min_moves(),
                    reference
                );
            }
        }
    }

    Ok(())
}
