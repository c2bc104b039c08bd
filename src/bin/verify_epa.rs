//! EPA verification binary.
//!
//! Usage:
//!   cargo run --release --bin verify_epa -- [OPTIONS]
//!
//! Options:
//!   --config <FILE>      Solver configuration JSON file (optional)
//!   --matrix <FILE>      Solve a single matrix from a text file and exit
//!   --random <N>         Number of random games to add (default: 200)
//!   --size <MxN>         Shape of the random games (default: 4x4)
//!   --seed <N>           Random seed (optional)
//!   --tolerance <X>      Match tolerance (default: 1e-6)
//!   --threads <N>        Number of threads (default: auto)
//!   --sequential         Run the batch on one thread
//!   --no-blotto          Skip the Colonel Blotto games
//!   --output <FILE>      Report file (default: epa_report.json)

use std::env;
use std::process;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use epa_solver::games::{blotto_cases, known_cases, random_cases, BLOTTO_GAMES};
use epa_solver::solver::{CaseOutcome, EpaSolver, ReferenceSolver};
use epa_solver::{PayoffMatrix, SolverConfig, TestCase, VerificationHarness};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let mut config_file: Option<String> = None;
    let mut matrix_file: Option<String> = None;
    let mut random_count: usize = 200;
    let mut size = (4usize, 4usize);
    let mut seed: Option<u64> = None;
    let mut tolerance: Option<f64> = None;
    let mut threads: usize = 0;
    let mut sequential = false;
    let mut include_blotto = true;
    let mut output_file = "epa_report.json".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            }
            "--matrix" | "-m" => {
                i += 1;
                if i < args.len() {
                    matrix_file = Some(args[i].clone());
                }
            }
            "--random" | "-r" => {
                i += 1;
                if i < args.len() {
                    random_count = args[i].parse().unwrap_or(random_count);
                }
            }
            "--size" => {
                i += 1;
                if i < args.len() {
                    match parse_size(&args[i]) {
                        Some(s) => size = s,
                        None => {
                            eprintln!("Invalid size '{}', expected e.g. 4x5", args[i]);
                            process::exit(2);
                        }
                    }
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            }
            "--tolerance" => {
                i += 1;
                if i < args.len() {
                    tolerance = args[i].parse().ok();
                }
            }
            "--threads" | "-t" => {
                i += 1;
                if i < args.len() {
                    threads = args[i].parse().unwrap_or(0);
                }
            }
            "--sequential" => {
                sequential = true;
            }
            "--no-blotto" => {
                include_blotto = false;
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = args[i].clone();
                }
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                process::exit(2);
            }
        }
        i += 1;
    }

    // Load or create configuration
    let mut config = match &config_file {
        Some(path) => match SolverConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                process::exit(1);
            }
        },
        None => SolverConfig::default(),
    };
    if let Some(t) = tolerance {
        config = config.with_tolerance(t);
    }
    if let Some(s) = seed {
        config = config.with_seed(s);
    }
    if threads > 0 {
        config = config.with_threads(threads);
    }
    if sequential {
        config = config.with_parallel(false);
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        process::exit(1);
    }

    if let Some(path) = matrix_file {
        solve_single(&path, &config);
        return;
    }

    println!("=================================================");
    println!("  EPA vs Nash Verification");
    println!("=================================================");
    println!();

    let built = known_cases().and_then(|mut known| {
        if include_blotto {
            let games: Vec<_> = BLOTTO_GAMES.iter().map(|(game, _)| *game).collect();
            known.extend(blotto_cases(&games)?);
        }
        known.extend(random_cases(random_count, size.0, size.1, config.seed)?);
        Ok(known)
    });
    let cases: Vec<TestCase> = match built {
        Ok(cases) => cases,
        Err(e) => {
            eprintln!("Error building corpus: {}", e);
            process::exit(1);
        }
    };

    println!("Cases: {} ({} random {}x{})", cases.len(), random_count, size.0, size.1);
    println!("Tolerance: {:e}", config.tolerance);
    println!(
        "Threads: {}",
        match (config.parallel, config.num_threads) {
            (false, _) => "1".to_string(),
            (true, Some(n)) => n.to_string(),
            (true, None) => "auto".to_string(),
        }
    );
    if let Some(s) = config.seed {
        println!("Seed: {}", s);
    }
    println!("Output: {}", output_file);
    println!();

    let progress = ProgressBar::new(cases.len() as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        progress.set_style(style.progress_chars("#>-"));
    }

    let harness = match VerificationHarness::new(config) {
        Ok(harness) => harness,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };
    let report = harness.run_batch_with_callback(&cases, |_| progress.inc(1));
    progress.finish_and_clear();

    println!(
        "{:<28} {:>7} {:>12} {:>12} {:>10}  {}",
        "case", "shape", "EPA", "Nash", "|diff|", "status"
    );
    println!("{}", "-".repeat(82));
    for record in &report.records {
        let shape = format!("{}x{}", record.shape.0, record.shape.1);
        match &record.outcome {
            CaseOutcome::Compared(c) => println!(
                "{:<28} {:>7} {:>12.6} {:>12.6} {:>10.2e}  {}",
                record.name,
                shape,
                c.epa_value,
                c.nash_value,
                c.absolute_difference,
                if c.matched { "ok" } else { "MISMATCH" }
            ),
            CaseOutcome::Failed(f) => {
                println!("{:<28} {:>7} {:>49}  {}", record.name, shape, "", f.kind)
            }
        }
    }
    println!();

    let stats = &report.stats;
    println!("=== Summary ===");
    println!("Compared: {} / {}", stats.compared, stats.cases);
    println!("Matched: {}", stats.matched);
    println!("Mismatched: {}", stats.mismatched);
    println!("Failed: {}", stats.failed);
    println!("Max |EPA - Nash|: {:.3e}", stats.max_difference);
    println!(
        "Total time: {:.2}s ({:.0} cases/s)",
        stats.elapsed_seconds, stats.cases_per_second
    );

    let counterexamples = report.counterexamples();
    if !counterexamples.is_empty() {
        println!();
        println!("=== Counterexamples ===");
        for record in counterexamples {
            if let Some(c) = record.comparison() {
                if let Err(violation) = c.check() {
                    println!("{}: {}", record.name, violation);
                }
            }
            if let Some(case) = cases.iter().find(|case| case.name == record.name) {
                println!("{}", case.matrix);
            }
        }
    }

    for record in report.failures() {
        if let CaseOutcome::Failed(f) = &record.outcome {
            eprintln!("{}: {}", record.name, f.message);
        }
    }

    println!();
    match report.save_json(&output_file) {
        Ok(_) => println!("Saved report: {}", output_file),
        Err(e) => eprintln!("Error saving report: {}", e),
    }
    info!("verification finished");
}

fn solve_single(path: &str, config: &SolverConfig) {
    let matrix = match PayoffMatrix::from_text_file(path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error reading matrix: {}", e);
            process::exit(1);
        }
    };

    println!("Matrix ({}x{}):", matrix.num_rows(), matrix.num_columns());
    println!("{}", matrix);

    let epa = match EpaSolver::from_config(config).solve_detailed(&matrix) {
        Ok(solution) => solution,
        Err(e) => {
            eprintln!("EPA failed: {}", e);
            process::exit(1);
        }
    };
    let nash = match ReferenceSolver::from_config(config).solve_nash(&matrix) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Nash failed: {}", e);
            process::exit(1);
        }
    };

    let (rows, columns) = epa.index_map.reduced_shape();
    println!("Reduced to {}x{} after {} passes", rows, columns, epa.passes);
    println!("  rows kept:    {:?}", epa.index_map.rows());
    println!("  columns kept: {:?}", epa.index_map.columns());
    println!();
    println!("EPA value:  {:.9}", epa.value());
    println!("  row:      {:?}", epa.result.row_strategy.as_slice());
    println!("  column:   {:?}", epa.result.column_strategy.as_slice());
    println!("Nash value: {:.9}", nash.value);
    println!("  row:      {:?}", nash.row_strategy.as_slice());
    println!("  column:   {:?}", nash.column_strategy.as_slice());

    let difference = (epa.value() - nash.value).abs();
    println!();
    if difference <= config.tolerance {
        println!("Match (|diff| = {:.3e})", difference);
    } else {
        println!("MISMATCH (|diff| = {:.3e})", difference);
    }
}

fn parse_size(s: &str) -> Option<(usize, usize)> {
    let (m, n) = s.split_once(|c| c == 'x' || c == 'X')?;
    let m: usize = m.trim().parse().ok()?;
    let n: usize = n.trim().parse().ok()?;
    (m > 0 && n > 0).then_some((m, n))
}

fn print_help() {
    println!("EPA vs Nash Verification");
    println!();
    println!("Usage: verify_epa [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <FILE>      Solver configuration JSON file");
    println!("  -m, --matrix <FILE>      Solve one matrix from a text file and exit");
    println!("  -r, --random <N>         Random games to add (default: 200)");
    println!("  --size <MxN>             Shape of the random games (default: 4x4)");
    println!("  -s, --seed <N>           Random seed");
    println!("  --tolerance <X>          Match tolerance (default: 1e-6)");
    println!("  -t, --threads <N>        Number of threads (default: auto)");
    println!("  --sequential             Run the batch on one thread");
    println!("  --no-blotto              Skip the Colonel Blotto games");
    println!("  -o, --output <FILE>      Report file (default: epa_report.json)");
    println!("  -h, --help               Show this help");
    println!();
    println!("Examples:");
    println!("  # Known games plus 1000 seeded random 5x5 games");
    println!("  verify_epa --random 1000 --size 5x5 --seed 42");
    println!();
    println!("  # One matrix from a file");
    println!("  verify_epa --matrix game.txt");
}
