use std::process::ExitCode;

use codec_bench::harness::{
    config, generate_sample_text, load_file, render_table, render_verification, run_benchmark,
    BenchmarkConfig, BenchmarkOutcome, Dataset,
};
use codec_bench::Result;

static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let args = record.args();

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}): {}", target, args),
                log::Level::Warn => eprintln!("Warning (in {}): {}", target, args),
                log::Level::Info => eprintln!("Info (in {}): {}", target, args),
                log::Level::Debug => eprintln!("Debug (in {}): {}", target, args),
                log::Level::Trace => eprintln!("Trace (in {}): {}", target, args),
            }
        }
    }

    fn flush(&self) {}
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match BenchmarkConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run with --help for usage");
            return ExitCode::FAILURE;
        }
    };
    if config.help {
        config::print_help();
        return ExitCode::SUCCESS;
    }

    if let Ok(()) = log::set_logger(&LOGGER) {
        log::set_max_level(if config.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        });
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &BenchmarkConfig) -> Result<()> {
    config.print();

    let dataset = match &config.input_file {
        Some(path) => load_file(path, config.mode)?,
        None => Dataset::Text(generate_sample_text(config.seed, config.sample_len)),
    };

    let outcome = match &dataset {
        Dataset::Text(text) => {
            let symbols: Vec<char> = text.chars().collect();
            run_benchmark(config, &symbols)?
        }
        Dataset::Binary(bytes) => run_benchmark(config, bytes)?,
    };

    print_outcome(&dataset, &outcome);
    Ok(())
}

fn print_outcome(dataset: &Dataset, outcome: &BenchmarkOutcome) {
    println!("=== Results ===");
    println!(
        "Input: {} symbols, entropy {:.3} bits/symbol",
        dataset.len(),
        outcome.entropy
    );
    println!("{}", render_table(&outcome.results));
    for result in &outcome.results {
        if let Some(path) = &result.artifact {
            println!("{} artifact: {}", result.algorithm, path.display());
        }
    }

    if !outcome.verifications.is_empty() {
        println!();
        println!("=== Round trip ===");
        println!("{}", render_verification(&outcome.verifications));
    }
}
