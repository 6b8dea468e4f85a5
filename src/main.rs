//! autosplit - split scanned book spreads at the spine
//!
//! CLI entry point

use clap::{CommandFactory, Parser};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use book_autosplit::{
    expand_inputs, format_duration, log_filter, opening_path, output_path, Cli, CliProgress,
    CommonArgs, Commands, Config, ExitCode, JoinArgs, JoinOptions, JoinOutcome, JoinPipeline,
    PageHalf, PagePair, SplitArgs, SplitOptions, SplitPipeline,
};

fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        None => print_usage(None),
        Some(Commands::Split(args)) if args.inputs.is_empty() => print_usage(Some("split")),
        Some(Commands::Join(args)) if args.dirs.is_empty() => print_usage(Some("join")),
        Some(Commands::Split(args)) => run_split(&args),
        Some(Commands::Join(args)) => run_join(&args),
    };

    std::process::exit(code.code());
}

/// Print help for the whole tool or one subcommand
fn print_usage(subcommand: Option<&str>) -> ExitCode {
    let mut cmd = Cli::command();
    cmd.build();
    let printed = match subcommand {
        Some(name) => match cmd.find_subcommand_mut(name) {
            Some(sub) => sub.print_help(),
            None => cmd.print_help(),
        },
        None => cmd.print_help(),
    };
    if printed.is_err() {
        return ExitCode::GeneralError;
    }
    println!();
    ExitCode::Success
}

fn init_tracing(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the config file, falling back to defaults with a warning
fn load_config(common: &CommonArgs) -> Config {
    match Config::resolve(common.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config file: {}", e);
            Config::default()
        }
    }
}

fn print_json<T: Serialize>(report: &T) {
    match serde_json::to_string(report) {
        Ok(line) => println!("{}", line),
        Err(e) => eprintln!("Error: Failed to serialize report: {}", e),
    }
}

fn print_summary(total: usize, ok: usize, failed: usize, elapsed: std::time::Duration) {
    println!();
    println!("=== Summary ===");
    println!("  Total:     {}", total);
    println!("  Succeeded: {}", ok);
    if failed > 0 {
        println!("  Failed:    {}", failed);
    }
    println!("  Elapsed:   {}", format_duration(elapsed));
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "ENABLED"
    } else {
        "DISABLED"
    }
}

// ============ Split Command ============

fn run_split(args: &SplitArgs) -> ExitCode {
    init_tracing(args.common.verbose);
    let start_time = Instant::now();

    let options = load_config(&args.common).merge_with_cli(&args.overrides());

    let files = match expand_inputs(&args.inputs) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: Failed to read input directory: {}", e);
            return ExitCode::InputNotFound;
        }
    };
    if files.is_empty() {
        eprintln!("Error: No image files found in input paths");
        return ExitCode::InputNotFound;
    }

    if args.common.dry_run {
        print_split_plan(&files, &options);
        return ExitCode::Success;
    }

    let pipeline = SplitPipeline::new(options);
    let show_bar = !args.common.quiet && args.common.verbose == 0;
    let progress = CliProgress::new(files.len(), show_bar);
    let summary = pipeline.split_files(&files, &progress);
    progress.finish();

    if args.common.json {
        for report in &summary.reports {
            print_json(report);
        }
    } else if !args.common.quiet {
        for report in &summary.reports {
            for page in &report.outputs {
                println!("{} -> {}", report.source.display(), page.path.display());
            }
        }
        print_summary(
            files.len(),
            summary.reports.len(),
            summary.failures.len(),
            start_time.elapsed(),
        );
    }

    if summary.is_success() {
        ExitCode::Success
    } else {
        ExitCode::ProcessingError
    }
}

fn print_split_plan(files: &[PathBuf], options: &SplitOptions) {
    println!("=== Dry Run - Execution Plan ===");
    println!();
    println!("Split Configuration:");
    println!("  Rotate for vertical binding: {}", enabled(options.vertical));
    println!("  Border trim: {}", enabled(options.trim));
    println!("  Deskew: {}", enabled(options.deskew));
    match options.fixed_split_percent {
        Some(percent) => println!("  Cut: fixed at {}% of width", percent),
        None => println!("  Cut: darkest column, spine side {}", options.spine_side),
    }
    if options.line_only {
        println!("  Mode: draw cut line only");
    } else {
        println!("  Overlap margin: {}% of width", options.fudge_factor_percent);
    }
    println!();
    println!("Files to process: {}", files.len());
    for file in files {
        let outputs: Vec<String> = options
            .emitted_halves()
            .iter()
            .map(|half| output_path(file, half.suffix()).display().to_string())
            .collect();
        println!("  {} -> {}", file.display(), outputs.join(", "));
    }
}

// ============ Join Command ============

fn run_join(args: &JoinArgs) -> ExitCode {
    init_tracing(args.common.verbose);
    let start_time = Instant::now();

    let options = load_config(&args.common).merge_join_with_cli(&args.overrides());

    let mut exit = ExitCode::Success;
    let mut plans: Vec<(PathBuf, Vec<PagePair>)> = Vec::new();
    for dir in &args.dirs {
        if !dir.is_dir() {
            eprintln!("Error: Not a directory: {}", dir.display());
            exit = ExitCode::InputNotFound;
            continue;
        }
        match JoinPipeline::plan(dir) {
            Ok(pairs) => plans.push((dir.clone(), pairs)),
            Err(e) => {
                eprintln!("Error processing {}: {}", dir.display(), e);
                exit = ExitCode::from(&e);
            }
        }
    }

    if args.common.dry_run {
        print_join_plan(&plans, &options);
        return exit;
    }

    let total: usize = plans.iter().map(|(_, pairs)| pairs.len()).sum();
    let pipeline = JoinPipeline::new(options);
    let show_bar = !args.common.quiet && args.common.verbose == 0;
    let progress = CliProgress::new(total, show_bar);

    let mut ok_count = 0usize;
    let mut error_count = 0usize;
    for (_, pairs) in &plans {
        let summary = pipeline.process_pairs(pairs, &progress);
        ok_count += summary.reports.len();
        error_count += summary.failures.len();

        for outcome in &summary.reports {
            if args.common.json {
                print_json(outcome);
            } else if !args.common.quiet {
                match outcome {
                    JoinOutcome::Opening(report) => println!(
                        "{} + {} -> {}",
                        report.verso.display(),
                        report.recto.display(),
                        report.output.display()
                    ),
                    JoinOutcome::Unpaired(report) => {
                        for page in &report.outputs {
                            println!(
                                "{} (unpaired) -> {}",
                                report.source.display(),
                                page.path.display()
                            );
                        }
                    }
                }
            }
        }
    }
    progress.finish();

    if !args.common.quiet && !args.common.json {
        print_summary(total, ok_count, error_count, start_time.elapsed());
    }

    if error_count > 0 {
        ExitCode::ProcessingError
    } else {
        exit
    }
}

fn print_join_plan(plans: &[(PathBuf, Vec<PagePair>)], options: &JoinOptions) {
    println!("=== Dry Run - Execution Plan ===");
    println!();
    println!("Join Configuration:");
    if options.detect_verso {
        println!("  Verso cut: darkest column near the right edge");
    } else {
        println!("  Verso cut: fixed at {}% of width", options.verso_split_percent);
    }
    println!("  Recto cut: darkest column near the left edge");
    println!("  Border trim: {}", enabled(options.trim));
    println!("  Deskew: {}", enabled(options.deskew));

    for (dir, pairs) in plans {
        println!();
        println!("{}: {} opening(s)", dir.display(), pairs.len());
        for pair in pairs {
            match &pair.recto {
                Some(recto) => {
                    let output = opening_path(&output_path(&pair.verso, PageHalf::Left.suffix()));
                    println!(
                        "  {} + {} -> {}",
                        pair.verso.display(),
                        recto.display(),
                        output.display()
                    );
                }
                None => println!(
                    "  {} (unpaired) -> {}",
                    pair.verso.display(),
                    output_path(&pair.verso, PageHalf::Left.suffix()).display()
                ),
            }
        }
    }
}
