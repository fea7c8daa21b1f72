use anyhow::{Context, Result};
use clap::{Arg, Command};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;
use ulog_pipeline::{
    expand_inputs, NormalizationPolicy, Pipeline, PipelineConfig, Ulog2CsvExtractor,
};

fn build_command() -> Command {
    Command::new("ulog_pipeline")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Batch ETL for PX4 ULog flight logs: extract topics, align timelines, render a chart and a styled report per log.")
        .arg(
            Arg::new("inputs")
                .help(".ulg files, directories (searched recursively), or glob patterns")
                .required(false)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for output files (default: same as each input file)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("shared-epoch")
                .long("shared-epoch")
                .help("Rebase all topics against the earliest sample across topics instead of each topic's own start")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("extractor")
                .long("extractor")
                .help("Decoder program used to extract topics from a log")
                .value_name("PROG")
                .default_value("ulog2csv"),
        )
        .arg(
            Arg::new("timeout-secs")
                .long("timeout-secs")
                .help("Per-file decoder timeout in seconds")
                .value_name("SECS")
                .value_parser(clap::value_parser!(u64))
                .default_value("120"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output and detailed processing information")
                .action(clap::ArgAction::SetTrue),
        )
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();

    let debug = matches.get_flag("debug");
    env_logger::Builder::from_default_env()
        .filter_level(if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init();

    let inputs: Vec<String> = match matches.get_many::<String>("inputs") {
        Some(values) => values.cloned().collect(),
        None => {
            build_command().print_help()?;
            println!();
            return Ok(());
        }
    };

    let files = expand_inputs(&inputs).context("expanding input paths")?;
    if files.is_empty() {
        eprintln!("Error: no .ulg files found in the specified inputs.");
        std::process::exit(1);
    }

    let config = PipelineConfig {
        normalization: if matches.get_flag("shared-epoch") {
            NormalizationPolicy::SharedEpoch
        } else {
            NormalizationPolicy::PerTopic
        },
        output_dir: matches
            .get_one::<String>("output-dir")
            .map(PathBuf::from),
        ..PipelineConfig::default()
    };

    let program = matches
        .get_one::<String>("extractor")
        .cloned()
        .unwrap_or_else(|| "ulog2csv".to_string());
    let timeout = matches.get_one::<u64>("timeout-secs").copied().unwrap_or(120);
    let extractor = Ulog2CsvExtractor::new(program, Duration::from_secs(timeout));

    let pipeline = Pipeline::new(config);
    let summary = pipeline.run_batch(&extractor, &files);

    println!();
    println!(
        "Processed {} of {} file(s), {} failure(s)",
        summary.processed.len(),
        summary.total(),
        summary.failures.len()
    );

    if summary.processed.is_empty() {
        eprintln!(
            "Error: no files were successfully processed out of {} file(s) found.",
            files.len()
        );
        eprintln!("Use --debug for more detailed error information.");
        std::process::exit(1);
    }

    Ok(())
}
