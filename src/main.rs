// Property Assessment Pipeline - Main executable
// Author: Gabriel Demetrios Lafis

use anyhow::{anyhow, Context, Result};
use clap::{App, Arg, ArgMatches};
use log::info;

use property_assessment_pipeline::{
    data::load,
    processing::{DisplayBounds, NonFinitePolicy, SentinelSource, Transformer},
    utils::{init_logging, parse_level_filter, Config},
};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let matches = App::new("Property Assessment Pipeline")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Gabriel Demetrios Lafis")
        .about("Cleans property-assessment extracts for map display")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Overrides the configured log level")
                .takes_value(true)
                .global(true),
        )
        .subcommand(
            App::new("process")
                .about("Clean a raw extract and write the result")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("URI")
                        .help("Raw assessment CSV")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("PATH")
                        .help("Where to write the cleaned CSV")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("strict-residential")
                        .long("strict-residential")
                        .help("Keep only classes below 500 and only the map columns"),
                )
                .arg(
                    Arg::new("sentinel")
                        .long("sentinel")
                        .value_name("TEXT")
                        .help("Use this deed date as the placeholder instead of the first row's")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("reject-non-finite")
                        .long("reject-non-finite")
                        .help("Drop rows whose coordinates do not project to a finite point"),
                ),
        )
        .subcommand(
            App::new("bounds")
                .about("Print the display bounds of a cleaned file as JSON")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("URI")
                        .help("Cleaned assessment CSV")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .get_matches();

    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config file {}", path))?,
        None => Config::default(),
    };

    if let Some(level) = matches.value_of("log-level") {
        config.logging.level = level.to_string();
    }

    if let Err(err) = init_logging(parse_level_filter(&config.logging.level)) {
        eprintln!("Error initializing logger: {}", err);
    }

    match matches.subcommand() {
        Some(("process", sub)) => process(&mut config, sub),
        Some(("bounds", sub)) => bounds(sub),
        _ => {
            println!("No subcommand specified. Use --help for usage information.");
            Ok(())
        }
    }
}

fn process(config: &mut Config, matches: &ArgMatches) -> Result<()> {
    let pipeline = &mut config.pipeline;

    if let Some(input) = matches.value_of("input") {
        pipeline.input = Some(input.to_string());
    }
    if let Some(output) = matches.value_of("output") {
        pipeline.output = Some(output.to_string());
    }
    if matches.is_present("strict-residential") {
        pipeline.options.strict_residential_classes = true;
    }
    if let Some(sentinel) = matches.value_of("sentinel") {
        pipeline.options.sentinel = SentinelSource::Fixed(sentinel.to_string());
    }
    if matches.is_present("reject-non-finite") {
        pipeline.options.non_finite = NonFinitePolicy::Reject;
    }

    let input = pipeline
        .input
        .clone()
        .ok_or_else(|| anyhow!("no input given (use --input or pipeline.input)"))?;
    let output = pipeline
        .output
        .clone()
        .ok_or_else(|| anyhow!("no output given (use --output or pipeline.output)"))?;

    info!("Cleaning {} into {}", input, output);

    let transformer = Transformer::new(pipeline.options.clone());
    let cleaned = transformer
        .transform_and_persist(&input, &output)
        .with_context(|| format!("cleaning {}", input))?;

    info!("Done: {} rows written to {}", cleaned.len(), output);
    Ok(())
}

fn bounds(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .value_of("input")
        .ok_or_else(|| anyhow!("no input given"))?;

    let dataset = load(input).with_context(|| format!("loading {}", input))?;
    let bounds = DisplayBounds::from_dataset(&dataset)
        .with_context(|| format!("computing bounds of {}", input))?;

    println!("{}", serde_json::to_string_pretty(&bounds)?);
    Ok(())
}
