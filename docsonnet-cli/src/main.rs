//! Command-line interface for docsonnet
//! Extracts the docsonnet documentation from a Jsonnet file and prints it.
//!
//! Usage:
//!   docsonnet `<path>` [-J `<dir>`]... [--format json|yaml|raw] [--output `<file>`]
//!   docsonnet --dump-config                                   - Print the effective configuration

mod logging;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use docsonnet::Opts;
use docsonnet_config::{DocsonnetConfig, Loader, OutputConfig, OutputFormat};
use std::fs;

fn command() -> Command {
    Command::new("docsonnet")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extracts docsonnet documentation from Jsonnet libraries")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Jsonnet file to document")
                .required_unless_present("dump-config")
                .index(1),
        )
        .arg(
            Arg::new("jpath")
                .long("jpath")
                .short('J')
                .help("Additional library search path; later ones are searched first")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults and ./docsonnet.toml"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: json, yaml or raw (the untyped extracted data)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Write to this file instead of stdout"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more (-v debug, -vv trace)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("dump-config")
                .long("dump-config")
                .help("Print the effective configuration and exit")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    let matches = command().get_matches();

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });
    logging::init(matches.get_count("verbose"), &config.log.level);

    if matches.get_flag("dump-config") {
        println!("{:#?}", config);
        return;
    }

    let path = matches
        .get_one::<String>("path")
        .expect("path is required unless dumping config");
    let mut opts = config.opts();
    if let Some(dirs) = matches.get_many::<String>("jpath") {
        opts = opts.jpaths(dirs.cloned());
    }

    let rendered = render(path, &opts, &config.output).unwrap_or_else(|e| {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    });

    match matches.get_one::<String>("output") {
        Some(out) => {
            if let Err(e) = fs::write(out, rendered) {
                eprintln!("Error writing {}: {}", out, e);
                std::process::exit(1);
            }
        }
        None => println!("{}", rendered),
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<DocsonnetConfig> {
    let mut loader = Loader::new().discover(".");
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(format) = matches.get_one::<String>("format") {
        loader = loader.format(format)?;
    }
    Ok(loader.build()?)
}

fn render(path: &str, opts: &Opts, output: &OutputConfig) -> anyhow::Result<String> {
    if output.format == OutputFormat::Raw {
        let raw = docsonnet::extract(path, opts)?;
        if !output.pretty {
            return Ok(String::from_utf8(raw)?);
        }
        let value: serde_json::Value =
            serde_json::from_slice(&raw).context("extracted data is not JSON")?;
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let pkg = docsonnet::load(path, opts)?;
    tracing::info!(package = %pkg.name, fields = pkg.api.len(), "loaded docsonnet package");

    let rendered = match (output.format, output.pretty) {
        (OutputFormat::Yaml, _) => serde_yaml::to_string(&pkg)?,
        (_, true) => serde_json::to_string_pretty(&pkg)?,
        (_, false) => serde_json::to_string(&pkg)?,
    };
    Ok(rendered)
}
