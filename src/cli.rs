//! Command line entry point.

use std::{collections::BTreeSet, path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize;
use tracing::info;

use crate::{
    config::{Config, LogLevel, RunConfig, Verbosity},
    flatten::{FlattenReport, Flattener},
    logger,
    ontology::{rdf, OntologyStore, RdfFormat, TermId},
    output::BulkWriter,
    Result,
};

/// Flattens the ancestors of every ontology term into faceted search-index
/// records.
#[derive(Debug, Parser)]
#[command(name = "owl-flattener", version, about, long_about = None)]
pub struct Cli {
    /// Ontology file to flatten.
    #[arg(short = 'i', long = "owl")]
    pub owl: PathBuf,

    /// Root term, as an IRI or identifier; it and its direct children are
    /// never reported as ancestors.
    #[arg(short, long, value_parser = parse_term_id)]
    pub root: TermId,

    /// Log details of every closure walk.
    #[arg(short, long)]
    pub debug: bool,

    /// Log details only for these terms (e.g. `DOID_0001816 DOID:4`).
    #[arg(short, long, num_args = 1.., value_parser = parse_term_id)]
    pub trace: Vec<TermId>,

    /// Output file; overrides the configuration.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ontology serialization; guessed from the file extension when absent.
    #[arg(long, value_enum)]
    pub format: Option<RdfFormat>,
}

fn parse_term_id(value: &str) -> std::result::Result<TermId, String> {
    TermId::parse(value).map_err(|err| err.to_string())
}

impl Cli {
    /// Verbosity requested on the command line.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity {
            debug: self.debug,
            trace: self.trace.iter().cloned().collect::<BTreeSet<_>>(),
        }
    }

    /// Loads the configuration file, or the defaults when none is given.
    ///
    /// # Errors
    ///
    /// When the file is unreadable or malformed.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(output) = &self.output {
            config.output.path.clone_from(output);
        }
        Ok(config)
    }
}

/// Runs a full flattening: load, walk, write, report.
///
/// # Errors
///
/// When the ontology cannot be loaded or the output cannot be written.
pub fn run(cli: &Cli, config: &Config) -> Result<FlattenReport> {
    let started = chrono::Local::now();
    info!(started = %started.to_rfc3339(), "flattening started");

    let store = rdf::load(&cli.owl, cli.format)?;
    let summary = store.summary();
    info!(
        classes = summary.class_count,
        axioms = summary.axiom_count,
        annotations = summary.annotation_count,
        annotation_properties = summary.annotation_property_count,
        "ontology loaded"
    );

    let run_config = RunConfig::new(cli.root.clone(), &config.flatten, cli.verbosity());
    let mut writer = BulkWriter::create(&config.output.path, config.output.action_line.clone())?;
    let report = Flattener::new(&store, &run_config).run(&mut writer)?;
    report.summarize();

    let finished = chrono::Local::now();
    info!(
        output = %config.output.path.display(),
        records = writer.written(),
        finished = %finished.to_rfc3339(),
        elapsed_ms = (finished - started).num_milliseconds(),
        "flattening completed"
    );
    Ok(report)
}

/// Parses the arguments, sets up logging and runs.
#[must_use]
pub fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(err) => return fail(&err),
    };
    let force = cli.verbosity().is_enabled().then_some(LogLevel::Debug);
    logger::init(&config.logger, force);

    match run(&cli, &config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => fail(&err),
    }
}

fn fail(err: &crate::Error) -> ExitCode {
    eprintln!("{} {err}", "error:".red());
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;
    use crate::ontology::{RdfFormat, TermId};

    #[test]
    fn parses_short_flags() {
        let cli = Cli::try_parse_from([
            "owl-flattener",
            "-i",
            "doid.owl",
            "-r",
            "http://purl.obolibrary.org/obo/DOID_4",
            "-t",
            "DOID_0001816",
            "DOID:0050117",
        ])
        .expect("parses");

        assert_eq!(cli.root, TermId::parse("DOID:4").expect("id"));
        assert_eq!(cli.trace.len(), 2);
        assert!(cli.verbosity().is_verbose_for(&TermId::parse("DOID:0001816").expect("id")));
        assert!(!cli.verbosity().is_verbose_for(&TermId::parse("DOID:4").expect("id")));
        assert!(cli.format.is_none());
    }

    #[test]
    fn parses_long_flags() {
        let cli = Cli::try_parse_from([
            "owl-flattener",
            "--owl",
            "doid.ttl",
            "--root",
            "DOID:4",
            "--debug",
            "--output",
            "out.json",
            "--format",
            "turtle",
        ])
        .expect("parses");

        assert!(cli.debug);
        assert_eq!(cli.format, Some(RdfFormat::Turtle));
        let config = cli.load_config().expect("defaults");
        assert_eq!(config.output.path.to_str(), Some("out.json"));
    }

    #[test]
    fn root_and_input_are_required() {
        assert!(Cli::try_parse_from(["owl-flattener", "-i", "doid.owl"]).is_err());
        assert!(Cli::try_parse_from(["owl-flattener", "-r", "DOID:4"]).is_err());
    }
}
