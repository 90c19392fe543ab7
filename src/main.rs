use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use schemanote::annotate::{self, Outcome};
use schemanote::error::AnnotateError;
use schemanote::loader::{find_table, load_tables, table_for_file};
use schemanote::options::{CONFIG_FILE_NAME, Options, Position};
use schemanote::sql::Dialect;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Keep a schema-info comment block in model source files
#[derive(Parser, Debug)]
#[command(name = "schemanote", version, about, long_about = None)]
struct Cli {
    /// Model source files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Schema file: a SQL dump, or JSON table descriptions (.json)
    #[arg(short, long, required_unless_present = "delete")]
    schema: Option<PathBuf>,

    /// Table to describe (default: each file's stem, or its plural)
    #[arg(short, long)]
    table: Option<String>,

    /// Where new blocks go
    #[arg(short, long, value_enum)]
    position: Option<Position>,

    /// Move existing blocks to --position
    #[arg(short, long)]
    force: bool,

    /// List indexes
    #[arg(short = 'i', long)]
    show_indexes: bool,

    /// List foreign keys
    #[arg(short = 'k', long)]
    show_foreign_keys: bool,

    /// Header marking the managed block
    #[arg(long)]
    header: Option<String>,

    /// Line-comment token, e.g. "//" for Rust sources
    #[arg(long)]
    comment_prefix: Option<String>,

    /// SQL dialect of the schema dump
    #[arg(long, value_enum, default_value_t = Dialect::Auto)]
    dialect: Dialect,

    /// Config file (default: schemanote.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail instead of writing when an annotation is out of date
    #[arg(long)]
    check: bool,

    /// Remove annotations instead of writing them
    #[arg(short, long)]
    delete: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "schemanote=warn",
        1 => "schemanote=info",
        2 => "schemanote=debug",
        _ => "schemanote=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_options(cli: &Cli) -> Result<Options, AnnotateError> {
    let mut options = match &cli.config {
        Some(path) => Options::load(path)?,
        None if Path::new(CONFIG_FILE_NAME).exists() => Options::load(Path::new(CONFIG_FILE_NAME))?,
        None => Options::default(),
    };

    if let Some(position) = cli.position {
        options.position = position;
    }
    if let Some(header) = &cli.header {
        options.header = header.clone();
    }
    if let Some(prefix) = &cli.comment_prefix {
        options.comment_prefix = prefix.clone();
    }
    options.force |= cli.force;
    options.show_indexes |= cli.show_indexes;
    options.show_foreign_keys |= cli.show_foreign_keys;
    options.frozen |= cli.check;

    Ok(options)
}

fn run(cli: &Cli) -> Result<(), AnnotateError> {
    let options = load_options(cli)?;

    if cli.delete {
        for file in &cli.files {
            let outcome = annotate::remove_annotation_file(file, &options)?;
            report(file, outcome, "Removed annotation from");
        }
        return Ok(());
    }

    let Some(schema) = cli.schema.as_deref() else {
        Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "--schema is required")
            .exit();
    };
    let tables = load_tables(schema, cli.dialect)?;

    for file in &cli.files {
        let table = match &cli.table {
            Some(name) => find_table(&tables, name, schema)?,
            None => table_for_file(&tables, file, schema)?,
        };
        let outcome = annotate::annotate_file(file, table, &options)?;
        report(file, outcome, "Annotated");
    }

    Ok(())
}

fn report(path: &Path, outcome: Outcome, verb: &str) {
    match outcome {
        Outcome::Written => println!("{} {}", verb, path.display()),
        Outcome::Unchanged => tracing::info!(path = %path.display(), "Up to date"),
        Outcome::Skipped => tracing::info!(path = %path.display(), "Nothing to annotate"),
    }
}
