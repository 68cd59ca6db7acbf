//! Sheaf CLI - Command-line tool for the schema field-path engine
//!
//! This binary provides command-line interfaces for:
//! - tree: show the schema tree built from a descriptor
//! - schema: show the reconciled physical schema
//! - rules: list validation rules per constrained path
//! - nest: validate flat rows and re-nest them into records

mod config;

use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use sheaf_codec::SchemaNode;
use sheaf_io::{
    write_row_results_parallel, InvalidRowPolicy, NdjsonRows, NdjsonSink, ParallelConfig,
    SchemaDescriptor, SessionOptions, WriteSession, WriteSummary,
};
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "sheaf")]
#[command(about = "Schema field-path engine CLI tool")]
#[command(version)]
struct Cli {
    /// Enable verbose logging. Repeat for more (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML config providing namespace, filters, delimiter, skip_invalid
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
struct SchemaArgs {
    /// Schema descriptor (JSON object of path -> type)
    descriptor: PathBuf,
    /// Namespace the filters are applied for
    #[arg(long)]
    namespace: Option<String>,
    /// Filter configuration, e.g. "profile/identities.primary,profile/meta"
    #[arg(long)]
    filters: Option<String>,
    /// Path delimiter used by the descriptor
    #[arg(long)]
    delimiter: Option<char>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the schema tree built from a descriptor
    ///
    /// Examples:
    ///   sheaf tree schema.json
    ///   sheaf tree schema.json --namespace profile --filters profile/meta --format json
    Tree {
        #[command(flatten)]
        schema: SchemaArgs,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show the reconciled physical schema
    Schema {
        #[command(flatten)]
        schema: SchemaArgs,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List validation rules per constrained path
    Rules {
        #[command(flatten)]
        schema: SchemaArgs,
    },
    /// Validate rows (one JSON array per line) and write nested NDJSON
    ///
    /// Examples:
    ///   sheaf nest schema.json --rows rows.ndjson -o nested.ndjson
    ///   cat rows.ndjson | sheaf nest schema.json --skip-invalid --parallel
    Nest {
        #[command(flatten)]
        schema: SchemaArgs,
        /// Row input (defaults to stdin)
        #[arg(long)]
        rows: Option<PathBuf>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip invalid rows instead of aborting
        #[arg(long)]
        skip_invalid: bool,
        /// Process rows on a worker pool
        #[arg(long)]
        parallel: bool,
        /// Maximum worker threads with --parallel
        #[arg(long, requires = "parallel")]
        threads: Option<usize>,
        /// Show progress spinner while nesting
        #[arg(long)]
        progress: bool,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

struct NestArgs {
    rows: Option<PathBuf>,
    output: Option<PathBuf>,
    skip_invalid: bool,
    parallel: bool,
    threads: Option<usize>,
    progress: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = CliConfig::load(cli.config.as_deref())?;
    tracing::debug!(path = ?cli.config, config = ?config, "configuration loaded");
    let stdout = std::io::stdout();

    match cli.command {
        Commands::Tree { schema, format } => {
            handle_tree(&schema, &config, format, &mut stdout.lock())?;
        }
        Commands::Schema { schema, format } => {
            handle_schema(&schema, &config, format, &mut stdout.lock())?;
        }
        Commands::Rules { schema } => {
            handle_rules(&schema, &config, &mut stdout.lock())?;
        }
        Commands::Nest {
            schema,
            rows,
            output,
            skip_invalid,
            parallel,
            threads,
            progress,
        } => {
            let args = NestArgs {
                rows,
                output,
                skip_invalid,
                parallel,
                threads,
                progress,
            };
            handle_nest(&schema, &config, args)?;
        }
    }
    Ok(())
}

fn open_session(
    schema: &SchemaArgs,
    config: &CliConfig,
    policy: InvalidRowPolicy,
) -> Result<WriteSession, Box<dyn Error>> {
    let file = File::open(&schema.descriptor)
        .map_err(|e| format!("cannot open descriptor {}: {}", schema.descriptor.display(), e))?;
    let descriptor = SchemaDescriptor::from_json_reader(BufReader::new(file))?;

    let mut options = SessionOptions::default().with_policy(policy);
    if let Some(delimiter) = schema.delimiter.or(config.delimiter) {
        options.delimiter = delimiter;
    }
    if let Some(namespace) = schema.namespace.as_ref().or(config.namespace.as_ref()) {
        options = options.with_namespace(namespace.clone());
    }
    if let Some(filters) = schema.filters.as_ref().or(config.filters.as_ref()) {
        options = options.with_filter_config(filters)?;
    }

    Ok(WriteSession::open(&descriptor, options)?)
}

fn handle_tree(
    schema: &SchemaArgs,
    config: &CliConfig,
    format: OutputFormat,
    writer: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    let session = open_session(schema, config, InvalidRowPolicy::Abort)?;
    let tree = session.tree();

    match format {
        OutputFormat::Table => {
            for node in tree.fields() {
                print_tree_node(writer, node)?;
            }
        }
        OutputFormat::Json => {
            let delimiter = schema.delimiter.or(config.delimiter).unwrap_or('.');
            let flattened: Map<String, Value> = tree
                .flatten(delimiter)
                .into_iter()
                .map(|(path, type_name)| (path, Value::String(type_name)))
                .collect();
            serde_json::to_writer_pretty(&mut *writer, &flattened)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn print_tree_node(writer: &mut dyn Write, node: &SchemaNode) -> Result<(), Box<dyn Error>> {
    let indent = "  ".repeat(node.depth().saturating_sub(1));
    if node.is_group() {
        writeln!(writer, "{}{}/", indent, node.key())?;
        for child in node.children() {
            print_tree_node(writer, child)?;
        }
    } else {
        let marker = if node.constraint().is_some() { " *" } else { "" };
        writeln!(
            writer,
            "{}{}\t{}{}",
            indent,
            node.key(),
            node.declared_type(),
            marker
        )?;
    }
    Ok(())
}

fn handle_schema(
    schema: &SchemaArgs,
    config: &CliConfig,
    format: OutputFormat,
    writer: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    let session = open_session(schema, config, InvalidRowPolicy::Abort)?;
    let physical = session.physical_schema();

    match format {
        OutputFormat::Table => {
            writeln!(writer, "Column\tType")?;
            for column in physical.columns() {
                writeln!(writer, "{}\t{}", column.path, column.physical_type)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, physical)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn handle_rules(
    schema: &SchemaArgs,
    config: &CliConfig,
    writer: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    let session = open_session(schema, config, InvalidRowPolicy::Abort)?;
    let registry = session.registry();

    writeln!(writer, "Path\tFamily\tRules")?;
    for (path, family) in registry.paths() {
        writeln!(
            writer,
            "{}\t{:?}\t{}",
            path,
            family,
            registry.describe(path).join("; ")
        )?;
    }
    Ok(())
}

fn handle_nest(
    schema: &SchemaArgs,
    config: &CliConfig,
    args: NestArgs,
) -> Result<WriteSummary, Box<dyn Error>> {
    let start = Instant::now();
    let policy = if args.skip_invalid || config.skip_invalid.unwrap_or(false) {
        InvalidRowPolicy::Skip
    } else {
        InvalidRowPolicy::Abort
    };
    let session = open_session(schema, config, policy)?;

    let input: Box<dyn BufRead> = match &args.rows {
        Some(path) => Box::new(BufReader::new(File::open(path).map_err(|e| {
            format!("cannot open rows {}: {}", path.display(), e)
        })?)),
        None => Box::new(BufReader::new(std::io::stdin())),
    };
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };
    let mut sink = NdjsonSink::new(output);

    let mut progress_bar = args.progress.then(|| create_spinner("Nesting rows"));
    let bar = progress_bar.as_ref();
    let rows = NdjsonRows::new(input).inspect(|_| {
        if let Some(pb) = bar {
            pb.inc(1);
        }
    });

    let summary = if args.parallel {
        let config = ParallelConfig {
            max_threads: args.threads,
        };
        write_row_results_parallel(&session, rows, &mut sink, &config)?
    } else {
        session.write_row_results(rows, &mut sink)?
    };
    sink.into_inner()?.flush()?;

    let elapsed = start.elapsed();
    let rec_rate = summary.rows_read as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
    if let Some(pb) = progress_bar.take() {
        pb.finish_with_message(format!(
            "Nested {} rows in {:.2?} ({:.1} rows/s)",
            summary.rows_written, elapsed, rec_rate
        ));
    }
    report_nest_summary(&summary, args.output.as_deref(), elapsed, rec_rate)?;
    Ok(summary)
}

fn report_nest_summary(
    summary: &WriteSummary,
    output: Option<&Path>,
    elapsed: Duration,
    rec_rate: f64,
) -> Result<(), Box<dyn Error>> {
    let target = output
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    let mut stderr = std::io::stderr().lock();
    writeln!(
        &mut stderr,
        "Nested to {} (rows read: {}, written: {}, skipped: {}, elapsed: {:.2?}, {:.1} rows/s)",
        target, summary.rows_read, summary.rows_written, summary.rows_skipped, elapsed, rec_rate
    )?;
    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {pos} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DESCRIPTOR: &str = r#"{
        "profile.name": {"type": "string", "maxLength": 5},
        "profile.age": {"type": "int", "minimum": 0, "maximum": 150},
        "meta.source": "string"
    }"#;

    struct Workspace {
        dir: TempDir,
        schema: SchemaArgs,
    }

    fn workspace() -> Workspace {
        let dir = TempDir::new().unwrap();
        let descriptor = dir.path().join("schema.json");
        fs::write(&descriptor, DESCRIPTOR).unwrap();
        Workspace {
            schema: SchemaArgs {
                descriptor,
                ..SchemaArgs::default()
            },
            dir,
        }
    }

    fn capture(f: impl FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_tree_table_indents_groups() {
        let ws = workspace();
        let out = capture(|w| handle_tree(&ws.schema, &CliConfig::default(), OutputFormat::Table, w));
        assert_eq!(
            out,
            "profile/\n  name\tstring *\n  age\tint *\nmeta/\n  source\tstring\n"
        );
    }

    #[test]
    fn test_tree_json_is_flattened_descriptor() {
        let ws = workspace();
        let out = capture(|w| handle_tree(&ws.schema, &CliConfig::default(), OutputFormat::Json, w));
        let value: Value = serde_json::from_str(&out).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["profile.name", "profile.age", "meta.source"]);
    }

    #[test]
    fn test_config_namespace_and_filters_apply() {
        let ws = workspace();
        let config = CliConfig {
            namespace: Some("profile".to_string()),
            filters: Some("profile/meta".to_string()),
            ..CliConfig::default()
        };
        let out = capture(|w| handle_schema(&ws.schema, &config, OutputFormat::Table, w));
        assert_eq!(out, "Column\tType\nprofile.name\tSTRING\nprofile.age\tINTEGER\n");
    }

    #[test]
    fn test_flags_override_config() {
        let ws = workspace();
        let schema = SchemaArgs {
            namespace: Some("other".to_string()),
            ..ws.schema.clone()
        };
        let config = CliConfig {
            namespace: Some("profile".to_string()),
            filters: Some("profile/meta".to_string()),
            ..CliConfig::default()
        };
        let out = capture(|w| handle_schema(&schema, &config, OutputFormat::Table, w));
        assert!(out.contains("meta.source"));
    }

    #[test]
    fn test_rules_listed_per_path() {
        let ws = workspace();
        let out = capture(|w| handle_rules(&ws.schema, &CliConfig::default(), w));
        assert_eq!(
            out,
            "Path\tFamily\tRules\nprofile.name\tString\tmaxLength=5\nprofile.age\tInteger\tminimum=0 maximum=150\n"
        );
    }

    #[test]
    fn test_nest_writes_output_file() {
        let ws = workspace();
        let rows = ws.dir.path().join("rows.ndjson");
        let output = ws.dir.path().join("out.ndjson");
        fs::write(&rows, "[\"ann\", 30, \"web\"]\n[\"toolong\", 1, null]\n").unwrap();

        let args = NestArgs {
            rows: Some(rows),
            output: Some(output.clone()),
            skip_invalid: true,
            parallel: false,
            threads: None,
            progress: false,
        };
        let summary = handle_nest(&ws.schema, &CliConfig::default(), args).unwrap();
        assert_eq!(summary.rows_written, 1);
        assert_eq!(summary.rows_skipped, 1);

        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(
            text,
            "{\"profile\":{\"name\":\"ann\",\"age\":30},\"meta\":{\"source\":\"web\"}}\n"
        );
    }
}
