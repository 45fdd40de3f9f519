use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use geofeat_core::config::{DecoderConfig, SchemaSource};
use tracing::{debug, info};

mod display;

use display::{OutputMode, RecordTable};

/// geofeat — decode binary feature records against an old schema, projecting
/// only the attributes you ask for.
#[derive(Parser, Debug)]
#[command(name = "geofeat", version)]
struct Cli {
    /// Old schema as a spec string, e.g. "name:String,age:Integer,*geom:Point".
    #[arg(short, long)]
    schema: Option<String>,

    /// JSON decoder config file. Command-line flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated attributes to materialize (default: all).
    #[arg(short, long, value_delimiter = ',')]
    project: Option<Vec<String>>,

    /// Record file to read (default: stdin).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output one JSON object per line.
    #[arg(short, long, conflicts_with = "table")]
    json: bool,

    /// Output a table after reading all records.
    #[arg(short, long)]
    table: bool,

    /// Stop after this many records.
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Reject length prefixes above this many bytes.
    #[arg(long)]
    max_blob_len: Option<usize>,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.table {
            OutputMode::Table
        } else {
            OutputMode::Pretty
        }
    }
}

/// Merge the config file (if any) with command-line overrides.
fn resolve_config(cli: &Cli) -> Result<DecoderConfig, Box<dyn std::error::Error>> {
    let mut config = match (&cli.config, &cli.schema) {
        (Some(path), _) => DecoderConfig::load(path)?,
        (None, Some(spec)) => DecoderConfig::from_spec(spec.clone()),
        (None, None) => return Err("either --schema or --config is required".into()),
    };
    if let (Some(_), Some(spec)) = (&cli.config, &cli.schema) {
        config.schema = SchemaSource::Spec(spec.clone());
    }
    if let Some(names) = &cli.project {
        config.projection = Some(names.clone());
    }
    if let Some(max) = cli.max_blob_len {
        config.max_blob_len = Some(max);
    }
    Ok(config)
}

fn open_input(path: Option<&PathBuf>) -> io::Result<Box<dyn BufRead>> {
    match path {
        Some(p) => Ok(Box::new(BufReader::new(File::open(p)?))),
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Decode every record from `input` and render it.
///
/// Returns exit code: 0 = stream fully decoded, 1 = first error stops decoding.
fn run_decode<R: BufRead>(
    config: &DecoderConfig,
    input: R,
    limit: Option<usize>,
    mode: OutputMode,
) -> i32 {
    let mut stream = match config.open_stream(input) {
        Ok(s) => s,
        Err(e) => {
            display::render_error(&e, mode);
            return 1;
        }
    };

    let decoder = stream.decoder();
    let mut table = RecordTable::new(decoder.old_schema(), |n| decoder.selector().wants(n));
    debug!(schema = %decoder.old_schema(), "decoding");

    let limit = limit.unwrap_or(usize::MAX);
    let mut code = 0;
    for item in stream.by_ref().take(limit) {
        match item {
            Ok(record) => display::render_record(&record, mode, &mut table),
            Err(e) => {
                display::render_error(&e, mode);
                code = 1;
                break;
            }
        }
    }

    info!(
        records = stream.records_read(),
        bytes = stream.position(),
        "finished"
    );
    display::render_summary(stream.records_read(), stream.position(), mode, &table);
    code
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = cli.output_mode();

    let config = match resolve_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            display::render_error(&e, mode);
            process::exit(2);
        }
    };

    let input = match open_input(cli.input.as_ref()) {
        Ok(i) => i,
        Err(e) => {
            display::render_error(&e, mode);
            process::exit(2);
        }
    };

    process::exit(run_decode(&config, input, cli.limit, mode));
}
