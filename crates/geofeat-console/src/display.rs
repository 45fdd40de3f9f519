use comfy_table::{Table, presets};
use geofeat_core::{DecodedRecord, Schema};
use serde_json::json;

/// Output mode for rendering decoded records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable pretty-printed JSON per record.
    Pretty,
    /// Machine-parseable JSON (one JSON object per line on stdout).
    Json,
    /// One table row per record, printed after the stream ends.
    Table,
}

/// Render a single record. Table mode buffers rows instead of printing.
pub fn render_record(record: &DecodedRecord, mode: OutputMode, table: &mut RecordTable) {
    match mode {
        OutputMode::Pretty => match serde_json::to_string_pretty(record) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Error formatting record: {e}"),
        },
        OutputMode::Json => match serde_json::to_string(record) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("{}", json!({"error": e.to_string()})),
        },
        OutputMode::Table => table.push(record),
    }
}

/// Print the trailer once the stream is exhausted.
pub fn render_summary(count: u64, bytes: u64, mode: OutputMode, table: &RecordTable) {
    match mode {
        OutputMode::Pretty => println!("Decoded {count} record(s), {bytes} byte(s)."),
        OutputMode::Json => {}
        OutputMode::Table => {
            println!("{}", table.render());
            println!("({count} record(s))");
        }
    }
}

/// Render an error to stderr in the given mode.
pub fn render_error(err: &dyn std::fmt::Display, mode: OutputMode) {
    match mode {
        OutputMode::Json => eprintln!("{}", json!({"error": err.to_string()})),
        OutputMode::Pretty | OutputMode::Table => eprintln!("Error: {err}"),
    }
}

/// Rows for table mode. Columns follow old-schema order, restricted to the
/// attributes a projection selected.
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RecordTable {
    pub fn new(schema: &Schema, wants: impl Fn(&str) -> bool) -> Self {
        let columns = schema
            .fields()
            .iter()
            .filter(|f| wants(f.name.as_str()))
            .map(|f| f.name.clone())
            .collect();
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn push(&mut self, record: &DecodedRecord) {
        let mut row = vec![record.identity.clone(), record.version.to_string()];
        for column in &self.columns {
            row.push(
                record
                    .get(column)
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            );
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::ASCII_MARKDOWN);
        let mut header = vec!["identity".to_string(), "version".to_string()];
        header.extend(self.columns.iter().cloned());
        table.set_header(header);
        for row in &self.rows {
            table.add_row(row.clone());
        }
        table
    }
}
