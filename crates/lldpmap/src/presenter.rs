//! Rendering of the neighbor table as CSV or JSON

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{LldpError, Result};
use crate::table::{NeighborRecord, NeighborTable};

/// CSV header row.
pub const CSV_HEADER: [&str; 3] = ["Local", "RemotePort", "RemoteSysName"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => f.write_str("csv"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Renders a table in the configured format.
///
/// Output always ends with a newline. Rows follow key order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presenter {
    format: OutputFormat,
    csv_escape: bool,
    pretty: bool,
}

impl Presenter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    /// Quote CSV fields that contain separators, quotes or line breaks.
    pub fn with_csv_escape(mut self, escape: bool) -> Self {
        self.csv_escape = escape;
        self
    }

    /// Indent JSON output.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn render(&self, table: &NeighborTable) -> Result<String> {
        match self.format {
            OutputFormat::Csv if self.csv_escape => render_csv_escaped(table),
            OutputFormat::Csv => Ok(render_csv_raw(table)),
            OutputFormat::Json => self.render_json(table),
        }
    }

    fn render_json(&self, table: &NeighborTable) -> Result<String> {
        let mut out = if self.pretty {
            serde_json::to_string_pretty(table)
        } else {
            serde_json::to_string(table)
        }
        .map_err(|e| LldpError::render(format!("JSON encoding failed: {e}")))?;
        out.push('\n');
        Ok(out)
    }
}

fn row(record: &NeighborRecord) -> [&str; 3] {
    [
        &record.local_port_label,
        &record.remote_port_label,
        &record.remote_system_name,
    ]
}

/// Plain comma join; a comma inside a value shifts the columns.
fn render_csv_raw(table: &NeighborTable) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for (_, record) in table.entries() {
        out.push_str(&row(record).join(","));
        out.push('\n');
    }
    out
}

fn render_csv_escaped(table: &NeighborTable) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| LldpError::render(format!("CSV encoding failed: {e}")))?;
    for (_, record) in table.entries() {
        writer
            .write_record(row(record))
            .map_err(|e| LldpError::render(format!("CSV encoding failed: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LldpError::render(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| LldpError::render(format!("CSV output is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::CorrelationKey;
    use pretty_assertions::assert_eq;

    fn table() -> NeighborTable {
        let mut table = NeighborTable::new();
        table.upsert_local(CorrelationKey::interface(3), "Gi0/3");
        table
            .merge_remote_system_name(&CorrelationKey::interface(3), "core-switch")
            .unwrap();
        table
            .merge_remote_port(&CorrelationKey::interface(3), "Gi1/1")
            .unwrap();
        table.upsert_local(CorrelationKey::interface(12), "Gi0/12");
        table
    }

    #[test]
    fn test_csv_raw() {
        let out = Presenter::new(OutputFormat::Csv).render(&table()).unwrap();
        assert_eq!(
            out,
            "Local,RemotePort,RemoteSysName\nGi0/3,Gi1/1,core-switch\nGi0/12,,\n"
        );
    }

    #[test]
    fn test_csv_raw_does_not_escape() {
        let mut table = NeighborTable::new();
        table.upsert_local(CorrelationKey::interface(1), "uplink, rack 4");
        let out = Presenter::new(OutputFormat::Csv).render(&table).unwrap();
        assert_eq!(out.lines().nth(1), Some("uplink, rack 4,,"));
    }

    #[test]
    fn test_csv_escaped_quotes_when_needed() {
        let mut table = NeighborTable::new();
        table.upsert_local(CorrelationKey::interface(1), "uplink, rack 4");
        table.upsert_local(CorrelationKey::interface(2), "eth1");
        let out = Presenter::new(OutputFormat::Csv)
            .with_csv_escape(true)
            .render(&table)
            .unwrap();
        assert_eq!(
            out,
            "Local,RemotePort,RemoteSysName\n\"uplink, rack 4\",,\neth1,,\n"
        );
    }

    #[test]
    fn test_csv_empty_table_is_header_only() {
        let out = Presenter::new(OutputFormat::Csv)
            .render(&NeighborTable::new())
            .unwrap();
        assert_eq!(out, "Local,RemotePort,RemoteSysName\n");
    }

    #[test]
    fn test_json() {
        let out = Presenter::new(OutputFormat::Json).render(&table()).unwrap();
        assert_eq!(
            out,
            concat!(
                r#"{"3":{"LocalPortName":"Gi0/3","RemotePortName":"Gi1/1","RemoteSysName":"core-switch"},"#,
                r#""12":{"LocalPortName":"Gi0/12","RemotePortName":"","RemoteSysName":""}}"#,
                "\n"
            )
        );
    }

    #[test]
    fn test_json_pretty_parses_back() {
        let out = Presenter::new(OutputFormat::Json)
            .with_pretty(true)
            .render(&table())
            .unwrap();
        assert!(out.contains("\n  \"3\": {"));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["12"]["LocalPortName"], "Gi0/12");
    }

    #[test]
    fn test_json_empty_table() {
        let out = Presenter::new(OutputFormat::Json)
            .render(&NeighborTable::new())
            .unwrap();
        assert_eq!(out, "{}\n");
    }
}
