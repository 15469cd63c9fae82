use std::io::{IsTerminal, Write};

use bytes::Bytes;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use devchan_module::CounterSnapshot;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Result of one session operation.
#[derive(Debug, Default, Serialize)]
pub struct OpRecord {
    pub line: usize,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counters: Option<CounterSnapshot>,
    #[serde(skip)]
    pub payload: Option<Bytes>,
}

impl OpRecord {
    pub fn new(line: usize, op: &'static str) -> Self {
        Self {
            line,
            op,
            ..Self::default()
        }
    }

    pub fn with_payload(mut self, payload: Bytes) -> Self {
        self.data = Some(payload_preview(payload.as_ref()));
        self.payload = Some(payload);
        self
    }
}

pub fn print_record(record: &OpRecord, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Pretty => println!("{}", pretty_line(record)),
        OutputFormat::Raw => {
            if let Some(payload) = &record.payload {
                print_raw(payload.as_ref());
            }
        }
        OutputFormat::Table => print_table(std::slice::from_ref(record)),
    }
}

pub fn print_table(records: &[OpRecord]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["LINE", "OP", "CHANNEL", "COUNT", "OFFSET", "RESULT"]);
    for record in records {
        table.add_row(vec![
            record.line.to_string(),
            record.op.to_string(),
            record.channel.clone().unwrap_or_default(),
            opt_to_string(record.count),
            opt_to_string(record.offset),
            result_cell(record),
        ]);
    }
    println!("{table}");
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn pretty_line(record: &OpRecord) -> String {
    let mut line = format!("[{}] {}", record.line, record.op);
    if let Some(channel) = &record.channel {
        line.push_str(&format!(" {channel}"));
    }
    if let Some(count) = record.count {
        line.push_str(&format!(" count={count}"));
    }
    if let Some(offset) = record.offset {
        line.push_str(&format!(" offset={offset}"));
    }
    let result = result_cell(record);
    if !result.is_empty() {
        line.push_str(&format!(" {result}"));
    }
    line
}

fn result_cell(record: &OpRecord) -> String {
    if let Some(error) = &record.error {
        return format!("error: {error}");
    }
    if let Some(c) = &record.counters {
        return format!(
            "opens={} closes={} reads={} writes={}",
            c.opens, c.closes, c.reads, c.writes
        );
    }
    record
        .data
        .as_ref()
        .map(|d| format!("{d:?}"))
        .unwrap_or_default()
}

fn opt_to_string(value: Option<usize>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_skips_absent_fields() {
        let record = OpRecord::new(1, "open");
        let json = serde_json::to_string(&record).expect("record should serialize");
        assert_eq!(json, r#"{"line":1,"op":"open"}"#);
    }

    #[test]
    fn payload_sets_preview() {
        let record = OpRecord::new(2, "read").with_payload(Bytes::from_static(b"hi"));
        assert_eq!(record.data.as_deref(), Some("hi"));
        let binary = OpRecord::new(3, "read").with_payload(Bytes::from_static(&[0xff, 0xfe]));
        assert_eq!(binary.data.as_deref(), Some("<binary 2 bytes>"));
    }

    #[test]
    fn pretty_line_includes_error() {
        let mut record = OpRecord::new(4, "write");
        record.channel = Some("device".to_string());
        record.error = Some("no space left".to_string());
        assert_eq!(pretty_line(&record), "[4] write device error: no space left");
    }
}
