use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use fieldframe_frame::Value;
use serde::Serialize;

/// Byte fields longer than this are abbreviated in table output.
const HEX_PREVIEW_BYTES: usize = 24;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
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

pub fn print_json<T: Serialize>(out: &T) {
    println!(
        "{}",
        serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_table(header: &[&str], rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

/// Write binary output to stdout. Unlike the text printers, failures are
/// returned: the bytes are the command's whole result.
pub fn print_raw(data: &[u8]) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(data)?;
    out.flush()
}

pub fn hex_preview(data: &[u8]) -> String {
    if data.len() <= HEX_PREVIEW_BYTES {
        hex::encode(data)
    } else {
        format!(
            "{}.. ({} bytes)",
            hex::encode(&data[..HEX_PREVIEW_BYTES]),
            data.len()
        )
    }
}

/// JSON rendering of a field value. Byte arrays become text when they hold
/// valid UTF-8 (trailing zeros dropped); anything else is rendered as hex.
pub fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::I8(v) => (*v).into(),
        Value::U8(v) => (*v).into(),
        Value::I16(v) => (*v).into(),
        Value::U16(v) => (*v).into(),
        Value::I32(v) => (*v).into(),
        Value::U32(v) => (*v).into(),
        Value::I64(v) => (*v).into(),
        Value::U64(v) => (*v).into(),
        Value::F32(v) => serde_json::Value::from(*v as f64),
        Value::F64(v) => serde_json::Value::from(*v),
        Value::Bytes(bytes) => {
            let trimmed = value.trimmed_bytes().unwrap_or_default();
            match std::str::from_utf8(trimmed) {
                Ok(text) => serde_json::Value::String(text.to_string()),
                Err(_) => serde_json::Value::String(format!("hex:{}", hex::encode(bytes))),
            }
        }
    }
}
