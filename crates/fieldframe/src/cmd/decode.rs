use fieldframe_frame::{peek_stream_id, DecodeConfig, Record};
use fieldframe_schema::{Schema, SchemaRegistry};
use serde::Serialize;

use crate::cmd::{load_schema, read_frame, DecodeArgs};
use crate::exit::{frame_error, schema_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_json, print_table, value_json, OutputFormat};

#[derive(Serialize)]
struct FieldValue {
    id: u32,
    name: String,
    #[serde(rename = "type")]
    ty: String,
    value: serde_json::Value,
}

#[derive(Serialize)]
struct DecodeOutput {
    stream_id: u32,
    matched: usize,
    skipped: usize,
    size_mismatches: usize,
    fields: Vec<FieldValue>,
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = read_frame(&args.frame)?;

    let single: Schema;
    let registry: SchemaRegistry;
    let schema = match (&args.schema, &args.schema_dir) {
        (Some(path), _) => {
            single = load_schema(path)?;
            &single
        }
        (None, Some(dir)) => {
            registry = SchemaRegistry::from_directory(dir)
                .map_err(|err| schema_error(&format!("loading {}", dir.display()), err))?;
            let stream_id = peek_stream_id(&frame).map_err(|err| frame_error("decode", err))?;
            registry
                .require(stream_id)
                .map_err(|err| schema_error("decode", err))?
        }
        (None, None) => return Err(CliError::new(USAGE, "--schema or --schema-dir is required")),
    };

    let config = DecodeConfig {
        size_policy: args.policy.into(),
    };
    let mut record = Record::zeroed(schema);
    let report = record
        .decode_from(&frame, &config)
        .map_err(|err| frame_error("decode", err))?;

    let out = DecodeOutput {
        stream_id: schema.stream_id(),
        matched: report.matched,
        skipped: report.skipped,
        size_mismatches: report.size_mismatches,
        fields: schema
            .fields()
            .iter()
            .zip(record.values())
            .map(|(layout, (name, value))| FieldValue {
                id: layout.id(),
                name: name.to_string(),
                ty: layout.ty.to_string(),
                value: value_json(&value),
            })
            .collect(),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            println!(
                "stream {} | matched {} | skipped {} | size mismatches {}",
                out.stream_id, out.matched, out.skipped, out.size_mismatches
            );
            let rows = out
                .fields
                .iter()
                .map(|f| {
                    vec![
                        f.id.to_string(),
                        f.name.clone(),
                        f.ty.clone(),
                        display_json(&f.value),
                    ]
                })
                .collect();
            print_table(&["ID", "NAME", "TYPE", "VALUE"], rows);
        }
        OutputFormat::Pretty => {
            for f in &out.fields {
                println!("{}: {}", f.name, display_json(&f.value));
            }
        }
    }

    Ok(SUCCESS)
}

fn display_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
