use bytes::BytesMut;
use fieldframe_frame::{Record, Value};
use fieldframe_schema::FieldType;
use serde::Serialize;

use crate::cmd::{load_schema, EncodeArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_json, print_raw, OutputFormat};

#[derive(Serialize)]
struct EncodeOutput<'a> {
    stream_id: u32,
    frame_size: usize,
    output: &'a str,
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = load_schema(&args.schema)?;
    let mut record = Record::zeroed(&schema);

    for assignment in &args.set {
        let (name, text) = split_assignment(assignment)?;
        let layout = schema
            .field(name)
            .ok_or_else(|| CliError::new(USAGE, format!("unknown field '{name}'")))?;
        let value = parse_value(layout.ty, text)
            .map_err(|msg| CliError::new(USAGE, format!("field '{name}': {msg}")))?;
        record
            .set_value(name, &value)
            .map_err(|err| frame_error("encode", err))?;
    }

    let mut buf = BytesMut::new();
    record
        .encode(&mut buf)
        .map_err(|err| frame_error("encode", err))?;
    tracing::debug!(
        stream_id = schema.stream_id(),
        bytes = buf.len(),
        "encoded frame"
    );

    match &args.output {
        Some(path) => {
            std::fs::write(path, &buf)
                .map_err(|err| io_error(&format!("writing {}", path.display()), err))?;
            let shown = path.display().to_string();
            let out = EncodeOutput {
                stream_id: schema.stream_id(),
                frame_size: buf.len(),
                output: &shown,
            };
            match format {
                OutputFormat::Json => print_json(&out),
                OutputFormat::Table | OutputFormat::Pretty => println!(
                    "wrote {} bytes (stream {}) to {}",
                    out.frame_size, out.stream_id, out.output
                ),
            }
        }
        None => print_raw(&buf).map_err(|err| io_error("writing frame to stdout", err))?,
    }

    Ok(SUCCESS)
}

fn split_assignment(assignment: &str) -> CliResult<(&str, &str)> {
    assignment
        .split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| {
            CliError::new(
                USAGE,
                format!("expected NAME=VALUE, got '{assignment}'"),
            )
        })
}

fn parse_value(ty: FieldType, text: &str) -> Result<Value, String> {
    fn num<T: std::str::FromStr>(text: &str) -> Result<T, String> {
        text.trim()
            .parse::<T>()
            .map_err(|_| format!("invalid number '{text}'"))
    }

    let value = match ty {
        FieldType::I8 => Value::I8(num(text)?),
        FieldType::U8 => Value::U8(num(text)?),
        FieldType::I16 => Value::I16(num(text)?),
        FieldType::U16 => Value::U16(num(text)?),
        FieldType::I32 => Value::I32(num(text)?),
        FieldType::U32 => Value::U32(num(text)?),
        FieldType::I64 => Value::I64(num(text)?),
        FieldType::U64 => Value::U64(num(text)?),
        FieldType::F32 => Value::F32(num(text)?),
        FieldType::F64 => Value::F64(num(text)?),
        FieldType::Bytes(_) => match text.strip_prefix("hex:") {
            Some(digits) => {
                Value::Bytes(hex::decode(digits).map_err(|err| format!("invalid hex: {err}"))?)
            }
            None => Value::Bytes(text.as_bytes().to_vec()),
        },
    };
    Ok(value)
}
