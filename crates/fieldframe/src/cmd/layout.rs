use fieldframe_frame::frame_size;
use serde::Serialize;

use crate::cmd::{load_schema, LayoutArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct FieldRow {
    id: u32,
    name: String,
    #[serde(rename = "type")]
    ty: String,
    offset: u16,
    size: u16,
}

#[derive(Serialize)]
struct LayoutOutput {
    stream_id: u32,
    record_size: usize,
    align: usize,
    frame_size: usize,
    fields: Vec<FieldRow>,
}

pub fn run(args: LayoutArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = load_schema(&args.schema)?;

    let out = LayoutOutput {
        stream_id: schema.stream_id(),
        record_size: schema.record_size(),
        align: schema.align(),
        frame_size: frame_size(&schema),
        fields: schema
            .fields()
            .iter()
            .map(|field| FieldRow {
                id: field.id(),
                name: field.name.clone(),
                ty: field.ty.to_string(),
                offset: field.descriptor.offset,
                size: field.descriptor.size,
            })
            .collect(),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            println!(
                "stream {} | record {} bytes (align {}) | frame {} bytes",
                out.stream_id, out.record_size, out.align, out.frame_size
            );
            let rows = out
                .fields
                .iter()
                .map(|f| {
                    vec![
                        f.id.to_string(),
                        f.name.clone(),
                        f.ty.clone(),
                        f.offset.to_string(),
                        f.size.to_string(),
                    ]
                })
                .collect();
            print_table(&["ID", "NAME", "TYPE", "OFFSET", "SIZE"], rows);
        }
        OutputFormat::Pretty => {
            println!(
                "stream_id={} record_size={} align={} frame_size={}",
                out.stream_id, out.record_size, out.align, out.frame_size
            );
            for f in &out.fields {
                println!(
                    "  id={} name={} type={} offset={} size={}",
                    f.id, f.name, f.ty, f.offset, f.size
                );
            }
        }
    }

    Ok(SUCCESS)
}
