use fieldframe_frame::FrameView;
use serde::Serialize;

use crate::cmd::{read_frame, InspectArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{hex_preview, print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct EntryOutput {
    id: u32,
    offset: u16,
    size: u16,
    /// Hex of the bytes the entry points at, absent when it lies outside raw data.
    data: Option<String>,
}

#[derive(Serialize)]
struct InspectOutput {
    stream_id: u32,
    meta_count: u32,
    frame_size: usize,
    raw_size: usize,
    entries: Vec<EntryOutput>,
}

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = read_frame(&args.frame)?;
    let view = FrameView::parse(&frame).map_err(|err| frame_error("inspect", err))?;

    let out = InspectOutput {
        stream_id: view.stream_id(),
        meta_count: view.meta_count(),
        frame_size: view.len(),
        raw_size: view.raw_data().len(),
        entries: view
            .descriptors()
            .map(|desc| EntryOutput {
                id: desc.id,
                offset: desc.offset,
                size: desc.size,
                data: view.field_bytes(&desc).map(hex::encode),
            })
            .collect(),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            println!(
                "stream {} | {} entries | frame {} bytes | raw data {} bytes",
                out.stream_id, out.meta_count, out.frame_size, out.raw_size
            );
            let rows = view
                .descriptors()
                .map(|desc| {
                    vec![
                        desc.id.to_string(),
                        desc.offset.to_string(),
                        desc.size.to_string(),
                        view.field_bytes(&desc)
                            .map(hex_preview)
                            .unwrap_or_else(|| "<out of bounds>".to_string()),
                    ]
                })
                .collect();
            print_table(&["ID", "OFFSET", "SIZE", "DATA"], rows);
        }
        OutputFormat::Pretty => {
            println!(
                "stream_id={} meta_count={} frame_size={} raw_size={}",
                out.stream_id, out.meta_count, out.frame_size, out.raw_size
            );
            for entry in &out.entries {
                println!(
                    "  id={} offset={} size={} data={}",
                    entry.id,
                    entry.offset,
                    entry.size,
                    entry.data.as_deref().unwrap_or("<out of bounds>")
                );
            }
        }
    }

    Ok(SUCCESS)
}
