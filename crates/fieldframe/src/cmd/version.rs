use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("fieldframe {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: fieldframe");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("FIELDFRAME_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("FIELDFRAME_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_endian: {}", target_endian());
    println!("frame_header_bytes: {}", fieldframe_frame::HEADER_SIZE);
    println!("descriptor_bytes: {}", fieldframe_schema::DESCRIPTOR_SIZE);

    Ok(SUCCESS)
}

// Frames use native byte order, so readers need to know the producer's.
fn target_endian() -> &'static str {
    if cfg!(target_endian = "little") {
        "little"
    } else {
        "big"
    }
}
