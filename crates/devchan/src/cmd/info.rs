use devchan_buffer::{CAPACITY, WRITE_LIMIT};
use serde::Serialize;

use crate::cmd::InfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{payload_preview, print_raw, OutputFormat};

#[derive(Serialize)]
struct InfoOutput {
    device_name: String,
    status_name: String,
    status_mode: String,
    capacity: usize,
    write_limit: usize,
    advisory: String,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.module.to_config();
    let out = InfoOutput {
        device_name: config.device_name,
        status_name: config.status_name,
        status_mode: format!("{:o}", config.status_mode),
        capacity: CAPACITY,
        write_limit: WRITE_LIMIT,
        advisory: payload_preview(config.advisory.as_ref()),
    };

    print_info(&out, format);
    Ok(SUCCESS)
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Module Info:");
            println!("  Device node:  {}", out.device_name);
            println!("  Status node:  {} (mode {})", out.status_name, out.status_mode);
            println!("  Capacity:     {} bytes", out.capacity);
            println!("  Write limit:  {}", out.write_limit);
            println!("  Advisory:     {:?}", out.advisory);
        }
        OutputFormat::Raw => print_raw(out.advisory.as_bytes()),
    }
}
