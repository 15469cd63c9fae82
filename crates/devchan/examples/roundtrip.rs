//! Write to the device node, read it back, then poke the status node.
//!
//! Run with: `cargo run --example roundtrip`

use devchan::host::LocalHost;
use devchan::module::{read_to_end, Channel, Module, ModuleConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let host = LocalHost::new();
    let module = Module::init(host.clone(), ModuleConfig::default())?;
    println!(
        "loaded {} as {}",
        module.config().device_name,
        module.device_number()
    );

    let device = module.device();
    device.open();
    let mut cursor = 0;
    for part in ["hello", ", ", "world"] {
        cursor = device.write(part.as_bytes(), cursor)?.offset;
    }
    let (data, _) = read_to_end(device, 0);
    println!("device: {}", String::from_utf8_lossy(&data));
    device.close();

    module.status().write(b"ignored by reads", 0)?;
    let (advisory, _) = read_to_end(module.status(), 0);
    print!("status: {}", String::from_utf8_lossy(&advisory));

    println!("counters: {:?}", device.counters());
    module.teardown();
    println!("host idle after teardown: {}", host.is_idle());
    Ok(())
}
