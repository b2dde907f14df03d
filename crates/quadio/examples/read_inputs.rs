//! Read all four channels of a digital input module in one exchange.
//!
//! Usage:
//!   cargo run --example read_inputs -- /dev/ttyACM0

use quadio::{IoModule, SerialTransport, ValueKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyACM0".to_string());

    let transport = SerialTransport::new(&port);
    let mut module = IoModule::di4(Box::new(transport));
    module.open().await?;

    let status = module.identify(0).await?;
    anyhow::ensure!(status.is_ok(), "identify failed: {status}");
    println!(
        "{} ({}), firmware rev {}",
        module.device_class_name().unwrap_or("unknown class"),
        module.device_type_name().unwrap_or("unknown type"),
        module.device_id().map(|id| id.revision_fw).unwrap_or(0),
    );

    let selector = [true; 4];
    match module.get_io_group(&selector, ValueKind::Digital).await? {
        quadio::Reply::Value(values) => {
            for (channel, value) in values.iter().enumerate() {
                println!("channel {channel}: {:?}", value.as_digital());
            }
        }
        quadio::Reply::Failed(status) => {
            eprintln!("group read failed: {status}");
        }
    }

    module.close().await?;
    Ok(())
}
