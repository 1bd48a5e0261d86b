//! GATT Session - Main Entry Point

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatt_session::{
    CharacteristicRef, DeviceSession,
    backend::BluerBackend,
    config::{CliArgs, Command, Settings},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gatt_session=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let args = CliArgs::parse();
    info!(?args, "Starting GATT session");

    let settings = Settings::load(&args).await?;

    let backend = Arc::new(BluerBackend::new().await?);
    let mut session = DeviceSession::new(backend);
    session.set_debug(settings.debug);

    if !session.connect(&settings.options).await {
        error!("No session could be established with a matching device");
        return Err("connection failed".into());
    }

    let outcome = run_command(&mut session, &args.command).await;
    session.disconnect().await;
    outcome
}

async fn run_command(
    session: &mut DeviceSession<BluerBackend>,
    command: &Command,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Info => {
            println!("Device: {}", session.device_id().unwrap_or("<unknown>"));
            if let Some(name) = session.device_name() {
                println!("Name: {}", name);
            }
            Ok(())
        }
        Command::Read {
            service,
            characteristic,
            format,
        } => {
            let target = CharacteristicRef::lookup(*service, *characteristic);
            match session.read_value(&target, *format).await {
                Some(value) => {
                    println!("{}", value);
                    Ok(())
                }
                None => Err("read failed".into()),
            }
        }
        Command::Write {
            service,
            characteristic,
            value,
        } => {
            let payload = decode_payload(value)?;
            let target = CharacteristicRef::lookup(*service, *characteristic);
            match session.write_value(&target, &payload).await {
                Some(()) => {
                    info!("Write acknowledged");
                    Ok(())
                }
                None => Err("write failed".into()),
            }
        }
    }
}

fn decode_payload(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let trimmed = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    hex::decode(trimmed)
}
