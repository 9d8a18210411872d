use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tti_psu_control::{ConnectionConfig, Model, PowerSupply, TtiPsu, Vxi11Transport};

/// Print the identity, self-test result and per-channel status of a supply.
#[derive(Parser)]
struct Args {
    /// Hostname or IP address of the supply.
    #[arg(default_value = "192.168.0.40")]
    host: String,
    /// VXI-11 logical device name.
    #[arg(default_value = "inst0")]
    resource: String,
    #[arg(long, value_enum, default_value = "pl601-p")]
    model: Model,
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args = Args::parse();
    let config = ConnectionConfig::new(args.host)
        .with_resource(args.resource)
        .with_timeout(Duration::from_secs(args.timeout_secs));

    let transport = Vxi11Transport::connect(&config)
        .await
        .with_context(|| format!("failed to connect to {}", config.host))?;
    let mut psu = TtiPsu::new(transport, args.model.profile());
    psu.open().await?;

    println!("IDN: {}", psu.identify().await?);

    let report = psu.self_test().await?;
    println!("Self test: {} ({})", report.fault_code, report.message);

    for channel in 1..=psu.channel_count() {
        let status = psu.channel_status(channel).await?;
        println!("CH{channel}:");
        println!(
            "  Set      : {:.3} V / {:.3} A",
            status.set_voltage_v, status.set_current_a
        );
        println!(
            "  Measured : {:.3} V / {:.3} A",
            status.measured_voltage_v, status.measured_current_a
        );
        println!(
            "  OVP/OCP  : {:.3} V / {:.3} A",
            psu.get_over_voltage_protection(channel).await?,
            psu.get_over_current_protection(channel).await?
        );
        println!("  Output   : {}", if status.output_on { "ON" } else { "OFF" });
    }

    // Read-only demo: leave the outputs as they were found.
    psu.close_with(tti_psu_control::CloseBehavior::PreserveOutput)
        .await?;
    Ok(())
}
