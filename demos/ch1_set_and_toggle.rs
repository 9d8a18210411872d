use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::sleep;
use tti_psu_control::{ConnectionConfig, Model, PowerSupply, TtiPsu, Vxi11Transport};

/// Program channel 1, switch it on for a moment, then close (outputs off).
#[derive(Parser)]
struct Args {
    #[arg(default_value = "192.168.0.40")]
    host: String,
    #[arg(default_value = "inst0")]
    resource: String,
    #[arg(long, value_enum, default_value = "pl601-p")]
    model: Model,
    #[arg(long, default_value_t = 10.0)]
    volts: f64,
    #[arg(long, default_value_t = 1.0)]
    amps: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args = Args::parse();
    let config = ConnectionConfig::new(args.host).with_resource(args.resource);

    let transport = Vxi11Transport::connect(&config)
        .await
        .with_context(|| format!("failed to connect to {}", config.host))?;
    let mut psu = TtiPsu::new(transport, args.model.profile());
    psu.open().await?;

    psu.set_voltage(args.volts, 1).await?;
    psu.set_current(args.amps, 1).await?;
    psu.set_over_voltage_protection(args.volts * 1.1, 1)
        .await
        .context("OVP above the model's voltage range, lower --volts")?;

    let readback = psu.get_voltage(1).await?;
    if readback != args.volts {
        anyhow::bail!("CH1 setpoint reads back {readback} V, expected {} V", args.volts);
    }

    psu.set_output_state(true, 1).await?;
    sleep(Duration::from_secs(1)).await;
    println!(
        "CH1 output: {:.3} V / {:.3} A",
        psu.measure_voltage(1).await?,
        psu.measure_current(1).await?
    );

    psu.close().await?;
    Ok(())
}
