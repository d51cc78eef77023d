//! Inventory telemetry test for 400ZR_PLUS transceivers
//!
//! Runs the interface-flap and transceiver-on-off scenarios against a gNMI
//! target, or against the built-in simulated DUT.

use clap::{Parser, ValueEnum};
use tracing::{error, info};

use fpkit_common::{Device, ToolConfig, init_tracing};
use fpkit_gnmi::GnmiClient;
use zrp_inventory::{InventoryConfig, Scenario, ScenarioParams, SimDut, run_scenario};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioArg {
    InterfaceFlap,
    TransceiverOnOff,
    All,
}

impl ScenarioArg {
    fn scenarios(self) -> Vec<Scenario> {
        match self {
            ScenarioArg::InterfaceFlap => vec![Scenario::InterfaceFlap],
            ScenarioArg::TransceiverOnOff => vec![Scenario::TransceiverOnOff],
            ScenarioArg::All => Scenario::ALL.to_vec(),
        }
    }
}

/// ZR_PLUS inventory telemetry test
#[derive(Parser, Debug)]
#[command(name = "zrp-inventory")]
#[command(about = "Verify 400ZR_PLUS inventory telemetry across link events")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "zrp_inventory.json5")]
    config: String,

    /// Vendor-specific operational mode for the optical channels
    #[arg(long, default_value_t = 5)]
    operational_mode: u16,

    /// Scenario to run
    #[arg(long, value_enum, default_value_t = ScenarioArg::All)]
    scenario: ScenarioArg,

    /// Run against the built-in simulated DUT instead of the configured target
    #[arg(long)]
    simulate: bool,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,
}

async fn run_all<D: Device>(
    dut: &D,
    config: &InventoryConfig,
    params: &ScenarioParams,
    scenarios: &[Scenario],
) -> usize {
    let mut failed = 0;
    for scenario in scenarios {
        match run_scenario(dut, config, params, *scenario).await {
            Ok(()) => info!("PASS {}", scenario),
            Err(e) => {
                error!("FAIL {}: {}", scenario, e);
                failed += 1;
            }
        }
    }
    failed
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = InventoryConfig::load(&args.config)?;
    let logging = config.logging().clone().with_level_override(args.log_level.as_deref());
    init_tracing(&logging)?;

    let params = ScenarioParams::new(args.operational_mode)?;
    let scenarios = args.scenario.scenarios();

    let failed = if args.simulate {
        let dut = SimDut::two_port(&config.ports.port1, &config.ports.port2);
        info!("Running {} scenario(s) against simulated DUT", scenarios.len());
        run_all(&dut, &config, &params, &scenarios).await
    } else {
        let dut = GnmiClient::connect(config.dut.clone()).await?;
        info!(
            "Running {} scenario(s) against {} ({})",
            scenarios.len(),
            config.dut.name,
            config.dut.address
        );
        run_all(&dut, &config, &params, &scenarios).await
    };

    if failed > 0 {
        anyhow::bail!("{} of {} scenario(s) failed", failed, scenarios.len());
    }
    info!("All scenarios passed");
    Ok(())
}
