//! Lambda bootstrap for the organization rule reconciler.
//!
//! Serves two triggers from a single function: the CloudFormation custom
//! resource provider (`Create` / `Update` / `Delete`) and the EventBridge rule
//! that fires on `MoveAccount` / `RemoveAccountFromOrganization`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ORGANIZATION_UNIT_ID` | *(required)* | Organizational unit whose accounts feed the rule |
//! | `SNS_TOPIC_ARN` | *(required)* | Rule target |
//! | `REGION` | *(required)* | Region of the event bus |
//! | `EVENT_BUS_NAME` | *(required)* | Central event bus |
//! | `CENTRAL_EVENT_BRIDGE_RULE_NAME` | `CentralEventBridgeRule` | Managed rule name |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod runtime;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{Instrument, error, info, info_span};
use tracing_subscriber::EnvFilter;

use orgbridge_aws::{EventBridgeRouting, OrganizationsDirectory, load_sdk_config};
use orgbridge_core::{Reconciler, ReconcilerConfig};

use crate::runtime::{ErrorReport, Invocation, RuntimeClient};

/// Version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` value.
/// Output is JSON lines without ANSI colors or timestamps; CloudWatch Logs
/// adds its own.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .with_current_span(true)
        .with_ansi(false)
        .without_time()
        .init();

    Ok(())
}

/// Read the log level from the environment.
fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

/// Load configuration and build the reconciler with AWS clients.
async fn build_reconciler() -> Result<Reconciler> {
    let config = ReconcilerConfig::from_env().context("invalid reconciler configuration")?;
    info!(
        organization_unit_id = %config.organization_unit_id,
        event_bus = %config.event_bus_name,
        rule = %config.rule_name,
        region = %config.region,
        "initializing reconciler",
    );

    let sdk_config = load_sdk_config(&config.region).await;
    let directory = Arc::new(OrganizationsDirectory::from_conf(&sdk_config));
    let routing = Arc::new(EventBridgeRouting::from_conf(&sdk_config));

    Reconciler::new(config, directory, routing).context("invalid reconciler configuration")
}

/// Run one invocation and report its result to the Runtime API.
///
/// Handler failures are reported as invocation errors; only failures to talk
/// to the Runtime API itself are returned.
async fn handle_invocation(
    runtime: &RuntimeClient,
    reconciler: &Reconciler,
    invocation: Invocation,
) -> Result<()> {
    if let Some(remaining) = invocation.remaining() {
        info!(
            remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
            function_arn = ?invocation.function_arn,
            trace_id = ?invocation.trace_id,
            "invocation started"
        );
    }

    match reconciler.handle(&invocation.payload).await {
        Ok(response) => {
            info!(?response, "invocation succeeded");
            runtime
                .send_response(&invocation.request_id, &response)
                .await
        }
        Err(e) => {
            let error_type = e.kind();
            let message = format!("{:#}", anyhow::Error::from(e));
            error!(error_type, error = %message, "invocation failed");
            let report = ErrorReport::new(error_type, message);
            runtime.send_error(&invocation.request_id, &report).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&log_level())?;

    let runtime = RuntimeClient::from_env()?;

    let reconciler = match build_reconciler().await {
        Ok(reconciler) => reconciler,
        Err(e) => {
            error!(error = %format!("{e:#}"), "initialization failed");
            let report = ErrorReport::new("InitError", format!("{e:#}"));
            if let Err(report_err) = runtime.send_init_error(&report).await {
                error!(error = %format!("{report_err:#}"), "failed to report init error");
            }
            return Err(e);
        }
    };

    info!(
        version = VERSION,
        runtime_api = runtime.base_url(),
        "orgbridge Lambda runtime started"
    );

    loop {
        let invocation = runtime.next_invocation().await?;
        let span = info_span!("invocation", request_id = %invocation.request_id);
        handle_invocation(&runtime, &reconciler, invocation)
            .instrument(span)
            .await?;
    }
}
