//! HTTP surface of the gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use airlift_sdk::build::{BuildStatusResponse, TriggerBuildRequest, TriggerBuildResponse};
use airlift_sdk::device::{RegisterDeviceRequest, RegisterDeviceResponse};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde_json::json;
use tokio::task::JoinHandle;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::config::GatewayConfig;
use crate::manifest::{index, manifest, static_file};
use crate::orchestrator::BuildOrchestrator;
use crate::prelude::*;
use crate::registry::DeviceRegistry;

/// Shared handler state: configuration plus the two stateful components.
///
/// Both components own their state explicitly; constructing a fresh
/// `GatewayState` yields a gateway with empty registries.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub registry: DeviceRegistry,
    pub orchestrator: BuildOrchestrator,
}

impl GatewayState {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self {
            registry: DeviceRegistry::new(Arc::clone(&config)),
            orchestrator: BuildOrchestrator::new(Arc::clone(&config)),
            config,
        }
    }
}

/// Build the router and start serving on the configured port.
///
/// Returns the bound address (the configured port may be 0 to pick an
/// ephemeral one) and the server task handle.
pub async fn setup_api(state: GatewayState) -> Result<(SocketAddr, JoinHandle<Result<()>>)> {
    let api_routes = Router::new()
        .route("/api/register-device", post(register_device))
        .route("/api/trigger-build", post(trigger_build))
        .route("/api/build-status/{udid}", get(build_status))
        .route("/device-info", get(device_info))
        .layer(CorsLayer::permissive());

    let app = Router::new()
        .route("/manifest.plist", get(manifest))
        .route("/", get(index))
        .merge(api_routes)
        .fallback(static_file)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", state.config.port)).await?;
    let addr = listener.local_addr()?;
    tracing::debug!("listening on {addr}");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await?;
        Ok(())
    });

    Ok((addr, handle))
}

async fn register_device(
    State(state): State<GatewayState>,
    Json(payload): Json<RegisterDeviceRequest>,
) -> Result<Json<RegisterDeviceResponse>> {
    let udid = payload.udid.unwrap_or_default();
    let registration = state
        .registry
        .register(udid.trim(), payload.device_name.as_deref())
        .await?;
    Ok(Json(RegisterDeviceResponse {
        success: true,
        udid: registration.udid,
        already_registered: registration.already_registered,
        output: registration.output,
    }))
}

async fn trigger_build(
    State(state): State<GatewayState>,
    Json(payload): Json<TriggerBuildRequest>,
) -> Result<Json<TriggerBuildResponse>> {
    let udid = payload.udid.unwrap_or_default();
    let outcome = state.orchestrator.trigger(udid.trim()).await?;
    let note = outcome
        .already_pending
        .then(|| "A build is already in progress for this device".to_string());
    Ok(Json(TriggerBuildResponse {
        success: true,
        build_id: outcome.record.build_id,
        status: outcome.record.status,
        note,
    }))
}

async fn build_status(
    State(state): State<GatewayState>,
    Path(udid): Path<String>,
) -> Json<BuildStatusResponse> {
    let response = match state.orchestrator.status(&udid).await {
        Some(record) => BuildStatusResponse::Tracked {
            success: true,
            build_id: record.build_id,
            status: record.status,
            started_at: record.started_at,
        },
        None => BuildStatusResponse::Unknown {
            success: false,
            message: format!("No build has been triggered for device {udid}"),
        },
    };
    Json(response)
}

/// Static service facts for the installation page.
async fn device_info(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "platform": state.config.platform,
        "endpoints": {
            "manifest": "/manifest.plist",
            "register": "/api/register-device",
            "trigger": "/api/trigger-build",
            "status": "/api/build-status/{udid}",
        },
    }))
}
