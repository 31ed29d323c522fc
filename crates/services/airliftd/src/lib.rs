//! Airlift Gateway Service (airliftd)
//!
//! A small gateway that lets a mobile device self-enroll into the ad-hoc
//! distribution pipeline and trigger a remote build without manual operator
//! steps. It provides:
//!
//! - **Manifest Responder**: the installation descriptor with the strict
//!   header set the installing client requires
//! - **Device Registry**: idempotent enrollment wrapping the external build
//!   automation tool
//! - **Build Orchestrator**: fire-and-forget build triggering with at most
//!   one tracked build per device, plus read-only status queries
//! - **Static passthrough**: the installation page and its assets
//!
//! All orchestration state is in memory and volatile; a restart starts
//! empty by design.

pub mod api;
pub mod config;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod prelude;
pub mod registry;
