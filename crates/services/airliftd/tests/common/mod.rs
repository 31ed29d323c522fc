//! Shared fixtures for gateway integration tests.
//!
//! Each test spawns its own gateway on an ephemeral port, backed by a
//! scratch directory holding the public files and a stub build tool. The
//! stub is a shell script that appends every invocation to `tool.log`
//! before running the test-provided body, so tests can assert exactly how
//! often (and with which arguments) the external tool was touched.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use std::time::Duration;

use airliftd::api::{GatewayState, setup_api};
use airliftd::config::GatewayConfig;
use tempfile::TempDir;

pub struct TestGateway {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    dir: TempDir,
}

impl TestGateway {
    /// Spawn a gateway whose build tool is a shell script with the given
    /// body. `$@` expands to the invocation arguments.
    pub async fn spawn(tool_body: &str) -> Self {
        Self::spawn_with(tool_body, Duration::from_secs(30), Duration::from_secs(60)).await
    }

    pub async fn spawn_with(
        tool_body: &str,
        register_timeout: Duration,
        trigger_timeout: Duration,
    ) -> Self {
        let dir = tempfile::tempdir().expect("Couldn't create scratch directory");
        let public_dir = dir.path().join("public");
        std::fs::create_dir(&public_dir).expect("Couldn't create public directory");

        let log = dir.path().join("tool.log");
        let tool = dir.path().join("tool.sh");
        let script = format!("#!/bin/sh\necho \"$@\" >> \"{}\"\n{tool_body}\n", log.display());
        std::fs::write(&tool, script).expect("Couldn't write stub tool");
        let mut permissions = std::fs::metadata(&tool)
            .expect("Couldn't stat stub tool")
            .permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(&tool, permissions).expect("Couldn't make stub tool executable");

        let config = GatewayConfig {
            port: 0,
            tool: tool.display().to_string(),
            project_root: dir.path().to_path_buf(),
            public_dir,
            register_timeout,
            trigger_timeout,
            ..GatewayConfig::default()
        };
        let state = GatewayState::new(Arc::new(config));
        let (addr, _handle) = setup_api(state).await.expect("Couldn't start gateway");

        Self {
            addr,
            client: reqwest::Client::new(),
            dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.addr.port())
    }

    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    /// Number of times the stub tool was invoked.
    pub fn tool_invocations(&self) -> usize {
        self.tool_log().lines().count()
    }

    /// Raw invocation log, one argument line per call.
    pub fn tool_log(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("tool.log")).unwrap_or_default()
    }

    pub fn write_public(&self, name: &str, contents: &str) {
        std::fs::write(self.dir.path().join("public").join(name), contents)
            .expect("Couldn't write public file");
    }
}
