//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_api;
pub mod scripted;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use centro_control::api::ElectoralApi;
use centro_control::config::{BackPolicy, Config};
use centro_control::store::Store;
use centro_control::ui::ViewController;

use scripted::ScriptedTransport;

pub const LIST_PATH: &str = "/api/municipios";
pub const HEALTH_PATH: &str = "/api/health";

pub fn detail_path(id: u64) -> String {
    format!("/api/municipios/{}", id)
}

/// Config pointing at `base_url` with a fast retry budget.
pub fn test_config(base_url: &str, max_attempts: u32) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_ms = 500;
    config.retry.max_attempts = max_attempts;
    config.retry.base_backoff_ms = 10;
    config
}

/// Create a temporary config file with the given TOML content.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

// -- Payload fixtures ---------------------------------------------------------

pub fn list_body(entries: &[(u64, &str)]) -> String {
    let items: Vec<_> = entries
        .iter()
        .map(|(id, nombre)| json!({"id": id, "nombre": nombre}))
        .collect();
    json!({ "municipalities": items }).to_string()
}

/// Detail payload with one alliance per `(name, concejales)` pair. Each
/// alliance also has an intendente.
pub fn detail_body(id: u64, nombre: &str, alliances: &[(&str, usize)]) -> String {
    let alianzas: Vec<_> = alliances
        .iter()
        .enumerate()
        .map(|(i, (name, concejales))| {
            let titulares: Vec<_> = (0..*concejales)
                .map(|n| json!({"nombre": format!("{} concejal {}", name, n), "orden": n + 1}))
                .collect();
            json!({
                "id": i + 1,
                "nombre": name,
                "candidatos": {
                    "intendente": {"nombre": format!("{} intendente", name), "dni": "20111222"},
                    "concejales_titulares": titulares,
                    "concejales_suplentes": []
                }
            })
        })
        .collect();
    json!({ "municipio": { "id": id, "nombre": nombre, "alianzas": alianzas } }).to_string()
}

// -- Controller builders ------------------------------------------------------

/// Controller over a scripted transport, with the given retry budget and
/// back policy.
pub fn scripted_controller(
    transport: &ScriptedTransport,
    max_attempts: u32,
    back_policy: BackPolicy,
) -> ViewController<ScriptedTransport> {
    let mut config = test_config("http://api.test", max_attempts);
    config.dashboard.back_policy = back_policy;
    let api = Arc::new(ElectoralApi::new(transport.clone(), &config));
    ViewController::new(api, Store::new(), &config.dashboard)
}
