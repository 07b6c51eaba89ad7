//! Integration tests for the Lizmap API handlers.
//!
//! Uses `tower::ServiceExt::oneshot` to call handlers without binding a real
//! TCP port. The host is made of fakes, every test gets a fresh one.

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use lizmap_api::{ApiState, build_api_router};
use lizmap_core::config::BackendKind;
use lizmap_core::{EnvSource, LizmapConfig, LizmapError};
use lizmap_host::Host;
use lizmap_host::backend::PluginBackend;
use lizmap_host::environment::HostManifest;
use lizmap_host::services::{ServiceDescriptor, StaticServiceRegistry};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt; // .oneshot()

const REVEAL: &str = "QGIS_SERVER_LIZMAP_REVEAL_SETTINGS";

// ── Fakes ─────────────────────────────────────────────────────

/// Plugin backend answering from a table, counting calls.
struct FakeBackend {
    kind: BackendKind,
    plugins: Vec<String>,
    metadata: HashMap<(String, String), String>,
    calls: AtomicUsize,
}

impl FakeBackend {
    fn new(kind: BackendKind, plugins: &[&str], metadata: &[(&str, &str, &str)]) -> Self {
        Self {
            kind,
            plugins: plugins.iter().map(|p| p.to_string()).collect(),
            metadata: metadata
                .iter()
                .map(|(p, k, v)| ((p.to_string(), k.to_string()), v.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl PluginBackend for FakeBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn list_plugins(&self) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.plugins.clone()
    }

    fn plugin_metadata(&self, plugin: &str, key: &str) -> Result<String, LizmapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.metadata
            .get(&(plugin.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| LizmapError::PluginNotFound(plugin.to_string()))
    }
}

struct Fixture {
    backend: Arc<FakeBackend>,
    manifest_yaml: String,
    services: Vec<&'static str>,
    runtime_manifest: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            backend: Arc::new(FakeBackend::new(
                BackendKind::Qgis,
                &["lizmap_server", "cadastre"],
                &[
                    ("lizmap_server", "name", "Lizmap server"),
                    ("lizmap_server", "version", "2.9.1"),
                    ("lizmap_server", "commitnumber", "1"),
                    ("cadastre", "version", "1.19.0"),
                ],
            )),
            manifest_yaml: r#"
qgis:
  version: "3.16.0-Hannover"
  version_int: 31600
  dev_version: exported
fonts: ["DejaVu Sans", "Noto Sans"]
libraries:
  gdal: "3080400"
  python: "3.11.2"
  qt: "5.15.8"
"#
            .to_string(),
            services: vec!["WMS", "WFS", "ATLAS", "OTHER"],
            runtime_manifest: None,
            env: HashMap::from([(REVEAL.to_string(), "TRUE".to_string())]),
        }
    }

    fn state(&self) -> ApiState {
        let manifest = HostManifest::from_yaml(&self.manifest_yaml).unwrap();
        let services = self
            .services
            .iter()
            .map(|name| ServiceDescriptor {
                name: name.to_string(),
                version: None,
            })
            .collect();
        let host = Host::new(
            self.backend.clone(),
            Arc::new(StaticServiceRegistry::new(services)),
            Arc::new(manifest),
            self.runtime_manifest.clone(),
        );
        let env: Arc<dyn EnvSource> = Arc::new(self.env.clone());
        ApiState::new(Arc::new(host), env, &LizmapConfig::default())
    }

    fn app(&self) -> axum::Router {
        build_api_router(self.state(), "/lizmap")
    }
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn server_json(fixture: &Fixture) -> serde_json::Value {
    let resp = fixture.app().oneshot(get_req("/lizmap/server.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// ── Authorization ─────────────────────────────────────────────

#[tokio::test]
async fn server_json_without_reveal_setting_returns_404() {
    let mut fixture = Fixture::new();
    fixture.env.clear();
    let resp = fixture.app().oneshot(get_req("/lizmap/server.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let j = body_json(resp).await;
    assert_eq!(j["error"], "Bad request error");
    assert_eq!(j["message"], "Invalid request");
    // Nothing was gathered from the host
    assert_eq!(fixture.backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn server_json_without_reveal_setting_hides_format_errors() {
    let mut fixture = Fixture::new();
    fixture.env.clear();
    let resp = fixture
        .app()
        .oneshot(get_req("/lizmap/server.json?f=xml"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let j = body_json(resp).await;
    assert_eq!(j["message"], "Invalid request");
    assert_eq!(fixture.backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn server_json_with_false_reveal_setting_returns_404() {
    let mut fixture = Fixture::new();
    fixture.env.insert(REVEAL.to_string(), "no".to_string());
    let resp = fixture.app().oneshot(get_req("/lizmap/server.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Document shape ────────────────────────────────────────────

#[tokio::test]
async fn server_json_has_stable_shape() {
    let j = server_json(&Fixture::new()).await;
    for key in ["version", "tag", "name", "commit_id", "version_int", "py_qgis_server", "py_qgis_server_version"] {
        assert!(j["qgis_server"]["metadata"].get(key).is_some(), "metadata.{key} missing");
    }
    for key in ["found", "version", "build_id", "commit_id", "stable_release", "stable"] {
        assert!(j["qgis_server"]["py_qgis_server"].get(key).is_some(), "py_qgis_server.{key} missing");
    }
    assert!(j["qgis_server"]["services"].is_array());
    assert!(j["qgis_server"]["plugins"].is_object());
    assert!(j["fonts"].is_array());
    for key in ["gdal", "python", "qt"] {
        assert!(j["environment"].get(key).is_some(), "environment.{key} missing");
    }
}

#[tokio::test]
async fn server_json_parses_host_version() {
    let j = server_json(&Fixture::new()).await;
    let meta = &j["qgis_server"]["metadata"];
    assert_eq!(meta["version"], "3.16.0");
    assert_eq!(meta["name"], "Hannover");
    assert_eq!(meta["tag"], "final-3_16_0");
    assert_eq!(meta["version_int"], 31600);
    assert_eq!(meta["commit_id"], "");
}

#[tokio::test]
async fn server_json_version_without_codename_degrades() {
    let mut fixture = Fixture::new();
    fixture.manifest_yaml = "qgis:\n  version: \"3.34.4\"\n".to_string();
    let j = server_json(&fixture).await;
    let meta = &j["qgis_server"]["metadata"];
    assert_eq!(meta["version"], "3.34.4");
    assert_eq!(meta["name"], "");
    assert_eq!(meta["tag"], "");
}

#[tokio::test]
async fn server_json_reports_dev_build_commit() {
    let mut fixture = Fixture::new();
    fixture.manifest_yaml =
        "qgis:\n  version: \"3.28.1-Firenze\"\n  dev_version: \"288d2cacb5\"\n".to_string();
    let j = server_json(&fixture).await;
    assert_eq!(j["qgis_server"]["metadata"]["commit_id"], "288d2cacb5");
    assert_eq!(j["qgis_server"]["metadata"]["version_int"], 32801);
}

#[tokio::test]
async fn server_json_reports_fonts_and_libraries() {
    let j = server_json(&Fixture::new()).await;
    assert_eq!(j["fonts"], serde_json::json!(["DejaVu Sans", "Noto Sans"]));
    assert_eq!(j["environment"]["gdal"], "3080400");
    assert_eq!(j["environment"]["python"], "3.11.2");
    assert_eq!(j["environment"]["qt"], "5.15.8");
}

// ── Plugins ───────────────────────────────────────────────────

#[tokio::test]
async fn server_json_describes_active_plugins() {
    let j = server_json(&Fixture::new()).await;
    let lizmap = &j["qgis_server"]["plugins"]["lizmap_server"];
    assert_eq!(lizmap["name"], "Lizmap server");
    assert_eq!(lizmap["version"], "2.9.1");
    assert_eq!(lizmap["commitNumber"], "1");
    assert_eq!(lizmap["commitSha1"], "unknown");
    assert_eq!(lizmap["dateTime"], "unknown");
    assert_eq!(lizmap["repository"], "unknown");

    let cadastre = &j["qgis_server"]["plugins"]["cadastre"];
    assert_eq!(cadastre["version"], "1.19.0");
    assert_eq!(cadastre["name"], "unknown");
}

#[tokio::test]
async fn server_json_backfills_expected_plugins() {
    let j = server_json(&Fixture::new()).await;
    let plugins = &j["qgis_server"]["plugins"];
    assert_eq!(plugins["wfsOutputExtension"], serde_json::json!({ "version": "not found" }));
    assert_eq!(plugins["atlasprint"], serde_json::json!({ "version": "not found" }));
    // Active expected plugin keeps its full record
    assert_eq!(plugins["lizmap_server"]["version"], "2.9.1");
    assert_eq!(plugins.as_object().unwrap().len(), 4);
}

// ── Services ──────────────────────────────────────────────────

#[tokio::test]
async fn server_json_lists_registered_services_in_probe_order() {
    let mut fixture = Fixture::new();
    fixture.services = vec!["LIZMAP", "WFS", "OTHER", "WMS"];
    let j = server_json(&fixture).await;
    assert_eq!(j["qgis_server"]["services"], serde_json::json!(["WMS", "WFS", "LIZMAP"]));
}

#[tokio::test]
async fn server_json_without_services_is_empty_list() {
    let mut fixture = Fixture::new();
    fixture.services.clear();
    let j = server_json(&fixture).await;
    assert_eq!(j["qgis_server"]["services"], serde_json::json!([]));
}

// ── Custom headers ────────────────────────────────────────────

#[tokio::test]
async fn custom_headers_field_omitted_unless_requested() {
    let j = server_json(&Fixture::new()).await;
    assert!(j["qgis_server"].get("support_custom_headers").is_none());
}

#[tokio::test]
async fn custom_headers_detected_when_requested() {
    let fixture = Fixture::new();
    let req = Request::builder()
        .uri("/lizmap/server.json?CHECK_CUSTOM_HEADERS=yes")
        .header("X-Check-Custom-Headers", "1")
        .body(Body::empty())
        .unwrap();
    let j = body_json(fixture.app().oneshot(req).await.unwrap()).await;
    assert_eq!(j["qgis_server"]["support_custom_headers"], true);

    let resp = fixture
        .app()
        .oneshot(get_req("/lizmap/server.json?check_custom_headers=true"))
        .await
        .unwrap();
    let j = body_json(resp).await;
    assert_eq!(j["qgis_server"]["support_custom_headers"], false);
}

// ── Alternate runtime ─────────────────────────────────────────

#[tokio::test]
async fn plain_qgis_reports_py_qgis_server_not_used() {
    let j = server_json(&Fixture::new()).await;
    let py = &j["qgis_server"]["py_qgis_server"];
    assert_eq!(py["found"], false);
    assert_eq!(py["version"], "not used");
    assert!(py["build_id"].is_null());
    assert!(py["commit_id"].is_null());
    assert_eq!(j["qgis_server"]["metadata"]["py_qgis_server"], false);
}

#[tokio::test]
async fn py_qgis_server_probe_failure_is_reported_not_raised() {
    let mut fixture = Fixture::new();
    fixture.backend = Arc::new(FakeBackend::new(BackendKind::PyQgisServer, &[], &[]));
    fixture.runtime_manifest = Some(PathBuf::from("/nonexistent/pyqgisserver.json"));
    let j = server_json(&fixture).await;
    let py = &j["qgis_server"]["py_qgis_server"];
    assert_eq!(py["found"], false);
    assert_eq!(py["version"], "error while fetching py-qgis-server version");
    assert_eq!(py["stable"], false);
    assert_eq!(
        j["qgis_server"]["metadata"]["py_qgis_server_version"],
        "error while fetching py-qgis-server version"
    );
}

#[tokio::test]
async fn py_qgis_server_manifest_is_reported() {
    let mut manifest = tempfile::NamedTempFile::new().unwrap();
    write!(manifest, "version: \"1.8.7\"\nbuildid: 142\ncommitid: \"9d8c7b6\"\n").unwrap();

    let mut fixture = Fixture::new();
    fixture.backend = Arc::new(FakeBackend::new(BackendKind::PyQgisServer, &[], &[]));
    fixture.runtime_manifest = Some(manifest.path().to_path_buf());
    let j = server_json(&fixture).await;
    let py = &j["qgis_server"]["py_qgis_server"];
    assert_eq!(py["found"], true);
    assert_eq!(py["version"], "1.8.7");
    assert_eq!(py["build_id"], 142);
    assert_eq!(py["commit_id"], "9d8c7b6");
    assert_eq!(py["stable"], true);
    assert_eq!(py["stable_release"], true);
    assert_eq!(j["qgis_server"]["metadata"]["py_qgis_server"], true);
}

// ── Format negotiation ────────────────────────────────────────

#[tokio::test]
async fn server_json_is_application_json() {
    let resp = Fixture::new().app().oneshot(get_req("/lizmap/server.json")).await.unwrap();
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
}

#[tokio::test]
async fn server_json_renders_html_on_request() {
    let resp = Fixture::new()
        .app()
        .oneshot(get_req("/lizmap/server.json?f=html"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("<title>Server information</title>"));
}

#[tokio::test]
async fn unsupported_format_returns_400() {
    let resp = Fixture::new()
        .app()
        .oneshot(get_req("/lizmap/server.json?f=xml"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Landing & routing ─────────────────────────────────────────

#[tokio::test]
async fn landing_lists_server_info_handler() {
    for uri in ["/lizmap", "/lizmap/", "/lizmap/index.json"] {
        let resp = Fixture::new().app().oneshot(get_req(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let j = body_json(resp).await;
        let links = j["links"].as_array().unwrap();
        let server = links
            .iter()
            .find(|l| l["operationId"] == "server")
            .expect("server link");
        assert_eq!(server["href"], "/lizmap/server.json");
        assert_eq!(server["rel"], "data");
        assert_eq!(server["title"], "Handler Lizmap API server info");
        assert_eq!(server["parameters"][0]["name"], "CHECK_CUSTOM_HEADERS");
    }
}

#[tokio::test]
async fn landing_does_not_require_reveal_setting() {
    let mut fixture = Fixture::new();
    fixture.env.clear();
    let resp = fixture.app().oneshot(get_req("/lizmap/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_path_returns_404() {
    let resp = Fixture::new()
        .app()
        .oneshot(get_req("/lizmap/server.jsonx"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let j = body_json(resp).await;
    assert_eq!(j["error"], "Not found");
}
