use assert_cmd::Command;
use clap::Parser;
use curseforge_publish::cli::{run, Cli};
use predicates::prelude::*;
use serial_test::serial;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLUGIN_ENV: &[&str] = &[
    "PLUGIN_API_KEY",
    "CURSEFORGE_API_KEY",
    "PLUGIN_PROJECT",
    "PLUGIN_FILE",
    "PLUGIN_TITLE",
    "PLUGIN_RELEASE",
    "PLUGIN_NOTE",
    "PLUGIN_CHANGELOG",
    "PLUGIN_TYPE",
    "PLUGIN_GAMES",
    "PLUGIN_RELATIONS",
    "PLUGIN_MANIFEST",
    "PLUGIN_METADATA",
];

fn clear_plugin_env() {
    for key in PLUGIN_ENV {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn flags_map_onto_settings() {
    clear_plugin_env();
    let cli = Cli::parse_from([
        "curseforge-publish",
        "--api-key",
        "k",
        "--project",
        "32274",
        "--file",
        "build/libs/mod.jar",
        "--title",
        "Mod 1.2.0",
        "--games",
        "7498,8134",
        "--manifest",
        "manifest.json",
    ]);
    let settings = cli.settings();

    assert_eq!(settings.api_key, "k");
    assert_eq!(settings.project, 32274);
    assert_eq!(settings.file, std::path::PathBuf::from("build/libs/mod.jar"));
    assert_eq!(settings.title, "Mod 1.2.0");
    assert_eq!(settings.release, "release");
    assert_eq!(settings.changelog_type, "markdown");
    assert_eq!(settings.games, vec![7498, 8134]);
    assert_eq!(settings.manifest.as_deref(), Some("manifest.json"));
    assert_eq!(settings.relations, None);
    assert_eq!(settings.metadata, None);
}

#[test]
#[serial]
fn plugin_environment_is_honoured() {
    clear_plugin_env();
    std::env::set_var("CURSEFORGE_API_KEY", "from-alias");
    std::env::set_var("PLUGIN_PROJECT", "12");
    std::env::set_var("PLUGIN_RELEASE", "beta");
    std::env::set_var("PLUGIN_CHANGELOG", "CHANGELOG.md");
    std::env::set_var("PLUGIN_TYPE", "html");
    std::env::set_var("PLUGIN_GAMES", "1,2,3");

    let settings = Cli::parse_from(["curseforge-publish"]).settings();
    clear_plugin_env();

    assert_eq!(settings.api_key, "from-alias");
    assert_eq!(settings.project, 12);
    assert_eq!(settings.release, "beta");
    assert_eq!(settings.note, "CHANGELOG.md");
    assert_eq!(settings.changelog_type, "html");
    assert_eq!(settings.games, vec![1, 2, 3]);
}

#[test]
#[serial]
fn primary_env_wins_over_alias() {
    clear_plugin_env();
    std::env::set_var("PLUGIN_API_KEY", "primary");
    std::env::set_var("CURSEFORGE_API_KEY", "alias");

    let settings = Cli::parse_from(["curseforge-publish"]).settings();
    clear_plugin_env();

    assert_eq!(settings.api_key, "primary");
}

#[test]
fn binary_without_api_key_exits_non_zero() {
    let mut cmd = Command::cargo_bin("curseforge-publish").expect("Binary exists");
    for key in PLUGIN_ENV {
        cmd.env_remove(key);
    }
    cmd.arg("--project").arg("1").arg("--file").arg("Cargo.toml");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no apikey provided"));
}

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
#[serial]
async fn emits_trace_initialised_event() {
    clear_plugin_env();
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let cli = Cli::parse_from(["curseforge-publish"]);
    let result = run(cli).await;
    assert!(result.is_err(), "run without settings must fail validation");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}

#[tokio::test]
#[serial]
async fn run_publishes_against_configured_endpoints() {
    clear_plugin_env();
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("mod-2.0.jar");
    std::fs::write(&artifact, b"jar").unwrap();
    let manifest = dir.path().join("manifest.json");
    std::fs::write(
        &manifest,
        r#"{"files":[{"projectID":306612,"fileID":1,"required":true}]}"#,
    )
    .unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/addon/306612"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"slug":"fabric-api"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/projects/42/upload-file"))
        .and(header("x-api-token", "ci-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"id":555,"errorCode":0,"errorMessage":""}"#),
        )
        .expect(1)
        .mount(&server)
        .await;
    let base = server.uri();

    let cli = Cli::parse_from([
        "curseforge-publish",
        "--api-key",
        "ci-token",
        "--project",
        "42",
        "--file",
        artifact.to_str().unwrap(),
        "--title",
        "2.0",
        "--games",
        "9990",
        "--manifest",
        manifest.to_str().unwrap(),
        "--upload-url",
        base.as_str(),
        "--lookup-url",
        base.as_str(),
    ]);

    let report = run(cli).await.expect("publish succeeds");
    assert_eq!(report.file_id, 555);
    assert_eq!(report.relations, Some(1));

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.path(), "/api/v2/addon/306612");
    assert_eq!(requests[1].url.path(), "/api/projects/42/upload-file");
    let body = String::from_utf8_lossy(&requests[1].body);
    assert!(body.contains(r#"filename="mod-2.0.jar""#));
    assert!(body.contains(r#""relations":{"projects":[{"slug":"fabric-api","type":"requiredDependency"}]}"#));
    assert!(body.contains(r#""gameVersions":[9990]"#));
}
