use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::{tempdir, NamedTempFile};

/// Base URL nothing listens on, so every API call fails fast.
const UNREACHABLE: &str = "http://127.0.0.1:9";

fn ragie_import() -> Command {
    let mut cmd = Command::cargo_bin("ragie-import").expect("Binary exists");
    cmd.env_remove("RAGIE_API_KEY").env_remove("RAGIE_BASE_URL");
    cmd
}

fn youtube_export() -> NamedTempFile {
    let file = NamedTempFile::new().expect("Creating temp export failed");
    write(
        file.path(),
        r#"[{"videoId":"abc","title":"T","captions":["line1","line2"]},{"title":"no id"}]"#,
    )
    .expect("Writing temp export failed");
    file
}

#[test]
fn force_and_replace_are_rejected_before_anything_else() {
    ragie_import()
        .args(["import", "youtube", "does-not-exist.json", "--force", "--replace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "--force and --replace flags cannot be used together",
        ));
}

#[test]
fn out_of_range_delay_is_a_config_error() {
    ragie_import()
        .args(["import", "youtube", "videos.json", "--delay", "1e20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("delay must be"));
}

#[test]
fn truncated_wordpress_export_fails() {
    let export = NamedTempFile::new().unwrap();
    write(
        export.path(),
        "<root><post><url>u</url><title>T</title><content>body</content>",
    )
    .unwrap();

    ragie_import()
        .arg("import")
        .arg("wordpress")
        .arg(export.path())
        .args(["--dry-run", "--delay", "0"])
        .env("RAGIE_API_KEY", "test-key")
        .env("RAGIE_BASE_URL", UNREACHABLE)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected end of file"));
}

#[test]
fn missing_api_key_fails() {
    let export = youtube_export();
    ragie_import()
        .arg("import")
        .arg("youtube")
        .arg(export.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("RAGIE_API_KEY"));
}

#[test]
fn unknown_source_type_fails() {
    ragie_import()
        .args(["import", "rss", "feed.xml"])
        .env("RAGIE_API_KEY", "test-key")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown import type: rss"));
}

#[test]
fn missing_source_file_fails() {
    ragie_import()
        .args(["import", "wordpress", "/definitely/not/here.xml"])
        .env("RAGIE_API_KEY", "test-key")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open wordpress source"));
}

#[test]
fn dry_run_survives_an_unreachable_api() {
    let export = youtube_export();
    ragie_import()
        .arg("import")
        .arg("youtube")
        .arg(export.path())
        .args(["--dry-run", "--delay", "0"])
        .env("RAGIE_API_KEY", "test-key")
        .env("RAGIE_BASE_URL", UNREACHABLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("would save document: T"))
        .stdout(predicate::str::contains("1 dry-run, 1 skipped"));
}

#[test]
fn dry_run_over_a_directory_skips_empty_files() {
    let dir = tempdir().unwrap();
    write(dir.path().join("a.txt"), "alpha").unwrap();
    write(dir.path().join("empty.txt"), "").unwrap();

    ragie_import()
        .arg("--dry-run")
        .arg("import")
        .arg("files")
        .arg(dir.path())
        .args(["--delay", "0"])
        .env("RAGIE_API_KEY", "test-key")
        .env("RAGIE_BASE_URL", UNREACHABLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("would save document: a.txt"))
        .stdout(predicate::str::contains("would save document: empty.txt").not());
}

#[test]
fn config_file_supplies_delay() {
    let export = youtube_export();
    let config = NamedTempFile::new().unwrap();
    write(config.path(), "delay: 0\npartition: team-a\n").unwrap();

    ragie_import()
        .arg("import")
        .arg("youtube")
        .arg(export.path())
        .arg("--dry-run")
        .arg("--config")
        .arg(config.path())
        .env("RAGIE_API_KEY", "test-key")
        .env("RAGIE_BASE_URL", UNREACHABLE)
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .success()
        .stdout(predicate::str::contains("would save document: T"));
}

#[test]
fn unparseable_config_file_fails() {
    let config = NamedTempFile::new().unwrap();
    write(config.path(), "delay: [not, a, number]\n").unwrap();

    ragie_import()
        .args(["clear", "--dry-run", "--config"])
        .arg(config.path())
        .env("RAGIE_API_KEY", "test-key")
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse"));
}

#[test]
fn clear_fails_when_documents_cannot_be_listed() {
    ragie_import()
        .args(["clear", "--dry-run"])
        .env("RAGIE_API_KEY", "test-key")
        .env("RAGIE_BASE_URL", UNREACHABLE)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to list documents"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn run_emits_start_event_and_rejects_conflicting_flags() {
    use clap::Parser;
    use ragie_import::cli::{run, Cli};

    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let cli = Cli::parse_from([
        "ragie-import",
        "import",
        "zip",
        "dummy.zip",
        "--force",
        "--replace",
    ]);
    let err = run(cli).await.unwrap_err();
    assert!(err.to_string().contains("cannot be used together"));

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("CLI command started")),
        "Expected a 'CLI command started' trace event, got: {:?}",
        event_msgs
    );
}
