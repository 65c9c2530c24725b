use std::fs;
use std::path::Path;

use vigil_agent::config::load_from_str;
use vigil_agent::store::{FileStore, Store};
use vigil_agent::Agent;
use vigil_common::Severity;

fn write_checks(dir: &Path) {
    fs::write(
        dir.join("disk.yml"),
        "root:\n  command: echo 'root is full'; exit 2\n  retry: 0\nboot:\n  command: echo fine\n",
    )
    .unwrap();
    fs::write(
        dir.join("load.yaml"),
        concat!(
            "avg:\n",
            "  command: \"echo 'load ok|load1=9;;;;'\"\n",
            "  nagios_performance: true\n",
            "  thresholds: load1 error > 4\n",
            "  retry: 0\n",
        ),
    )
    .unwrap();
    fs::write(dir.join("README.txt"), "not a check").unwrap();
}

fn config_yaml(checks: &Path, db: &Path, base_interval: f64) -> String {
    format!(
        "agent:\n  name: web1\n  directory: {}\n  base_interval: {base_interval}\n\
         database:\n  kind: file\n  path: {}\n\
         alerter:\n  kind: log\n\
         metrics:\n  kind: none\n",
        checks.display(),
        db.display(),
    )
}

#[tokio::test]
async fn agent_built_from_config_runs_its_checks() {
    let tmp = tempfile::tempdir().unwrap();
    let checks = tmp.path().join("checks");
    fs::create_dir(&checks).unwrap();
    write_checks(&checks);
    let db = tmp.path().join("state.json");

    let config = load_from_str(&config_yaml(&checks, &db, 60.0)).unwrap();
    let mut agent = Agent::from_config(&config).await.unwrap();
    let names: Vec<_> = agent.checks().iter().map(|c| c.name().to_string()).collect();
    assert_eq!(
        names,
        vec!["//web1/disk/boot", "//web1/disk/root", "//web1/load/avg"]
    );

    let summary = agent.perform(1).await.unwrap();
    assert_eq!(summary.checks_run, 3);

    let faults = FileStore::new(&db).get_faults("web1").await.unwrap();
    let summary: Vec<_> = faults
        .iter()
        .map(|f| (f.name.as_str(), f.severity, f.message.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("//web1/disk/root", Severity::Critical, "root is full"),
            ("//web1/load/avg#load1", Severity::Critical, "9 > 4"),
        ]
    );
    assert!(faults.iter().all(|f| f.triggered));
}

#[tokio::test]
async fn counted_run_ticks_and_keeps_registration() {
    let tmp = tempfile::tempdir().unwrap();
    let checks = tmp.path().join("checks");
    fs::create_dir(&checks).unwrap();
    fs::write(checks.join("ping.yml"), "self:\n  command: echo pong\n").unwrap();
    let db = tmp.path().join("state.json");

    let config = load_from_str(&config_yaml(&checks, &db, 1.0)).unwrap();
    let stats = vigil_agent::run::run(config, Some(2)).await.unwrap();
    assert_eq!(stats.ticks, 2);
    assert_eq!(stats.failed_ticks, 0);
    assert!(!stats.cancelled);

    assert!(FileStore::new(&db).get_faults("web1").await.unwrap().is_empty());
    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&db).unwrap()).unwrap();
    assert!(doc["agents"]["web1"].as_i64().unwrap() > 0);
}
