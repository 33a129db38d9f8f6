//! Runs the `statusrep` binary against the stub status endpoint.

use statusrep_devkit::{status_body, StatusCode, StatusStub};
use std::io::Write;
use std::process::Output;
use tokio::process::Command;

const SCRUBBED_ENV: &[&str] = &[
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
    "RUST_LOG",
    "STATUSREP_CONFIG",
    "STATUSREP_HOSTS_FILE",
    "STATUSREP_ROOT_URL",
    "STATUSREP_LOG_LEVEL",
    "STATUSREP_LOG_FORMAT",
    "STATUSREP_MAX_CONCURRENCY",
];

async fn statusrep(args: &[&str], workdir: &std::path::Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_statusrep"));
    cmd.args(args).current_dir(workdir);
    for var in SCRUBBED_ENV {
        cmd.env_remove(var);
    }
    cmd.output().await.unwrap()
}

#[tokio::test]
async fn test_cli_prints_report_for_healthy_hosts() {
    let stub = StatusStub::start().await.unwrap();
    stub.set_json("h1", status_body("foo", "1.1", 4, 1, 3));
    stub.set_body("h2", StatusCode::OK, r#"{"invalid}}"#);

    let workdir = tempfile::tempdir().unwrap();
    let hosts_path = workdir.path().join("hosts.txt");
    let mut hosts_file = std::fs::File::create(&hosts_path).unwrap();
    writeln!(hosts_file, "  h1  \n\n h2\n").unwrap();

    let output = statusrep(
        &["-f", hosts_path.to_str().unwrap(), "-r", &stub.base_url(), "-l", "warn"],
        workdir.path(),
    )
    .await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "foo,1.1,0.25\n");
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("could not get status for host"), "stderr: {stderr}");
    assert!(stderr.contains("h2"));
}

#[tokio::test]
async fn test_cli_reads_config_file() {
    let stub = StatusStub::start().await.unwrap();
    stub.set_json("web-1", status_body("web", "3.0", 8, 8, 0));

    let workdir = tempfile::tempdir().unwrap();
    std::fs::write(workdir.path().join("hosts.txt"), "web-1\n").unwrap();
    std::fs::write(
        workdir.path().join("statusrep.toml"),
        format!(
            "hosts_file = \"hosts.txt\"\nroot_url = \"{}\"\nlog_format = \"json\"\nmax_concurrency = 2\n",
            stub.base_url()
        ),
    )
    .unwrap();

    let output = statusrep(&[], workdir.path()).await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "web,3.0,1.00\n");
}

#[tokio::test]
async fn test_cli_requires_hosts_file() {
    let workdir = tempfile::tempdir().unwrap();
    let output = statusrep(&[], workdir.path()).await;

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("hosts file is required."));
}

#[tokio::test]
async fn test_cli_fails_on_unreadable_hosts_file() {
    let workdir = tempfile::tempdir().unwrap();
    let output = statusrep(&["-f", "missing.txt"], workdir.path()).await;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.txt"));
}
