//! Black-box tests for the `capctl` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use capalloc_testing::{fixtures, CapacityDocBuilder};
use serde_json::{json, Value};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    /// A command isolated from the user's config and environment.
    fn capctl(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_capctl"));
        cmd.arg("--config").arg(self.path("no-config.json"));
        for var in [
            "RUST_LOG",
            "CAPACITY_FILE",
            "DISCOVERED_CAPACITY",
            "SHARED_ALLOC",
            "PRIVATE_ALLOC",
            "ALLOCATION_FILE",
            "OLD_ALLOC",
            "NEW_ALLOC",
            "CAPCTL_ISOLATION_CEILING",
            "CAPCTL_DOMAIN_SHARE_CEILING",
            "CAPCTL_LOG_LEVEL",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn run_scenario_succeeds() {
    let ws = Workspace::new();
    let capacity = ws.write("capacity.json", &fixtures::scenario_document());
    let out_dir = ws.path("out");

    let output = ws
        .capctl()
        .args(["run", "--capacity-file"])
        .arg(&capacity)
        .arg("--out-dir")
        .arg(&out_dir)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output), json!({"status": "ok"}));
    assert_eq!(
        read(&out_dir.join("shared.json"))["shared_allocations"]["dc2"]["podA-pair"],
        json!({"cpu": 50, "mem": 50, "storage": 50})
    );
}

#[test]
fn normalize_reads_capacity_file_from_env() {
    let ws = Workspace::new();
    let capacity = ws.write("capacity.json", &fixtures::scenario_document());

    let output = ws
        .capctl()
        .arg("normalize")
        .env("CAPACITY_FILE", &capacity)
        .output()
        .unwrap();

    assert!(output.status.success());
    let descriptor = stdout_json(&output);
    assert_eq!(descriptor["data_centers"], json!(["dc1", "dc2"]));
    assert_eq!(descriptor["pods"]["podA"], json!({"dc": "dc1", "pair_dc": "dc2"}));
}

#[test]
fn exhaustion_exits_nonzero_with_message() {
    let ws = Workspace::new();
    let capacity = ws.write("capacity.json", &fixtures::exhaustion_document());

    let output = ws
        .capctl()
        .args(["run", "--capacity-file"])
        .arg(&capacity)
        .arg("--out-dir")
        .arg(ws.path("out"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("insufficient cpu in dc1 for shared pool"), "{stderr}");
}

#[test]
fn missing_shared_dc_is_a_configuration_error() {
    let ws = Workspace::new();
    let doc = CapacityDocBuilder::new(&["dc1", "dc2"])
        .shared("dc1", 100, 100, 100)
        .build();
    let capacity = ws.write("capacity.json", &doc);

    let output = ws
        .capctl()
        .args(["normalize", "--capacity-file"])
        .arg(&capacity)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("shared pool missing DC: dc2"));
}

#[test]
fn validate_failure_prints_report_and_exits_nonzero() {
    let ws = Workspace::new();
    let capacity = ws.write("capacity.json", &fixtures::scenario_document());
    let out_dir = ws.path("out");
    let run = ws
        .capctl()
        .args(["run", "--capacity-file"])
        .arg(&capacity)
        .arg("--out-dir")
        .arg(&out_dir)
        .output()
        .unwrap();
    assert!(run.status.success());

    let output = ws
        .capctl()
        .arg("validate")
        .env("ALLOCATION_FILE", out_dir.join("allocation.json"))
        .args(["--domain-share-ceiling", "0.4"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout_json(&output),
        json!({
            "status": "failed",
            "errors": [
                "podA exceeds 40% CPU policy in dc1.",
                "podA-pair exceeds 40% CPU policy in dc2."
            ]
        })
    );
}

#[test]
fn invalid_ceiling_is_rejected() {
    let ws = Workspace::new();
    let output = ws
        .capctl()
        .arg("validate")
        .arg("--allocation")
        .arg(ws.path("allocation.json"))
        .args(["--isolation-ceiling", "1.5"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("isolation_ceiling must be in (0, 1]"));
}

#[test]
fn diff_writes_output_file() {
    let ws = Workspace::new();
    let old = ws.write("old.json", &json!({"shared_allocations": {"dc1": {"db": {"cpu": 10}}}}));
    let new = ws.write("new.json", &json!({"shared_allocations": {"dc1": {"db": {"cpu": 12.0}}}}));
    let target = ws.path("diff.json");

    let output = ws
        .capctl()
        .arg("diff")
        .arg("--old")
        .arg(&old)
        .arg("--new")
        .arg(&new)
        .arg("--output")
        .arg(&target)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(
        read(&target),
        json!({
            "added": {},
            "removed": {},
            "changed": {"shared_allocations.dc1.db.cpu": {"old": 10, "new": 12}}
        })
    );
}

#[test]
fn extract_pod_from_pipeline_output() {
    let ws = Workspace::new();
    let capacity = ws.write("capacity.json", &fixtures::two_customer_document());
    let out_dir = ws.path("out");
    // two_customer_document breaches isolation, so the run itself fails
    let run = ws
        .capctl()
        .args(["run", "--capacity-file"])
        .arg(&capacity)
        .arg("--out-dir")
        .arg(&out_dir)
        .output()
        .unwrap();
    assert_eq!(run.status.code(), Some(1));

    let output = ws
        .capctl()
        .args(["extract", "pod", "--shared"])
        .arg(out_dir.join("shared.json"))
        .arg("--private")
        .arg(out_dir.join("private.json"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let doc = stdout_json(&output);
    let shared = &doc["pod_allocations"]["shared"];
    assert!(shared["dc1"]["podA"].is_object());
    assert!(shared["dc1"].get("podB-pair").is_none());
    assert!(doc["pod_allocations"]["private"]["globex"]["dc2"]["podB"].is_object());
}

#[test]
fn extract_ignores_pipeline_variables_from_the_shell() {
    let ws = Workspace::new();
    let capacity = ws.write("capacity.json", &fixtures::scenario_document());
    let out_dir = ws.path("out");
    let run = ws
        .capctl()
        .args(["run", "--capacity-file"])
        .arg(&capacity)
        .arg("--out-dir")
        .arg(&out_dir)
        .output()
        .unwrap();
    assert!(run.status.success());

    let mut cmd = ws.capctl();
    cmd.env("DISCOVERED_CAPACITY", ws.path("missing.json"));
    let output = cmd
        .args(["extract", "db", "--shared"])
        .arg(out_dir.join("shared.json"))
        .arg("--private")
        .arg(out_dir.join("private.json"))
        .output()
        .unwrap();
    assert!(!output.status.success());

    let output = ws
        .capctl()
        .args(["extract", "db", "--shared"])
        .arg(out_dir.join("shared.json"))
        .arg("--private")
        .arg(out_dir.join("private.json"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc = stdout_json(&output);
    assert_eq!(
        doc["db_allocations"]["shared"]["dc1"],
        json!({"cpu": 10, "mem": 10, "storage": 10})
    );
}
