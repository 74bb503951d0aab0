// End-to-end tests driving the deptscan binary over a temp directory.

use std::fs;
use std::path::Path;
use std::process::Command;

use deptscan_dataset::read_table;

fn deptscan(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_deptscan"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run deptscan")
}

fn write(dir: &Path, name: &str, data: &str) {
    fs::write(dir.join(name), data).unwrap();
}

fn setup_workspace(dir: &Path) {
    write(
        dir,
        "whitelist.json",
        r#"{"1": ["chemistry", "economics"], "2": [], "3": ["labor"]}"#,
    );
    write(
        dir,
        "batch.csv",
        "id_text,snippet_1,snippet_2\n\
         a_1,She is a professor of chemistry.,She teaches often.\n\
         b_2,,\n",
    );
    write(dir, "roster.csv", "id_text,name\na_1,Alice\nb_2,Bob\nc_3,Carol\n");
    write(
        dir,
        "pipeline.toml",
        "batch = \"batch.csv\"\n\
         roster = \"roster.csv\"\n\
         complete = \"complete.csv\"\n\
         reprocess = \"reprocess.csv\"\n\
         whitelist = \"whitelist.json\"\n",
    );
}

#[test]
fn run_splits_merges_and_marks_roster() {
    let dir = tempfile::tempdir().unwrap();
    setup_workspace(dir.path());

    let out = deptscan(dir.path(), &["run", "pipeline.toml"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    // Evidence row went to complete with its derived columns.
    let complete = read_table(&dir.path().join("complete.csv")).unwrap();
    assert_eq!(complete.len(), 1);
    assert_eq!(complete.get(0, 0), "a_1");
    let dept = complete.column_index("department_textual").unwrap();
    assert_eq!(complete.get(0, dept), "chemistry");
    let tier = complete.column_index("isPrimaryPattern").unwrap();
    assert_eq!(complete.get(0, tier), "1");
    let teach = complete.column_index("teaching_intensity").unwrap();
    assert_eq!(complete.get(0, teach), "1");
    let keyword = complete.column_index("department_keyword").unwrap();
    assert_eq!(complete.get(0, keyword), "chemistry");

    // The evidence-free row went to reprocess with sentinels.
    let reprocess = read_table(&dir.path().join("reprocess.csv")).unwrap();
    assert_eq!(reprocess.len(), 1);
    assert_eq!(reprocess.get(0, 0), "b_2");
    let dept = reprocess.column_index("department_textual").unwrap();
    assert_eq!(reprocess.get(0, dept), "MISSING");
    let tier = reprocess.column_index("isPrimaryPattern").unwrap();
    assert_eq!(reprocess.get(0, tier), "-1");

    // Both batch rows are marked processed; the untouched roster row is not.
    let roster = read_table(&dir.path().join("roster.csv")).unwrap();
    let processed = roster.column_index("is_processed").unwrap();
    assert_eq!(roster.get(0, processed), "true");
    assert_eq!(roster.get(1, processed), "true");
    assert_eq!(roster.get(2, processed), "");

    // No conflicts on a fresh run; lock file released.
    assert!(!dir.path().join("completed_conflicts.csv").exists());
    assert!(!dir.path().join("deptscan.lock").exists());
}

#[test]
fn rerun_conflicts_everything_and_grows_nothing() {
    let dir = tempfile::tempdir().unwrap();
    setup_workspace(dir.path());

    assert!(deptscan(dir.path(), &["run", "pipeline.toml"]).status.success());
    let out = deptscan(dir.path(), &["run", "pipeline.toml", "--json"]);
    assert!(out.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("valid JSON report");
    assert_eq!(report["batch_rows"], 2);
    assert_eq!(report["completed"]["accepted"], 0);
    assert_eq!(report["completed"]["conflicts"], 1);
    assert_eq!(report["reprocess"]["conflicts"], 1);
    assert!(report["meta"]["run_at"].is_string());

    // Conflicts landed in the side files; tables did not grow.
    let conflicts = read_table(&dir.path().join("completed_conflicts.csv")).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts.get(0, 0), "a_1");
    assert_eq!(read_table(&dir.path().join("complete.csv")).unwrap().len(), 1);
    assert_eq!(read_table(&dir.path().join("reprocess.csv")).unwrap().len(), 1);
}

#[test]
fn held_lock_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    setup_workspace(dir.path());
    write(dir.path(), "deptscan.lock", "");

    let out = deptscan(dir.path(), &["run", "pipeline.toml"]);
    assert_eq!(out.status.code(), Some(6));
    assert!(!dir.path().join("complete.csv").exists());
    // A failed acquire must not release someone else's lock.
    assert!(dir.path().join("deptscan.lock").exists());
}

#[test]
fn bad_config_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    setup_workspace(dir.path());
    write(dir.path(), "bad.toml", "batch = \"batch.csv\"\nunknown_knob = 1\n");

    let out = deptscan(dir.path(), &["run", "bad.toml"]);
    assert_eq!(out.status.code(), Some(20));
}

#[test]
fn classify_appends_derived_columns() {
    let dir = tempfile::tempdir().unwrap();
    setup_workspace(dir.path());

    let out = deptscan(
        dir.path(),
        &[
            "classify",
            "--input",
            "batch.csv",
            "--whitelist",
            "whitelist.json",
            "-o",
            "classified.csv",
        ],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let classified = read_table(&dir.path().join("classified.csv")).unwrap();
    assert_eq!(classified.len(), 2);
    let prof = classified.column_index("isProfessor").unwrap();
    assert_eq!(classified.get(0, prof), "true");
    assert_eq!(classified.get(1, prof), "false");
    let processed = classified.column_index("is_processed").unwrap();
    assert_eq!(classified.get(0, processed), "true");
}

#[test]
fn merge_and_pending_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "complete.csv", "id_text,v\na_1,1\n");
    write(dir.path(), "reprocess.csv", "id_text,v\n");
    write(dir.path(), "incoming.csv", "id_text,v\na_1,dup\nb_2,2\n");
    write(dir.path(), "roster.csv", "id_text\na_1\nb_2\nc_3\n");

    let out = deptscan(
        dir.path(),
        &[
            "merge",
            "--master",
            "complete.csv",
            "--incoming",
            "incoming.csv",
            "--conflicts-out",
            "conflicts.csv",
        ],
    );
    assert!(out.status.success());
    assert_eq!(read_table(&dir.path().join("complete.csv")).unwrap().len(), 2);
    assert_eq!(read_table(&dir.path().join("conflicts.csv")).unwrap().len(), 1);

    let out = deptscan(
        dir.path(),
        &[
            "pending",
            "--input",
            "roster.csv",
            "--complete",
            "complete.csv",
            "--reprocess",
            "reprocess.csv",
            "-o",
            "batch.csv",
        ],
    );
    assert!(out.status.success());
    let batch = read_table(&dir.path().join("batch.csv")).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.get(0, 0), "c_3");
}

#[test]
fn whitelist_build_and_validate() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "curated.csv",
        "department_keyword,precision_level\nEconomics,1\nlabor,3\npending,?\n",
    );

    let out = deptscan(
        dir.path(),
        &["whitelist", "build", "--curated", "curated.csv", "-o", "wl.json"],
    );
    assert!(out.status.success());
    let side: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("wl.json")).unwrap()).unwrap();
    assert_eq!(side["1"][0], "economics");
    assert_eq!(side["3"][0], "labor");

    write(
        dir.path(),
        "bad_rules.toml",
        "[patterns]\nprimary = ['no capture group']\nbackup = ['x ([a-z]+)']\n",
    );
    let out = deptscan(dir.path(), &["validate", "bad_rules.toml"]);
    assert_eq!(out.status.code(), Some(10));
}
