use assert_cmd::cargo::cargo_bin_cmd;

#[test]
fn top_level_help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("gptkctl");
    let help = cmd.arg("--help").assert().success();
    let output = help.get_output().stdout.clone();
    let text = String::from_utf8_lossy(&output);
    for sub in ["run", "validate", "hash", "similar"] {
        assert!(text.contains(sub), "help missing '{sub}'");
    }
}

#[test]
fn run_help_mentions_source_and_action_flags() {
    let mut cmd = cargo_bin_cmd!("gptkctl");
    let output = cmd
        .arg("run")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);
    for flag in [
        "--snapshot",
        "--source",
        "--album",
        "--filter",
        "--action",
        "--target-album",
        "--album-title",
        "--preserve-order",
        "--write-back",
    ] {
        assert!(text.contains(flag), "run help missing {flag}");
    }
    assert!(
        text.contains("add-to-new-album"),
        "run help missing action values"
    );
}

#[test]
fn hash_requires_an_image() {
    let mut cmd = cargo_bin_cmd!("gptkctl");
    cmd.arg("hash").assert().failure();
}
