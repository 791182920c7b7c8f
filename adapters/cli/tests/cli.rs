use std::process::Command;

fn refinement() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_refinement"));
    let _ = command
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env("RUST_LOG", "warn");
    command
}

#[test]
fn bundled_config_plays_a_day_to_completion() {
    let output = refinement()
        .args(["--config", "terminal.toml", "--max-steps", "5000"])
        .output()
        .expect("failed to launch the refinement binary");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Welcome to Macrodata Refinement."), "{stdout}");
    assert!(stdout.contains("Day complete: 2 files refined"), "{stdout}");
}

#[test]
fn missing_config_file_fails_with_context() {
    let output = refinement()
        .args(["--config", "does-not-exist.toml"])
        .output()
        .expect("failed to launch the refinement binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read terminal config"), "{stderr}");
}
