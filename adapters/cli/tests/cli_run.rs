use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_typer-drive"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch typer-drive")
}

#[test]
fn short_run_prints_summary() {
    let output = run(&[
        "--waves",
        "1",
        "--seed",
        "7",
        "--accuracy",
        "1.0",
        "--keys-per-second",
        "20",
        "--max-seconds",
        "90",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Welcome to Typer Drive."));
    assert!(stdout.contains("score"));
    assert!(stdout.contains("health"));
}

#[test]
fn out_of_range_start_wave_fails() {
    let output = run(&["--waves", "2", "--start-wave", "5", "--max-seconds", "1"]);
    assert!(!output.status.success());
}

#[test]
fn invalid_accuracy_is_rejected() {
    let output = run(&["--accuracy", "1.5"]);
    assert!(!output.status.success());
}
