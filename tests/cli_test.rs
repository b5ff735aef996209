use std::process::Command;

fn highway_sim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_highway_sim"))
}

/// Test that the headless runner completes and reports
#[test]
fn test_headless_run_completes() {
    let output = highway_sim()
        .args([
            "--mode",
            "solution",
            "--ticks",
            "180",
            "--seed",
            "4",
            "--rush-hour",
            "--close-lane",
            "4",
            "--emergency-at",
            "30",
            "--on-ramp-every",
            "60",
        ])
        .output()
        .expect("Failed to execute highway_sim");

    assert!(
        output.status.success(),
        "highway_sim failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Highway Simulation Summary ==="));
    assert!(stdout.contains("=== Final State ==="));
    assert!(stdout.contains("=== Highway Map ==="));
    assert!(stdout.contains("Emergency active"));
    assert!(stdout.contains("Closed lanes: [4]"));
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let output = highway_sim()
        .args(["--ticks", "10", "--spawn-rate", "5"])
        .output()
        .expect("Failed to execute highway_sim");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid simulation parameters"), "{}", stderr);
}

#[test]
fn test_invalid_lane_is_rejected() {
    let output = highway_sim()
        .args(["--ticks", "10", "--close-lane", "7"])
        .output()
        .expect("Failed to execute highway_sim");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot close lane 7"), "{}", stderr);
}

#[test]
fn test_unusable_delta_is_rejected() {
    for delta in ["inf", "0", "-0.5", "NaN"] {
        let output = highway_sim()
            .args(["--ticks", "3", &format!("--delta={}", delta)])
            .output()
            .expect("Failed to execute highway_sim");

        assert!(!output.status.success(), "--delta {} was accepted", delta);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("--delta must be a positive"), "{}", stderr);
    }
}
