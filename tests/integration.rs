use std::{fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) -> String {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_tempscope"));

    let output = Command::new(bin)
        .args(args)
        .env_remove("OPENWEATHER_API_KEY")
        .output()
        .expect("failed to execute command");

    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );

    stdout_str.to_string()
}

fn test_dir(name: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir_all(&test_dir).expect("failed to create test directory");
    test_dir
}

#[test]
fn basic_workflow() {
    let test_dir = test_dir("basic_workflow");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "[analysis]\n"
        + "window = 30\n"
        + "anomaly_threshold = 2.0\n"
        + "\n"
        + "[weather]\n"
        + "timeout_secs = 5\n";
    fs::write(&config_path, config_contents).expect("failed to write config file");

    let data_path = test_dir.join("temperature_data.csv");
    let results_path = test_dir.join("results.json");

    let config_str = config_path.to_str().expect("non-utf8 path");
    let data_str = data_path.to_str().expect("non-utf8 path");
    let results_str = results_path.to_str().expect("non-utf8 path");

    run_bin(&[
        "--config", config_str, "generate", "--output", data_str, "--cities", "Berlin,Cairo",
        "--years", "2", "--seed", "42",
    ]);
    run_bin(&[
        "--config", config_str, "analyze", "--data", data_str, "--output", results_str,
        "--parallel",
    ]);

    let results: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(&results_path).expect("failed to read results"),
    )
    .expect("failed to parse results");
    let results = results.as_array().expect("results must be an array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["city"], "Berlin");
    assert_eq!(results[1]["city"], "Cairo");

    for result in results {
        assert_eq!(result["summary"]["count"], 730);
        let rows = result["rows"].as_array().expect("rows must be an array");
        assert_eq!(rows.len(), 730);
        assert!(rows[0]["rolling_mean"].is_null());
        assert!(rows[29]["rolling_mean"].is_f64());
        for season in ["winter", "spring", "summer", "autumn"] {
            assert!(result["season_profile"][season]["mean"].is_f64(), "{season}");
            assert!(result["season_roll_profile"][season]["mean_of_rolling_means"].is_f64());
        }
        assert!(result["trend"]["slope"].is_f64());
    }

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn single_city_sequential() {
    let test_dir = test_dir("single_city_sequential");
    let data_path = test_dir.join("data.csv");
    let results_path = test_dir.join("results.json");
    let data_str = data_path.to_str().expect("non-utf8 path");
    let results_str = results_path.to_str().expect("non-utf8 path");

    run_bin(&["generate", "--output", data_str, "--years", "1", "--seed", "1"]);
    run_bin(&["analyze", "--data", data_str, "--city", "Moscow", "--output", results_str]);

    let results: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&results_path).expect("failed to read results"))
            .expect("failed to parse results");
    assert_eq!(results.as_array().map(Vec::len), Some(1));
    assert_eq!(results[0]["city"], "Moscow");

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn unknown_city_fails() {
    let test_dir = test_dir("unknown_city_fails");
    let data_path = test_dir.join("data.csv");
    let data_str = data_path.to_str().expect("non-utf8 path");

    run_bin(&["generate", "--output", data_str, "--years", "1", "--seed", "3"]);

    let output = Command::new(env!("CARGO_BIN_EXE_tempscope"))
        .args(["analyze", "--data", data_str, "--city", "Atlantis"])
        .output()
        .expect("failed to execute command");
    assert!(!output.status.success());

    fs::remove_dir_all(&test_dir).ok();
}
