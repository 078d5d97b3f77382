//! Integration tests for the pumpkin binary

use std::process::Command;

use tempfile::tempdir;

fn pumpkin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pumpkin"))
}

#[test]
fn test_generate_writes_obj_and_scene() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out = dir.path().join("out");

    let status = pumpkin()
        .args(["generate", "--count", "1", "--seed", "31", "--light", "-o"])
        .arg(&out)
        .status()
        .expect("Failed to run pumpkin");
    assert!(status.success(), "pumpkin generate failed");

    let obj = std::fs::read_to_string(out.join("pumpkin1.obj")).expect("Missing OBJ");
    assert!(obj.starts_with("o pumpkin1\n"));
    assert!(obj.lines().any(|l| l.starts_with("f ")));

    let scene: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("scene.json")).expect("Missing scene"))
            .expect("scene.json is not JSON");
    assert_eq!(scene["seed"], 31);
    let entry = &scene["pumpkins"][0];
    assert_eq!(entry["name"], "pumpkin1");
    assert_eq!(entry["file"], "pumpkin1.obj");
    assert_eq!(entry["cell"]["row"], 0);
    assert!(entry["light"]["intensity"].as_f64().is_some());
    assert!(scene["failures"].as_array().expect("failures array").is_empty());
}

#[test]
fn test_plan_prints_json() {
    let output = pumpkin()
        .args(["plan", "-n", "4", "--seed", "7", "--mouth", "sad,neutral"])
        .output()
        .expect("Failed to run pumpkin");
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).expect("plan is not JSON");
    let pumpkins = plan["pumpkins"].as_array().expect("pumpkins array");
    assert_eq!(pumpkins.len(), 4);
    assert_eq!(pumpkins[3]["cell"]["row"], 1);
    for p in pumpkins {
        let shape = p["parameters"]["mouth"]["shape"].as_str().expect("mouth shape");
        assert!(shape == "sad" || shape == "neutral");
    }
}

#[test]
fn test_plan_from_manifest() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = dir.path().join("pumpkin.toml");
    std::fs::write(&config, "[batch]\ncount = 2\nseed = 5\nmouth_shapes = [\"happy\"]\n").unwrap();

    let output = pumpkin()
        .args(["plan", "--config"])
        .arg(&config)
        .output()
        .expect("Failed to run pumpkin");
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).expect("plan is not JSON");
    assert_eq!(plan["seed"], 5);
    assert_eq!(plan["pumpkins"].as_array().map(Vec::len), Some(2));
    assert_eq!(plan["pumpkins"][0]["parameters"]["mouth"]["shape"], "happy");
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = tempdir().expect("Failed to create temp dir");

    let first = pumpkin()
        .args(["init", "--path"])
        .arg(dir.path())
        .status()
        .expect("Failed to run pumpkin");
    assert!(first.success());
    assert!(dir.path().join("pumpkin.toml").exists());

    let second = pumpkin()
        .args(["init", "--path"])
        .arg(dir.path())
        .status()
        .expect("Failed to run pumpkin");
    assert!(!second.success());

    let forced = pumpkin()
        .args(["init", "--force", "--path"])
        .arg(dir.path())
        .status()
        .expect("Failed to run pumpkin");
    assert!(forced.success());
}

#[test]
fn test_invalid_options_fail() {
    let zero = pumpkin()
        .args(["plan", "--count", "0"])
        .output()
        .expect("Failed to run pumpkin");
    assert!(!zero.status.success());

    let bad_shape = pumpkin()
        .args(["plan", "--mouth", "grumpy"])
        .output()
        .expect("Failed to run pumpkin");
    assert!(!bad_shape.status.success());
}
