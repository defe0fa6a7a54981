use assert_cmd::Command;
use landgen_sim::genome::{Genotype, Individual};
use landgen_sim::simulation::{Landscape, Species};
use landgen_sim::storage::{Recorder, RecordingStrategy, RunMetadata};
use predicates::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

const SIDE: usize = 10;

/// Species whose loci follow the x and y coordinates more closely as
/// `timestep` grows.
fn snapshot(timestep: usize, n: u64, rng: &mut Xoshiro256PlusPlus) -> Species {
    let structure = (timestep as f64 / 100.0).min(1.0);
    let side = SIDE as f64;
    let individuals = (0..n)
        .map(|id| {
            let x: f64 = rng.random_range(0.0..side);
            let y: f64 = rng.random_range(0.0..side);
            let loci: Vec<[u8; 2]> = (0..40)
                .map(|locus| {
                    let coord = if locus % 2 == 0 { x } else { y };
                    let p = 0.5 + structure * (coord / side - 0.5);
                    [u8::from(rng.random_bool(p)), u8::from(rng.random_bool(p))]
                })
                .collect();
            let env = vec![rng.random_range(0.0..1.0), 1.0];
            Individual::new(id, Genotype::new(&loci).unwrap(), (x, y), env)
                .with_phenotype(vec![rng.random_range(0.0..1.0)])
        })
        .collect();
    Species::new("spp", timestep, individuals).unwrap()
}

fn fixture() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let db = dir.path().join("run.sqlite");
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);

    let gradient: Vec<f64> = (0..SIDE * SIDE)
        .map(|i| (i % SIDE) as f64 / (SIDE - 1) as f64)
        .collect();
    let mut mask = vec![1.0; SIDE * SIDE];
    mask[0] = 0.0;
    let landscape = Landscape::new(SIDE, SIDE)
        .with_layer("env", gradient)
        .unwrap()
        .with_layer("mask", mask)
        .unwrap();

    let mut meta = RunMetadata::new("cli_fixture");
    meta.burn_in_steps = Some(500);
    let mut recorder = Recorder::new(&db, &meta, RecordingStrategy::EveryN(100)).unwrap();
    recorder.record_landscape(&landscape).unwrap();
    for step in [0, 100, 200] {
        recorder.record_species(0, &snapshot(step, 40, &mut rng)).unwrap();
    }
    recorder.close().unwrap();

    (dir, db)
}

fn analyze(db: &Path, output: &Path) -> Command {
    let mut cmd = Command::cargo_bin("landgen").unwrap();
    cmd.arg("analyze")
        .arg("--database")
        .arg(db)
        .arg("--burn-in")
        .arg("500")
        .arg("-T")
        .arg("200")
        .arg("--sample-size")
        .arg("30")
        .arg("--seed")
        .arg("11")
        .arg("--output")
        .arg(output);
    cmd
}

#[test]
fn test_analyze_writes_figures() {
    let (dir, db) = fixture();
    let figure = dir.path().join("ibd.svg");

    analyze(&db, &figure)
        .arg("--alpha")
        .arg("1.0")
        .assert()
        .success()
        .stdout(predicate::str::contains("Burn-in complete"))
        .stdout(predicate::str::contains("Figure written to"))
        .stdout(predicate::str::contains("geo"));

    let svg = std::fs::read_to_string(&figure).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("IBD"));
    assert!(dir.path().join("ibd_3d.svg").exists());
}

#[test]
fn test_analyze_json_summary() {
    let (dir, db) = fixture();
    let figure = dir.path().join("unused.svg");

    let output = analyze(&db, &figure)
        .arg("--alpha")
        .arg("1.0")
        .arg("--no-plot")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!figure.exists());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["timestep"], 200);
    assert_eq!(summary["sample_size"], 30);
    assert_eq!(summary["pairs"], 30 * 29 / 2);
    assert!(summary["regression"]["params"].is_array());
}

#[test]
fn test_analyze_fails_when_not_significant() {
    let (dir, db) = fixture();

    analyze(&db, &dir.path().join("fig.svg"))
        .arg("--alpha")
        .arg("0.0")
        .arg("--no-plot")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not significant"));
}

#[test]
fn test_analyze_from_config_file() {
    let (dir, db) = fixture();
    let config = dir.path().join("config.json");
    let figure = dir.path().join("from_config.svg");
    let json = serde_json::json!({
        "model": { "database": db },
        "burn_in": 500,
        "timesteps": 100,
        "sample_size": 25,
        "alpha": 1.0,
        "output": figure,
    });
    std::fs::write(&config, json.to_string()).unwrap();

    Command::cargo_bin("landgen")
        .unwrap()
        .arg("analyze")
        .arg("--config")
        .arg(&config)
        .arg("--seed")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample Size: 25"));

    assert!(figure.exists());
}

#[test]
fn test_analyze_past_recording_fails() {
    let (dir, db) = fixture();

    Command::cargo_bin("landgen")
        .unwrap()
        .arg("analyze")
        .arg("--database")
        .arg(&db)
        .arg("-T")
        .arg("5000")
        .arg("--output")
        .arg(dir.path().join("fig.svg"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Main phase failed"));
}

#[test]
fn test_analyze_missing_database() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("landgen")
        .unwrap()
        .arg("analyze")
        .arg("--database")
        .arg(dir.path().join("missing.sqlite"))
        .arg("--no-plot")
        .assert()
        .failure();
}

#[test]
fn test_info_lists_run() {
    let (_dir, db) = fixture();

    Command::cargo_bin("landgen")
        .unwrap()
        .arg("info")
        .arg("--database")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Name: cli_fixture"))
        .stdout(predicate::str::contains("Landscape: 10 x 10"))
        .stdout(predicate::str::contains("Records: 120 individuals, 2 layers"))
        .stdout(predicate::str::contains("Timesteps: [0, 100, 200]"));
}

#[test]
fn test_export_pairs_csv() {
    let (_dir, db) = fixture();

    let output = Command::cargo_bin("landgen")
        .unwrap()
        .arg("export")
        .arg("--database")
        .arg(&db)
        .arg("--timestep")
        .arg("100")
        .output()
        .unwrap();
    assert!(output.status.success());

    let csv = String::from_utf8(output.stdout).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("i,j,id_i,id_j,genetic,scaled_genetic,geographic,environmental")
    );
    assert_eq!(lines.count(), 40 * 39 / 2);
    assert!(csv.lines().nth(1).unwrap().starts_with("1,0,1,0,"));
}

#[test]
fn test_export_single_kind_header() {
    let (_dir, db) = fixture();

    Command::cargo_bin("landgen")
        .unwrap()
        .arg("export")
        .arg("--database")
        .arg(&db)
        .arg("--kind")
        .arg("environmental")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("i,j,id_i,id_j,environmental\n"));
}

#[test]
fn test_export_matrix_to_file() {
    let (dir, db) = fixture();
    let out = dir.path().join("geo.csv");

    Command::cargo_bin("landgen")
        .unwrap()
        .arg("export")
        .arg("--database")
        .arg(&db)
        .arg("--kind")
        .arg("geographic")
        .arg("--matrix")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Data exported to"));

    let csv = std::fs::read_to_string(&out).unwrap();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 41);
    assert_eq!(rows[0].split(',').count(), 41);
    assert_eq!(rows[1].split(',').nth(1), Some("0"));
}

#[test]
fn test_export_matrix_requires_single_kind() {
    let (_dir, db) = fixture();

    Command::cargo_bin("landgen")
        .unwrap()
        .arg("export")
        .arg("--database")
        .arg(&db)
        .arg("--matrix")
        .assert()
        .failure()
        .stderr(predicate::str::contains("single distance kind"));
}

#[test]
fn test_export_unknown_timestep() {
    let (_dir, db) = fixture();

    Command::cargo_bin("landgen")
        .unwrap()
        .arg("export")
        .arg("--database")
        .arg(&db)
        .arg("--timestep")
        .arg("150")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not recorded"));
}
