//! Integration tests for recording a run and replaying it through `Model`.

use landgen_sim::errors::{ModelError, SnapshotError};
use landgen_sim::genome::{Genotype, Individual};
use landgen_sim::simulation::{Landscape, Model, ModelParams, RecordedModel, Species, WalkMode};
use landgen_sim::storage::{
    IndividualSnapshot, QueryBuilder, Recorder, RecordingStrategy, RunMetadata,
};
use std::path::Path;
use tempfile::tempdir;

fn test_landscape() -> Landscape {
    let env: Vec<f64> = (0..16).map(|i| (i % 4) as f64 / 3.0).collect();
    Landscape::new(4, 4)
        .with_layer("env", env)
        .unwrap()
        .with_layer("barrier", vec![1.0; 16])
        .unwrap()
}

fn test_species(timestep: usize, n: u64) -> Species {
    let individuals = (0..n)
        .map(|id| {
            let allele = (id % 2) as u8;
            let genotype = Genotype::new(&[[allele, allele], [0, 1], [1, 1]]).unwrap();
            Individual::new(id, genotype, (id as f64 % 4.0, 1.0), vec![0.25, 1.0])
                .with_phenotype(vec![0.5])
        })
        .collect();
    Species::new("spp", timestep, individuals).unwrap()
}

fn record_run(path: &Path, metadata: RunMetadata, steps: &[usize]) {
    let mut recorder = Recorder::new(path, &metadata, RecordingStrategy::EveryN(10)).unwrap();
    recorder.record_landscape(&test_landscape()).unwrap();
    for &step in steps {
        assert!(recorder.should_record(step));
        assert!(recorder.record_species(0, &test_species(step, 6 + step as u64 / 10)).unwrap());
    }
    let stats = recorder.close().unwrap();
    assert_eq!(stats.snapshots_recorded, steps.len());
}

#[test]
fn test_query_reads_back_run() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("run.sqlite");
    let mut meta = RunMetadata::new("ibd");
    meta.burn_in_steps = Some(500);
    record_run(&db, meta.clone(), &[0, 10, 20]);

    let query = QueryBuilder::new(&db).unwrap();
    assert_eq!(query.get_run_metadata().unwrap(), Some(meta));
    assert!(query.burn_in_complete().unwrap());
    assert_eq!(query.get_species_ids().unwrap(), vec![0]);
    assert_eq!(query.get_recorded_timesteps(0).unwrap(), vec![0, 10, 20]);
    assert_eq!(query.get_landscape().unwrap(), Some(test_landscape()));

    let rows = query.get_timestep(0, 10).unwrap();
    assert_eq!(rows.len(), 7);
    let ind = rows[3].clone().into_individual().unwrap();
    assert_eq!(ind.id(), 3);
    assert_eq!(ind.env(), &[0.25, 1.0]);
    assert_eq!(ind.phenotype(), &[0.5]);
}

#[test]
fn test_recorder_skips_rejected_timesteps() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("strategy.sqlite");
    let mut recorder =
        Recorder::new(&db, &RunMetadata::new("ibd"), RecordingStrategy::EveryN(10)).unwrap();
    assert!(!recorder.record_species(0, &test_species(15, 4)).unwrap());
    assert!(recorder.record_species(0, &test_species(20, 4)).unwrap());
    let stats = recorder.close().unwrap();
    assert_eq!(stats.snapshots_recorded, 1);
    assert_eq!(stats.snapshots_skipped, 1);
    assert_eq!(stats.individuals_recorded, 4);

    let db_none = dir.path().join("none.sqlite");
    let mut recorder =
        Recorder::new(&db_none, &RunMetadata::new("ibd"), RecordingStrategy::None).unwrap();
    assert!(!recorder.record_species(0, &test_species(15, 4)).unwrap());
    let row = IndividualSnapshot::from_individual(test_species(15, 1).iter().next().unwrap());
    assert!(!recorder.record_rows(0, 15, &[row]).unwrap());
    recorder.close().unwrap();

    assert_eq!(QueryBuilder::new(&db).unwrap().get_recorded_timesteps(0).unwrap(), vec![20]);
    assert!(
        QueryBuilder::new(&db_none)
            .unwrap()
            .get_recorded_timesteps(0)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_recorded_model_walks() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("walk.sqlite");
    record_run(&db, RunMetadata::new("ibd"), &[0, 10, 20]);

    let mut model = RecordedModel::from_params(&ModelParams::new(&db)).unwrap();
    assert_eq!(model.recorded_timesteps(), &[0, 10, 20]);
    assert_eq!(model.landscape().n_layers(), 2);

    model.walk(20_000, WalkMode::Burn).unwrap();
    assert_eq!(model.timestep(), 0);
    assert_eq!(model.species().size(), 6);

    model.walk(15, WalkMode::Main).unwrap();
    assert_eq!(model.timestep(), 15);
    assert_eq!(model.species().timestep(), 10);
    assert_eq!(model.species().size(), 7);

    model.walk(5, WalkMode::Main).unwrap();
    assert_eq!(model.species().timestep(), 20);
    assert_eq!(model.species().size(), 8);
}

#[test]
fn test_recorded_model_requires_burn_in() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("noburn.sqlite");
    record_run(&db, RunMetadata::new("ibd"), &[0, 10]);

    let mut model = RecordedModel::from_params(&ModelParams::new(&db)).unwrap();
    assert!(matches!(
        model.walk(10, WalkMode::Main),
        Err(ModelError::NotBurnedIn)
    ));
}

#[test]
fn test_recorded_model_without_burn_in_state() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("raw.sqlite");
    let mut meta = RunMetadata::new("ibd");
    meta.burn_in_complete = false;
    record_run(&db, meta, &[0]);

    let mut model = RecordedModel::from_params(&ModelParams::new(&db)).unwrap();
    assert!(matches!(
        model.walk(100, WalkMode::Burn),
        Err(ModelError::BurnInUnavailable)
    ));
}

#[test]
fn test_recorded_model_past_last_timestep() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("short.sqlite");
    record_run(&db, RunMetadata::new("ibd"), &[0, 10]);

    let mut model = RecordedModel::from_params(&ModelParams::new(&db)).unwrap();
    model.walk(1, WalkMode::Burn).unwrap();
    match model.walk(1000, WalkMode::Main) {
        Err(ModelError::TimestepUnavailable { requested, last }) => {
            assert_eq!(requested, 1000);
            assert_eq!(last, Some(10));
        }
        other => panic!("expected unavailable timestep, got {:?}", other.err()),
    }
}

#[test]
fn test_recorded_model_unknown_species() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("spp.sqlite");
    record_run(&db, RunMetadata::new("ibd"), &[0]);

    let params = ModelParams {
        database: db,
        species: 3,
    };
    assert!(matches!(
        RecordedModel::from_params(&params),
        Err(ModelError::UnknownSpecies(3))
    ));
}

#[test]
fn test_recorded_model_reports_malformed_rows() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("malformed.sqlite");
    let mut recorder =
        Recorder::new(&db, &RunMetadata::new("ibd"), RecordingStrategy::All).unwrap();
    recorder.record_landscape(&test_landscape()).unwrap();
    let row = IndividualSnapshot {
        id: 12,
        x: Some(1.0),
        y: Some(1.0),
        genotype: None,
        env: None,
        phenotype: None,
    };
    assert!(recorder.record_rows(0, 0, &[row]).unwrap());
    recorder.close().unwrap();

    let mut model = RecordedModel::from_params(&ModelParams::new(&db)).unwrap();
    match model.walk(1, WalkMode::Burn) {
        Err(ModelError::Snapshot(SnapshotError::Malformed { id, .. })) => assert_eq!(id, 12),
        other => panic!("expected malformed snapshot, got {:?}", other.err()),
    }
}
