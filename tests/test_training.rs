//! Integration test: Training pipeline end-to-end

mod common;

use placement_predictor::error::PlacementError;
use placement_predictor::pipeline::PlacementPipeline;
use placement_predictor::schema::{Placement, StudentProfile};
use placement_predictor::training::{ClassWeight, Solver, TrainEngine, TrainingConfig};
use tempfile::TempDir;

#[test]
fn test_train_from_csv_writes_loadable_artifact() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("placement.csv");
    let output = dir.path().join("placement_pipeline.bin");
    common::write_placement_csv(&data, 150);

    let engine = TrainEngine::new(TrainingConfig::default());
    let (pipeline, report) = engine.run(&data, &output).unwrap();

    assert!(output.exists());
    assert_eq!(report.output_path.as_deref(), Some(output.as_path()));
    assert_eq!(report.n_rows, 150, "imputed rows must be kept");
    assert_eq!(report.n_train + report.n_test, 150);
    assert!(report.train_accuracy > 0.8, "train accuracy {}", report.train_accuracy);
    assert!(report.test_accuracy > 0.7, "test accuracy {}", report.test_accuracy);

    let loaded = PlacementPipeline::load(&output).unwrap();
    let profile = StudentProfile::example();
    let (a, pa) = pipeline.predict_one_with_proba(&profile).unwrap();
    let (b, pb) = loaded.predict_one_with_proba(&profile).unwrap();
    assert_eq!(a, b);
    assert_eq!(pa, pb);

    let meta = loaded.metadata().unwrap();
    assert_eq!(meta.metric("test_accuracy"), Some(report.test_accuracy));
    assert!(!meta.trained_at.is_empty());
}

#[test]
fn test_raw_spellings_are_normalized_before_encoding() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("placement.csv");
    let output = dir.path().join("model.bin");
    common::write_placement_csv(&data, 90);

    let (pipeline, _) = TrainEngine::new(TrainingConfig::default()).run(&data, &output).unwrap();
    let transformer = pipeline.transformer();

    assert_eq!(transformer.categories("gender").unwrap(), ["Female", "Male"]);
    assert_eq!(transformer.categories("ssc_b").unwrap(), ["Central", "Others"]);
    assert_eq!(transformer.categories("hsc_s").unwrap(), ["Arts", "Commerce", "Others", "Science"]);
}

#[test]
fn test_training_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("placement.csv");
    common::write_placement_csv(&data, 80);

    let engine = TrainEngine::new(TrainingConfig::default().with_random_state(7));
    let (_, first) = engine.run(&data, dir.path().join("a.bin")).unwrap();
    let (_, second) = engine.run(&data, dir.path().join("b.bin")).unwrap();

    assert_eq!(first.train_accuracy, second.train_accuracy);
    assert_eq!(first.test_accuracy, second.test_accuracy);
}

#[test]
fn test_alternative_solver_and_weighting() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("placement.csv");
    common::write_placement_csv(&data, 100);

    let config = TrainingConfig::default()
        .with_class_weight(ClassWeight::None)
        .with_solver(Solver::GradientDescent { learning_rate: 0.1 })
        .with_max_iter(3000);
    let (pipeline, report) = TrainEngine::new(config).run(&data, dir.path().join("gd.bin")).unwrap();

    assert!(report.train_accuracy > 0.75, "train accuracy {}", report.train_accuracy);
    let outcome = pipeline.predict_one(&StudentProfile::example()).unwrap();
    assert!(matches!(outcome, Placement::Placed | Placement::NotPlaced));
}

#[test]
fn test_single_label_dataset_fails_fast() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("placement.csv");
    let csv = common::placement_csv(40).replace("Not Placed", "Placed");
    std::fs::write(&data, csv).unwrap();

    let output = dir.path().join("model.bin");
    let err = TrainEngine::new(TrainingConfig::default()).run(&data, &output).unwrap_err();
    assert!(matches!(err, PlacementError::InsufficientClasses(_)));
    assert!(!output.exists());
}

#[test]
fn test_missing_column_fails() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("placement.csv");
    let csv: String = common::placement_csv(30)
        .lines()
        .map(|line| {
            let mut fields: Vec<&str> = line.split(',').collect();
            fields.remove(9); // workex
            fields.join(",") + "\n"
        })
        .collect();
    std::fs::write(&data, csv).unwrap();

    let err = TrainEngine::new(TrainingConfig::default())
        .run(&data, dir.path().join("model.bin"))
        .unwrap_err();
    assert!(matches!(err, PlacementError::MissingColumn(ref c) if c == "workex"));
}

#[test]
fn test_na_cell_drops_row_and_keeps_every_feature() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("placement.csv");
    let csv: String = common::placement_csv(100)
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let mut fields: Vec<&str> = line.split(',').collect();
            if i == 5 {
                fields[10] = "NA"; // etest_p
            }
            fields.join(",") + "\n"
        })
        .collect();
    std::fs::write(&data, csv).unwrap();

    let (pipeline, report) = TrainEngine::new(TrainingConfig::default())
        .run(&data, dir.path().join("model.bin"))
        .unwrap();

    assert_eq!(report.n_rows, 99);
    let inputs = &pipeline.metadata().unwrap().input_columns;
    assert_eq!(inputs.len(), 12);
    assert!(inputs.iter().any(|c| c == "etest_p"));
}

#[test]
fn test_unreadable_csv_is_data_error() {
    let dir = TempDir::new().unwrap();
    let err = TrainEngine::new(TrainingConfig::default())
        .run(dir.path().join("absent.csv"), dir.path().join("model.bin"))
        .unwrap_err();
    assert!(matches!(err, PlacementError::DataError(_)));
}

#[test]
fn test_config_file_drives_training() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("placement.csv");
    common::write_placement_csv(&data, 100);

    let config_path = dir.path().join("train.json");
    std::fs::write(&config_path, r#"{"test_size": 0.3, "c": 0.5}"#).unwrap();
    let config = TrainingConfig::from_json_file(&config_path).unwrap();

    let (pipeline, report) = TrainEngine::new(config).run(&data, dir.path().join("m.bin")).unwrap();
    assert!(report.n_test >= 29 && report.n_test <= 31, "n_test {}", report.n_test);
    let meta = pipeline.metadata().unwrap();
    assert_eq!(meta.hyperparameters.get("c").map(String::as_str), Some("0.5"));
}
