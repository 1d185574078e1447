use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;
use shallow_net::{CheckpointStore, Classifier, Error, Initialization, Matrix, Parameters, TrainConfig};

fn temp_store(tag: &str) -> CheckpointStore {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let dir: PathBuf = std::env::temp_dir().join(format!("shallow-net-it-{}-{}-{}", tag, std::process::id(), nanos));
    CheckpointStore::new(dir)
}

#[test]
fn reloaded_model_predicts_identically() {
    let store = temp_store("reload");
    let mut rng = StdRng::seed_from_u64(21);
    let x = Matrix::random_normal(6, 12, 1.0, &mut rng);
    let labels: Vec<usize> = (0..12).map(|i| i % 4).collect();

    let mut trained = Classifier::new();
    trained
        .train(&x, &labels, &TrainConfig::new(6, 5, 4, 40, 0.3), None, &mut rng)
        .unwrap();
    let id = store.save(trained.parameters().unwrap(), 50.0, "reload").unwrap();

    let mut restored = Classifier::new();
    restored.load_checkpoint(&store, &id).unwrap();
    assert_eq!(restored.parameters(), trained.parameters());
    assert_eq!(restored.predict(&x).unwrap(), trained.predict(&x).unwrap());
    assert_eq!(
        restored.predict_single_with_probabilities(&x.column(0)).unwrap(),
        trained.predict_single_with_probabilities(&x.column(0)).unwrap()
    );

    std::fs::remove_dir_all(store.dir()).ok();
}

#[test]
fn best_checkpoint_is_the_most_accurate() {
    let store = temp_store("best");
    let mut rng = StdRng::seed_from_u64(3);
    let snapshots: Vec<Parameters> = (0..3).map(|_| Parameters::initialize(4, 3, 2, &mut rng)).collect();
    for (params, accuracy) in snapshots.iter().zip([91.2, 87.0, 95.5]) {
        store.save(params, accuracy, "model_weights").unwrap();
    }

    let mut model = Classifier::new();
    let info = model.load_best(&store).unwrap().unwrap();
    assert_eq!(info.accuracy, 95.5);
    assert_eq!(model.parameters(), Some(&snapshots[2]));

    let accuracies: Vec<f64> = store.list().unwrap().iter().map(|i| i.accuracy).collect();
    assert_eq!(accuracies, vec![95.5, 91.2, 87.0]);

    std::fs::remove_dir_all(store.dir()).ok();
}

#[test]
fn resuming_picks_up_the_best_checkpoint() {
    let store = temp_store("resume");
    let mut rng = StdRng::seed_from_u64(8);
    let x = Matrix::random_normal(3, 6, 1.0, &mut rng);
    let labels = vec![0, 1, 0, 1, 0, 1];
    let stored = Parameters::initialize(3, 4, 2, &mut rng);
    store.save(&stored, 60.0, "seed").unwrap();

    let config = TrainConfig::new(3, 4, 2, 0, 0.1).with_init(Initialization::ResumeBest);
    let mut model = Classifier::new();
    let report = model.train(&x, &labels, &config, Some(&store), &mut rng).unwrap();
    assert_eq!(report.epochs_completed, 0);
    assert_eq!(model.parameters(), Some(&stored));

    std::fs::remove_dir_all(store.dir()).ok();
}

#[test]
fn uninitialized_model_refuses_to_predict() {
    let model = Classifier::new();
    let err = model.predict(&Matrix::zeros(3, 1)).unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}
