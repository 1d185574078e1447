use rand::rngs::StdRng;
use rand::SeedableRng;
use shallow_net::activation::softmax_columns;
use shallow_net::network::{backward, forward};
use shallow_net::{train_loop, Classifier, CrossEntropyLoss, Matrix, Parameters, Sgd, TrainConfig};

const EPS: f64 = 1e-9;

fn assert_close(actual: &Matrix, expected: &[&[f64]]) {
    assert_eq!(actual.rows, expected.len());
    for (row, want) in actual.data.iter().zip(expected) {
        assert_eq!(row.len(), want.len());
        for (a, e) in row.iter().zip(want.iter()) {
            assert!((a - e).abs() < EPS, "{} != {}", a, e);
        }
    }
}

fn hand_checked_params() -> Parameters {
    Parameters::new(
        Matrix::from_data(vec![
            vec![0.1, 0.2, 0.3, 0.4],
            vec![-0.1, 0.0, -0.2, 0.0],
            vec![0.2, 0.1, 0.1, 0.3],
        ]),
        Matrix::zeros(3, 1),
        Matrix::from_data(vec![vec![0.5, -0.5, 0.2], vec![-0.3, 0.4, 0.6]]),
        Matrix::zeros(2, 1),
    )
    .unwrap()
}

#[test]
fn one_step_matches_hand_computed_values() {
    let mut params = hand_checked_params();
    let x = Matrix::from_column(&[1.0, 0.0, 1.0, 0.0]);
    let y = [1];

    let cache = forward(&params, &x).unwrap();
    assert_close(&cache.z1, &[&[0.4], &[-0.3], &[0.3]]);
    assert_close(&cache.a1, &[&[0.4], &[0.0], &[0.3]]);
    assert_close(&cache.z2, &[&[0.26], &[0.06]]);
    assert_close(&cache.a2, &[&[0.549833997312478], &[0.4501660026875221]]);

    let loss = CrossEntropyLoss::loss(&y, &cache.a2);
    assert!((loss - 0.7981388693815918).abs() < EPS);

    let grads = backward(&params, &x, &y, &cache);
    assert_close(&grads.db2, &[&[0.549833997312478], &[-0.549833997312478]]);
    assert_close(
        &grads.dw2,
        &[&[0.2199335989249912, 0.0, 0.1649501991937434], &[-0.2199335989249912, 0.0, -0.1649501991937434]],
    );
    assert_close(&grads.db1, &[&[0.43986719784998235], &[0.0], &[-0.21993359892499115]]);

    Sgd::new(0.1).step(&mut params, &grads);
    assert_close(
        &params.w1,
        &[
            &[0.056013280215001765, 0.2, 0.25601328021500175, 0.4],
            &[-0.1, 0.0, -0.2, 0.0],
            &[0.22199335989249913, 0.1, 0.12199335989249913, 0.3],
        ],
    );
    assert_close(&params.b1, &[&[-0.04398671978499824], &[0.0], &[0.021993359892499117]]);
    assert_close(
        &params.w2,
        &[&[0.4780066401075009, -0.5, 0.18350498008062566], &[-0.27800664010750087, 0.4, 0.6164950199193743]],
    );
    assert_close(&params.b2, &[&[-0.0549833997312478], &[0.0549833997312478]]);

    let after = CrossEntropyLoss::loss(&y, &forward(&params, &x).unwrap().a2);
    assert!((after - 0.6607927127003422).abs() < EPS);
}

#[test]
fn softmax_columns_are_distributions() {
    let mut rng = StdRng::seed_from_u64(5);
    let logits = Matrix::random_normal(10, 7, 20.0, &mut rng);
    let probs = softmax_columns(&logits);
    for j in 0..probs.cols {
        let column = probs.column(j);
        assert!(column.iter().all(|&p| (0.0..=1.0).contains(&p)));
        assert!((column.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}

fn separable_batch() -> (Matrix, Vec<usize>) {
    let mut columns = Vec::new();
    let mut labels = Vec::new();
    for i in 0..30 {
        let class = i % 3;
        let mut v: Vec<f64> = (0..4).map(|j| 0.1 * ((i * 7 + j * 3) % 5) as f64 / 4.0).collect();
        v[class] += 1.0;
        columns.push(v);
        labels.push(class);
    }
    (Matrix::from_columns(&columns), labels)
}

#[test]
fn logged_losses_do_not_increase() {
    let (x, y) = separable_batch();
    let config = TrainConfig::new(4, 8, 3, 300, 0.5);
    let report = train_loop(&x, &y, &config, None, &mut StdRng::seed_from_u64(2024)).unwrap();

    assert_eq!(report.losses.len(), 300);
    let logged: Vec<f64> = report.losses.iter().step_by(10).copied().collect();
    for pair in logged.windows(2) {
        assert!(pair[1] <= pair[0], "loss went up: {:?}", pair);
    }
    assert!(report.final_loss().unwrap() < 3f64.ln());
}

#[test]
fn predictions_follow_their_columns() {
    let (x, y) = separable_batch();
    let mut model = Classifier::new();
    model
        .train(&x, &y, &TrainConfig::new(4, 8, 3, 300, 0.5), None, &mut StdRng::seed_from_u64(7))
        .unwrap();

    let forward_order = model.predict(&x).unwrap();
    let reversed: Vec<Vec<f64>> = (0..x.cols).rev().map(|j| x.column(j)).collect();
    let mut backward_order = model.predict(&Matrix::from_columns(&reversed)).unwrap();
    backward_order.reverse();
    assert_eq!(forward_order, backward_order);

    for j in 0..x.cols {
        assert_eq!(model.predict_single(&x.column(j)).unwrap(), forward_order[j]);
    }
}
