//! Integration test: Train / Predict / Evaluate / Info through the lifecycle

use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use std::thread;
use stock_ann::prelude::*;

/// Synthetic daily OHLCV file with `rows` rows; `extra` adds an `Adj` column
fn ohlcv(rows: usize, extra: bool) -> String {
    let start = NaiveDate::from_ymd_opt(2019, 1, 2).unwrap();
    let mut out = if extra {
        String::from("Date,Open,High,Low,Close,Adj,Volume\n")
    } else {
        String::from("Date,Open,High,Low,Close,Volume\n")
    };

    for i in 0..rows {
        let date = start + Duration::days(i as i64);
        let t = i as f64;
        let open = 200.0 + 30.0 * (t / 40.0).sin() + t * 0.05;
        let close = open + 2.0 * (t / 7.0).cos();
        let high = open.max(close) + 1.5;
        let low = open.min(close) - 1.5;
        let volume = 1_000_000.0 + 250_000.0 * (t / 15.0).sin() + 800.0 * (high - low);
        if extra {
            out.push_str(&format!(
                "{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.0}\n",
                date, open, high, low, close, close, volume
            ));
        } else {
            out.push_str(&format!(
                "{},{:.2},{:.2},{:.2},{:.2},{:.0}\n",
                date, open, high, low, close, volume
            ));
        }
    }
    out
}

#[test]
fn test_train_1131_rows() {
    let lifecycle = ModelLifecycle::default();
    let summary = lifecycle
        .train(ohlcv(1131, false).as_bytes(), TrainParams::new(20, 32, 0.2))
        .unwrap();

    assert_eq!(summary.status, "success");
    assert_eq!(summary.data_shape, (1131, 5));
    assert_eq!(summary.train_samples + summary.test_samples, 1131);
    assert!((summary.train_samples as i64 - 904).abs() <= 1);
    assert!((summary.test_samples as i64 - 227).abs() <= 1);
    assert!(summary.loss.is_finite() && summary.mae.is_finite());
    assert!(summary.training_time > 0.0);

    let prediction = lifecycle.predict(&[251.55, 253.67, 247.14, 247.45]).unwrap();
    assert_eq!(prediction.model_id, summary.model_id);
    assert!(prediction.prediction.is_finite());

    let info = lifecycle.info().unwrap();
    assert_eq!(info.input_features, 4);
    assert_eq!(info.feature_names, vec!["Open", "High", "Low", "Close"]);
    assert_eq!(info.target_name, "Volume");
    assert_eq!(info.epochs, 20);
    assert_eq!(info.loss, summary.loss);
}

#[test]
fn test_wrong_feature_count_always_rejected() {
    let lifecycle = ModelLifecycle::default();
    lifecycle
        .train(ohlcv(60, false).as_bytes(), TrainParams::new(2, 32, 0.2))
        .unwrap();

    for len in [1usize, 3, 5, 8] {
        let features = vec![250.0; len];
        let err = lifecycle.predict(&features).unwrap_err();
        assert!(
            matches!(err, ForecastError::FeatureMismatch { expected: 4, actual } if actual == len),
            "{:?}",
            err
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[test]
fn test_five_feature_model_rejects_four_values() {
    let lifecycle = ModelLifecycle::default();
    lifecycle
        .train(ohlcv(60, true).as_bytes(), TrainParams::new(2, 32, 0.2))
        .unwrap();

    assert!(lifecycle.predict(&[251.55, 253.67, 247.14, 247.45, 247.45]).is_ok());
    assert!(matches!(
        lifecycle.predict(&[251.55, 253.67, 247.14, 247.45]),
        Err(ForecastError::FeatureMismatch { expected: 5, actual: 4 })
    ));
}

#[test]
fn test_operations_before_train_are_not_found() {
    let lifecycle = ModelLifecycle::default();

    let err = lifecycle.evaluate(ohlcv(20, false).as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(lifecycle.predict(&[1.0, 2.0, 3.0, 4.0]).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(lifecycle.info().unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_evaluate_on_training_file() {
    let lifecycle = ModelLifecycle::default();
    let csv = ohlcv(300, false);
    let summary = lifecycle
        .train(csv.as_bytes(), TrainParams::new(15, 32, 0.2))
        .unwrap();

    let outcome = lifecycle.evaluate(csv.as_bytes()).unwrap();
    assert_eq!(outcome.model_id, summary.model_id);
    assert_eq!(outcome.test_samples, 300);
    assert!(outcome.loss.is_finite() && outcome.loss >= 0.0);

    // Same native units and scale as the held-out figures
    let ratio = outcome.mae / summary.mae;
    assert!(ratio > 0.05 && ratio < 20.0, "evaluate mae {} vs train mae {}", outcome.mae, summary.mae);
}

#[test]
fn test_info_is_idempotent() {
    let lifecycle = ModelLifecycle::default();
    lifecycle
        .train(ohlcv(40, false).as_bytes(), TrainParams::new(2, 8, 0.25))
        .unwrap();

    let first = lifecycle.info().unwrap();
    let second = lifecycle.info().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.test_samples, 10);
}

#[test]
fn test_invalid_input_leaves_registry_untouched() {
    let lifecycle = ModelLifecycle::default();
    let summary = lifecycle
        .train(ohlcv(40, false).as_bytes(), TrainParams::new(2, 8, 0.2))
        .unwrap();

    let bad_params = [
        TrainParams::new(0, 32, 0.2),
        TrainParams::new(1001, 32, 0.2),
        TrainParams::new(10, 0, 0.2),
        TrainParams::new(10, 513, 0.2),
        TrainParams::new(10, 32, 0.05),
        TrainParams::new(10, 32, 0.55),
    ];
    for params in bad_params {
        let err = lifecycle.train(ohlcv(40, false).as_bytes(), params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{:?}", params);
    }

    let too_few = ohlcv(9, false);
    assert_eq!(
        lifecycle.train(too_few.as_bytes(), TrainParams::default()).unwrap_err().kind(),
        ErrorKind::Validation
    );

    let non_numeric = ohlcv(20, false).replacen(",1", ",x1", 1);
    assert_eq!(
        lifecycle.train(non_numeric.as_bytes(), TrainParams::default()).unwrap_err().kind(),
        ErrorKind::Validation
    );

    assert_eq!(
        lifecycle.train(b"not,a\ncsv", TrainParams::default()).unwrap_err().kind(),
        ErrorKind::Validation
    );

    assert_eq!(lifecycle.info().unwrap().model_id, summary.model_id);
}

#[test]
fn test_retrain_gets_new_identifier() {
    let lifecycle = ModelLifecycle::default();
    let csv = ohlcv(40, false);
    let a = lifecycle.train(csv.as_bytes(), TrainParams::new(1, 8, 0.2)).unwrap();
    let b = lifecycle.train(csv.as_bytes(), TrainParams::new(1, 8, 0.2)).unwrap();

    assert_ne!(a.model_id, b.model_id);
    assert_eq!(lifecycle.info().unwrap().model_id, b.model_id);
}

#[test]
fn test_concurrent_predicts_during_train() {
    let lifecycle = Arc::new(ModelLifecycle::default());
    let first = lifecycle
        .train(ohlcv(80, false).as_bytes(), TrainParams::new(2, 16, 0.2))
        .unwrap();

    let trainer = {
        let lifecycle = Arc::clone(&lifecycle);
        thread::spawn(move || {
            lifecycle
                .train(ohlcv(200, true).as_bytes(), TrainParams::new(5, 16, 0.2))
                .unwrap()
        })
    };

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let lifecycle = Arc::clone(&lifecycle);
            let first_id = first.model_id.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    match lifecycle.predict(&[251.55, 253.67, 247.14, 247.45]) {
                        // Old 4-feature artifact
                        Ok(outcome) => assert_eq!(outcome.model_id, first_id),
                        // New 5-feature artifact
                        Err(ForecastError::FeatureMismatch { expected, actual }) => {
                            assert_eq!((expected, actual), (5, 4));
                        }
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
    let second = trainer.join().unwrap();

    // Once Train has returned, its artifact is visible
    assert_eq!(lifecycle.info().unwrap().model_id, second.model_id);
    assert!(lifecycle.predict(&[251.55, 253.67, 247.14, 247.45, 247.45]).is_ok());
}

#[test]
fn test_explicit_target_column() {
    let config = LifecycleConfig::default()
        .with_preprocessing(PreprocessingConfig::new().with_target_column("Close"));
    let lifecycle = ModelLifecycle::new(config);

    let summary = lifecycle
        .train(ohlcv(40, false).as_bytes(), TrainParams::new(1, 8, 0.2))
        .unwrap();
    assert_eq!(summary.data_shape, (40, 5));

    let info = lifecycle.info().unwrap();
    assert_eq!(info.target_name, "Close");
    assert_eq!(info.feature_names, vec!["Open", "High", "Low", "Volume"]);
}

#[test]
fn test_export_and_install() {
    let lifecycle = ModelLifecycle::default();
    let summary = lifecycle
        .train(ohlcv(40, false).as_bytes(), TrainParams::new(2, 8, 0.2))
        .unwrap();
    let expected = lifecycle.predict(&[210.0, 212.0, 208.0, 211.0]).unwrap().prediction;

    let path = std::env::temp_dir().join(format!("stock-ann-{}.json", summary.model_id));
    lifecycle.export(&path).unwrap();

    let restored = ModelLifecycle::default();
    restored.install(RegistryEntry::load(&path).unwrap());
    std::fs::remove_file(&path).ok();

    assert_eq!(restored.info().unwrap().model_id, summary.model_id);
    let actual = restored.predict(&[210.0, 212.0, 208.0, 211.0]).unwrap().prediction;
    assert!((actual - expected).abs() <= 1e-6 * expected.abs().max(1.0));
}
