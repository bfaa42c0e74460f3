//! End to end runs of the sweep harness on toy datasets.

use candle_core::Device;

use phishgnn::graph::synthetic::toy_dataset;
use phishgnn::prelude::*;
use phishgnn::sweep::{AccuracyStats, SplitStats};

fn log_init_test() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn graphsage_separates_toy_graphs() {
    log_init_test();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    let dataset = toy_dataset(10, 113).unwrap();
    assert_eq!(dataset.class_counts(), vec![5, 5]);
    let params = SweepParams::new(vec![ModelKind::GraphSage], vec![Pooling::Mean], vec![32], 10)
        .with_batch_size(4)
        .with_result_path(&path);
    let outcome = run_sweep(&dataset, &params, &Device::Cpu).unwrap();
    assert_eq!(outcome.runs.len(), 1);
    let history = &outcome.runs[0].history;
    assert_eq!(history.get_nb_epochs(), 10);
    assert_eq!(*history.test_accuracies.last().unwrap(), 1.);
    //
    assert_eq!(outcome.record.len(), 1);
    assert!(outcome.record.contains(ModelKind::GraphSage, Pooling::Mean, 32));
    assert_eq!(ResultRecord::load(&path).unwrap(), outcome.record);
}

#[test]
fn record_is_persisted_after_each_combination() {
    log_init_test();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    let dataset = toy_dataset(10, 5).unwrap();
    let params = SweepParams::new(vec![ModelKind::Gcn, ModelKind::Gin], vec![Pooling::Mean, Pooling::Sum], vec![8], 2)
        .with_batch_size(4)
        .with_result_path(&path);
    let outcome = run_sweep(&dataset, &params, &Device::Cpu).unwrap();
    assert_eq!(outcome.runs.len(), 4);
    assert_eq!(outcome.record.len(), 4);
    // combinations complete in enumeration order
    let order: Vec<(ModelKind, Pooling)> = outcome.runs.iter().map(|r| (r.kind, r.pooling)).collect();
    assert_eq!(
        order,
        vec![
            (ModelKind::Gcn, Pooling::Mean),
            (ModelKind::Gcn, Pooling::Sum),
            (ModelKind::Gin, Pooling::Mean),
            (ModelKind::Gin, Pooling::Sum)
        ]
    );
    let reloaded = ResultRecord::load(&path).unwrap();
    assert_eq!(reloaded.len(), 4);
    for run in &outcome.runs {
        let stats = reloaded.get(run.kind, run.pooling, run.hidden).unwrap();
        assert_eq!(*stats, run.history.stats().unwrap());
        assert!((0. ..=1.).contains(&stats.train.mean));
        assert!(stats.test.std >= 0.);
    }
}

#[test]
fn resume_skips_recorded_combinations() {
    log_init_test();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    let previous = SplitStats {
        train: AccuracyStats { mean: 0.123, std: 0. },
        test: AccuracyStats { mean: 0.456, std: 0. },
    };
    let mut record = ResultRecord::new();
    record.insert(ModelKind::Gcn, Pooling::Max, 8, previous);
    record.persist(&path).unwrap();
    //
    let dataset = toy_dataset(8, 9).unwrap();
    let params = SweepParams::new(vec![ModelKind::Gcn], vec![Pooling::Mean, Pooling::Max], vec![8], 1)
        .with_batch_size(4)
        .with_result_path(&path)
        .with_resume(true);
    let outcome = run_sweep(&dataset, &params, &Device::Cpu).unwrap();
    assert_eq!(outcome.runs.len(), 1);
    assert_eq!(outcome.runs[0].pooling, Pooling::Mean);
    assert_eq!(outcome.record.len(), 2);
    assert_eq!(*outcome.record.get(ModelKind::Gcn, Pooling::Max, 8).unwrap(), previous);
    // without resume the file is started again
    let outcome = run_sweep(&dataset, &params.with_resume(false), &Device::Cpu).unwrap();
    assert_eq!(outcome.runs.len(), 2);
    assert_ne!(*outcome.record.get(ModelKind::Gcn, Pooling::Max, 8).unwrap(), previous);
}

#[test]
fn unwritable_record_stops_the_sweep() {
    log_init_test();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("results.json");
    let dataset = toy_dataset(6, 1).unwrap();
    let params = SweepParams::new(vec![ModelKind::Gcn], vec![Pooling::Mean], vec![4], 1)
        .with_batch_size(4)
        .with_result_path(&path);
    let res = run_sweep(&dataset, &params, &Device::Cpu);
    assert!(matches!(res, Err(GnnError::Persistence(_))));
}

#[test]
fn fit_converges_on_four_separable_graphs() {
    log_init_test();
    let device = Device::Cpu;
    let dataset = toy_dataset(4, 21).unwrap();
    let graphs = dataset.get_graphs().to_vec();
    let mut train_loader = DataLoader::new(graphs.clone(), 4, true, 3, &device).unwrap();
    let mut eval_loader = DataLoader::new(graphs, 4, false, 0, &device).unwrap();
    let config = ModelConfig::new(Some(1), 16, Some(2));
    let mut model = build_model(ModelKind::Gcn, &config, &device).unwrap();
    let mut optimizer = build_optimizer(&*model, &OptimizerParams::default()).unwrap();
    //
    let mut accuracies = vec![model.evaluate(&mut eval_loader).unwrap()];
    for _ in 0..100 {
        model.fit(&mut train_loader, &mut optimizer, cross_entropy).unwrap();
        accuracies.push(model.evaluate(&mut eval_loader).unwrap());
    }
    assert!(accuracies.windows(2).all(|w| w[1] >= w[0]), "accuracy decreased : {:?}", accuracies);
    assert_eq!(*accuracies.last().unwrap(), 1.);
    assert!(model.embeddings().is_some());
}
