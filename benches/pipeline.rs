use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tabular_preprocessing::pipeline::{
    ClipOutliers, EncodeMethod, MissingStrategy, Preprocessor, ScaleMethod, SplitRatios,
};

fn synth_csv(rows: usize) -> String {
    let mut out = String::from("age,income,score,city,label\n");
    for i in 0..rows {
        let income = if i % 13 == 0 {
            String::new() // sprinkle missing cells for the imputer
        } else {
            (30_000 + (i * 37) % 90_000).to_string()
        };
        out.push_str(&format!(
            "{},{income},{:.2},{},{}\n",
            20 + i % 50,
            (i as f64 * 0.7) % 100.0,
            ["NYC", "LA", "SF", "CHI"][i % 4],
            i % 2
        ));
    }
    out
}

fn bench_pipeline(c: &mut Criterion) {
    let csv = synth_csv(5_000);

    c.bench_function("full_pipeline_5k_rows", |b| {
        b.iter(|| {
            let mut prep = Preprocessor::from_csv_str(black_box(&csv)).unwrap();
            prep.handle_missing_values(MissingStrategy::Mean, None).unwrap();
            prep.encode_categorical(EncodeMethod::Onehot, Some(&["city"]), None)
                .unwrap();
            prep.clip_outliers(&ClipOutliers::iqr()).unwrap();
            prep.normalize(ScaleMethod::Zscore, None).unwrap();
            prep.split_data(SplitRatios::default(), Some(7)).unwrap();
            prep.to_tensors().unwrap()
        })
    });

    let prep = {
        let mut p = Preprocessor::from_csv_str(&csv).unwrap();
        p.handle_missing_values(MissingStrategy::Mean, None).unwrap();
        p
    };
    c.bench_function("correlation_matrix_5k_rows", |b| {
        b.iter(|| black_box(&prep).correlation_matrix().unwrap())
    });
    c.bench_function("describe_5k_rows", |b| {
        b.iter(|| black_box(&prep).describe())
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
