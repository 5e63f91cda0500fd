use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tabular_preprocessing::ingestion::csv::{parse_csv_str, write_csv};
use tabular_preprocessing::ingestion::json::parse_json_str;

fn synth_csv(rows: usize) -> String {
    let mut out = String::from("id,age,income,city,label\n");
    for i in 0..rows {
        out.push_str(&format!(
            "{i},{},{},{},{}\n",
            20 + i % 50,
            30_000 + (i * 37) % 90_000,
            ["NYC", "LA", "SF", "CHI"][i % 4],
            i % 2
        ));
    }
    out
}

fn synth_json(rows: usize) -> String {
    let mut items = Vec::with_capacity(rows);
    for i in 0..rows {
        items.push(format!(
            r#"{{"id":{i},"age":{},"city":"{}"}}"#,
            20 + i % 50,
            ["NYC", "LA", "SF", "CHI"][i % 4]
        ));
    }
    format!("[{}]", items.join(","))
}

fn bench_ingestion(c: &mut Criterion) {
    let csv = synth_csv(10_000);
    c.bench_function("parse_csv_10k_rows", |b| {
        b.iter(|| parse_csv_str(black_box(&csv)).unwrap())
    });

    let json = synth_json(10_000);
    c.bench_function("parse_json_10k_rows", |b| {
        b.iter(|| parse_json_str(black_box(&json)).unwrap())
    });

    let table = parse_csv_str(&csv).unwrap();
    c.bench_function("write_csv_10k_rows", |b| {
        b.iter(|| write_csv(black_box(&table)).unwrap())
    });
}

criterion_group!(benches, bench_ingestion);
criterion_main!(benches);
