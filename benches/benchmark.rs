// Throughput benchmarks for ingestion, query analysis and reranking
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use sheetsense::{Column, Dataset, Engine, IndexPayload, RawHit};
use std::collections::BTreeMap;

const METRICS: &[&str] = &[
    "Total Revenue", "Cost of Goods Sold", "Gross Profit", "Operating Expenses", "EBITDA",
    "Cash Balance", "Debt Ratio", "Marketing Spend", "Headcount", "Forecast Sales",
];

const CATEGORIES: &[&str] = &[
    "revenue", "cost", "margin", "growth", "efficiency", "ratio", "forecast", "liquidity",
];

fn generate_dataset(rows: usize) -> Dataset {
    let mut rng = rand::rng();
    let mut metric = Vec::with_capacity(rows);
    let mut value = Vec::with_capacity(rows);
    let mut share = Vec::with_capacity(rows);
    let mut period = Vec::with_capacity(rows);

    for i in 0..rows {
        metric.push(METRICS[i % METRICS.len()].to_string());
        value.push(format!("${}", rng.random_range(1_000..5_000_000)));
        share.push(format!("{}%", rng.random_range(0..100)));
        period.push(format!("2024-{:02}-28", i % 12 + 1));
    }

    Dataset::new(vec![
        Column::new("Metric", metric),
        Column::new("Value", value),
        Column::new("Share %", share),
        Column::new("Period", period),
    ])
    .unwrap()
}

fn generate_hits(count: usize) -> Vec<RawHit> {
    let mut rng = rand::rng();
    (0..count)
        .map(|i| {
            let categories = CATEGORIES
                .iter()
                .filter(|_| rng.random_bool(0.25))
                .map(|c| c.to_string())
                .collect();
            RawHit::new(
                IndexPayload {
                    // some duplicates, as a hybrid search produces
                    row_index: rng.random_range(0..count as u64),
                    row_text: format!("Metric: row {}", i),
                    business_categories: categories,
                    column_types: BTreeMap::new(),
                },
                rng.random_range(0.0f32..1.0f32),
            )
        })
        .collect()
}

fn benchmark_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");
    let engine = Engine::default();

    for size in [100, 1000, 10000].iter() {
        let dataset = generate_dataset(*size);
        group.bench_with_input(BenchmarkId::new("rows", size), size, |b, _| {
            b.iter(|| engine.ingest(black_box(&dataset)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_analyze(c: &mut Criterion) {
    let engine = Engine::default();
    let queries = [
        "What is the total revenue?",
        "compare budget vs actual marketing spend",
        "where is the EBITDA row",
        "customers in northern europe with late invoices and revenue",
    ];

    c.bench_function("analyze_query", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(engine.analyze(black_box(query)).unwrap());
            }
        });
    });
}

fn benchmark_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    let engine = Engine::default();
    let analysis = engine.analyze("revenue and gross margin forecast").unwrap();

    for size in [20, 200, 2000].iter() {
        let hits = generate_hits(*size);
        group.bench_with_input(BenchmarkId::new("hits", size), size, |b, _| {
            b.iter(|| engine.rank(black_box(&analysis), hits.clone(), 10).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_ingest, benchmark_analyze, benchmark_rank);
criterion_main!(benches);
