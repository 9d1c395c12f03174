use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::json;
use vaccine_ledger_core::{pow, CandidateBlock, Record, RecordBatch};

fn candidate() -> CandidateBlock {
    let mut rng = StdRng::seed_from_u64(42);
    let batches: Vec<RecordBatch> = (0..10)
        .map(|i| {
            let mut record = Record::new();
            record.insert("name".into(), json!(format!("patient-{i}")));
            record.insert("vaccinated".into(), json!(rng.gen_bool(0.5)));
            record.insert("dose".into(), json!(rng.gen_range(1..4)));
            vec![record]
        })
        .collect();
    CandidateBlock::new(1, "0".repeat(64), batches, 1_600_000_000_000)
}

fn bench_pow(c: &mut Criterion) {
    let block = candidate();

    c.bench_function("mine_difficulty_4", |b| {
        b.iter(|| pow::mine(block.clone(), 4));
    });

    c.bench_function("mine_parallel_difficulty_4", |b| {
        b.iter(|| pow::mine_parallel(block.clone(), 4));
    });
}

criterion_group!(benches, bench_pow);
criterion_main!(benches);
