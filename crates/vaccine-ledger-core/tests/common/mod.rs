#![allow(dead_code)]

use rand::Rng;
use serde_json::{json, Value};
use vaccine_ledger_core::{Ledger, LedgerConfig, Record, RecordBatch};

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("record fixture must be a JSON object, got {other}"),
    }
}

pub fn vaccination(name: &str, cpf: &str, is_vaccinated: bool) -> Record {
    record(json!({ "name": name, "cpf": cpf, "is_vaccinated": is_vaccinated }))
}

pub fn random_batch<R: Rng>(rng: &mut R) -> RecordBatch {
    let size = rng.gen_range(1..5);
    (0..size)
        .map(|_| {
            let cpf: String = (0..11).map(|_| char::from(b'0' + rng.gen_range(0..10))).collect();
            vaccination(&format!("patient-{}", rng.gen::<u32>()), &cpf, rng.gen_bool(0.5))
        })
        .collect()
}

pub fn ledger_with_difficulty(difficulty: u32) -> Ledger {
    Ledger::with_config(LedgerConfig::with_difficulty(difficulty)).expect("valid difficulty")
}
