mod common;

use common::{ledger_with_difficulty, random_batch, record, vaccination};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::json;
use vaccine_ledger_core::{
    create_ledger, pow, Block, Ledger, LedgerConfig, LedgerError, SharedLedger,
};

#[test]
fn test_vaccination_scenario() -> anyhow::Result<()> {
    let mut ledger = create_ledger();
    assert_eq!(ledger.tip().index(), 0);

    ledger.add_transaction(vec![record(json!({ "name": "A", "vaccinated": true }))]);
    assert_eq!(ledger.mine()?, 1);
    assert_eq!(ledger.len(), 2);
    assert!(ledger.pending().is_empty());

    ledger.add_transaction(vec![record(json!({ "name": "B", "vaccinated": false }))]);
    assert_eq!(ledger.mine()?, 2);
    assert_eq!(ledger.len(), 3);

    assert!(ledger.chain_is_intact());
    assert_eq!(ledger.mine(), Err(LedgerError::EmptyPool));
    assert_eq!(ledger.mine().ok(), None);
    assert_eq!(ledger.len(), 3);
    Ok(())
}

#[test]
fn test_sample_vaccination_records() -> anyhow::Result<()> {
    let mut ledger = create_ledger();
    ledger.add_transaction(vec![
        vaccination("Mateus Denucci", "46943393030", true),
        vaccination("Random Person", "46943393030", false),
    ]);
    ledger.mine()?;
    ledger.add_transaction(vec![vaccination("Random Person 2", "46943396030", false)]);
    ledger.mine()?;

    let names: Vec<Vec<String>> = ledger
        .blocks()
        .map(|block| {
            block
                .transactions()
                .iter()
                .flatten()
                .map(|r| r["name"].as_str().unwrap_or_default().to_owned())
                .collect()
        })
        .collect();
    assert_eq!(
        names,
        vec![
            vec![],
            vec!["Mateus Denucci".to_owned(), "Random Person".to_owned()],
            vec!["Random Person 2".to_owned()],
        ]
    );
    assert!(ledger.chain_is_intact());
    ledger.verify()?;
    Ok(())
}

#[test]
fn test_random_chain_invariants() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut ledger = ledger_with_difficulty(2);

    for _ in 0..20 {
        for _ in 0..rand::Rng::gen_range(&mut rng, 1..4) {
            ledger.add_transaction(random_batch(&mut rng));
        }
        ledger.mine()?;
    }

    let blocks: Vec<&Block> = ledger.blocks().collect();
    assert_eq!(blocks.len(), 21);
    for (i, block) in blocks.iter().enumerate() {
        assert_eq!(block.index(), i as u64);
        assert_eq!(block.compute_hash(), block.block_hash());
        if i > 0 {
            assert_eq!(block.previous_block_hash(), blocks[i - 1].block_hash());
            assert!(pow::hex_meets_difficulty(block.block_hash(), 2));
        }
    }
    assert!(ledger.chain_is_intact());
    ledger.verify()?;
    Ok(())
}

#[test]
fn test_external_mining_path() -> anyhow::Result<()> {
    let mut ledger = ledger_with_difficulty(2);
    ledger.add_transaction(vec![vaccination("C", "1", true)]);

    let block = pow::mine_parallel(ledger.candidate()?, ledger.difficulty());
    assert_eq!(ledger.add_block(block)?, 1);
    assert!(ledger.pending().is_empty());
    assert!(ledger.is_valid());
    Ok(())
}

#[test]
fn test_block_from_other_ledger_is_stale() -> anyhow::Result<()> {
    let mut ours = ledger_with_difficulty(1);
    let mut theirs = ledger_with_difficulty(1);
    theirs.add_transaction(vec![vaccination("D", "2", false)]);
    let foreign = pow::mine(theirs.candidate()?, 1);

    ours.add_transaction(vec![vaccination("E", "3", true)]);
    ours.mine()?;
    ours.add_transaction(vec![vaccination("G", "5", true)]);
    let err = ours.add_block(foreign).unwrap_err();
    assert!(matches!(err, LedgerError::StaleTip { .. }));
    assert_eq!(ours.len(), 2);
    assert_eq!(ours.pending().len(), 1);
    Ok(())
}

#[test]
fn test_ledger_report_serialization() -> anyhow::Result<()> {
    let mut ledger = Ledger::with_config(LedgerConfig::with_difficulty(1))?;
    ledger.add_transaction(vec![vaccination("F", "4", true)]);
    ledger.mine()?;

    let report = serde_json::to_value(&ledger)?;
    assert_eq!(report["config"]["difficulty"], 1);
    assert_eq!(report["chain"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["chain"][0]["previous_block_hash"], "First Block");
    assert_eq!(report["chain"][1]["transactions"][0][0]["name"], "F");
    assert_eq!(report["unconfirmed_transactions"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_shared_ledger_mining_off_thread() -> anyhow::Result<()> {
    let shared = SharedLedger::new(ledger_with_difficulty(2));
    let mut rng = StdRng::seed_from_u64(11);

    let mut tasks = Vec::new();
    for _ in 0..4 {
        shared.add_transaction(random_batch(&mut rng));
        let ledger = shared.clone();
        tasks.push(tokio::task::spawn_blocking(move || ledger.mine()));
    }

    let mut indices = Vec::new();
    for task in tasks {
        if let Ok(index) = task.await? {
            indices.push(index);
        }
    }
    indices.sort_unstable();
    indices.dedup();

    assert_eq!(shared.len(), indices.len() + 1);
    assert_eq!(shared.pending_len(), 0);
    assert!(shared.chain_is_intact());
    shared.verify()?;
    Ok(())
}
