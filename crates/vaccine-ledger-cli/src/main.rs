use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use vaccine_ledger_core::{
    constants::DEFAULT_DIFFICULTY, Ledger, LedgerConfig, Record, RecordBatch,
};

#[derive(Parser, Debug)]
#[command(name = "vaccine-ledger")]
#[command(about = "Mine vaccination records into a hash-chained ledger")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine the built-in sample records and report the chain
    Demo {
        #[command(flatten)]
        mining: MiningArgs,
    },
    /// Mine one block per batch given on the command line
    Mine {
        /// A JSON array of record objects, e.g. '[{"name":"A","vaccinated":true}]'
        #[arg(long = "batch", required = true)]
        batches: Vec<String>,
        #[command(flatten)]
        mining: MiningArgs,
    },
}

#[derive(Args, Debug)]
struct MiningArgs {
    /// Required leading zero hex digits in each block hash
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: u32,
    /// Search nonces on all cores
    #[arg(long)]
    parallel: bool,
    /// Print the whole ledger as JSON
    #[arg(long)]
    json: bool,
}

impl MiningArgs {
    fn ledger(&self) -> Result<Ledger> {
        let config = LedgerConfig {
            difficulty: self.difficulty,
            parallel_mining: self.parallel,
        };
        Ledger::with_config(config).context("invalid ledger configuration")
    }
}

#[derive(Serialize)]
struct Report<'a> {
    ledger: &'a Ledger,
    intact: bool,
    valid: bool,
}

fn record(value: Value) -> Result<Record> {
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("records must be JSON objects, got {other}"),
    }
}

fn sample_batches() -> Result<Vec<RecordBatch>> {
    Ok(vec![
        vec![
            record(json!({ "name": "Mateus Denucci", "cpf": "46943393030", "is_vaccinated": true }))?,
            record(json!({ "name": "Random Person", "cpf": "46943393030", "is_vaccinated": false }))?,
        ],
        vec![record(
            json!({ "name": "Random Person 2", "cpf": "46943396030", "is_vaccinated": false }),
        )?],
    ])
}

fn parse_batch(raw: &str) -> Result<RecordBatch> {
    let values: Vec<Value> =
        serde_json::from_str(raw).with_context(|| format!("batch is not a JSON array: {raw}"))?;
    values.into_iter().map(record).collect()
}

fn run(batches: Vec<RecordBatch>, mining: &MiningArgs) -> Result<()> {
    let mut ledger = mining.ledger()?;
    for batch in batches {
        ledger.add_transaction(batch);
        let index = ledger.mine()?;
        info!("mined block {index}");
    }

    let intact = ledger.chain_is_intact();
    let valid = ledger.is_valid();

    if mining.json {
        let report = Report {
            ledger: &ledger,
            intact,
            valid,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for block in ledger.blocks() {
            println!(
                "block {} nonce {} hash {}",
                block.index(),
                block.nonce(),
                block.block_hash()
            );
            println!("{}", serde_json::to_string(block.transactions())?);
        }
        println!("intact: {intact}");
        println!("valid: {valid}");
    }
    Ok(())
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .pretty()
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo { mining } => run(sample_batches()?, &mining),
        Command::Mine { batches, mining } => {
            let batches = batches
                .iter()
                .map(|raw| parse_batch(raw))
                .collect::<Result<Vec<_>>>()?;
            run(batches, &mining)
        }
    }
}
