#![forbid(unsafe_code)]
use clap::Parser;
use powledger::config::{load_config, DEFAULT_CONFIG_PATH};
use powledger::{Block, Blockchain, KeyPair, MiningLimits, Transaction};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "powledger-demo", about = "Mine and validate a two-block demo ledger")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override the configured proof-of-work difficulty
    #[arg(short, long)]
    difficulty: Option<usize>,
}

fn print_block(block: &Block) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}\n", serde_json::to_string_pretty(block)?);
    Ok(())
}

fn mine_and_append(
    chain: &mut Blockchain,
    tx: Transaction,
    bounded: bool,
    limits: &MiningLimits,
) -> Result<Block, Box<dyn std::error::Error>> {
    let previous_hash = chain.tip().hash.clone();
    let start = Instant::now();
    let block = if bounded {
        chain.new_block_bounded(vec![tx], previous_hash, limits)?
    } else {
        chain.new_block(vec![tx], previous_hash)
    };
    info!(
        "Mined block {} in {:.3}s (nonce={})",
        block.index,
        start.elapsed().as_secs_f64(),
        block.nonce
    );
    chain.add_block(block.clone())?;
    Ok(block)
}

fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = load_config(&args.config)?;
    if let Some(difficulty) = args.difficulty {
        config.set_difficulty(difficulty)?;
    }
    let limits = config.miner.limits()?;
    let bounded = config.miner.is_bounded();

    let mut chain = Blockchain::from_config(&config.chain);
    info!("Created ledger (difficulty = {})", chain.difficulty());

    let (alice, bob) = match (KeyPair::generate(), KeyPair::generate()) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            error!("Key generation failed: {}", e);
            std::process::exit(1);
        }
    };

    let tx1 = Transaction::new("Alice", "Bob", 100.0, &alice)?;
    if !tx1.verify(&alice.public_key) {
        error!("Transaction {} is invalid", tx1.hash_str());
        return Ok(false);
    }
    let block1 = mine_and_append(&mut chain, tx1, bounded, &limits)?;
    println!("Block 1 added!");
    print_block(&block1)?;

    let tx2 = Transaction::new("Bob", "Alice", 50.0, &bob)?;
    if !tx2.verify(&bob.public_key) {
        error!("Transaction {} is invalid", tx2.hash_str());
        return Ok(false);
    }
    let block2 = mine_and_append(&mut chain, tx2, bounded, &limits)?;
    println!("Block 2 added!");
    print_block(&block2)?;

    match chain.verify_chain() {
        Ok(()) => {
            println!("The blockchain is valid ({} blocks).", chain.len());
            Ok(true)
        }
        Err(e) => {
            println!("Error: blockchain is invalid: {}", e);
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
