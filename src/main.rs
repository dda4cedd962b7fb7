// Entry point for the ledger CLI
use clap::Parser;
use iot_ledger::cli::parse_payload;
use iot_ledger::report::{truncate_hash, ChainReport};
use iot_ledger::{
    generate_key_pair, sign, verify, Blockchain, Command, LedgerConfig, Opt, PublicKey, Record,
    SensorEventGenerator, Signature,
};
use log::{error, LevelFilter};
use std::fs;
use std::process;
use std::time::Duration;

// Device message signed and then altered in the demo
const DEMO_MESSAGE: &str = "ID_DISPOSITIVO: 789, DATOS: 42.0";
const DEMO_FORGED_MESSAGE: &str = "ID_DISPOSITIVO: 789, DATOS: 99.9";

// Hex characters of a signature shown before the ellipsis
const SIGNATURE_PREVIEW_LEN: usize = 40;

fn main() {
    // Info level by default, RUST_LOG still wins
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

// Defaults, then the config file and LEDGER_* variables, then command-line flags
fn build_config(opt: &Opt) -> Result<LedgerConfig, Box<dyn std::error::Error>> {
    let mut config = LedgerConfig::load(opt.config.as_deref())?;
    if let Some(difficulty) = opt.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(secs) = opt.timeout_secs {
        config.mining.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    if let Some(scheme) = opt.scheme {
        config.signature_scheme = scheme;
    }
    config.validate()?;
    Ok(config)
}

fn print_report(blockchain: &Blockchain, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let report = ChainReport::from_chain(blockchain);
    if as_json {
        println!("{}", report.to_json_pretty()?);
        return Ok(());
    }

    println!(
        "Chain of {} blocks (difficulty {})",
        report.length, report.difficulty
    );
    for block in &report.blocks {
        println!("Block #{} [{}]", block.index, block.timestamp);
        println!("  Data:          {}", block.data);
        println!("  Nonce:         {}", block.nonce);
        println!("  Hash:          {}", block.hash);
        println!("  Previous hash: {}", block.previous_hash);
    }
    println!("Chain valid: {:?}", report.validation.as_tuple());
    Ok(())
}

fn run(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&opt)?;

    match opt.command {
        // Two readings, a tampered block, then a signed device message
        Command::Demo => {
            println!("--- Ledger ---");
            let mut blockchain = Blockchain::with_config(&config)?;
            blockchain.append(Record::new().with("sensor", "temp").with("valor", 22.5))?;
            blockchain.append(Record::new().with("sensor", "hum").with("valor", 60.1))?;

            println!("Chain valid: {:?}", blockchain.validate().as_tuple());
            println!("Tampering with block 1...");
            if !blockchain.tamper(1, Record::new().with("sensor", "temp").with("valor", 500.0)) {
                return Err(format!(
                    "Cannot tamper with block 1 (chain length {})",
                    blockchain.len()
                )
                .into());
            }
            println!("Chain valid: {:?}", blockchain.validate().as_tuple());

            println!();
            println!("--- Digital signature ({}) ---", config.signature_scheme);
            let key_pair = generate_key_pair(config.signature_scheme)?;
            let signature = key_pair.sign(DEMO_MESSAGE)?;
            let signature_hex = signature.to_hex();
            let preview_len = SIGNATURE_PREVIEW_LEN.min(signature_hex.len());

            println!("Data: {DEMO_MESSAGE}");
            println!("Signature (hex): {}...", &signature_hex[..preview_len]);
            println!(
                "Verification (correct data): {}",
                key_pair.verify(DEMO_MESSAGE, &signature)?
            );
            println!(
                "Verification (forged data): {}",
                key_pair.verify(DEMO_FORGED_MESSAGE, &signature)?
            );
        }
        Command::Record {
            payloads,
            tamper,
            json,
        } => {
            let mut blockchain = Blockchain::with_config(&config)?;
            for payload in &payloads {
                blockchain.append(parse_payload(payload)?)?;
            }
            if let Some(request) = tamper {
                if !blockchain.tamper(request.index, parse_payload(&request.data)?) {
                    return Err(format!(
                        "Cannot tamper with block {} (chain length {})",
                        request.index,
                        blockchain.len()
                    )
                    .into());
                }
            }
            print_report(&blockchain, json)?;
        }
        Command::Simulate {
            events,
            device,
            seed,
            json,
        } => {
            let generator = match seed {
                Some(seed) => SensorEventGenerator::with_seed(device, seed),
                None => SensorEventGenerator::new(device),
            };
            let mut blockchain = Blockchain::with_config(&config)?;
            for event in generator.take(events) {
                blockchain.append(event)?;
            }
            print_report(&blockchain, json)?;
        }
        // Sign a file with a fresh key pair and print what a verifier needs
        Command::Sign { file } => {
            let contents = fs::read(&file)
                .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
            let (private_key, public_key) = generate_key_pair(config.signature_scheme)?.into_parts();
            let signature = sign(&private_key, &contents)?;

            println!("Scheme: {}", config.signature_scheme);
            println!("File: {} ({} bytes)", file.display(), contents.len());
            println!("Public key: {}", public_key.to_hex());
            println!("Signature: {}", signature.to_hex());
            println!(
                "Self-check: {}",
                verify(&public_key, &contents, &signature)?
            );
        }
        Command::Verify {
            file,
            public_key,
            signature,
        } => {
            let contents = fs::read(&file)
                .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
            let public_key = PublicKey::from_hex(config.signature_scheme, &public_key)?;
            let signature = Signature::from_hex(config.signature_scheme, &signature)?;

            let valid = verify(&public_key, &contents, &signature)?;
            println!(
                "Signature for {} (key {}): {}",
                file.display(),
                truncate_hash(&public_key.to_hex()),
                if valid { "valid" } else { "INVALID" }
            );
            if !valid {
                process::exit(2);
            }
        }
    }
    Ok(())
}
