use crate::core::{BlockData, Record, Scalar};
use crate::error::{LedgerError, Result};
use crate::signing::SignatureScheme;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

/// `INDEX=DATA` request to overwrite a block's payload after mining
#[derive(Debug, Clone)]
pub struct TamperArg {
    pub index: usize,
    pub data: String,
}

impl FromStr for TamperArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (index, data) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid tamper request: {s}. Use INDEX=DATA"))?;
        let index = index
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid block index in tamper request: {index}"))?;
        Ok(TamperArg {
            index,
            data: data.to_string(),
        })
    }
}

fn parse_scalar(value: &str) -> Scalar {
    let value = value.trim();
    match value {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        "null" => Scalar::Null,
        _ => {
            if let Ok(i) = value.parse::<i64>() {
                Scalar::Int(i)
            } else if let Ok(f) = value.parse::<f64>() {
                Scalar::Float(f)
            } else {
                Scalar::Text(value.to_string())
            }
        }
    }
}

/// Interpret a command-line payload.
///
/// JSON (`{...}` or `"..."`) is parsed as such, `key=value[,key=value]` becomes
/// a record with typed values, anything else is free text.
pub fn parse_payload(input: &str) -> Result<BlockData> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('"') {
        return BlockData::from_json(trimmed);
    }
    if !input.contains('=') {
        return Ok(BlockData::from(input));
    }

    let mut record = Record::new();
    for pair in input.split(',') {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            LedgerError::Serialization(format!("Expected key=value, got '{pair}'"))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(LedgerError::Serialization(format!(
                "Empty field name in '{pair}'"
            )));
        }
        record.insert(key, parse_scalar(value));
    }
    Ok(BlockData::Record(record))
}

#[derive(Debug, Parser)]
#[command(
    name = "iot-ledger",
    about = "Tamper-evident device event ledger with payload signing"
)]
pub struct Opt {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Leading zero hex digits required per block")]
    pub difficulty: Option<u32>,
    #[arg(
        long = "timeout-secs",
        global = true,
        help = "Give up mining a block after this many seconds (0 disables)"
    )]
    pub timeout_secs: Option<u64>,
    #[arg(long, global = true, help = "Signature scheme (ecdsa-p256, ed25519)")]
    pub scheme: Option<SignatureScheme>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        name = "demo",
        about = "Mine two sensor readings, tamper with one, then sign and verify a device message"
    )]
    Demo,
    #[command(name = "record", about = "Append payloads to a fresh chain and validate it")]
    Record {
        #[arg(
            required = true,
            help = "Payloads: JSON, key=value[,key=value] or free text"
        )]
        payloads: Vec<String>,
        #[arg(long, help = "Overwrite a block's data after mining (INDEX=DATA)")]
        tamper: Option<TamperArg>,
        #[arg(long, help = "Print the chain report as JSON")]
        json: bool,
    },
    #[command(name = "simulate", about = "Append simulated sensor events and validate")]
    Simulate {
        #[arg(long, default_value_t = 5, help = "Number of events to record")]
        events: usize,
        #[arg(long, default_value_t = 1, help = "Simulated device id")]
        device: u32,
        #[arg(long, help = "Seed for a reproducible event stream")]
        seed: Option<u64>,
        #[arg(long, help = "Print the chain report as JSON")]
        json: bool,
    },
    #[command(name = "sign", about = "Generate a key pair and sign a file")]
    Sign {
        #[arg(help = "File to sign, e.g. a firmware image")]
        file: PathBuf,
    },
    #[command(name = "verify", about = "Verify a file signature")]
    Verify {
        #[arg(help = "Signed file")]
        file: PathBuf,
        #[arg(long = "public-key", help = "Public key as hex")]
        public_key: String,
        #[arg(long, help = "Signature as hex")]
        signature: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Opt::command().debug_assert();
    }

    #[test]
    fn test_parse_record_payload() {
        let data = parse_payload("sensor=temp, valor=22.5,count=3,ok=true").unwrap();
        let record = data.as_record().unwrap();
        assert_eq!(record.get("sensor"), Some(&Scalar::Text("temp".to_string())));
        assert_eq!(record.get("valor"), Some(&Scalar::Float(22.5)));
        assert_eq!(record.get("count"), Some(&Scalar::Int(3)));
        assert_eq!(record.get("ok"), Some(&Scalar::Bool(true)));
    }

    #[test]
    fn test_parse_text_and_json_payloads() {
        assert_eq!(
            parse_payload("temp: 22.5").unwrap(),
            BlockData::from("temp: 22.5")
        );
        let json = parse_payload(r#"{"sensor": "hum", "valor": 60.1}"#).unwrap();
        assert_eq!(
            json.as_record().unwrap().get("valor"),
            Some(&Scalar::Float(60.1))
        );
        assert!(parse_payload("=5").is_err());
        assert!(parse_payload("a=1,b").is_err());
    }

    #[test]
    fn test_parse_non_finite_values_stay_floats() {
        let data = parse_payload("a=inf,b=-inf,c=NaN,d=null").unwrap();
        let record = data.as_record().unwrap();
        assert_eq!(record.get("a"), Some(&Scalar::Float(f64::INFINITY)));
        assert_eq!(record.get("b"), Some(&Scalar::Float(f64::NEG_INFINITY)));
        assert!(matches!(record.get("c"), Some(Scalar::Float(v)) if v.is_nan()));
        assert_eq!(record.get("d"), Some(&Scalar::Null));
    }

    #[test]
    fn test_parse_tamper_arg() {
        let arg: TamperArg = "1=temp: 99.9".parse().unwrap();
        assert_eq!(arg.index, 1);
        assert_eq!(arg.data, "temp: 99.9");
        assert!("x=data".parse::<TamperArg>().is_err());
        assert!("no separator".parse::<TamperArg>().is_err());
    }

    #[test]
    fn test_global_flags() {
        let opt = Opt::try_parse_from([
            "iot-ledger",
            "record",
            "a=1",
            "--difficulty",
            "3",
            "--scheme",
            "ed25519",
        ])
        .unwrap();
        assert_eq!(opt.difficulty, Some(3));
        assert_eq!(opt.scheme, Some(SignatureScheme::Ed25519));
        assert!(matches!(opt.command, Command::Record { .. }));
    }
}
