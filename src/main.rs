//! CNAB 240 Remittance Encoder CLI
//!
//! Reads a JSON remittance request, writes the CNAB 240 file and prints a
//! CSV summary of its batches.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- request.json [output.rem] > summary.csv
//! ```
//!
//! Without an output path the file is written next to the request, with the
//! `.rem` extension.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `info` or `debug` to control logging verbosity
//! - `CNAB_FILE_SEQUENCE`: File sequence number when the request has none
//! - `CNAB_BANK_NAME`: Bank name printed in the file header
//! - `CNAB_GENERATED_AT`: Fixed generation timestamp (`YYYY-MM-DDTHH:MM:SS`)

use cnab240_encoder::{CnabError, EncoderConfig, RemittanceEncoder, RemittanceRequest, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(CnabError::MissingArgument);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_path = match args.get(2) {
        Some(path) => PathBuf::from(path),
        None => input_path.with_extension("rem"),
    };

    let file = File::open(&input_path)?;
    let request = RemittanceRequest::from_reader(BufReader::new(file))?;

    let encoder = RemittanceEncoder::new(EncoderConfig::from_env());
    let encoded = encoder.encode(&request)?;
    encoded.persist(&output_path)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    encoded.write_summary(handle)?;

    Ok(())
}
