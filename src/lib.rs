//! # CNAB 240 Remittance Encoder
//!
//! Turns structured payment instructions into FEBRABAN CNAB 240 remittance
//! files: fixed-width text, 240 characters per line, that a Brazilian bank
//! ingests to execute supplier credits, slip settlements, payroll, tax
//! collections and instant transfers.
//!
//! ## Architecture
//!
//! - **format**: field formatters (zero-filled numbers, uppercase
//!   accent-free text, `DDMMYYYY` dates, implicit-decimal amounts)
//! - **framing** / **segment**: one builder per record kind, each returning a
//!   sealed 240-character [`Record`]
//! - **batch**: one processor per payment family, deciding which segments a
//!   payment produces
//! - **engine**: the [`RemittanceEncoder`] framing batches into a file
//!
//! ## Guarantees
//!
//! - **Fixed width**: a record that is not exactly 240 characters is an error
//! - **All or nothing**: any failure aborts the file; no partial output
//! - **Exact sums**: amounts are decimal, rounded once to cents
//!
//! ## Example
//!
//! ```no_run
//! use cnab240_encoder::{EncoderConfig, RemittanceEncoder, RemittanceRequest};
//! use std::fs::File;
//!
//! let request = RemittanceRequest::from_reader(File::open("request.json").unwrap()).unwrap();
//! let encoder = RemittanceEncoder::new(EncoderConfig::from_env());
//! let file = encoder.encode(&request).unwrap();
//! file.persist("request.rem").unwrap();
//! file.write_summary(std::io::stdout()).unwrap();
//! ```

pub mod barcode;
pub mod batch;
pub mod company;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod framing;
pub mod money;
pub mod payment;
pub mod record;
pub mod segment;

pub use batch::{process_batch, ProcessedBatch};
pub use company::{Address, BankAccount, Company, IdKind, Identification, Party};
pub use config::EncoderConfig;
pub use engine::{BatchSummary, EncodedFile, FileSummary, RemittanceEncoder, RemittanceRequest};
pub use error::{CnabError, Result};
pub use money::Money;
pub use payment::{Batch, BatchRecord, Payments, ServiceType, TaxType};
pub use record::{Record, RecordKind, Segment, LINE_WIDTH};
