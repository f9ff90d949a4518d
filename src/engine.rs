//! Remittance file orchestrator.
//!
//! Validates the request, emits the file header, runs each batch through its
//! processor in the order given, and closes the file with the trailer. Any
//! failure aborts the whole file: either every line is valid or nothing is
//! returned.

use crate::batch::process_batch;
use crate::company::Company;
use crate::config::EncoderConfig;
use crate::error::{CnabError, Result};
use crate::framing::{file_header, file_trailer, FileHeader, FileTrailer};
use crate::money::Money;
use crate::payment::{BatchRecord, ServiceType};
use crate::record::{Record, LINE_WIDTH};
use chrono::Local;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Everything needed to generate one remittance file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RemittanceRequest {
    #[serde(default)]
    pub company: Option<Company>,
    #[serde(default)]
    pub batches: Vec<BatchRecord>,
    /// File sequence number (NSA); overrides the configured one.
    #[serde(default)]
    pub file_sequence: Option<u32>,
}

impl RemittanceRequest {
    /// Reads a JSON request.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Per-batch figures of an encoded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub batch: u32,
    pub service: ServiceType,
    pub payment_count: usize,
    /// Header, details and trailer of the batch.
    pub record_count: u32,
    pub total: Money,
}

/// File-level figures of an encoded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub batch_count: u32,
    /// Every line, file header and trailer included.
    pub record_count: u32,
    /// Size of the newline-joined content.
    pub byte_size: usize,
    pub batches: Vec<BatchSummary>,
}

impl FileSummary {
    /// Sum of all batch totals.
    pub fn total(&self) -> Money {
        self.batches.iter().map(|b| b.total).sum()
    }
}

/// An encoded remittance file: its records in order and their summary.
#[derive(Debug, Clone)]
pub struct EncodedFile {
    records: Vec<Record>,
    summary: FileSummary,
}

impl EncodedFile {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn summary(&self) -> &FileSummary {
        &self.summary
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(Record::as_str)
    }

    /// Lines joined with `\n`, without a trailing newline.
    pub fn content(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }

    /// Writes the content to any sink.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for (idx, line) in self.lines().enumerate() {
            if idx > 0 {
                writer.write_all(b"\n")?;
            }
            writer.write_all(line.as_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the content to `path`, creating or truncating the file.
    ///
    /// The file is closed before this returns.
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))?;
        info!(
            "Wrote {} ({} bytes, {} records)",
            path.display(),
            self.summary.byte_size,
            self.summary.record_count
        );
        Ok(())
    }

    /// Writes the summary as CSV: one row per batch, then a `file` row.
    pub fn write_summary<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["batch", "service", "payments", "records", "total"])?;

        for batch in &self.summary.batches {
            csv_writer.write_record([
                batch.batch.to_string(),
                batch.service.to_string(),
                batch.payment_count.to_string(),
                batch.record_count.to_string(),
                batch.total.to_string(),
            ])?;
        }

        let payments: usize = self.summary.batches.iter().map(|b| b.payment_count).sum();
        csv_writer.write_record([
            "file".to_string(),
            String::new(),
            payments.to_string(),
            self.summary.record_count.to_string(),
            self.summary.total().to_string(),
        ])?;

        csv_writer.flush()?;
        Ok(())
    }
}

/// Builds remittance files from requests.
///
/// Holds no state between calls; one encoder can serve any number of
/// requests, concurrently or not.
#[derive(Debug, Clone, Default)]
pub struct RemittanceEncoder {
    config: EncoderConfig,
}

impl RemittanceEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        RemittanceEncoder { config }
    }

    /// Encodes the request into a complete file.
    ///
    /// Fails before producing any line when the company is missing or
    /// invalid, or when there are no batches. Errors raised while encoding a
    /// batch are wrapped with its 1-based number.
    pub fn encode(&self, request: &RemittanceRequest) -> Result<EncodedFile> {
        let company = request
            .company
            .as_ref()
            .ok_or_else(|| CnabError::missing("request", "company"))?;
        company.validate()?;
        if request.batches.is_empty() {
            return Err(CnabError::missing("request", "batches"));
        }

        let generated_at = self
            .config
            .generated_at
            .unwrap_or_else(|| Local::now().naive_local());
        let file_sequence = request.file_sequence.unwrap_or(self.config.file_sequence);
        let bank_code = company.bank.bank_code.as_str();

        let mut records = vec![file_header(&FileHeader {
            company_id: &company.identification,
            company_name: &company.name,
            agreement: company.agreement.as_deref(),
            account: &company.bank,
            bank_name: self
                .config
                .bank_name
                .as_deref()
                .or(company.bank_name.as_deref()),
            generated_at,
            file_sequence,
            layout_version: &self.config.layout_version,
            density: &self.config.density,
        })?];
        let mut record_count: u32 = 1;
        let mut batches = Vec::with_capacity(request.batches.len());

        for (idx, raw) in request.batches.iter().enumerate() {
            let number = idx as u32 + 1;
            let processed = raw
                .parse()
                .and_then(|batch| process_batch(number, &batch, company))
                .map_err(|e| e.in_batch(number))?;

            record_count += processed.record_count;
            batches.push(BatchSummary {
                batch: number,
                service: processed.service,
                payment_count: processed.payment_count,
                record_count: processed.record_count,
                total: processed.total,
            });
            records.extend(processed.records);
            debug!("Batch {}: appended, {} records so far", number, record_count);
        }

        let batch_count = batches.len() as u32;
        record_count += 1;
        records.push(file_trailer(&FileTrailer {
            bank_code,
            batch_count,
            record_count,
        })?);

        let byte_size = records.len() * LINE_WIDTH + records.len().saturating_sub(1);
        info!(
            "Encoded remittance file: {} batches, {} records, {} bytes",
            batch_count, record_count, byte_size
        );

        Ok(EncodedFile {
            records,
            summary: FileSummary {
                batch_count,
                record_count,
                byte_size,
                batches,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordKind;
    use chrono::NaiveDate;
    use serde_json::json;

    fn encoder() -> RemittanceEncoder {
        RemittanceEncoder::new(EncoderConfig {
            generated_at: NaiveDate::from_ymd_opt(2024, 3, 15)
                .and_then(|d| d.and_hms_opt(8, 0, 0)),
            ..Default::default()
        })
    }

    fn request(batches: serde_json::Value) -> RemittanceRequest {
        serde_json::from_value(json!({
            "company": {
                "identification": { "kind": "cnpj", "number": "12345678000190" },
                "name": "Acme Ltda",
                "bank": { "bank_code": "341", "branch": "1234", "account": "56789" }
            },
            "batches": batches
        }))
        .unwrap()
    }

    fn supplier_batch(amount: f64) -> serde_json::Value {
        json!({
            "service_type": "supplier",
            "payments": [{
                "beneficiary": {
                    "name": "Fornecedor",
                    "bank": { "bank_code": "237", "branch": "1", "account": "2" }
                },
                "payment": { "amount": amount, "payment_date": "2024-03-20" }
            }]
        })
    }

    #[test]
    fn test_encode_frames_batches() {
        let file = encoder()
            .encode(&request(json!([supplier_batch(10.0), supplier_batch(2.5)])))
            .unwrap();

        let kinds: Vec<RecordKind> = file.records().iter().map(Record::kind).collect();
        assert_eq!(kinds.first(), Some(&RecordKind::FileHeader));
        assert_eq!(kinds.last(), Some(&RecordKind::FileTrailer));
        assert_eq!(file.records().len(), 8);

        let summary = file.summary();
        assert_eq!(summary.batch_count, 2);
        assert_eq!(summary.record_count, 8);
        assert_eq!(summary.byte_size, 8 * 240 + 7);
        assert_eq!(summary.total(), Money::from_cents(1250));

        let trailer = file.records()[7].as_str();
        assert_eq!(&trailer[17..23], "000002");
        assert_eq!(&trailer[23..29], "000008");
    }

    #[test]
    fn test_missing_company_fails_first() {
        let request = RemittanceRequest {
            company: None,
            batches: request(json!([supplier_batch(1.0)])).batches,
            file_sequence: None,
        };
        assert!(matches!(
            encoder().encode(&request),
            Err(CnabError::MissingField { field: "company", .. })
        ));
    }

    #[test]
    fn test_empty_batch_list_fails() {
        assert!(matches!(
            encoder().encode(&request(json!([]))),
            Err(CnabError::MissingField { field: "batches", .. })
        ));
    }

    #[test]
    fn test_batch_errors_name_the_batch() {
        let result = encoder().encode(&request(json!([
            supplier_batch(1.0),
            { "service_type": "77", "payments": [{}] }
        ])));

        match result {
            Err(CnabError::Batch { batch, source }) => {
                assert_eq!(batch, 2);
                assert!(matches!(*source, CnabError::UnsupportedServiceType(_)));
            }
            other => panic!("Expected batch error, got {:?}", other),
        }
    }

    #[test]
    fn test_request_sequence_wins_over_config() {
        let mut request = request(json!([supplier_batch(1.0)]));
        request.file_sequence = Some(77);

        let file = encoder().encode(&request).unwrap();
        assert_eq!(&file.records()[0].as_str()[157..163], "000077");
    }

    #[test]
    fn test_content_has_no_trailing_newline() {
        let file = encoder().encode(&request(json!([supplier_batch(1.0)]))).unwrap();

        let mut written = Vec::new();
        file.write_to(&mut written).unwrap();
        let written = String::from_utf8(written).unwrap();

        assert_eq!(written, file.content());
        assert!(!written.ends_with('\n'));
        assert_eq!(written.len(), file.summary().byte_size);
        assert_eq!(written.lines().count(), 5);
    }

    #[test]
    fn test_write_summary() {
        let file = encoder()
            .encode(&request(json!([supplier_batch(10.0), supplier_batch(2.5)])))
            .unwrap();

        let mut output = Vec::new();
        file.write_summary(&mut output).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("batch,service,payments,records,total"));
        assert!(output.contains("1,supplier,1,3,10.00"));
        assert!(output.contains("2,supplier,1,3,2.50"));
        assert!(output.contains("file,,2,8,12.50"));
    }
}
