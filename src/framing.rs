//! File and batch header/trailer builders.

use crate::company::{Address, BankAccount, Identification};
use crate::error::{require_text, Result};
use crate::format::{alpha, alpha_opt, amount, date_of, number, numeric, numeric_opt};
use crate::money::Money;
use crate::payment::ServiceType;
use crate::record::{Line, Record, RecordKind, FILE_HEADER_BATCH, FILE_TRAILER_BATCH};
use chrono::NaiveDateTime;

/// File header (record type 0).
#[derive(Debug, Clone)]
pub struct FileHeader<'a> {
    pub company_id: &'a Identification,
    pub company_name: &'a str,
    pub agreement: Option<&'a str>,
    pub account: &'a BankAccount,
    pub bank_name: Option<&'a str>,
    pub generated_at: NaiveDateTime,
    pub file_sequence: u32,
    pub layout_version: &'a str,
    pub density: &'a str,
}

pub fn file_header(h: &FileHeader<'_>) -> Result<Record> {
    let bank_code = require_text(Some(h.account.bank_code.as_str()), "file header", "bank code")?;
    let name = require_text(Some(h.company_name), "file header", "company name")?;

    let mut line = Line::start(RecordKind::FileHeader, bank_code, FILE_HEADER_BATCH);
    line.blank(9);
    company_block(&mut line, h.company_id, h.agreement, h.account, name);
    line.push(alpha_opt(h.bank_name, 30))
        .blank(10)
        .push("1")
        .push(date_of(h.generated_at.date()))
        .push(h.generated_at.format("%H%M%S").to_string())
        .push(number(u64::from(h.file_sequence), 6))
        .push(numeric(h.layout_version, 3))
        .push(numeric(h.density, 5))
        .blank(20)
        .blank(20)
        .blank(29);
    line.finish()
}

/// Batch header (record type 1).
#[derive(Debug, Clone)]
pub struct BatchHeader<'a> {
    pub batch: u32,
    pub service: ServiceType,
    pub payment_form: &'a str,
    pub company_id: &'a Identification,
    pub company_name: &'a str,
    pub agreement: Option<&'a str>,
    pub account: &'a BankAccount,
    pub message: Option<&'a str>,
    pub address: Option<&'a Address>,
}

pub fn batch_header(h: &BatchHeader<'_>) -> Result<Record> {
    let bank_code = require_text(Some(h.account.bank_code.as_str()), "batch header", "bank code")?;
    let name = require_text(Some(h.company_name), "batch header", "company name")?;
    let form = require_text(Some(h.payment_form), "batch header", "payment form")?;

    let mut line = Line::start(RecordKind::BatchHeader, bank_code, &h.batch.to_string());
    line.push("C")
        .push(h.service.code())
        .push(numeric(form, 2))
        .push(h.service.layout_version())
        .blank(1);
    company_block(&mut line, h.company_id, h.agreement, h.account, name);
    line.push(alpha_opt(h.message, 40));

    let empty = Address::default();
    let address = h.address.unwrap_or(&empty);
    let (zip, zip_suffix) = address.zip_parts();
    line.push(alpha_opt(address.street.as_deref(), 30))
        .push(numeric_opt(address.number.as_deref(), 5))
        .push(alpha_opt(address.complement.as_deref(), 15))
        .push(alpha_opt(address.city.as_deref(), 20))
        .push(numeric_opt(zip.as_deref(), 5))
        .push(numeric_opt(zip_suffix.as_deref(), 3))
        .push(alpha_opt(address.state.as_deref(), 2))
        .push("01")
        .blank(6)
        .blank(10);
    line.finish()
}

/// Batch trailer (record type 5).
#[derive(Debug, Clone)]
pub struct BatchTrailer<'a> {
    pub bank_code: &'a str,
    pub batch: u32,
    /// Header, details and trailer.
    pub record_count: u32,
    /// Sum of the batch's payment amounts; zero is a valid sum.
    pub total: Money,
}

pub fn batch_trailer(t: &BatchTrailer<'_>) -> Result<Record> {
    let bank_code = require_text(Some(t.bank_code), "batch trailer", "bank code")?;

    let mut line = Line::start(RecordKind::BatchTrailer, bank_code, &t.batch.to_string());
    line.blank(9)
        .push(number(u64::from(t.record_count), 6))
        .push(amount(Some(t.total), 18))
        .zero(18)
        .zero(6)
        .blank(165)
        .blank(10);
    line.finish()
}

/// File trailer (record type 9).
#[derive(Debug, Clone)]
pub struct FileTrailer<'a> {
    pub bank_code: &'a str,
    pub batch_count: u32,
    /// Every line of the file, this trailer included.
    pub record_count: u32,
}

pub fn file_trailer(t: &FileTrailer<'_>) -> Result<Record> {
    let bank_code = require_text(Some(t.bank_code), "file trailer", "bank code")?;

    let mut line = Line::start(RecordKind::FileTrailer, bank_code, FILE_TRAILER_BATCH);
    line.blank(9)
        .push(number(u64::from(t.batch_count), 6))
        .push(number(u64::from(t.record_count), 6))
        .zero(6)
        .blank(205);
    line.finish()
}

/// Positions 18-102 of both headers: inscription, agreement, account and name.
fn company_block(
    line: &mut Line,
    id: &Identification,
    agreement: Option<&str>,
    account: &BankAccount,
    name: &str,
) {
    line.push(id.kind.code())
        .push(numeric(&id.number, 14))
        .push(alpha_opt(agreement, 20))
        .push(numeric(&account.branch, 5))
        .push(alpha_opt(account.branch_digit.as_deref(), 1))
        .push(numeric(&account.account, 12))
        .push(alpha_opt(account.account_digit.as_deref(), 1))
        .push(alpha_opt(account.branch_account_digit.as_deref(), 1))
        .push(alpha(name, 30));
}
