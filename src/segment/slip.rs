//! Segments J, J-52 and J-52 PIX: payment slip settlement.

use super::{is_barcode, push_inscription};
use crate::company::Party;
use crate::error::{require, require_text, CnabError, Result};
use crate::format::{alpha, alpha_opt, amount, date, verbatim};
use crate::money::Money;
use crate::record::{DetailKey, Line, Record, Segment};

/// Segment J: barcode, dates and values of a slip.
#[derive(Debug, Clone, Default)]
pub struct SegmentJ<'a> {
    /// 44-digit barcode
    pub barcode: Option<&'a str>,
    pub beneficiary_name: Option<&'a str>,
    pub due_date: Option<&'a str>,
    pub nominal_amount: Option<Money>,
    pub discount: Option<Money>,
    pub surcharge: Option<Money>,
    pub payment_date: Option<&'a str>,
    pub payment_amount: Option<Money>,
    pub your_number: Option<&'a str>,
    pub our_number: Option<&'a str>,
}

pub fn segment_j(key: &DetailKey<'_>, j: &SegmentJ<'_>) -> Result<Record> {
    let barcode = require_text(j.barcode, "segment J", "barcode")?;
    if !is_barcode(barcode) {
        return Err(CnabError::invalid("barcode", "segment J needs the 44-digit barcode"));
    }
    let paid = require(j.payment_amount, "segment J", "payment amount")?;

    let mut line = Line::detail(Segment::J, key);
    line.push("0")
        .push("00")
        .push(barcode)
        .push(alpha_opt(j.beneficiary_name, 30))
        .push(date(j.due_date))
        .push(amount(j.nominal_amount.or(Some(paid)), 15))
        .push(amount(j.discount, 15))
        .push(amount(j.surcharge, 15))
        .push(date(j.payment_date))
        .push(amount(Some(paid), 15))
        .zero(15)
        .push(alpha_opt(j.your_number, 20))
        .push(alpha_opt(j.our_number, 20))
        .push("09")
        .blank(6)
        .blank(10);
    line.finish()
}

/// Segment J-52: payer, beneficiary and drawer identities.
#[derive(Debug, Clone, Default)]
pub struct SegmentJ52<'a> {
    pub payer: Option<&'a Party>,
    pub beneficiary: Option<&'a Party>,
    pub drawer: Option<&'a Party>,
}

pub fn segment_j52(key: &DetailKey<'_>, j: &SegmentJ52<'_>) -> Result<Record> {
    if j.payer.is_none() && j.beneficiary.is_none() {
        return Err(CnabError::missing("segment J-52", "payer or beneficiary"));
    }

    let mut line = Line::detail(Segment::J52, key);
    line.blank(1).push("01").push("52");
    push_party(&mut line, j.payer);
    push_party(&mut line, j.beneficiary);
    push_party(&mut line, j.drawer);
    line.blank(53);
    line.finish()
}

/// Segment J-52 PIX: payer and beneficiary plus key, transaction id and text.
#[derive(Debug, Clone, Default)]
pub struct SegmentJ52Pix<'a> {
    pub payer: Option<&'a Party>,
    pub beneficiary: Option<&'a Party>,
    pub key: Option<&'a str>,
    pub txid: Option<&'a str>,
    pub message: Option<&'a str>,
}

pub fn segment_j52_pix(key: &DetailKey<'_>, j: &SegmentJ52Pix<'_>) -> Result<Record> {
    if j.key.map_or(true, |k| k.trim().is_empty()) && j.txid.map_or(true, |t| t.trim().is_empty()) {
        return Err(CnabError::missing("segment J-52 PIX", "instant-transfer key or txid"));
    }

    let mut line = Line::detail(Segment::J52Pix, key);
    line.blank(1).push("01").push("52");
    push_party(&mut line, j.payer);
    push_inscription(&mut line, j.beneficiary.map(|p| &p.identification), 15);
    line.push(verbatim(j.key, 77))
        .push(verbatim(j.txid, 35))
        .push(alpha_opt(j.message, 37));
    line.finish()
}

/// Inscription type, 15-digit number and 40-character name.
fn push_party(line: &mut Line, party: Option<&Party>) {
    push_inscription(line, party.map(|p| &p.identification), 15);
    match party {
        Some(p) => line.push(alpha(&p.name, 40)),
        None => line.blank(40),
    };
}
