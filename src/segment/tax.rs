//! Segments O, N and W: tax and collection payments.

use super::is_barcode;
use crate::company::Identification;
use crate::error::{require, require_text, CnabError, Result};
use crate::format::{alpha_opt, amount, date, money, month_year, numeric_opt, zeros};
use crate::money::Money;
use crate::payment::TaxType;
use crate::record::{DetailKey, Line, Record, Segment};

/// Segment O: barcode tax or utility payment.
#[derive(Debug, Clone, Default)]
pub struct SegmentO<'a> {
    /// 44-digit barcode
    pub barcode: Option<&'a str>,
    pub collector_name: Option<&'a str>,
    pub due_date: Option<&'a str>,
    pub payment_date: Option<&'a str>,
    pub amount: Option<Money>,
    pub your_number: Option<&'a str>,
    pub our_number: Option<&'a str>,
}

pub fn segment_o(key: &DetailKey<'_>, o: &SegmentO<'_>) -> Result<Record> {
    let barcode = require_text(o.barcode, "segment O", "barcode")?;
    if !is_barcode(barcode) {
        return Err(CnabError::invalid("barcode", "segment O needs the 44-digit barcode"));
    }
    let value = require(o.amount, "segment O", "amount")?;

    let mut line = Line::detail(Segment::O, key);
    line.push("0")
        .push("00")
        .push(barcode)
        .push(alpha_opt(o.collector_name, 30))
        .push(date(o.due_date))
        .push(date(o.payment_date))
        .push(amount(Some(value), 15))
        .push(alpha_opt(o.your_number, 20))
        .push(alpha_opt(o.our_number, 20))
        .blank(68)
        .blank(10);
    line.finish()
}

/// Segment N: code-based tax with revenue code, period and amount breakdown.
#[derive(Debug, Clone)]
pub struct SegmentN<'a> {
    pub tax_type: TaxType,
    pub your_number: Option<&'a str>,
    pub our_number: Option<&'a str>,
    pub taxpayer_name: Option<&'a str>,
    pub taxpayer_id: Option<&'a Identification>,
    pub payment_date: Option<&'a str>,
    pub revenue_code: Option<&'a str>,
    pub assessment_period: Option<&'a str>,
    pub reference_number: Option<&'a str>,
    pub principal: Option<Money>,
    pub fine: Option<Money>,
    pub interest: Option<Money>,
    pub due_date: Option<&'a str>,
}

impl SegmentN<'_> {
    /// Principal plus fine plus interest.
    pub fn total(&self) -> Option<Money> {
        self.principal.map(|p| {
            p + self.fine.unwrap_or(Money::ZERO) + self.interest.unwrap_or(Money::ZERO)
        })
    }
}

pub fn segment_n(key: &DetailKey<'_>, n: &SegmentN<'_>) -> Result<Record> {
    let total = require(n.total(), "segment N", "principal amount")?;
    let payment_date = require_text(n.payment_date, "segment N", "payment date")?;

    let id_type = match n.taxpayer_id {
        Some(id) => format!("0{}", id.kind.code()),
        None => zeros(2),
    };

    let mut line = Line::detail(Segment::N, key);
    line.push("0")
        .push("00")
        .push(alpha_opt(n.your_number, 20))
        .push(alpha_opt(n.our_number, 20))
        .push(alpha_opt(n.taxpayer_name, 30))
        .push(date(Some(payment_date)))
        .push(amount(Some(total), 15))
        .push(numeric_opt(n.revenue_code, 6))
        .push(id_type)
        .push(numeric_opt(n.taxpayer_id.map(|id| id.number.as_str()), 14))
        .push(n.tax_type.code())
        .push(date(n.assessment_period))
        .push(numeric_opt(n.reference_number, 17))
        .push(money(n.principal, 14, 2))
        .push(money(n.fine, 14, 2))
        .push(money(n.interest, 14, 2))
        .push(date(n.due_date))
        .blank(21)
        .blank(10);
    line.finish()
}

/// Segment W: state-tax (GARE) complement.
#[derive(Debug, Clone, Default)]
pub struct SegmentW<'a> {
    pub information_1: Option<&'a str>,
    pub information_2: Option<&'a str>,
    pub state_registration: Option<&'a str>,
    pub active_debt: Option<&'a str>,
    pub reference: Option<&'a str>,
    pub installment: Option<&'a str>,
}

pub fn segment_w(key: &DetailKey<'_>, w: &SegmentW<'_>) -> Result<Record> {
    let mut line = Line::detail(Segment::W, key);
    line.push("1")
        .push("1")
        .push(alpha_opt(w.information_1, 80))
        .push(alpha_opt(w.information_2, 80))
        .push("01")
        .push(numeric_opt(w.state_registration, 12))
        .push(numeric_opt(w.active_debt, 13))
        .push(month_year(w.reference))
        .push(numeric_opt(w.installment, 13))
        .blank(8)
        .blank(10);
    line.finish()
}
