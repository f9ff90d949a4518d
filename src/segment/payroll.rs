//! Segments P, Q, R and D: one salary payment.

use super::push_routing;
use crate::company::{Address, BankAccount, Identification};
use crate::error::{require, require_text, Result};
use crate::format::{alpha, alpha_opt, amount, date, month_year, number, numeric, numeric_opt};
use crate::money::Money;
use crate::record::{DetailKey, Line, Record, Segment};

/// Segment P: employee routing, amount and payment date.
#[derive(Debug, Clone, Default)]
pub struct SegmentP<'a> {
    pub bank: Option<&'a BankAccount>,
    pub employee_name: Option<&'a str>,
    pub your_number: Option<&'a str>,
    pub payment_date: Option<&'a str>,
    pub amount: Option<Money>,
    pub registration: Option<&'a str>,
    pub competence: Option<&'a str>,
}

pub fn segment_p(key: &DetailKey<'_>, p: &SegmentP<'_>) -> Result<Record> {
    let bank = require(p.bank, "segment P", "employee bank")?;
    let name = require_text(p.employee_name, "segment P", "employee name")?;
    let payment_date = require_text(p.payment_date, "segment P", "payment date")?;
    let value = require(p.amount, "segment P", "amount")?;

    let mut line = Line::detail(Segment::P, key);
    line.push("0")
        .push("00")
        .push(numeric(&bank.bank_code, 3));
    push_routing(&mut line, Some(bank));
    line.push(alpha(name, 30))
        .push(alpha_opt(p.your_number, 20))
        .push(date(Some(payment_date)))
        .push("BRL")
        .push(amount(Some(value), 15))
        .push(alpha_opt(p.registration, 20))
        .push(month_year(p.competence.or(Some(payment_date))))
        .blank(88)
        .blank(10);
    line.finish()
}

/// Segment Q: employee identity and address.
#[derive(Debug, Clone, Default)]
pub struct SegmentQ<'a> {
    pub employee_id: Option<&'a Identification>,
    pub employee_name: Option<&'a str>,
    pub address: Option<&'a Address>,
}

pub fn segment_q(key: &DetailKey<'_>, q: &SegmentQ<'_>) -> Result<Record> {
    let id = require(q.employee_id, "segment Q", "employee identification")?;
    let name = require_text(q.employee_name, "segment Q", "employee name")?;

    let empty = Address::default();
    let address = q.address.unwrap_or(&empty);
    let (zip, zip_suffix) = address.zip_parts();
    let street = address.line();

    let mut line = Line::detail(Segment::Q, key);
    line.blank(1)
        .push("01")
        .push(id.kind.code())
        .push(numeric(&id.number, 15))
        .push(alpha(name, 40))
        .push(alpha(&street, 40))
        .push(alpha_opt(address.district.as_deref(), 15))
        .push(numeric_opt(zip.as_deref(), 5))
        .push(numeric_opt(zip_suffix.as_deref(), 3))
        .push(alpha_opt(address.city.as_deref(), 15))
        .push(alpha_opt(address.state.as_deref(), 2))
        .push("0")
        .zero(15)
        .blank(40)
        .zero(3)
        .blank(20)
        .blank(8);
    line.finish()
}

/// Segment R: discount and fine schedule plus statement messages.
///
/// Salary payments carry no schedule, so the value fields stay zero-filled;
/// only the messages are used, for the payment history text.
#[derive(Debug, Clone, Default)]
pub struct SegmentR<'a> {
    pub message: Option<&'a str>,
}

pub fn segment_r(key: &DetailKey<'_>, r: &SegmentR<'_>) -> Result<Record> {
    let (message_3, message_4) = split_message(r.message.unwrap_or(""), 40);

    let mut line = Line::detail(Segment::R, key);
    line.blank(1)
        .push("01")
        .push("0")
        .zero(8)
        .zero(15)
        .push("0")
        .zero(8)
        .zero(15)
        .push("0")
        .zero(8)
        .zero(15)
        .blank(10)
        .push(alpha(&message_3, 40))
        .push(alpha(&message_4, 40))
        .blank(20)
        .zero(8)
        .zero(3)
        .zero(5)
        .blank(1)
        .zero(12)
        .blank(1)
        .blank(1)
        .push("0")
        .blank(9);
    line.finish()
}

/// Splits normalised text into two fields of `width` characters.
fn split_message(message: &str, width: usize) -> (String, String) {
    let cleaned = alpha(message, width * 2);
    let (first, second) = cleaned.split_at(width);
    (first.to_string(), second.to_string())
}

/// Segment D: pay-slip figures.
#[derive(Debug, Clone, Default)]
pub struct SegmentD<'a> {
    pub competence: Option<&'a str>,
    pub cost_center: Option<&'a str>,
    pub employee_code: Option<&'a str>,
    pub role: Option<&'a str>,
    pub vacation_start: Option<&'a str>,
    pub vacation_end: Option<&'a str>,
    pub income_tax_dependents: Option<u32>,
    pub family_dependents: Option<u32>,
    pub weekly_hours: Option<u32>,
    pub contribution_salary: Option<Money>,
    pub fgts: Option<Money>,
    pub credits: Option<Money>,
    pub debits: Option<Money>,
    pub net: Option<Money>,
    pub base_salary: Option<Money>,
    pub income_tax_base: Option<Money>,
    pub fgts_base: Option<Money>,
}

pub fn segment_d(key: &DetailKey<'_>, d: &SegmentD<'_>) -> Result<Record> {
    let count = |v: Option<u32>| number(u64::from(v.unwrap_or(0)), 2);

    let mut line = Line::detail(Segment::D, key);
    line.blank(3)
        .push(month_year(d.competence))
        .push(alpha_opt(d.cost_center, 15))
        .push(alpha_opt(d.employee_code, 15))
        .push(alpha_opt(d.role, 30))
        .push(date(d.vacation_start))
        .push(date(d.vacation_end))
        .push(count(d.income_tax_dependents))
        .push(count(d.family_dependents))
        .push(count(d.weekly_hours))
        .push(amount(d.contribution_salary, 15))
        .push(amount(d.fgts, 15))
        .push(amount(d.credits, 15))
        .push(amount(d.debits, 15))
        .push(amount(d.net, 15))
        .push(amount(d.base_salary, 15))
        .push(amount(d.income_tax_base, 15))
        .push(amount(d.fgts_base, 15))
        .push("01")
        .blank(13);
    line.finish()
}
