//! Segments A, B and C: credit transfers to a beneficiary.

use super::{ispb, push_inscription, push_routing};
use crate::company::{Address, BankAccount, Identification};
use crate::error::{require, require_text, CnabError, Result};
use crate::format::{alpha, alpha_opt, amount, date, numeric, numeric_opt, verbatim};
use crate::money::Money;
use crate::payment::PixKeyType;
use crate::record::{DetailKey, Line, Record, Segment};

/// Segment A: routing, beneficiary, amount and payment date.
#[derive(Debug, Clone, Default)]
pub struct SegmentA<'a> {
    /// Clearing house (câmara centralizadora)
    pub clearing_house: &'a str,
    pub bank: Option<&'a BankAccount>,
    pub beneficiary_name: Option<&'a str>,
    pub your_number: Option<&'a str>,
    pub payment_date: Option<&'a str>,
    pub amount: Option<Money>,
    pub our_number: Option<&'a str>,
    pub information: Option<&'a str>,
    pub doc_purpose: Option<&'a str>,
    pub ted_purpose: Option<&'a str>,
    pub complementary_purpose: Option<&'a str>,
    /// When set, routing may be absent: the credit goes to a key.
    pub keyed: bool,
}

pub fn segment_a(key: &DetailKey<'_>, a: &SegmentA<'_>) -> Result<Record> {
    let name = require_text(a.beneficiary_name, "segment A", "beneficiary name")?;
    let payment_date = require_text(a.payment_date, "segment A", "payment date")?;
    let value = require(a.amount, "segment A", "amount")?;
    if a.bank.is_none() && !a.keyed {
        return Err(CnabError::missing("segment A", "beneficiary bank"));
    }

    let mut line = Line::detail(Segment::A, key);
    line.push("0")
        .push("00")
        .push(numeric(a.clearing_house, 3))
        .push(numeric_opt(a.bank.map(|b| b.bank_code.as_str()), 3));
    push_routing(&mut line, a.bank);
    line.push(alpha(name, 30))
        .push(alpha_opt(a.your_number, 20))
        .push(date(Some(payment_date)))
        .push("BRL")
        .zero(15)
        .push(amount(Some(value), 15))
        .push(alpha_opt(a.our_number, 20))
        .zero(8)
        .zero(15)
        .push(alpha_opt(a.information, 40))
        .push(alpha_opt(a.doc_purpose, 2))
        .push(alpha_opt(a.ted_purpose, 5))
        .push(alpha_opt(a.complementary_purpose, 2))
        .blank(3)
        .push("0")
        .blank(10);
    line.finish()
}

/// What Segment B carries after the beneficiary's inscription.
#[derive(Debug, Clone)]
pub enum SegmentBPayload<'a> {
    /// Address plus document values.
    Address {
        address: &'a Address,
        due_date: Option<&'a str>,
        document_amount: Option<Money>,
        rebate: Option<Money>,
        discount: Option<Money>,
        interest: Option<Money>,
        fine: Option<Money>,
    },
    /// Instant-transfer key in place of the address region.
    Pix {
        key_type: PixKeyType,
        key: &'a str,
        txid: Option<&'a str>,
    },
}

/// Segment B: beneficiary identification and either address or key.
#[derive(Debug, Clone)]
pub struct SegmentB<'a> {
    pub beneficiary_id: Option<&'a Identification>,
    pub bank: Option<&'a BankAccount>,
    pub payload: SegmentBPayload<'a>,
}

pub fn segment_b(key: &DetailKey<'_>, b: &SegmentB<'_>) -> Result<Record> {
    let mut line = Line::detail(Segment::B, key);
    match &b.payload {
        SegmentBPayload::Address {
            address,
            due_date,
            document_amount,
            rebate,
            discount,
            interest,
            fine,
        } => {
            let (zip, zip_suffix) = address.zip_parts();
            line.blank(3);
            push_inscription(&mut line, b.beneficiary_id, 14);
            line.push(alpha_opt(address.street.as_deref(), 30))
                .push(numeric_opt(address.number.as_deref(), 5))
                .push(alpha_opt(address.complement.as_deref(), 15))
                .push(alpha_opt(address.district.as_deref(), 15))
                .push(alpha_opt(address.city.as_deref(), 20))
                .push(numeric_opt(zip.as_deref(), 5))
                .push(numeric_opt(zip_suffix.as_deref(), 3))
                .push(alpha_opt(address.state.as_deref(), 2))
                .push(date(*due_date))
                .push(amount(*document_amount, 15))
                .push(amount(*rebate, 15))
                .push(amount(*discount, 15))
                .push(amount(*interest, 15))
                .push(amount(*fine, 15))
                .blank(15)
                .push("0")
                .zero(6)
                .push(ispb(b.bank));
        }
        SegmentBPayload::Pix { key_type, key: pix_key, txid } => {
            let pix_key = require_text(Some(*pix_key), "segment B", "instant-transfer key")?;
            line.push(format!("{:<3}", key_type.initiation_code()));
            push_inscription(&mut line, b.beneficiary_id, 14);
            line.push(verbatim(*txid, 35))
                .blank(60)
                .push(verbatim(Some(pix_key), 99))
                .blank(6)
                .push(ispb(b.bank));
        }
    }
    line.finish()
}

/// Segment C: withheld amounts and substitute account.
#[derive(Debug, Clone, Default)]
pub struct SegmentC<'a> {
    pub income_tax: Option<Money>,
    pub iss: Option<Money>,
    pub iof: Option<Money>,
    pub other_deductions: Option<Money>,
    pub other_additions: Option<Money>,
    pub substitute_account: Option<&'a BankAccount>,
    pub inss: Option<Money>,
}

pub fn segment_c(key: &DetailKey<'_>, c: &SegmentC<'_>) -> Result<Record> {
    let mut line = Line::detail(Segment::C, key);
    line.blank(3)
        .push(amount(c.income_tax, 15))
        .push(amount(c.iss, 15))
        .push(amount(c.iof, 15))
        .push(amount(c.other_deductions, 15))
        .push(amount(c.other_additions, 15));
    push_routing(&mut line, c.substitute_account);
    line.push(amount(c.inss, 15)).blank(113);
    line.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::IdKind;
    use crate::segment::fixtures::key;

    fn bank() -> BankAccount {
        BankAccount {
            bank_code: "237".to_string(),
            branch: "0123".to_string(),
            branch_digit: Some("4".to_string()),
            account: "0004567".to_string(),
            account_digit: Some("8".to_string()),
            ispb: Some("60746948".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_segment_a_layout() {
        let bank = bank();
        let record = segment_a(
            &key(),
            &SegmentA {
                clearing_house: "018",
                bank: Some(&bank),
                beneficiary_name: Some("Fornecedor Ltda"),
                your_number: Some("NF-1001"),
                payment_date: Some("2024-03-15"),
                amount: Some(Money::from_cents(150010)),
                ..Default::default()
            },
        )
        .unwrap();
        let line = record.as_str();

        assert_eq!(line.len(), 240);
        assert_eq!(&line[13..14], "A");
        assert_eq!(&line[17..20], "018");
        assert_eq!(&line[20..23], "237");
        assert_eq!(&line[23..28], "00123");
        assert_eq!(&line[29..41], "000000004567");
        assert_eq!(&line[43..73], "FORNECEDOR LTDA               ");
        assert_eq!(&line[73..93], "NF1001              ");
        assert_eq!(&line[93..101], "15032024");
        assert_eq!(&line[101..104], "BRL");
        assert_eq!(&line[119..134], "000000000150010");
    }

    #[test]
    fn test_segment_a_requires_amount_and_bank() {
        let missing_amount = segment_a(
            &key(),
            &SegmentA {
                beneficiary_name: Some("X"),
                payment_date: Some("2024-03-15"),
                ..Default::default()
            },
        );
        assert!(matches!(
            missing_amount,
            Err(CnabError::MissingField { field: "amount", .. })
        ));

        let missing_bank = segment_a(
            &key(),
            &SegmentA {
                beneficiary_name: Some("X"),
                payment_date: Some("2024-03-15"),
                amount: Some(Money::from_cents(1)),
                ..Default::default()
            },
        );
        assert!(matches!(
            missing_bank,
            Err(CnabError::MissingField { field: "beneficiary bank", .. })
        ));
    }

    #[test]
    fn test_segment_b_address_layout() {
        let id = Identification::new(IdKind::Cnpj, "12345678000190");
        let address = Address {
            street: Some("Av Paulista".to_string()),
            number: Some("1000".to_string()),
            city: Some("São Paulo".to_string()),
            zip_code: Some("01310100".to_string()),
            state: Some("SP".to_string()),
            ..Default::default()
        };
        let bank = bank();
        let record = segment_b(
            &key(),
            &SegmentB {
                beneficiary_id: Some(&id),
                bank: Some(&bank),
                payload: SegmentBPayload::Address {
                    address: &address,
                    due_date: None,
                    document_amount: None,
                    rebate: None,
                    discount: None,
                    interest: None,
                    fine: None,
                },
            },
        )
        .unwrap();
        let line = record.as_str();

        assert_eq!(line.len(), 240);
        assert_eq!(&line[13..17], "B   ");
        assert_eq!(&line[17..32], "212345678000190");
        assert_eq!(&line[32..62], "AV PAULISTA                   ");
        assert_eq!(&line[62..67], "01000");
        assert_eq!(&line[117..122], "01310");
        assert_eq!(&line[122..125], "100");
        assert_eq!(&line[125..127], "SP");
        assert_eq!(&line[232..240], "60746948");
    }

    #[test]
    fn test_segment_b_pix_layout() {
        let record = segment_b(
            &key(),
            &SegmentB {
                beneficiary_id: None,
                bank: None,
                payload: SegmentBPayload::Pix {
                    key_type: PixKeyType::Email,
                    key: "Maria.Silva@example.com",
                    txid: Some("TX-001"),
                },
            },
        )
        .unwrap();
        let line = record.as_str();

        assert_eq!(line.len(), 240);
        assert_eq!(&line[14..17], "02 ");
        assert_eq!(&line[32..38], "TX-001");
        assert_eq!(line[127..226].trim_end(), "Maria.Silva@example.com");
        assert_eq!(&line[232..240], "00000000");
    }

    #[test]
    fn test_segment_c_layout() {
        let record = segment_c(
            &key(),
            &SegmentC {
                income_tax: Some(Money::from_cents(1500)),
                inss: Some(Money::from_cents(1100)),
                ..Default::default()
            },
        )
        .unwrap();
        let line = record.as_str();

        assert_eq!(line.len(), 240);
        assert_eq!(&line[13..14], "C");
        assert_eq!(&line[17..32], "000000000001500");
        assert_eq!(&line[112..127], "000000000001100");
    }
}
