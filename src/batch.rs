//! Batch processors, one per payment family.
//!
//! A processor walks the payments of one batch in order, decides which
//! segments each payment produces, numbers them with a running register
//! counter and accumulates the batch's monetary sum. The detail records are
//! then wrapped with the batch header and trailer.

use crate::barcode;
use crate::company::Company;
use crate::error::{CnabError, Result};
use crate::format;
use crate::framing::{batch_header, batch_trailer, BatchHeader, BatchTrailer};
use crate::money::Money;
use crate::payment::{
    Batch, BoletoPayment, Payments, PayrollPayment, PixCodePayment, PixPayment, ServiceType,
    SupplierPayment, TaxPayment, TaxType,
};
use crate::record::{DetailKey, Record};
use crate::segment::{
    segment_a, segment_b, segment_c, segment_d, segment_j, segment_j52, segment_j52_pix,
    segment_n, segment_o, segment_p, segment_q, segment_r, segment_w, SegmentA, SegmentB,
    SegmentBPayload, SegmentC, SegmentD, SegmentJ, SegmentJ52, SegmentJ52Pix, SegmentN, SegmentO,
    SegmentP, SegmentQ, SegmentR, SegmentW,
};
use log::debug;

/// Lines and counters produced for one batch.
#[derive(Debug, Clone)]
pub struct ProcessedBatch {
    pub batch: u32,
    pub service: ServiceType,
    pub payment_count: usize,
    /// Batch header, detail records and batch trailer, in file order.
    pub records: Vec<Record>,
    /// Detail records plus header and trailer.
    pub record_count: u32,
    pub total: Money,
}

/// Clearing house for a credit, derived from the payment form.
///
/// The form is zero-filled first, as in the batch header.
pub fn clearing_house(payment_form: &str) -> &'static str {
    match format::numeric(payment_form, 2).as_str() {
        "41" | "43" => "018",
        "03" => "700",
        "45" => "009",
        _ => "000",
    }
}

/// Encodes one batch with its 1-based number inside the file.
pub fn process_batch(number: u32, batch: &Batch, company: &Company) -> Result<ProcessedBatch> {
    let service = batch.service();
    debug!(
        "Batch {}: {} service with {} payments, form {}",
        number,
        service,
        batch.payments.len(),
        batch.payment_form
    );

    let header = batch_header(&BatchHeader {
        batch: number,
        service,
        payment_form: &batch.payment_form,
        company_id: &company.identification,
        company_name: &company.name,
        agreement: company.agreement.as_deref(),
        account: &company.bank,
        message: batch.message.as_deref(),
        address: company.address.as_ref(),
    })?;

    let mut details = DetailWriter::new(&company.bank.bank_code, number);
    let clearing = clearing_house(&batch.payment_form);
    match &batch.payments {
        Payments::Supplier(payments) => {
            for payment in payments {
                details.supplier(payment, clearing)?;
            }
        }
        Payments::Boleto(payments) => {
            for payment in payments {
                details.boleto(payment)?;
            }
        }
        Payments::Payroll(payments) => {
            for payment in payments {
                details.payroll(payment)?;
            }
        }
        Payments::Tax(payments) => {
            for payment in payments {
                details.tax(payment)?;
            }
        }
        Payments::InstantTransfer(payments) => {
            for payment in payments {
                match payment {
                    PixPayment::Key(p) => details.pix_key(p, clearing)?,
                    PixPayment::Code(p) => details.pix_code(p)?,
                }
            }
        }
    }

    let DetailWriter {
        records: detail_records,
        total,
        ..
    } = details;
    let record_count = detail_records.len() as u32 + 2;
    let trailer = batch_trailer(&BatchTrailer {
        bank_code: &company.bank.bank_code,
        batch: number,
        record_count,
        total,
    })?;

    let mut records = Vec::with_capacity(detail_records.len() + 2);
    records.push(header);
    records.extend(detail_records);
    records.push(trailer);

    debug!("Batch {}: {} records, total {}", number, record_count, total);

    Ok(ProcessedBatch {
        batch: number,
        service,
        payment_count: batch.payments.len(),
        records,
        record_count,
        total,
    })
}

/// Amount fields carry no sign, so a negative value can never be encoded.
fn unsigned(amounts: &[(&'static str, Option<Money>)]) -> Result<()> {
    for &(field, value) in amounts {
        if let Some(value) = value.filter(Money::is_negative) {
            return Err(CnabError::invalid(field, format!("negative amount {}", value)));
        }
    }
    Ok(())
}

/// Numbers and collects the detail records of a batch.
struct DetailWriter<'a> {
    bank_code: &'a str,
    batch: u32,
    sequence: u32,
    records: Vec<Record>,
    total: Money,
}

impl<'a> DetailWriter<'a> {
    fn new(bank_code: &'a str, batch: u32) -> Self {
        DetailWriter {
            bank_code,
            batch,
            sequence: 0,
            records: Vec::new(),
            total: Money::ZERO,
        }
    }

    /// Builds the next segment with the next register number.
    fn emit<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(&DetailKey<'_>) -> Result<Record>,
    {
        let key = DetailKey {
            bank_code: self.bank_code,
            batch: self.batch,
            sequence: self.sequence + 1,
        };
        let record = build(&key)?;
        self.sequence = key.sequence;
        if let Some(segment) = record.segment() {
            debug!(
                "Batch {}: register {} segment {}",
                self.batch, self.sequence, segment
            );
        }
        self.records.push(record);
        Ok(())
    }

    /// A, then B for an address or key, then C for withholding.
    fn supplier(&mut self, payment: &SupplierPayment, clearing: &str) -> Result<()> {
        let beneficiary = &payment.beneficiary;
        let data = &payment.payment;
        if let Some(id) = &beneficiary.identification {
            id.validate("beneficiary identification")?;
        }
        unsigned(&[
            ("amount", data.amount),
            ("document amount", data.document_amount),
            ("rebate", data.rebate),
            ("discount", data.discount),
            ("interest", data.interest),
            ("fine", data.fine),
        ])?;
        if let Some(w) = &payment.withholding {
            unsigned(&[
                ("income tax", w.income_tax),
                ("ISS", w.iss),
                ("IOF", w.iof),
                ("INSS", w.inss),
                ("other deductions", w.other_deductions),
                ("other additions", w.other_additions),
            ])?;
        }

        self.emit(|key| {
            segment_a(
                key,
                &SegmentA {
                    clearing_house: clearing,
                    bank: beneficiary.bank.as_ref(),
                    beneficiary_name: beneficiary.name.as_deref(),
                    your_number: data.your_number.as_deref(),
                    payment_date: data.payment_date.as_deref(),
                    amount: data.amount,
                    our_number: data.our_number.as_deref(),
                    information: data.information.as_deref(),
                    doc_purpose: data.doc_purpose.as_deref(),
                    ted_purpose: data.ted_purpose.as_deref(),
                    complementary_purpose: data.complementary_purpose.as_deref(),
                    keyed: payment.pix.is_some(),
                },
            )
        })?;

        let payload = if let Some(pix) = &payment.pix {
            Some(SegmentBPayload::Pix {
                key_type: pix.key_type,
                key: &pix.key,
                txid: pix.txid.as_deref(),
            })
        } else {
            beneficiary
                .address
                .as_ref()
                .filter(|a| !a.is_empty())
                .map(|address| SegmentBPayload::Address {
                    address,
                    due_date: data.due_date.as_deref(),
                    document_amount: data.document_amount,
                    rebate: data.rebate,
                    discount: data.discount,
                    interest: data.interest,
                    fine: data.fine,
                })
        };
        if let Some(payload) = payload {
            self.emit(|key| {
                segment_b(
                    key,
                    &SegmentB {
                        beneficiary_id: beneficiary.identification.as_ref(),
                        bank: beneficiary.bank.as_ref(),
                        payload,
                    },
                )
            })?;
        }

        if let Some(w) = &payment.withholding {
            self.emit(|key| {
                segment_c(
                    key,
                    &SegmentC {
                        income_tax: w.income_tax,
                        iss: w.iss,
                        iof: w.iof,
                        other_deductions: w.other_deductions,
                        other_additions: w.other_additions,
                        substitute_account: w.substitute_account.as_ref(),
                        inss: w.inss,
                    },
                )
            })?;
        }

        self.total += payment.principal_amount();
        Ok(())
    }

    /// J, then J-52 when payer or beneficiary identity is supplied.
    fn boleto(&mut self, payment: &BoletoPayment) -> Result<()> {
        self.slip(payment)?;

        if payment.needs_segment_j52() {
            self.emit(|key| {
                segment_j52(
                    key,
                    &SegmentJ52 {
                        payer: payment.payer.as_ref(),
                        beneficiary: payment.beneficiary.as_ref(),
                        drawer: payment.drawer.as_ref(),
                    },
                )
            })?;
        }

        self.total += payment.principal_amount();
        Ok(())
    }

    /// Segment J for a slip or a QR-code transfer.
    fn slip(&mut self, payment: &BoletoPayment) -> Result<()> {
        let barcode = match payment.barcode.as_deref() {
            Some(raw) if !raw.trim().is_empty() => barcode::normalize(raw)?,
            _ => return Err(CnabError::missing("segment J", "barcode")),
        };
        unsigned(&[
            ("nominal amount", payment.amount),
            ("discount", payment.discount),
            ("surcharge", payment.surcharge),
            ("payment amount", payment.payable()),
        ])?;

        self.emit(|key| {
            segment_j(
                key,
                &SegmentJ {
                    barcode: Some(barcode.as_str()),
                    beneficiary_name: payment.beneficiary_name.as_deref(),
                    due_date: payment.due_date.as_deref(),
                    nominal_amount: payment.amount,
                    discount: payment.discount,
                    surcharge: payment.surcharge,
                    payment_date: payment.payment_date.as_deref(),
                    payment_amount: payment.payable(),
                    your_number: payment.your_number.as_deref(),
                    our_number: payment.our_number.as_deref(),
                },
            )
        })
    }

    /// P, Q and R always, then D for pay-slip figures.
    fn payroll(&mut self, payment: &PayrollPayment) -> Result<()> {
        let employee = &payment.employee;
        if let Some(id) = &employee.identification {
            id.validate("employee identification")?;
        }
        unsigned(&[("amount", payment.amount)])?;
        if let Some(w) = &payment.withholding {
            unsigned(&[
                ("base salary", w.base_salary),
                ("income tax", w.income_tax),
                ("social security", w.social_security),
                ("FGTS", w.fgts),
                ("other deductions", w.other_deductions),
            ])?;
        }

        self.emit(|key| {
            segment_p(
                key,
                &SegmentP {
                    bank: payment.bank.as_ref(),
                    employee_name: employee.name.as_deref(),
                    your_number: payment.your_number.as_deref(),
                    payment_date: payment.payment_date.as_deref(),
                    amount: payment.amount,
                    registration: employee.registration.as_deref(),
                    competence: payment.competence.as_deref(),
                },
            )
        })?;
        self.emit(|key| {
            segment_q(
                key,
                &SegmentQ {
                    employee_id: employee.identification.as_ref(),
                    employee_name: employee.name.as_deref(),
                    address: employee.address.as_ref(),
                },
            )
        })?;
        self.emit(|key| {
            segment_r(
                key,
                &SegmentR {
                    message: payment.history.as_deref(),
                },
            )
        })?;

        if let Some(w) = &payment.withholding {
            let competence = payment
                .competence
                .as_deref()
                .or(payment.payment_date.as_deref());
            let net = payment.amount;
            let debits = w.total_deductions();
            let income_tax_base = w
                .base_salary
                .map(|b| b - w.social_security.unwrap_or(Money::ZERO));
            unsigned(&[("income tax base", income_tax_base)])?;
            self.emit(|key| {
                segment_d(
                    key,
                    &SegmentD {
                        competence,
                        cost_center: w.cost_center.as_deref(),
                        employee_code: employee.registration.as_deref(),
                        role: w.role.as_deref(),
                        vacation_start: w.vacation_start.as_deref(),
                        vacation_end: w.vacation_end.as_deref(),
                        income_tax_dependents: w.income_tax_dependents,
                        family_dependents: w.family_dependents,
                        weekly_hours: w.weekly_hours,
                        contribution_salary: w.base_salary,
                        fgts: w.fgts,
                        credits: net.map(|n| n + debits),
                        debits: Some(debits),
                        net,
                        base_salary: w.base_salary,
                        income_tax_base,
                        fgts_base: w.base_salary,
                    },
                )
            })?;
        }

        self.total += payment.principal_amount();
        Ok(())
    }

    /// O and N for a barcode tax, plus W for GARE; N alone otherwise.
    fn tax(&mut self, payment: &TaxPayment) -> Result<()> {
        let tax_type = payment.kind()?;
        let taxpayer = payment.taxpayer.as_ref();
        if let Some(party) = taxpayer {
            party.identification.validate("taxpayer identification")?;
        }
        unsigned(&[
            ("amount", payment.amount),
            ("principal", payment.principal()),
            ("fine", payment.fine),
            ("interest", payment.interest),
        ])?;

        let barcode = match payment.barcode.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(barcode::normalize(raw)?),
            _ => None,
        };

        if let Some(barcode) = &barcode {
            self.emit(|key| {
                segment_o(
                    key,
                    &SegmentO {
                        barcode: Some(barcode.as_str()),
                        collector_name: payment.collector_name.as_deref(),
                        due_date: payment.due_date.as_deref(),
                        payment_date: payment.payment_date.as_deref(),
                        amount: payment.total(),
                        your_number: payment.your_number.as_deref(),
                        our_number: payment.our_number.as_deref(),
                    },
                )
            })?;
        }

        self.emit(|key| {
            segment_n(
                key,
                &SegmentN {
                    tax_type,
                    your_number: payment.your_number.as_deref(),
                    our_number: payment.our_number.as_deref(),
                    taxpayer_name: taxpayer.map(|p| p.name.as_str()),
                    taxpayer_id: taxpayer.map(|p| &p.identification),
                    payment_date: payment.payment_date.as_deref(),
                    revenue_code: payment.revenue_code.as_deref(),
                    assessment_period: payment.assessment_period.as_deref(),
                    reference_number: payment.reference_number.as_deref(),
                    principal: payment.principal(),
                    fine: payment.fine,
                    interest: payment.interest,
                    due_date: payment.due_date.as_deref(),
                },
            )
        })?;

        if barcode.is_some() && tax_type == TaxType::Gare {
            let gare = payment.gare.clone().unwrap_or_default();
            self.emit(|key| {
                segment_w(
                    key,
                    &SegmentW {
                        information_1: gare.information_1.as_deref(),
                        information_2: gare.information_2.as_deref(),
                        state_registration: gare.state_registration.as_deref(),
                        active_debt: gare.active_debt.as_deref(),
                        reference: gare.reference.as_deref(),
                        installment: gare.installment.as_deref(),
                    },
                )
            })?;
        }

        self.total += payment.principal_amount();
        Ok(())
    }

    /// A then B carrying the key; the key replaces routing data.
    fn pix_key(&mut self, payment: &SupplierPayment, clearing: &str) -> Result<()> {
        if payment.pix.is_none() {
            return Err(CnabError::missing("instant transfer", "pix key"));
        }
        self.supplier(payment, clearing)
    }

    /// J then J-52 PIX, unconditionally.
    fn pix_code(&mut self, payment: &PixCodePayment) -> Result<()> {
        let slip = &payment.slip;
        self.slip(slip)?;
        self.emit(|key| {
            segment_j52_pix(
                key,
                &SegmentJ52Pix {
                    payer: slip.payer.as_ref(),
                    beneficiary: slip.beneficiary.as_ref(),
                    key: payment.key.as_deref(),
                    txid: payment.txid.as_deref(),
                    message: payment.message.as_deref(),
                },
            )
        })?;

        self.total += slip.principal_amount();
        Ok(())
    }
}
