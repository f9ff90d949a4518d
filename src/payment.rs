//! Batch and payment models for request parsing and internal representation.

use crate::company::{Address, BankAccount, Identification, Party};
use crate::error::{CnabError, Result};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw batch as received from the request layer.
///
/// The service type is kept as text and the payments as untyped JSON until
/// [`BatchRecord::parse`] turns them into a typed [`Batch`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchRecord {
    /// Service type code (`20`, `03`, `30`, `22`, `98`) or name (`supplier`, ...)
    pub service_type: String,

    /// Payment form (forma de lançamento); defaults per service type
    #[serde(default)]
    pub payment_form: Option<String>,

    /// Free text printed in the batch header
    #[serde(default)]
    pub message: Option<String>,

    /// Payments in the shape the service type expects
    #[serde(default)]
    pub payments: Vec<serde_json::Value>,
}

impl BatchRecord {
    /// Parses the raw record into a typed batch.
    ///
    /// Fails with `UnsupportedServiceType` for unknown codes and with
    /// `MissingField` when the batch carries no payments.
    pub fn parse(&self) -> Result<Batch> {
        let service = ServiceType::from_str(&self.service_type)?;
        if self.payments.is_empty() {
            return Err(CnabError::missing("batch", "payments"));
        }

        let payments = match service {
            ServiceType::Supplier => Payments::Supplier(typed(&self.payments)?),
            ServiceType::Boleto => Payments::Boleto(typed(&self.payments)?),
            ServiceType::Payroll => Payments::Payroll(typed(&self.payments)?),
            ServiceType::Tax => Payments::Tax(typed(&self.payments)?),
            ServiceType::InstantTransfer => Payments::InstantTransfer(typed(&self.payments)?),
        };

        let mut batch = Batch::new(payments);
        if let Some(form) = self.payment_form.as_deref().filter(|f| !f.trim().is_empty()) {
            batch.payment_form = form.trim().to_string();
        }
        batch.message = self.message.clone();
        Ok(batch)
    }
}

fn typed<T: for<'de> Deserialize<'de>>(values: &[serde_json::Value]) -> Result<Vec<T>> {
    values
        .iter()
        .map(|v| T::deserialize(v).map_err(CnabError::from))
        .collect()
}

/// Service families, each handled by its own batch processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    /// Credit, DOC or TED payments to suppliers.
    Supplier,
    /// Settlement of bank payment slips.
    Boleto,
    /// Salary payments.
    Payroll,
    /// Taxes and utility collections.
    Tax,
    /// Instant transfers, by key or by QR code.
    InstantTransfer,
}

impl ServiceType {
    /// Two-digit service code written in the batch header.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceType::Supplier => "20",
            ServiceType::Boleto => "03",
            ServiceType::Payroll => "30",
            ServiceType::Tax => "22",
            ServiceType::InstantTransfer => "98",
        }
    }

    /// Payment form used when the batch does not declare one.
    pub fn default_payment_form(&self) -> &'static str {
        match self {
            ServiceType::Supplier => "41",
            ServiceType::Boleto => "31",
            ServiceType::Payroll => "01",
            ServiceType::Tax => "11",
            ServiceType::InstantTransfer => "45",
        }
    }

    /// Batch layout version written in the batch header.
    pub fn layout_version(&self) -> &'static str {
        match self {
            ServiceType::Supplier | ServiceType::Payroll => "045",
            ServiceType::Boleto => "040",
            ServiceType::Tax => "012",
            ServiceType::InstantTransfer => "046",
        }
    }
}

impl FromStr for ServiceType {
    type Err = CnabError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "20" | "supplier" => Ok(ServiceType::Supplier),
            "03" | "3" | "boleto" => Ok(ServiceType::Boleto),
            "30" | "payroll" => Ok(ServiceType::Payroll),
            "22" | "tax" => Ok(ServiceType::Tax),
            "98" | "pix" | "instant_transfer" => Ok(ServiceType::InstantTransfer),
            other => Err(CnabError::UnsupportedServiceType(other.to_string())),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceType::Supplier => "supplier",
            ServiceType::Boleto => "boleto",
            ServiceType::Payroll => "payroll",
            ServiceType::Tax => "tax",
            ServiceType::InstantTransfer => "pix",
        };
        f.write_str(name)
    }
}

/// A typed batch: payments of one service family.
#[derive(Debug, Clone)]
pub struct Batch {
    pub payment_form: String,
    pub message: Option<String>,
    pub payments: Payments,
}

impl Batch {
    /// Creates a batch with the service's default payment form.
    pub fn new(payments: Payments) -> Self {
        Batch {
            payment_form: payments.service().default_payment_form().to_string(),
            message: None,
            payments,
        }
    }

    pub fn service(&self) -> ServiceType {
        self.payments.service()
    }
}

/// Payments of a batch, one variant per service family.
#[derive(Debug, Clone)]
pub enum Payments {
    Supplier(Vec<SupplierPayment>),
    Boleto(Vec<BoletoPayment>),
    Payroll(Vec<PayrollPayment>),
    Tax(Vec<TaxPayment>),
    InstantTransfer(Vec<PixPayment>),
}

impl Payments {
    pub fn service(&self) -> ServiceType {
        match self {
            Payments::Supplier(_) => ServiceType::Supplier,
            Payments::Boleto(_) => ServiceType::Boleto,
            Payments::Payroll(_) => ServiceType::Payroll,
            Payments::Tax(_) => ServiceType::Tax,
            Payments::InstantTransfer(_) => ServiceType::InstantTransfer,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Payments::Supplier(p) => p.len(),
            Payments::Boleto(p) => p.len(),
            Payments::Payroll(p) => p.len(),
            Payments::Tax(p) => p.len(),
            Payments::InstantTransfer(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Person or company receiving a credit.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Beneficiary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub identification: Option<Identification>,
    /// Routing data; not needed when paying to an instant-transfer key
    #[serde(default)]
    pub bank: Option<BankAccount>,
    #[serde(default)]
    pub address: Option<Address>,
}

/// Scheduling and value data of a credit.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaymentData {
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub amount: Option<Money>,
    /// Company's own reference (seu número)
    #[serde(default)]
    pub your_number: Option<String>,
    /// Bank's reference (nosso número)
    #[serde(default)]
    pub our_number: Option<String>,
    #[serde(default)]
    pub information: Option<String>,
    #[serde(default)]
    pub doc_purpose: Option<String>,
    #[serde(default)]
    pub ted_purpose: Option<String>,
    #[serde(default)]
    pub complementary_purpose: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub document_amount: Option<Money>,
    #[serde(default)]
    pub rebate: Option<Money>,
    #[serde(default)]
    pub discount: Option<Money>,
    #[serde(default)]
    pub interest: Option<Money>,
    #[serde(default)]
    pub fine: Option<Money>,
}

/// Kind of instant-transfer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PixKeyType {
    Phone,
    Email,
    /// CPF or CNPJ
    Document,
    Random,
}

impl PixKeyType {
    /// Initiation form code written in Segment B.
    pub fn initiation_code(&self) -> &'static str {
        match self {
            PixKeyType::Phone => "01",
            PixKeyType::Email => "02",
            PixKeyType::Document => "03",
            PixKeyType::Random => "04",
        }
    }
}

/// Instant-transfer key addressing a payment instead of routing data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PixKey {
    pub key_type: PixKeyType,
    pub key: String,
    #[serde(default)]
    pub txid: Option<String>,
}

/// Amounts withheld from a supplier payment, written to Segment C.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Withholding {
    #[serde(default)]
    pub income_tax: Option<Money>,
    #[serde(default)]
    pub iss: Option<Money>,
    #[serde(default)]
    pub iof: Option<Money>,
    #[serde(default)]
    pub inss: Option<Money>,
    #[serde(default)]
    pub other_deductions: Option<Money>,
    #[serde(default)]
    pub other_additions: Option<Money>,
    /// Account to credit instead of the beneficiary's
    #[serde(default)]
    pub substitute_account: Option<BankAccount>,
}

/// Supplier credit (Segment A, optional B and C).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SupplierPayment {
    pub beneficiary: Beneficiary,
    pub payment: PaymentData,
    #[serde(default)]
    pub pix: Option<PixKey>,
    #[serde(default)]
    pub withholding: Option<Withholding>,
}

impl SupplierPayment {
    pub fn principal_amount(&self) -> Money {
        self.payment.amount.unwrap_or(Money::ZERO)
    }
}

/// Payment slip settlement (Segment J, optional J-52).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BoletoPayment {
    /// 44-digit barcode or 47/48-digit typeable line
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub beneficiary_name: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
    /// Nominal value of the slip
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub discount: Option<Money>,
    /// Interest plus fine
    #[serde(default)]
    pub surcharge: Option<Money>,
    /// Value actually paid; derived from the others when absent
    #[serde(default)]
    pub payment_amount: Option<Money>,
    #[serde(default)]
    pub your_number: Option<String>,
    #[serde(default)]
    pub our_number: Option<String>,
    #[serde(default)]
    pub payer: Option<Party>,
    #[serde(default)]
    pub beneficiary: Option<Party>,
    #[serde(default)]
    pub drawer: Option<Party>,
}

impl BoletoPayment {
    /// Value paid: explicit, or nominal minus discount plus surcharge.
    pub fn payable(&self) -> Option<Money> {
        self.payment_amount.or_else(|| {
            self.amount.map(|amount| {
                amount - self.discount.unwrap_or(Money::ZERO) + self.surcharge.unwrap_or(Money::ZERO)
            })
        })
    }

    /// Segment J-52 is needed when payer or beneficiary identity is supplied.
    pub fn needs_segment_j52(&self) -> bool {
        self.payer.is_some() || self.beneficiary.is_some()
    }

    pub fn principal_amount(&self) -> Money {
        self.payable().unwrap_or(Money::ZERO)
    }
}

/// Instant transfer paid from a QR code (Segment J then J-52 PIX).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PixCodePayment {
    #[serde(flatten)]
    pub slip: BoletoPayment,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Instant-transfer payment, addressed by key or by QR code.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PixPayment {
    /// Beneficiary and payment data of a supplier credit plus a key.
    Key(SupplierPayment),
    /// Payment line data plus key, transaction id and free text.
    Code(PixCodePayment),
}

impl PixPayment {
    pub fn principal_amount(&self) -> Money {
        match self {
            PixPayment::Key(p) => p.principal_amount(),
            PixPayment::Code(p) => p.slip.principal_amount(),
        }
    }
}

/// Employee being paid.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Employee {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub identification: Option<Identification>,
    /// Company registration number (matrícula)
    #[serde(default)]
    pub registration: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

/// Pay-slip figures written to Segment D.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PayrollWithholding {
    #[serde(default)]
    pub base_salary: Option<Money>,
    #[serde(default)]
    pub income_tax: Option<Money>,
    #[serde(default)]
    pub social_security: Option<Money>,
    #[serde(default)]
    pub fgts: Option<Money>,
    #[serde(default)]
    pub other_deductions: Option<Money>,
    #[serde(default)]
    pub cost_center: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub vacation_start: Option<String>,
    #[serde(default)]
    pub vacation_end: Option<String>,
    #[serde(default)]
    pub income_tax_dependents: Option<u32>,
    #[serde(default)]
    pub family_dependents: Option<u32>,
    #[serde(default)]
    pub weekly_hours: Option<u32>,
}

impl PayrollWithholding {
    /// Sum of everything deducted from the gross salary.
    pub fn total_deductions(&self) -> Money {
        [self.income_tax, self.social_security, self.other_deductions]
            .iter()
            .flatten()
            .copied()
            .sum()
    }
}

/// Salary payment (Segments P, Q, R and optional D).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PayrollPayment {
    pub employee: Employee,
    #[serde(default)]
    pub bank: Option<BankAccount>,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub your_number: Option<String>,
    /// Month the salary refers to
    #[serde(default)]
    pub competence: Option<String>,
    #[serde(default)]
    pub withholding: Option<PayrollWithholding>,
    /// Free text shown on the employee's statement
    #[serde(default)]
    pub history: Option<String>,
}

impl PayrollPayment {
    pub fn principal_amount(&self) -> Money {
        self.amount.unwrap_or(Money::ZERO)
    }
}

/// Tax sub-types with their Segment N tax identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaxType {
    Darf,
    DarfSimples,
    Gps,
    /// State ICMS collection (GARE), supplemented by Segment W.
    Gare,
    Fgts,
    Ipva,
    Dpvat,
    Licenciamento,
    Other,
}

impl TaxType {
    pub fn code(&self) -> &'static str {
        match self {
            TaxType::Darf => "16",
            TaxType::DarfSimples => "18",
            TaxType::Gps => "17",
            TaxType::Gare => "22",
            TaxType::Fgts => "11",
            TaxType::Ipva => "25",
            TaxType::Dpvat => "27",
            TaxType::Licenciamento => "26",
            TaxType::Other => "00",
        }
    }
}

impl FromStr for TaxType {
    type Err = CnabError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "darf" | "16" => Ok(TaxType::Darf),
            "darf_simples" | "18" => Ok(TaxType::DarfSimples),
            "gps" | "17" => Ok(TaxType::Gps),
            "gare" | "22" => Ok(TaxType::Gare),
            "fgts" | "11" => Ok(TaxType::Fgts),
            "ipva" | "25" => Ok(TaxType::Ipva),
            "dpvat" | "27" => Ok(TaxType::Dpvat),
            "licenciamento" | "26" => Ok(TaxType::Licenciamento),
            "other" | "00" => Ok(TaxType::Other),
            _ => Err(CnabError::UnsupportedTaxType(s.trim().to_string())),
        }
    }
}

/// State-tax (GARE) data written to Segment W.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GareSupplement {
    #[serde(default)]
    pub state_registration: Option<String>,
    #[serde(default)]
    pub active_debt: Option<String>,
    /// Reference month
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub installment: Option<String>,
    #[serde(default)]
    pub information_1: Option<String>,
    #[serde(default)]
    pub information_2: Option<String>,
}

/// Tax or collection payment (Segments O, N, W).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaxPayment {
    /// Tax sub-type as received; see [`TaxPayment::kind`]
    pub tax_type: String,
    /// Present for barcode taxes, which carry their amount only
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub taxpayer: Option<Party>,
    /// Concessionaire or agency name printed on the slip
    #[serde(default)]
    pub collector_name: Option<String>,
    #[serde(default)]
    pub revenue_code: Option<String>,
    #[serde(default)]
    pub assessment_period: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
    /// Amount of a barcode tax
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub principal: Option<Money>,
    #[serde(default)]
    pub fine: Option<Money>,
    #[serde(default)]
    pub interest: Option<Money>,
    #[serde(default)]
    pub your_number: Option<String>,
    #[serde(default)]
    pub our_number: Option<String>,
    #[serde(default)]
    pub gare: Option<GareSupplement>,
}

impl TaxPayment {
    /// Parses the declared sub-type.
    pub fn kind(&self) -> Result<TaxType> {
        TaxType::from_str(&self.tax_type)
    }

    pub fn has_barcode(&self) -> bool {
        self.barcode.as_deref().map_or(false, |b| !b.trim().is_empty())
    }

    /// Principal of the tax.
    ///
    /// The amount of a barcode tax already includes fine and interest, so
    /// without an explicit principal they are taken out of it.
    pub fn principal(&self) -> Option<Money> {
        if self.principal.is_some() {
            return self.principal;
        }
        let amount = self.amount?;
        if self.has_barcode() {
            Some(amount - self.surcharges())
        } else {
            Some(amount)
        }
    }

    /// Principal plus fine plus interest. For a barcode tax this is its amount.
    pub fn total(&self) -> Option<Money> {
        self.principal().map(|p| p + self.surcharges())
    }

    fn surcharges(&self) -> Money {
        self.fine.unwrap_or(Money::ZERO) + self.interest.unwrap_or(Money::ZERO)
    }

    pub fn principal_amount(&self) -> Money {
        self.total().unwrap_or(Money::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_supplier_batch() {
        let record: BatchRecord = serde_json::from_value(json!({
            "service_type": "20",
            "payments": [{
                "beneficiary": { "name": "Fornecedor" },
                "payment": { "amount": 10.5, "payment_date": "2024-03-15" }
            }]
        }))
        .unwrap();

        let batch = record.parse().unwrap();
        assert_eq!(batch.service(), ServiceType::Supplier);
        assert_eq!(batch.payment_form, "41");
        match batch.payments {
            Payments::Supplier(p) => assert_eq!(p[0].principal_amount().to_string(), "10.50"),
            _ => panic!("Expected supplier payments"),
        }
    }

    #[test]
    fn test_parse_handles_names_and_whitespace() {
        assert_eq!(ServiceType::from_str("  Payroll ").unwrap(), ServiceType::Payroll);
        assert_eq!(ServiceType::from_str("pix").unwrap(), ServiceType::InstantTransfer);
        assert_eq!(ServiceType::from_str("03").unwrap(), ServiceType::Boleto);
    }

    #[test]
    fn test_parse_rejects_unknown_service() {
        let record = BatchRecord {
            service_type: "77".to_string(),
            payment_form: None,
            message: None,
            payments: vec![json!({})],
        };
        assert!(matches!(
            record.parse(),
            Err(CnabError::UnsupportedServiceType(code)) if code == "77"
        ));
    }

    #[test]
    fn test_parse_rejects_empty_batch() {
        let record = BatchRecord {
            service_type: "30".to_string(),
            payment_form: Some("05".to_string()),
            message: None,
            payments: vec![],
        };
        assert!(matches!(record.parse(), Err(CnabError::MissingField { .. })));
    }

    #[test]
    fn test_parse_pix_modes() {
        let record: BatchRecord = serde_json::from_value(json!({
            "service_type": "pix",
            "payment_form": "47",
            "payments": [
                {
                    "mode": "key",
                    "beneficiary": { "name": "Maria" },
                    "payment": { "amount": "5.00" },
                    "pix": { "key_type": "email", "key": "maria@example.com" }
                },
                {
                    "mode": "code",
                    "barcode": "34191790010104351004791020150008291070026000",
                    "amount": 7,
                    "txid": "TX1"
                }
            ]
        }))
        .unwrap();

        let batch = record.parse().unwrap();
        assert_eq!(batch.payment_form, "47");
        match batch.payments {
            Payments::InstantTransfer(p) => {
                assert!(matches!(p[0], PixPayment::Key(_)));
                assert!(matches!(p[1], PixPayment::Code(_)));
                assert_eq!(p[1].principal_amount(), Money::from_cents(700));
            }
            _ => panic!("Expected instant-transfer payments"),
        }
    }

    #[test]
    fn test_tax_type_parsing() {
        assert_eq!(TaxType::from_str("GARE").unwrap(), TaxType::Gare);
        assert_eq!(TaxType::from_str("darf-simples").unwrap(), TaxType::DarfSimples);
        assert!(matches!(
            TaxType::from_str("xyz"),
            Err(CnabError::UnsupportedTaxType(_))
        ));
    }

    #[test]
    fn test_boleto_payable_amount() {
        let boleto = BoletoPayment {
            amount: Some(Money::from_cents(10000)),
            discount: Some(Money::from_cents(500)),
            surcharge: Some(Money::from_cents(250)),
            ..Default::default()
        };
        assert_eq!(boleto.payable(), Some(Money::from_cents(9750)));
    }

    #[test]
    fn test_tax_total_sums_components() {
        let tax = TaxPayment {
            tax_type: "DARF".to_string(),
            barcode: None,
            taxpayer: None,
            collector_name: None,
            revenue_code: Some("0220".to_string()),
            assessment_period: None,
            reference_number: None,
            due_date: None,
            payment_date: None,
            amount: None,
            principal: Some(Money::from_cents(10000)),
            fine: Some(Money::from_cents(200)),
            interest: Some(Money::from_cents(150)),
            your_number: None,
            our_number: None,
            gare: None,
        };
        assert_eq!(tax.total(), Some(Money::from_cents(10350)));
        assert_eq!(tax.kind().unwrap(), TaxType::Darf);
    }

    #[test]
    fn test_barcode_tax_amount_includes_surcharges() {
        let tax: TaxPayment = serde_json::from_value(json!({
            "tax_type": "FGTS",
            "barcode": "85890000460524601791606075930508683148300001",
            "amount": 100,
            "fine": 2,
            "interest": 1
        }))
        .unwrap();
        assert_eq!(tax.total(), Some(Money::from_cents(10000)));
        assert_eq!(tax.principal(), Some(Money::from_cents(9700)));
    }

    #[test]
    fn test_unknown_tax_type_is_kept_until_parsed() {
        let tax: TaxPayment =
            serde_json::from_value(json!({ "tax_type": "ICMS-XYZ", "principal": 1 })).unwrap();
        assert!(matches!(
            tax.kind(),
            Err(CnabError::UnsupportedTaxType(code)) if code == "ICMS-XYZ"
        ));
    }
}
