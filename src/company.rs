//! Company, bank account and party identification models.
//!
//! Maintains the invariant: an identification number has 11 digits for a
//! personal id (CPF) and 14 digits for a corporate id (CNPJ).

use crate::error::{CnabError, Result};
use serde::{Deserialize, Serialize};

/// Kind of Brazilian taxpayer identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    /// Personal id, 11 digits.
    Cpf,
    /// Corporate id, 14 digits.
    Cnpj,
}

impl IdKind {
    /// Number of digits an identification of this kind carries.
    pub fn digits(&self) -> usize {
        match self {
            IdKind::Cpf => 11,
            IdKind::Cnpj => 14,
        }
    }

    /// Single-digit inscription type code (`1` CPF, `2` CNPJ).
    pub fn code(&self) -> &'static str {
        match self {
            IdKind::Cpf => "1",
            IdKind::Cnpj => "2",
        }
    }
}

/// A taxpayer identification: kind plus number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub kind: IdKind,
    pub number: String,
}

impl Identification {
    pub fn new(kind: IdKind, number: impl Into<String>) -> Self {
        Identification {
            kind,
            number: number.into(),
        }
    }

    /// Number with punctuation removed.
    pub fn digits(&self) -> String {
        self.number.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Checks the digit count against the identification kind.
    pub fn validate(&self, field: &'static str) -> Result<()> {
        let digits = self.digits();
        if digits.len() != self.kind.digits() {
            return Err(CnabError::invalid(
                field,
                format!(
                    "{:?} must have {} digits, got {}",
                    self.kind,
                    self.kind.digits(),
                    digits.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Bank routing data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Three-digit COMPE bank code.
    pub bank_code: String,
    pub branch: String,
    #[serde(default)]
    pub branch_digit: Option<String>,
    pub account: String,
    #[serde(default)]
    pub account_digit: Option<String>,
    /// Single check digit over branch and account, when the bank uses one.
    #[serde(default)]
    pub branch_account_digit: Option<String>,
    /// Eight-digit ISPB, used for instant transfers.
    #[serde(default)]
    pub ispb: Option<String>,
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub complement: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Eight-digit CEP; split into its 5-digit prefix and 3-digit suffix.
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl Address {
    /// Returns `true` if no field carries data.
    pub fn is_empty(&self) -> bool {
        [
            &self.street,
            &self.number,
            &self.complement,
            &self.district,
            &self.city,
            &self.zip_code,
            &self.state,
        ]
        .iter()
        .all(|f| f.as_deref().map_or(true, |v| v.trim().is_empty()))
    }

    /// Splits the CEP into prefix and suffix digits.
    pub fn zip_parts(&self) -> (Option<String>, Option<String>) {
        match self.zip_code.as_deref() {
            Some(zip) => {
                let digits: String = zip.chars().filter(|c| c.is_ascii_digit()).collect();
                let split = digits.len().min(5);
                let (prefix, suffix) = digits.split_at(split);
                (Some(prefix.to_string()), Some(suffix.to_string()))
            }
            None => (None, None),
        }
    }

    /// Street, number and complement on one line.
    pub fn line(&self) -> String {
        [&self.street, &self.number, &self.complement]
            .iter()
            .filter_map(|f| f.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Identity triple used by boleto complements: id type, id number and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub identification: Identification,
    pub name: String,
}

/// The paying company. Immutable input for one file generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub identification: Identification,
    pub name: String,
    /// Account debited for every payment in the file.
    pub bank: BankAccount,
    /// Agreement (convênio) code assigned by the bank.
    #[serde(default)]
    pub agreement: Option<String>,
    /// Bank name printed in the file header.
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl Company {
    /// Verifies the fields every header needs.
    pub fn validate(&self) -> Result<()> {
        self.identification.validate("company identification")?;
        if self.name.trim().is_empty() {
            return Err(CnabError::missing("company", "name"));
        }
        if self.bank.bank_code.trim().is_empty() {
            return Err(CnabError::missing("company", "bank code"));
        }
        if self.bank.branch.trim().is_empty() {
            return Err(CnabError::missing("company", "branch"));
        }
        if self.bank.account.trim().is_empty() {
            return Err(CnabError::missing("company", "account"));
        }
        Ok(())
    }
}
