//! Barcode normalisation.
//!
//! Payment slips are printed with a typeable line that re-orders the barcode
//! digits and interleaves check digits. Files always carry the 44-digit
//! barcode, so typeable lines are converted back here.

use crate::error::{CnabError, Result};

/// Digits in a barcode.
pub const BARCODE_LEN: usize = 44;

/// Typeable line of a bank payment slip (boleto).
const BOLETO_LINE_LEN: usize = 47;

/// Typeable line of a utility or tax slip: four blocks of 11 digits + 1 check digit.
const COLLECTION_LINE_LEN: usize = 48;

/// Returns the 44-digit barcode for a barcode or typeable line.
pub fn normalize(value: &str) -> Result<String> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        BARCODE_LEN => Ok(digits),
        BOLETO_LINE_LEN => Ok(from_boleto_line(&digits)),
        COLLECTION_LINE_LEN => Ok(from_collection_line(&digits)),
        n => Err(CnabError::invalid(
            "barcode",
            format!(
                "expected {}, {} or {} digits, got {}",
                BARCODE_LEN, BOLETO_LINE_LEN, COLLECTION_LINE_LEN, n
            ),
        )),
    }
}

/// Boleto typeable line layout (0-indexed):
/// `0..4` bank + currency, `4..9` free field, `9` DV,
/// `10..20` free field, `20` DV, `21..31` free field, `31` DV,
/// `32` general DV, `33..47` due factor + value.
fn from_boleto_line(line: &str) -> String {
    [
        &line[0..4],
        &line[32..33],
        &line[33..47],
        &line[4..9],
        &line[10..20],
        &line[21..31],
    ]
    .concat()
}

fn from_collection_line(line: &str) -> String {
    line.as_bytes()
        .chunks(12)
        .map(|block| String::from_utf8_lossy(&block[..11]).into_owned())
        .collect()
}
