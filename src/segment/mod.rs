//! Detail segment builders.
//!
//! Each builder takes the [`DetailKey`](crate::record::DetailKey) plus a
//! parameter struct holding only the fields its layout needs, validates the
//! mandatory ones and returns a sealed 240-character [`Record`](crate::record::Record).

mod payroll;
mod slip;
mod tax;
mod transfer;

pub use payroll::{segment_d, segment_p, segment_q, segment_r, SegmentD, SegmentP, SegmentQ, SegmentR};
pub use slip::{segment_j, segment_j52, segment_j52_pix, SegmentJ, SegmentJ52, SegmentJ52Pix};
pub use tax::{segment_n, segment_o, segment_w, SegmentN, SegmentO, SegmentW};
pub use transfer::{segment_a, segment_b, segment_c, SegmentA, SegmentB, SegmentBPayload, SegmentC};

use crate::company::{BankAccount, Identification};
use crate::format::{alpha_opt, numeric, numeric_opt, zeros};
use crate::record::Line;

/// Branch, account and their check digits: 5 + 1 + 12 + 1 + 1 positions.
pub(crate) fn push_routing(line: &mut Line, account: Option<&BankAccount>) {
    match account {
        Some(a) => {
            line.push(numeric(&a.branch, 5))
                .push(alpha_opt(a.branch_digit.as_deref(), 1))
                .push(numeric(&a.account, 12))
                .push(alpha_opt(a.account_digit.as_deref(), 1))
                .push(alpha_opt(a.branch_account_digit.as_deref(), 1));
        }
        None => {
            line.zero(5).blank(1).zero(12).blank(1).blank(1);
        }
    }
}

/// Inscription type digit plus a zero-filled number of `width` digits.
pub(crate) fn push_inscription(line: &mut Line, id: Option<&Identification>, width: usize) {
    match id {
        Some(id) => {
            line.push(id.kind.code()).push(numeric(&id.number, width));
        }
        None => {
            line.push("0").push(zeros(width));
        }
    }
}

/// Exactly 44 ASCII digits.
pub(crate) fn is_barcode(value: &str) -> bool {
    value.len() == crate::barcode::BARCODE_LEN && value.chars().all(|c| c.is_ascii_digit())
}

/// ISPB of an account, if known.
pub(crate) fn ispb(account: Option<&BankAccount>) -> String {
    numeric_opt(account.and_then(|a| a.ispb.as_deref()), 8)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::record::DetailKey;

    pub fn key() -> DetailKey<'static> {
        DetailKey {
            bank_code: "341",
            batch: 1,
            sequence: 1,
        }
    }
}
