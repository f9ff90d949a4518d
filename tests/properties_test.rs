//! Property tests for formatters, record width and trailer totals.

use cnab240_encoder::format::{alpha, amount, numeric};
use cnab240_encoder::record::DetailKey;
use cnab240_encoder::segment::{segment_a, SegmentA};
use cnab240_encoder::{
    BankAccount, EncoderConfig, Money, RecordKind, RemittanceEncoder, RemittanceRequest,
};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;

proptest! {
    #[test]
    fn numeric_is_idempotent(value in ".{0,40}", width in 1usize..20) {
        let once = numeric(&value, width);
        prop_assert_eq!(once.len(), width);
        prop_assert_eq!(numeric(&once, width), once);
    }

    #[test]
    fn alpha_is_fixed_width_uppercase_ascii(value in "\\PC{0,60}", width in 1usize..50) {
        let field = alpha(&value, width);
        prop_assert_eq!(field.len(), width);
        prop_assert!(field.chars().all(|c| c == ' ' || c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn amount_round_trips_to_cents(units in 0i64..1_000_000_000_000, scale in 0u32..5) {
        let value = Decimal::new(units, scale);
        let field = amount(Some(Money::new(value)), 15);

        let cents: i64 = field.parse().unwrap();
        let expected = value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        prop_assert_eq!(Decimal::new(cents, 2), expected);
    }

    #[test]
    fn segment_a_is_always_240(
        name in "\\PC{1,80}",
        your_number in "\\PC{0,40}",
        cents in 0i64..100_000_000_000,
        sequence in 1u32..99_999,
    ) {
        prop_assume!(!name.trim().is_empty());
        let bank = BankAccount {
            bank_code: "237".to_string(),
            branch: "123456789".to_string(),
            account: "1".to_string(),
            ..Default::default()
        };
        let key = DetailKey { bank_code: "341", batch: 1, sequence };
        let record = segment_a(&key, &SegmentA {
            clearing_house: "018",
            bank: Some(&bank),
            beneficiary_name: Some(&name),
            your_number: Some(&your_number),
            payment_date: Some("2024-02-30"),
            amount: Some(Money::from_cents(cents)),
            ..Default::default()
        })
        .unwrap();

        prop_assert_eq!(record.as_str().len(), 240);
        prop_assert_eq!(record.as_str().chars().count(), 240);
    }

    #[test]
    fn trailers_count_and_sum(batches in prop::collection::vec(prop::collection::vec(0i64..10_000_000, 1..6), 1..5)) {
        let batch_json: Vec<_> = batches
            .iter()
            .map(|amounts| {
                let payments: Vec<_> = amounts
                    .iter()
                    .map(|cents| json!({
                        "beneficiary": {
                            "name": "Fornecedor",
                            "bank": { "bank_code": "237", "branch": "1", "account": "2" }
                        },
                        "payment": {
                            "amount": Money::from_cents(*cents).to_string(),
                            "payment_date": "2024-03-20"
                        }
                    }))
                    .collect();
                json!({ "service_type": "20", "payments": payments })
            })
            .collect();

        let request: RemittanceRequest = serde_json::from_value(json!({
            "company": {
                "identification": { "kind": "cnpj", "number": "12345678000190" },
                "name": "Acme Ltda",
                "bank": { "bank_code": "341", "branch": "1234", "account": "56789" }
            },
            "batches": batch_json
        }))
        .unwrap();

        let encoder = RemittanceEncoder::new(EncoderConfig {
            generated_at: NaiveDate::from_ymd_opt(2024, 3, 15).and_then(|d| d.and_hms_opt(0, 0, 0)),
            ..Default::default()
        });
        let file = encoder.encode(&request).unwrap();
        let records = file.records();

        let trailers: Vec<&str> = records
            .iter()
            .filter(|r| r.kind() == RecordKind::BatchTrailer)
            .map(|r| r.as_str())
            .collect();
        prop_assert_eq!(trailers.len(), batches.len());

        let mut total_records = 0u32;
        for (trailer, amounts) in trailers.iter().zip(&batches) {
            let count: u32 = trailer[17..23].parse().unwrap();
            prop_assert_eq!(count as usize, amounts.len() + 2);
            total_records += count;

            let sum: i64 = trailer[23..41].parse().unwrap();
            prop_assert_eq!(sum, amounts.iter().sum::<i64>());
        }

        let file_trailer = records[records.len() - 1].as_str();
        let file_count: u32 = file_trailer[23..29].parse().unwrap();
        prop_assert_eq!(file_count, total_records + 2);
        prop_assert_eq!(file_count as usize, records.len());
    }
}
