use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("record {index} is missing required field '{field}'")]
    MalformedRecord { index: usize, field: &'static str },
}

/// A single retail transaction. Loaded once at startup, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub customer: String,
    pub product: String,
    pub amount: f64,
}

/// Permissive mirror of the on-disk record shape. Field presence is checked
/// record by record so a bad entry reports its index and the missing field
/// instead of a bare deserialization failure.
#[derive(Deserialize)]
struct RawRecord {
    date: Option<String>,
    customer: Option<String>,
    product: Option<String>,
    amount: Option<f64>,
}

impl RawRecord {
    fn validate(self, index: usize) -> Result<TransactionRecord> {
        let date = self
            .date
            .ok_or(LoadError::MalformedRecord { index, field: "date" })?;
        let customer = self
            .customer
            .ok_or(LoadError::MalformedRecord { index, field: "customer" })?;
        let product = self
            .product
            .ok_or(LoadError::MalformedRecord { index, field: "product" })?;
        let amount = self
            .amount
            .ok_or(LoadError::MalformedRecord { index, field: "amount" })?;

        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .with_context(|| format!("record {} has an invalid date '{}'", index, date))?;
        if amount < 0.0 {
            anyhow::bail!("record {} has a negative amount {}", index, amount);
        }

        Ok(TransactionRecord {
            date,
            customer,
            product,
            amount,
        })
    }
}

/// Load and validate the transaction file. Any malformed record aborts the
/// whole load; no partial corpus is ever built from a bad file.
pub fn load_transactions(path: &Path) -> Result<Vec<TransactionRecord>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to open transactions file '{}'", path.display()))?;
    let raw: Vec<RawRecord> = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse transactions file '{}'", path.display()))?;

    raw.into_iter()
        .enumerate()
        .map(|(index, record)| record.validate(index))
        .collect()
}

/// Total spend per calendar month, ascending by month. Independent of the
/// retrieval pipeline; feeds the `report` subcommand.
pub fn monthly_spending(records: &[TransactionRecord]) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        let month = record.date.format("%Y-%m").to_string();
        *totals.entry(month).or_insert(0.0) += record.amount;
    }
    totals.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_records_in_order() {
        let file = write_file(
            r#"[
                {"date": "2024-01-01", "customer": "Amit", "product": "Shirt", "amount": 500},
                {"date": "2024-01-05", "customer": "Riya", "product": "Shoes", "amount": 1200}
            ]"#,
        );
        let records = load_transactions(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].customer, "Amit");
        assert_eq!(records[1].product, "Shoes");
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn missing_field_reports_index_and_field() {
        let file = write_file(
            r#"[
                {"date": "2024-01-01", "customer": "Amit", "product": "Shirt", "amount": 500},
                {"date": "2024-01-05", "customer": "Riya", "amount": 1200}
            ]"#,
        );
        let err = load_transactions(file.path()).unwrap_err();
        let load_err = err.downcast_ref::<LoadError>().unwrap();
        match load_err {
            LoadError::MalformedRecord { index, field } => {
                assert_eq!(*index, 1);
                assert_eq!(*field, "product");
            }
        }
    }

    #[test]
    fn malformed_record_aborts_whole_load() {
        let file = write_file(r#"[{"customer": "Amit"}]"#);
        assert!(load_transactions(file.path()).is_err());
    }

    #[test]
    fn invalid_date_is_rejected() {
        let file = write_file(
            r#"[{"date": "01/01/2024", "customer": "Amit", "product": "Shirt", "amount": 500}]"#,
        );
        assert!(load_transactions(file.path()).is_err());
    }

    #[test]
    fn negative_amount_is_rejected() {
        let file = write_file(
            r#"[{"date": "2024-01-01", "customer": "Amit", "product": "Shirt", "amount": -5}]"#,
        );
        assert!(load_transactions(file.path()).is_err());
    }

    #[test]
    fn empty_array_loads_as_empty() {
        let file = write_file("[]");
        assert!(load_transactions(file.path()).unwrap().is_empty());
    }

    #[test]
    fn monthly_spending_groups_and_sums() {
        let records = vec![
            TransactionRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                customer: "Amit".into(),
                product: "Shirt".into(),
                amount: 500.0,
            },
            TransactionRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
                customer: "Riya".into(),
                product: "Shoes".into(),
                amount: 1200.0,
            },
            TransactionRecord {
                date: NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
                customer: "Karan".into(),
                product: "Watch".into(),
                amount: 2000.0,
            },
        ];
        let spending = monthly_spending(&records);
        assert_eq!(
            spending,
            vec![("2024-01".to_string(), 1700.0), ("2024-02".to_string(), 2000.0)]
        );
    }
}
