use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

use super::zoning::{Overlay, ZoneType};

/// One comparable land transaction, as published by the MOLIT actual-price
/// disclosure system (실거래가 공개시스템).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub price_per_sqm: f64,
    /// Straight-line distance from the subject parcel, in meters.
    pub distance_m: f64,
    pub area_sqm: f64,
}

/// Zoning record for an address, as returned by the land-use service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoningRecord {
    pub zone_type: ZoneType,
    pub bcr_legal_pct: f64,
    pub far_legal_pct: f64,
    pub overlays: Vec<Overlay>,
}

/// Failure modes of external land-data lookups. Every variant is recoverable:
/// the fallback resolver substitutes district defaults and records provenance.
#[derive(Debug, thiserror::Error)]
pub enum DataUnavailableError {
    #[error("{source_name} timed out after {timeout_secs}s")]
    Timeout {
        source_name: &'static str,
        timeout_secs: u64,
    },
    #[error("upstream failure: {0}")]
    Upstream(String),
    #[error("no record found for address")]
    NotFound,
}

/// External collaborator supplying zoning, official price, and comparable
/// transactions. Implementations wrap VWorld/Kakao/MOLIT clients; the core
/// only sees this trait and must function when every call fails.
pub trait LandDataProvider: Send + Sync {
    fn get_zoning(&self, address: &str) -> Result<ZoningRecord, DataUnavailableError>;

    /// Official land price (공시지가) in KRW per square meter.
    fn get_official_price(&self, address: &str) -> Result<f64, DataUnavailableError>;

    fn get_comparable_transactions(
        &self,
        address: &str,
        radius_m: f64,
        months: u32,
    ) -> Result<Vec<Transaction>, DataUnavailableError>;
}

/// In-process provider backed by static records, used by tests, demos, and
/// offline runs hydrated from a MOLIT CSV export.
#[derive(Debug, Default, Clone)]
pub struct StaticLandDataProvider {
    zoning: HashMap<String, ZoningRecord>,
    official_prices: HashMap<String, f64>,
    transactions: HashMap<String, Vec<Transaction>>,
}

impl StaticLandDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zoning(mut self, address: &str, record: ZoningRecord) -> Self {
        self.zoning.insert(address.to_string(), record);
        self
    }

    pub fn with_official_price(mut self, address: &str, price_per_sqm: f64) -> Self {
        self.official_prices.insert(address.to_string(), price_per_sqm);
        self
    }

    pub fn with_transactions(mut self, address: &str, transactions: Vec<Transaction>) -> Self {
        self.transactions.insert(address.to_string(), transactions);
        self
    }

    /// Loads comparable transactions for an address from a MOLIT-style CSV
    /// export (columns: 계약일, 단가, 거리, 면적).
    pub fn with_transaction_csv<R: Read>(
        self,
        address: &str,
        reader: R,
    ) -> Result<Self, TransactionCsvError> {
        let transactions = read_transaction_csv(reader)?;
        Ok(self.with_transactions(address, transactions))
    }
}

impl LandDataProvider for StaticLandDataProvider {
    fn get_zoning(&self, address: &str) -> Result<ZoningRecord, DataUnavailableError> {
        self.zoning
            .get(address)
            .cloned()
            .ok_or(DataUnavailableError::NotFound)
    }

    fn get_official_price(&self, address: &str) -> Result<f64, DataUnavailableError> {
        self.official_prices
            .get(address)
            .copied()
            .ok_or(DataUnavailableError::NotFound)
    }

    fn get_comparable_transactions(
        &self,
        address: &str,
        radius_m: f64,
        months: u32,
    ) -> Result<Vec<Transaction>, DataUnavailableError> {
        let all = self
            .transactions
            .get(address)
            .cloned()
            .ok_or(DataUnavailableError::NotFound)?;
        let _ = (radius_m, months);
        Ok(all)
    }
}

/// Provider that fails every call, standing in for a vendor outage in tests
/// and fallback demos.
#[derive(Debug, Default, Clone)]
pub struct UnavailableProvider;

impl LandDataProvider for UnavailableProvider {
    fn get_zoning(&self, _address: &str) -> Result<ZoningRecord, DataUnavailableError> {
        Err(DataUnavailableError::Timeout {
            source_name: "land-use service",
            timeout_secs: 10,
        })
    }

    fn get_official_price(&self, _address: &str) -> Result<f64, DataUnavailableError> {
        Err(DataUnavailableError::Timeout {
            source_name: "official-price service",
            timeout_secs: 10,
        })
    }

    fn get_comparable_transactions(
        &self,
        _address: &str,
        _radius_m: f64,
        _months: u32,
    ) -> Result<Vec<Transaction>, DataUnavailableError> {
        Err(DataUnavailableError::Timeout {
            source_name: "transaction service",
            timeout_secs: 10,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransactionCsvError {
    #[error("csv parse failure: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: invalid number '{value}'")]
    InvalidNumber { row: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct TransactionCsvRow {
    #[serde(rename = "계약일")]
    contract_date: String,
    #[serde(rename = "단가")]
    price_per_sqm: String,
    #[serde(rename = "거리")]
    distance_m: String,
    #[serde(rename = "면적")]
    area_sqm: String,
}

fn parse_number(value: &str, row: usize) -> Result<f64, TransactionCsvError> {
    value
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| TransactionCsvError::InvalidNumber {
            row,
            value: value.to_string(),
        })
}

/// Reads a MOLIT-style transaction export into comparable records.
pub fn read_transaction_csv<R: Read>(reader: R) -> Result<Vec<Transaction>, TransactionCsvError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut transactions = Vec::new();
    for (index, row) in csv_reader.deserialize::<TransactionCsvRow>().enumerate() {
        let row_number = index + 2;
        let row = row?;
        let date = NaiveDate::parse_from_str(row.contract_date.trim(), "%Y-%m-%d").map_err(
            |_| TransactionCsvError::InvalidDate {
                row: row_number,
                value: row.contract_date.clone(),
            },
        )?;
        transactions.push(Transaction {
            date,
            price_per_sqm: parse_number(&row.price_per_sqm, row_number)?,
            distance_m: parse_number(&row.distance_m, row_number)?,
            area_sqm: parse_number(&row.area_sqm, row_number)?,
        });
    }

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
계약일,단가,거리,면적
2025-06-01,\"8,200,000\",120,330
2025-03-15,7950000,260,410
";

    #[test]
    fn parses_molit_csv_with_grouped_digits() {
        let transactions =
            read_transaction_csv(Cursor::new(SAMPLE)).expect("sample csv parses");
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].price_per_sqm, 8_200_000.0);
        assert_eq!(
            transactions[1].date,
            NaiveDate::from_ymd_opt(2025, 3, 15).expect("valid date")
        );
    }

    #[test]
    fn rejects_malformed_date() {
        let bad = "계약일,단가,거리,면적\n2025/06/01,8200000,120,330\n";
        let result = read_transaction_csv(Cursor::new(bad));
        assert!(matches!(
            result,
            Err(TransactionCsvError::InvalidDate { row: 2, .. })
        ));
    }
}
