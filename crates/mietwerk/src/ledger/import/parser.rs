use std::io::Read;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::ImportError;

#[derive(Debug)]
pub(crate) struct ImportRow {
    pub(crate) effective_date: NaiveDate,
    pub(crate) cold_rent: Decimal,
    pub(crate) utilities: Decimal,
    pub(crate) reason: Option<String>,
    pub(crate) notes: Option<String>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ImportRow>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<RawRow>().enumerate() {
        // Line 1 is the header.
        let line = index + 2;
        let raw = record?;

        let effective_date = parse_date(&raw.effective_date).ok_or(ImportError::InvalidRow {
            line,
            detail: format!("'{}' is not a calendar date", raw.effective_date),
        })?;
        let cold_rent = parse_amount(&raw.cold_rent).ok_or(ImportError::InvalidRow {
            line,
            detail: format!("'{}' is not a money amount", raw.cold_rent),
        })?;
        let utilities = match raw.utilities.as_deref() {
            Some(value) => parse_amount(value).ok_or(ImportError::InvalidRow {
                line,
                detail: format!("'{}' is not a money amount", value),
            })?,
            None => Decimal::ZERO,
        };

        rows.push(ImportRow {
            effective_date,
            cold_rent,
            utilities,
            reason: raw.reason,
            notes: raw.notes,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Effective Date")]
    effective_date: String,
    #[serde(rename = "Cold Rent")]
    cold_rent: String,
    #[serde(rename = "Utilities", default, deserialize_with = "empty_string_as_none")]
    utilities: Option<String>,
    #[serde(rename = "Reason", default, deserialize_with = "empty_string_as_none")]
    reason: Option<String>,
    #[serde(rename = "Notes", default, deserialize_with = "empty_string_as_none")]
    notes: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    // German exports quote dates as 01.07.2021.
    NaiveDate::parse_from_str(trimmed, "%d.%m.%Y").ok()
}

fn parse_amount(value: &str) -> Option<Decimal> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(amount) = Decimal::from_str(&cleaned) {
        return Some(amount);
    }

    // German exports quote amounts as 1.234,56.
    let german = cleaned.replace('.', "").replace(',', ".");
    Decimal::from_str(&german).ok()
}
