//! Fuzzy matching of CSV headers onto the canonical OHLCV columns
//!
//! Header matching is case-insensitive and alias-aware so that common
//! vendor exports ("Timestamp", "Vol", "close_price", ...) map onto the
//! canonical schema without the caller renaming anything.

use crate::error::{DataError, Result};

/// Logical columns every upload must provide, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Alternative header spellings accepted for each logical column.
fn alternatives(logical: &str) -> &'static [&'static str] {
    match logical {
        "date" => &["time", "timestamp", "datetime"],
        "open" => &["opening", "open_price"],
        "high" => &["highest", "high_price", "max"],
        "low" => &["lowest", "low_price", "min"],
        "close" => &["closing", "close_price"],
        "volume" => &["vol", "trading_volume"],
        _ => &[],
    }
}

/// Resolved mapping from logical columns to physical header indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
    pub volume: usize,
}

impl ColumnMap {
    /// Match the physical headers against [`REQUIRED_COLUMNS`].
    ///
    /// Logical columns are resolved in canonical order; within each, headers
    /// are scanned left to right and the first unclaimed match wins. A header
    /// matches a logical column when either contains the other, or when it
    /// equals one of the known alternative spellings. Each physical column is
    /// claimed at most once.
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let mut claimed = vec![false; lowered.len()];
        let mut indices = [usize::MAX; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();

        for (slot, logical) in REQUIRED_COLUMNS.iter().enumerate() {
            let mut found = None;

            for (i, header) in lowered.iter().enumerate() {
                if claimed[i] || header.is_empty() {
                    continue;
                }
                if header.contains(logical) || logical.contains(header.as_str()) {
                    found = Some(i);
                    break;
                }
            }

            if found.is_none() {
                for alt in alternatives(logical) {
                    let hit = lowered
                        .iter()
                        .enumerate()
                        .find(|(i, h)| !claimed[*i] && h.as_str() == *alt)
                        .map(|(i, _)| i);
                    if hit.is_some() {
                        found = hit;
                        break;
                    }
                }
            }

            match found {
                Some(i) => {
                    claimed[i] = true;
                    indices[slot] = i;
                }
                None => missing.push(logical.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(DataError::MissingColumns {
                missing,
                required: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
                available: headers.to_vec(),
            });
        }

        Ok(ColumnMap {
            date: indices[0],
            open: indices[1],
            high: indices[2],
            low: indices[3],
            close: indices[4],
            volume: indices[5],
        })
    }
}
