//! Stay date range

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Result, ToolkitError};

/// Check-in and check-out calendar dates for a stay
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl DateRange {
    /// Create a validated range; check-out must be strictly after check-in
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self> {
        let range = Self {
            check_in,
            check_out,
        };
        range.validate()?;
        Ok(range)
    }

    /// Range covering `nights` nights starting at `check_in`
    pub fn for_nights(check_in: NaiveDate, nights: u32) -> Result<Self> {
        let check_out = check_in
            .checked_add_days(chrono::Days::new(u64::from(nights)))
            .ok_or_else(|| ToolkitError::invalid_date_range("check-out date overflows"))?;
        Self::new(check_in, check_out)
    }

    /// Parse two `YYYY-MM-DD` strings
    pub fn parse(check_in: &str, check_out: &str) -> Result<Self> {
        Self::new(parse_date(check_in)?, parse_date(check_out)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.check_out <= self.check_in {
            return Err(ToolkitError::invalid_date_range(format!(
                "check-out {} must be after check-in {}",
                self.check_out, self.check_in
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn nights(&self) -> u32 {
        u32::try_from((self.check_out - self.check_in).num_days()).unwrap_or(0)
    }

    /// The date of every night in the stay, check-out excluded
    pub fn night_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.check_in
            .iter_days()
            .take_while(move |date| *date < self.check_out)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ToolkitError::invalid_date_range(format!("'{value}' is not a YYYY-MM-DD date: {e}"))
    })
}
