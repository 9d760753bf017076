use crate::enums::{Direction, Phase};
use crate::error::CoreError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Largest accepted transfer value (one quadrillion USD). Keeps sums over any
/// realistic ledger far inside `Decimal`'s range.
pub const MAX_AMOUNT_USD: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// A single normalized bridge transfer.
///
/// `date`, `iso_year` and `week` are derived from `timestamp` inside [`BridgeEvent::new`] and
/// the fields are only exposed through accessors, so the three can never drift
/// apart after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeEvent {
    timestamp: DateTime<Utc>,
    date: NaiveDate,
    iso_year: i32,
    week: u32,
    source_address: String,
    source_chain: String,
    direction: Direction,
    symbol: String,
    amount_usd: Decimal,
}

impl BridgeEvent {
    pub fn new(
        timestamp: DateTime<Utc>,
        source_address: impl Into<String>,
        source_chain: impl Into<String>,
        direction: Direction,
        symbol: impl Into<String>,
        amount_usd: Decimal,
    ) -> Result<Self, CoreError> {
        if amount_usd.is_sign_negative() && !amount_usd.is_zero() {
            return Err(CoreError::InvalidInput(
                "amount_usd".to_string(),
                format!("must be non-negative, got {}", amount_usd),
            ));
        }
        if amount_usd > MAX_AMOUNT_USD {
            return Err(CoreError::InvalidInput(
                "amount_usd".to_string(),
                format!("must not exceed {}, got {}", MAX_AMOUNT_USD, amount_usd),
            ));
        }

        let iso_week = timestamp.iso_week();
        Ok(Self {
            timestamp,
            date: timestamp.date_naive(),
            iso_year: iso_week.year(),
            week: iso_week.week(),
            source_address: source_address.into(),
            source_chain: source_chain.into(),
            direction,
            symbol: symbol.into(),
            amount_usd,
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Calendar date (UTC) of the transfer.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// ISO 8601 week number of the transfer.
    pub fn week(&self) -> u32 {
        self.week
    }

    /// ISO 8601 week-numbering year, which differs from the calendar year around
    /// New Year.
    pub fn iso_year(&self) -> i32 {
        self.iso_year
    }

    pub fn source_address(&self) -> &str {
        &self.source_address
    }

    pub fn source_chain(&self) -> &str {
        &self.source_chain
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn amount_usd(&self) -> Decimal {
        self.amount_usd
    }
}

/// The closed `[start, end]` interval of the incentive program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgramWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ProgramWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidInput(
                "program window".to_string(),
                format!("start {} is after end {}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    /// Builds a window from two calendar dates, each taken at midnight UTC.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        Self::new(midnight_utc(start), midnight_utc(end))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Classifies an instant. Both boundaries belong to `During`.
    pub fn phase_of(&self, timestamp: DateTime<Utc>) -> Phase {
        if timestamp < self.start {
            Phase::Before
        } else if timestamp > self.end {
            Phase::After
        } else {
            Phase::During
        }
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_event_derives_date_and_iso_week() {
        let event = BridgeEvent::new(
            ts(2024, 6, 24, 15),
            "0xabc",
            "ethereum",
            Direction::Inbound,
            "USDC",
            dec!(10.5),
        )
        .unwrap();

        assert_eq!(event.date(), NaiveDate::from_ymd_opt(2024, 6, 24).unwrap());
        assert_eq!(event.week(), 26);
    }

    #[test]
    fn test_iso_week_wraps_at_year_boundary() {
        // 2024-12-30 is a Monday belonging to ISO week 1 of 2025.
        let event = BridgeEvent::new(
            ts(2024, 12, 30, 0),
            "0xabc",
            "ethereum",
            Direction::Outbound,
            "ETH",
            dec!(1),
        )
        .unwrap();
        assert_eq!(event.week(), 1);
        assert_eq!(event.iso_year(), 2025);
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let result = BridgeEvent::new(
            ts(2024, 6, 24, 0),
            "0xabc",
            "ethereum",
            Direction::Inbound,
            "USDC",
            dec!(-1),
        );
        assert!(matches!(result, Err(CoreError::InvalidInput(field, _)) if field == "amount_usd"));
    }

    #[test]
    fn test_amount_above_cap_is_rejected() {
        assert_eq!(MAX_AMOUNT_USD, dec!(1000000000000000));

        let at_cap = BridgeEvent::new(
            ts(2024, 6, 24, 0),
            "0xabc",
            "ethereum",
            Direction::Inbound,
            "USDC",
            MAX_AMOUNT_USD,
        );
        assert!(at_cap.is_ok());

        let huge = BridgeEvent::new(
            ts(2024, 6, 24, 0),
            "0xabc",
            "ethereum",
            Direction::Inbound,
            "USDC",
            dec!(50000000000000000000000000000),
        );
        assert!(matches!(huge, Err(CoreError::InvalidInput(field, _)) if field == "amount_usd"));
    }

    #[test]
    fn test_window_boundaries_belong_to_during() {
        let window = ProgramWindow::new(ts(2024, 6, 24, 0), ts(2024, 7, 14, 0)).unwrap();
        assert_eq!(window.phase_of(ts(2024, 6, 23, 23)), Phase::Before);
        assert_eq!(window.phase_of(ts(2024, 6, 24, 0)), Phase::During);
        assert_eq!(window.phase_of(ts(2024, 7, 14, 0)), Phase::During);
        assert_eq!(window.phase_of(ts(2024, 7, 14, 1)), Phase::After);
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        assert!(ProgramWindow::new(ts(2024, 7, 14, 0), ts(2024, 6, 24, 0)).is_err());
    }
}
