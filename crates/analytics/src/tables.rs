//! Row types of the derived metric tables.
//!
//! Every table is an ordered `Vec` of one of these records. They are plain data:
//! built once by the engine, serialized by whoever renders them.

use chrono::{DateTime, NaiveDate, Utc};
use core_types::{Direction, Phase};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of `VolumeByDate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub amount_usd: Decimal,
}

/// One row of `FlowByDirection`. Both directions are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalFlow {
    pub direction: Direction,
    pub amount_usd: Decimal,
}

/// One row of a top-N table (`TopByChain`, `TopByToken`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub key: String,
    pub amount_usd: Decimal,
}

/// First and last inbound transfer of one address inside the program window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingPeriod {
    pub source_address: String,
    pub first_inbound: DateTime<Utc>,
    pub last_inbound: DateTime<Utc>,
    /// Always strictly positive.
    pub duration_minutes: Decimal,
}

/// One bucket of the holding-period distribution. `upper` is exclusive except
/// for the last bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: Decimal,
    pub upper: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionFlag {
    pub source_address: String,
    /// True when the address transacted after the program ended.
    pub retained: bool,
}

/// Per-address subtotal for one week; the first stage of the cohort fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortEntry {
    pub iso_year: i32,
    pub week: u32,
    pub source_address: String,
    pub amount_usd: Decimal,
}

/// One row of `CohortByWeek`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortWeek {
    /// ISO week-numbering year; orders weeks across New Year.
    pub iso_year: i32,
    pub week: u32,
    pub amount_usd: Decimal,
    /// Distinct addresses that bridged during the week.
    pub active_addresses: usize,
    /// Change against the previous week in percent. `None` for the first week
    /// and whenever the previous week's volume was zero.
    pub pct_change: Option<Decimal>,
}

/// One row of `PhaseComparison`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRate {
    pub phase: Phase,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_volume: Decimal,
    pub weeks: Decimal,
    pub volume_per_week: Decimal,
}
