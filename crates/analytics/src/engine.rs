use crate::error::AnalyticsError;
use crate::partition::Partitions;
use crate::tables::{
    CohortEntry, CohortWeek, DailyVolume, DirectionalFlow, GroupTotal, HistogramBin,
    HoldingPeriod, PhaseRate, RetentionFlag,
};
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{BridgeEvent, Direction, Phase, ProgramWindow};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const MICROS_PER_MINUTE: i64 = 60_000_000;
const DAYS_PER_WEEK: i64 = 7;

/// The column a top-N table groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    SourceChain,
    Symbol,
    SourceAddress,
}

impl GroupField {
    fn key<'e>(&self, event: &'e BridgeEvent) -> &'e str {
        match self {
            GroupField::SourceChain => event.source_chain(),
            GroupField::Symbol => event.symbol(),
            GroupField::SourceAddress => event.source_address(),
        }
    }
}

/// A stateless calculator for deriving program metrics from bridge activity.
///
/// Every method is a pure function of the events it is handed. Methods take a
/// partition as `&[&BridgeEvent]` (see [`crate::partition`]).
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of `amount_usd` over a partition.
    pub fn total_volume(&self, events: &[&BridgeEvent]) -> Decimal {
        events.iter().map(|e| e.amount_usd()).sum()
    }

    /// Daily volume in ascending date order. An empty partition gives an empty table.
    pub fn volume_over_time(&self, events: &[&BridgeEvent]) -> Vec<DailyVolume> {
        let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for event in events {
            *by_date.entry(event.date()).or_default() += event.amount_usd();
        }

        by_date
            .into_iter()
            .map(|(date, amount_usd)| DailyVolume { date, amount_usd })
            .collect()
    }

    /// Volume per direction. Both directions are always reported; a direction
    /// with no events carries zero.
    pub fn flow_by_direction(&self, events: &[&BridgeEvent]) -> Vec<DirectionalFlow> {
        Direction::ALL
            .iter()
            .map(|&direction| DirectionalFlow {
                direction,
                amount_usd: events
                    .iter()
                    .filter(|e| e.direction() == direction)
                    .map(|e| e.amount_usd())
                    .sum(),
            })
            .collect()
    }

    /// The `n` largest groups by summed volume, descending.
    ///
    /// # Arguments
    ///
    /// * `events` - The partition to rank.
    /// * `field` - The column to group by.
    /// * `n` - Maximum number of rows. Fewer groups than `n` returns all of them.
    ///
    /// # Returns
    ///
    /// Groups sorted by volume, descending. Equal volumes are ordered by key.
    pub fn top_entities(
        &self,
        events: &[&BridgeEvent],
        field: GroupField,
        n: usize,
    ) -> Vec<GroupTotal> {
        let mut sums: BTreeMap<&str, Decimal> = BTreeMap::new();
        for event in events {
            *sums.entry(field.key(event)).or_default() += event.amount_usd();
        }

        let mut groups: Vec<GroupTotal> = sums
            .into_iter()
            .map(|(key, amount_usd)| GroupTotal {
                key: key.to_string(),
                amount_usd,
            })
            .collect();

        // `sort_by` is stable, so ties stay in key order.
        groups.sort_by(|a, b| b.amount_usd.cmp(&a.amount_usd));
        groups.truncate(n);
        groups
    }

    /// Inbound events of a partition, order preserved.
    pub fn inbound_only<'a>(&self, events: &[&'a BridgeEvent]) -> Vec<&'a BridgeEvent> {
        events
            .iter()
            .copied()
            .filter(|e| e.direction() == Direction::Inbound)
            .collect()
    }

    /// First-to-last inbound span per address, in minutes.
    ///
    /// Expects the inbound events of the program window. Addresses whose span is
    /// not strictly positive (including every single-transfer address) are left
    /// out. Rows are ordered by address.
    pub fn holding_periods(&self, inbound_events: &[&BridgeEvent]) -> Vec<HoldingPeriod> {
        let mut spans: BTreeMap<&str, (DateTime<Utc>, DateTime<Utc>)> = BTreeMap::new();
        for event in inbound_events {
            let ts = event.timestamp();
            spans
                .entry(event.source_address())
                .and_modify(|(first, last)| {
                    *first = (*first).min(ts);
                    *last = (*last).max(ts);
                })
                .or_insert((ts, ts));
        }

        let periods: Vec<HoldingPeriod> = spans
            .into_iter()
            .filter_map(|(address, (first, last))| {
                let duration_minutes = minutes_between(first, last);
                (duration_minutes > Decimal::ZERO).then(|| HoldingPeriod {
                    source_address: address.to_string(),
                    first_inbound: first,
                    last_inbound: last,
                    duration_minutes,
                })
            })
            .collect();

        tracing::debug!(addresses = periods.len(), "Computed holding periods.");
        periods
    }

    /// Equal-width histogram of holding-period durations between the shortest and
    /// the longest period.
    pub fn holding_period_histogram(
        &self,
        periods: &[HoldingPeriod],
        bins: usize,
    ) -> Result<Vec<HistogramBin>, AnalyticsError> {
        if bins == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "histogram bin count must be at least 1".to_string(),
            ));
        }

        let bounds = periods
            .iter()
            .map(|p| p.duration_minutes)
            .fold(None::<(Decimal, Decimal)>, |acc, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            });
        let Some((min, max)) = bounds else {
            return Ok(Vec::new());
        };

        if min == max {
            return Ok(vec![HistogramBin {
                lower: min,
                upper: max,
                count: periods.len(),
            }]);
        }

        let width = (max - min) / Decimal::from(bins);
        let mut histogram: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: min + width * Decimal::from(i),
                upper: if i + 1 == bins {
                    max
                } else {
                    min + width * Decimal::from(i + 1)
                },
                count: 0,
            })
            .collect();

        for period in periods {
            let slot = ((period.duration_minutes - min) / width)
                .floor()
                .to_usize()
                .unwrap_or(bins - 1)
                .min(bins - 1);
            histogram[slot].count += 1;
        }

        Ok(histogram)
    }

    /// Per-address flag: did the address transact strictly after `program_end`?
    /// Rows are ordered by address.
    pub fn retention_flags(
        &self,
        events: &[&BridgeEvent],
        program_end: DateTime<Utc>,
    ) -> Vec<RetentionFlag> {
        let mut flags: BTreeMap<&str, bool> = BTreeMap::new();
        for event in events {
            let retained = flags.entry(event.source_address()).or_insert(false);
            *retained |= event.timestamp() > program_end;
        }

        flags
            .into_iter()
            .map(|(address, retained)| RetentionFlag {
                source_address: address.to_string(),
                retained,
            })
            .collect()
    }

    /// Fraction (0..=1) of distinct addresses that transacted after `program_end`.
    pub fn retention_rate(
        &self,
        events: &[&BridgeEvent],
        program_end: DateTime<Utc>,
    ) -> Result<Decimal, AnalyticsError> {
        let flags = self.retention_flags(events, program_end);
        if flags.is_empty() {
            return Err(AnalyticsError::EmptyPartition("retention".to_string()));
        }

        let retained = flags.iter().filter(|f| f.retained).count();
        Ok(Decimal::from(retained) / Decimal::from(flags.len()))
    }

    /// Per-(week, address) volume, ordered chronologically by ISO year and week,
    /// then by address.
    pub fn cohort_detail(&self, events: &[&BridgeEvent]) -> Vec<CohortEntry> {
        let mut subtotals: BTreeMap<(i32, u32, &str), Decimal> = BTreeMap::new();
        for event in events {
            *subtotals
                .entry((event.iso_year(), event.week(), event.source_address()))
                .or_default() += event.amount_usd();
        }

        subtotals
            .into_iter()
            .map(|((iso_year, week, address), amount_usd)| CohortEntry {
                iso_year,
                week,
                source_address: address.to_string(),
                amount_usd,
            })
            .collect()
    }

    /// Weekly volume of the program window with week-over-week change.
    ///
    /// Built in two stages: per-address subtotals from [`Self::cohort_detail`],
    /// then a rollup to one row per week.
    pub fn cohort_by_week(&self, during_events: &[&BridgeEvent]) -> Vec<CohortWeek> {
        let detail = self.cohort_detail(during_events);

        let mut weekly: BTreeMap<(i32, u32), (Decimal, usize)> = BTreeMap::new();
        for entry in &detail {
            let (amount, addresses) = weekly.entry((entry.iso_year, entry.week)).or_default();
            *amount += entry.amount_usd;
            *addresses += 1;
        }

        let mut previous: Option<Decimal> = None;
        weekly
            .into_iter()
            .map(|((iso_year, week), (amount_usd, active_addresses))| {
                let pct_change = previous.and_then(|prev| pct_change(prev, amount_usd));
                previous = Some(amount_usd);
                CohortWeek {
                    iso_year,
                    week,
                    amount_usd,
                    active_addresses,
                    pct_change,
                }
            })
            .collect()
    }

    /// Average weekly volume of one phase.
    ///
    /// The span of `Before` runs from its earliest event to the program start and
    /// the span of `After` from the program end to its latest event. `During`
    /// always uses the full program length. Spans count whole days.
    pub fn phase_rate(
        &self,
        phase: Phase,
        events: &[&BridgeEvent],
        window: &ProgramWindow,
    ) -> Result<PhaseRate, AnalyticsError> {
        let earliest = events.iter().map(|e| e.timestamp()).min();
        let latest = events.iter().map(|e| e.timestamp()).max();
        let (Some(earliest), Some(latest)) = (earliest, latest) else {
            return Err(AnalyticsError::EmptyPhase(phase));
        };

        let (start, end) = match phase {
            Phase::Before => (earliest, window.start()),
            Phase::During => (window.start(), window.end()),
            Phase::After => (window.end(), latest),
        };

        let weeks = Decimal::from((end - start).num_days()) / Decimal::from(DAYS_PER_WEEK);
        if weeks.is_zero() {
            return Err(AnalyticsError::DivisionByZero(format!(
                "{} volume per week",
                phase.label()
            )));
        }

        let total_volume = self.total_volume(events);
        Ok(PhaseRate {
            phase,
            start: start.date_naive(),
            end: end.date_naive(),
            total_volume,
            weeks,
            volume_per_week: total_volume / weeks,
        })
    }

    /// Weekly rates of all three phases, in chronological order. Fails on the
    /// first phase whose rate cannot be computed.
    pub fn phase_comparison(
        &self,
        partitions: &Partitions<'_>,
        window: &ProgramWindow,
    ) -> Result<Vec<PhaseRate>, AnalyticsError> {
        Phase::ALL
            .iter()
            .map(|&phase| self.phase_rate(phase, partitions.get(phase), window))
            .collect()
    }
}

fn minutes_between(first: DateTime<Utc>, last: DateTime<Utc>) -> Decimal {
    let elapsed = last - first;
    match elapsed.num_microseconds() {
        Some(micros) => Decimal::from(micros) / Decimal::from(MICROS_PER_MINUTE),
        None => Decimal::from(elapsed.num_minutes()),
    }
}

/// Percent change from `previous` to `current`. Undefined when `previous` is zero
/// or the ratio does not fit a `Decimal` (dust followed by a large week).
fn pct_change(previous: Decimal, current: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    current
        .checked_sub(previous)?
        .checked_div(previous)?
        .checked_mul(Decimal::ONE_HUNDRED)
}
