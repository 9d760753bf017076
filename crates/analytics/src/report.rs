use crate::engine::{AnalyticsEngine, GroupField};
use crate::error::AnalyticsError;
use crate::partition::{Partitions, partition};
use crate::tables::{
    CohortWeek, DailyVolume, DirectionalFlow, GroupTotal, HistogramBin, HoldingPeriod, PhaseRate,
};
use core_types::{BridgeEvent, Phase, ProgramWindow, ReportSection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Externally supplied cutoffs for the report tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    pub top_chains: usize,
    pub top_tokens: usize,
    pub holding_period_bins: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_chains: 3,
            top_tokens: 5,
            holding_period_bins: 30,
        }
    }
}

/// A metric that was skipped because the data could not support it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWarning {
    pub section: ReportSection,
    pub metric: String,
    pub message: String,
}

/// Capital flow during the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewReport {
    pub total_volume: Decimal,
    pub volume_by_date: Vec<DailyVolume>,
    pub flow_by_direction: Vec<DirectionalFlow>,
    pub top_chains: Vec<GroupTotal>,
    pub top_tokens: Vec<GroupTotal>,
    pub warnings: Vec<ReportWarning>,
}

/// How addresses behaved during and after the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBehaviorReport {
    /// `None` when the ledger is empty.
    pub retention_rate: Option<Decimal>,
    pub holding_periods: Vec<HoldingPeriod>,
    pub holding_period_histogram: Vec<HistogramBin>,
    pub cohort_by_week: Vec<CohortWeek>,
    pub warnings: Vec<ReportWarning>,
}

/// Weekly volume before, during and after the program. Phases whose rate could
/// not be computed are missing from `phases` and listed in `warnings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramImpactReport {
    pub phases: Vec<PhaseRate>,
    pub warnings: Vec<ReportWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "kebab-case")]
pub enum SectionReport {
    Overview(OverviewReport),
    UserBehavior(UserBehaviorReport),
    ProgramImpact(ProgramImpactReport),
}

impl SectionReport {
    pub fn warnings(&self) -> &[ReportWarning] {
        match self {
            SectionReport::Overview(r) => &r.warnings,
            SectionReport::UserBehavior(r) => &r.warnings,
            SectionReport::ProgramImpact(r) => &r.warnings,
        }
    }
}

/// All three sections of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullReport {
    pub program: ProgramWindowSummary,
    pub events: usize,
    pub overview: OverviewReport,
    pub user_behavior: UserBehaviorReport,
    pub program_impact: ProgramImpactReport,
}

impl FullReport {
    pub fn warnings(&self) -> impl Iterator<Item = &ReportWarning> {
        self.overview
            .warnings
            .iter()
            .chain(&self.user_behavior.warnings)
            .chain(&self.program_impact.warnings)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramWindowSummary {
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
}

/// Builds report sections from one immutable snapshot of the ledger.
pub struct ReportBuilder<'a> {
    events: &'a [BridgeEvent],
    window: ProgramWindow,
    settings: ReportSettings,
    partitions: Partitions<'a>,
    engine: AnalyticsEngine,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(events: &'a [BridgeEvent], window: ProgramWindow, settings: ReportSettings) -> Self {
        let partitions = partition(events, &window);
        debug_assert_eq!(partitions.len(), events.len());
        Self {
            events,
            window,
            settings,
            partitions,
            engine: AnalyticsEngine::new(),
        }
    }

    /// Builds one section.
    pub fn build(&self, section: ReportSection) -> SectionReport {
        match section {
            ReportSection::Overview => SectionReport::Overview(self.overview()),
            ReportSection::UserBehavior => SectionReport::UserBehavior(self.user_behavior()),
            ReportSection::ProgramImpact => SectionReport::ProgramImpact(self.program_impact()),
        }
    }

    /// Builds every section.
    pub fn build_all(&self) -> FullReport {
        FullReport {
            program: ProgramWindowSummary {
                start: self.window.start(),
                end: self.window.end(),
            },
            events: self.events.len(),
            overview: self.overview(),
            user_behavior: self.user_behavior(),
            program_impact: self.program_impact(),
        }
    }

    pub fn overview(&self) -> OverviewReport {
        let during = &self.partitions.during;
        let mut warnings = Vec::new();
        if during.is_empty() {
            warnings.push(warning(
                ReportSection::Overview,
                "program volume",
                &AnalyticsError::EmptyPartition(Phase::During.label().to_string()),
            ));
        }

        OverviewReport {
            total_volume: self.engine.total_volume(during),
            volume_by_date: self.engine.volume_over_time(during),
            flow_by_direction: self.engine.flow_by_direction(during),
            top_chains: self.engine.top_entities(
                during,
                GroupField::SourceChain,
                self.settings.top_chains,
            ),
            top_tokens: self
                .engine
                .top_entities(during, GroupField::Symbol, self.settings.top_tokens),
            warnings,
        }
    }

    pub fn user_behavior(&self) -> UserBehaviorReport {
        let section = ReportSection::UserBehavior;
        let mut warnings = Vec::new();

        let all: Vec<&BridgeEvent> = self.events.iter().collect();
        let retention_rate = recover(
            self.engine.retention_rate(&all, self.window.end()),
            section,
            "retention rate",
            &mut warnings,
        );

        let inbound = self.engine.inbound_only(&self.partitions.during);
        let holding_periods = self.engine.holding_periods(&inbound);
        let holding_period_histogram = recover(
            self.engine
                .holding_period_histogram(&holding_periods, self.settings.holding_period_bins),
            section,
            "holding period distribution",
            &mut warnings,
        )
        .unwrap_or_default();

        UserBehaviorReport {
            retention_rate,
            holding_periods,
            holding_period_histogram,
            cohort_by_week: self.engine.cohort_by_week(&self.partitions.during),
            warnings,
        }
    }

    pub fn program_impact(&self) -> ProgramImpactReport {
        let mut warnings = Vec::new();
        let phases = Phase::ALL
            .iter()
            .filter_map(|&phase| {
                recover(
                    self.engine
                        .phase_rate(phase, self.partitions.get(phase), &self.window),
                    ReportSection::ProgramImpact,
                    &format!("{} volume per week", phase.label()),
                    &mut warnings,
                )
            })
            .collect();

        ProgramImpactReport { phases, warnings }
    }
}

/// Turns a failed metric into a warning so the rest of the section still renders.
fn recover<T>(
    result: Result<T, AnalyticsError>,
    section: ReportSection,
    metric: &str,
    warnings: &mut Vec<ReportWarning>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            if !e.is_recoverable() {
                tracing::error!(error = %e, metric, "Metric failed with a non-data error.");
            }
            warnings.push(warning(section, metric, &e));
            None
        }
    }
}

fn warning(section: ReportSection, metric: &str, error: &AnalyticsError) -> ReportWarning {
    tracing::warn!(%section, metric, error = %error, "Metric omitted from report.");
    ReportWarning {
        section,
        metric: metric.to_string(),
        message: error.to_string(),
    }
}
