//! Plain-text rendering of report sections for the terminal.

use analytics::{
    FullReport, OverviewReport, ProgramImpactReport, ReportWarning, SectionReport,
    UserBehaviorReport,
};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use core_types::ReportSection;
use rust_decimal::Decimal;

pub fn render_full(report: &FullReport) -> String {
    let mut out = format!(
        "Program window: {} to {} ({} events)\n\n",
        report.program.start.date_naive(),
        report.program.end.date_naive(),
        report.events
    );
    out.push_str(&render_overview(&report.overview));
    out.push('\n');
    out.push_str(&render_user_behavior(&report.user_behavior));
    out.push('\n');
    out.push_str(&render_program_impact(&report.program_impact));
    out
}

pub fn render_section(report: &SectionReport) -> String {
    match report {
        SectionReport::Overview(r) => render_overview(r),
        SectionReport::UserBehavior(r) => render_user_behavior(r),
        SectionReport::ProgramImpact(r) => render_program_impact(r),
    }
}

fn render_overview(report: &OverviewReport) -> String {
    let mut out = heading(ReportSection::Overview);
    out.push_str(&format!(
        "Total bridged volume during program: {}\n\n",
        usd(report.total_volume)
    ));

    let mut daily = table(&["Date", "Volume (USD)"]);
    for row in &report.volume_by_date {
        daily.add_row(vec![Cell::new(row.date), amount_cell(row.amount_usd)]);
    }
    push_table(&mut out, "Bridging volume over time", &daily);

    let mut flow = table(&["Direction", "Volume (USD)"]);
    for row in &report.flow_by_direction {
        flow.add_row(vec![Cell::new(row.direction), amount_cell(row.amount_usd)]);
    }
    push_table(&mut out, "Capital flow inbound vs outbound", &flow);

    let mut chains = table(&["Source chain", "Volume (USD)"]);
    for row in &report.top_chains {
        chains.add_row(vec![Cell::new(&row.key), amount_cell(row.amount_usd)]);
    }
    push_table(&mut out, "Top source chains", &chains);

    let mut tokens = table(&["Token", "Volume (USD)"]);
    for row in &report.top_tokens {
        tokens.add_row(vec![Cell::new(&row.key), amount_cell(row.amount_usd)]);
    }
    push_table(&mut out, "Top bridged tokens", &tokens);

    push_warnings(&mut out, &report.warnings);
    out
}

fn render_user_behavior(report: &UserBehaviorReport) -> String {
    let mut out = heading(ReportSection::UserBehavior);
    match report.retention_rate {
        Some(rate) => {
            out.push_str(&format!(
                "User retention rate post program: {}\n\n",
                percent(rate * Decimal::ONE_HUNDRED)
            ));
        }
        None => out.push_str("User retention rate post program: n/a\n\n"),
    }

    out.push_str(&format!(
        "Addresses with a positive holding period: {}\n",
        report.holding_periods.len()
    ));
    let mut histogram = table(&["From (min)", "To (min)", "Addresses"]);
    for bin in &report.holding_period_histogram {
        histogram.add_row(vec![
            amount_cell(bin.lower),
            amount_cell(bin.upper),
            Cell::new(bin.count).set_alignment(CellAlignment::Right),
        ]);
    }
    push_table(&mut out, "Holding period length distribution (minutes)", &histogram);

    let mut cohort = table(&["ISO week", "Volume (USD)", "Addresses", "Change"]);
    for week in &report.cohort_by_week {
        let change = match week.pct_change {
            Some(pct) if pct > Decimal::ZERO => format!("{} ⬆", percent(pct)),
            Some(pct) if pct < Decimal::ZERO => format!("{} ⬇", percent(pct)),
            Some(pct) => percent(pct),
            None => "-".to_string(),
        };
        cohort.add_row(vec![
            Cell::new(week.week),
            amount_cell(week.amount_usd),
            Cell::new(week.active_addresses).set_alignment(CellAlignment::Right),
            Cell::new(change).set_alignment(CellAlignment::Right),
        ]);
    }
    push_table(&mut out, "Weekly bridging volume during program", &cohort);

    push_warnings(&mut out, &report.warnings);
    out
}

fn render_program_impact(report: &ProgramImpactReport) -> String {
    let mut out = heading(ReportSection::ProgramImpact);

    let mut phases = table(&["Phase", "Period", "Volume (USD)", "Weeks", "Volume per week (USD)"]);
    for rate in &report.phases {
        phases.add_row(vec![
            Cell::new(rate.phase),
            Cell::new(format!("{} to {}", rate.start, rate.end)),
            amount_cell(rate.total_volume),
            amount_cell(rate.weeks),
            amount_cell(rate.volume_per_week),
        ]);
    }
    push_table(&mut out, "Weekly bridging volume comparison", &phases);

    push_warnings(&mut out, &report.warnings);
    out
}

fn heading(section: ReportSection) -> String {
    let title = section.title();
    format!("{}\n{}\n", title, "=".repeat(title.len()))
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn push_table(out: &mut String, caption: &str, table: &Table) {
    out.push_str(&format!("{}\n{}\n\n", caption, table));
}

fn push_warnings(out: &mut String, warnings: &[ReportWarning]) {
    for warning in warnings {
        out.push_str(&format!(
            "warning: {} omitted: {}\n",
            warning.metric, warning.message
        ));
    }
}

fn amount_cell(value: Decimal) -> Cell {
    Cell::new(value.round_dp(2)).set_alignment(CellAlignment::Right)
}

fn usd(value: Decimal) -> String {
    format!("${}", value.round_dp(2))
}

fn percent(value: Decimal) -> String {
    format!("{}%", value.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::{CohortWeek, DailyVolume, DirectionalFlow, GroupTotal};
    use chrono::NaiveDate;
    use core_types::Direction;
    use rust_decimal_macros::dec;

    fn overview() -> OverviewReport {
        OverviewReport {
            total_volume: dec!(1234.567),
            volume_by_date: vec![DailyVolume {
                date: NaiveDate::from_ymd_opt(2024, 6, 25).unwrap(),
                amount_usd: dec!(1234.567),
            }],
            flow_by_direction: vec![
                DirectionalFlow { direction: Direction::Inbound, amount_usd: dec!(1000) },
                DirectionalFlow { direction: Direction::Outbound, amount_usd: dec!(234.567) },
            ],
            top_chains: vec![GroupTotal { key: "ethereum".to_string(), amount_usd: dec!(1234.567) }],
            top_tokens: vec![GroupTotal { key: "USDC".to_string(), amount_usd: dec!(1234.567) }],
            warnings: vec![],
        }
    }

    #[test]
    fn test_overview_shows_rounded_headline_and_tables() {
        let text = render_section(&SectionReport::Overview(overview()));

        assert!(text.starts_with("Overview\n========\n"));
        assert!(text.contains("Total bridged volume during program: $1234.57"));
        assert!(text.contains("2024-06-25"));
        assert!(text.contains("ethereum"));
        assert!(text.contains("outbound"));
    }

    #[test]
    fn test_cohort_change_marks_direction_and_first_week() {
        let report = UserBehaviorReport {
            retention_rate: Some(dec!(0.25)),
            holding_periods: vec![],
            holding_period_histogram: vec![],
            cohort_by_week: vec![
                CohortWeek { iso_year: 2024, week: 26, amount_usd: dec!(100), active_addresses: 2, pct_change: None },
                CohortWeek { iso_year: 2024, week: 27, amount_usd: dec!(150), active_addresses: 1, pct_change: Some(dec!(50)) },
            ],
            warnings: vec![ReportWarning {
                section: ReportSection::UserBehavior,
                metric: "retention rate".to_string(),
                message: "example".to_string(),
            }],
        };

        let text = render_section(&SectionReport::UserBehavior(report));

        assert!(text.contains("User retention rate post program: 25.00%"));
        assert!(text.contains("50% ⬆"));
        assert!(text.contains("User retention rate post program: 25.00%\n\nAddresses with a positive holding period: 0\n"));
        assert!(text.ends_with("warning: retention rate omitted: example\n"));
    }
}
