//! Terminal rendering of analysis results.

use clap::ValueEnum;
use dcf_core::math::statistics::DistributionSummary;
use dcf_engine::{BatchAnalysis, ScenarioAnalysis};

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn money(value: f64) -> String {
    let negative = value <= -0.5;
    let whole = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn render(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Single-scenario report: acquisition, yearly projection, metrics.
pub fn analysis_table(analysis: &ScenarioAnalysis) -> String {
    let initial = &analysis.initial;
    let metrics = &analysis.metrics;

    let mut lines = vec![
        format!(
            "Scenario {} ({} market, risk score {:.2})",
            analysis.scenario.scenario_id, analysis.scenario.regime, analysis.scenario.risk_score
        ),
        String::new(),
        format!("  Acquisition cost     {:>14}", money(initial.acquisition_cost)),
        format!("  After-repair value   {:>14}", money(initial.after_repair_value)),
        format!(
            "  Loan amount          {:>14}{}",
            money(initial.loan_amount),
            if initial.dscr_capped { "  (DSCR capped)" } else { "" }
        ),
        format!("  Annual debt service  {:>14}", money(initial.annual_debt_service)),
        format!("  Cash required        {:>14}", money(initial.total_cash_required)),
        String::new(),
        "┌──────┬──────────────┬──────────────┬──────────────┬──────────────┬────────┐".to_string(),
        "│ Year │ EGI          │ NOI          │ Net cash     │ Cumulative   │ DSCR   │".to_string(),
        "├──────┼──────────────┼──────────────┼──────────────┼──────────────┼────────┤".to_string(),
    ];
    lines.extend(analysis.cash_flows.iter().map(|year| {
        let dscr = year
            .dscr
            .map_or_else(|| "-".to_string(), |d| format!("{:.2}", d));
        format!(
            "│ {:>4} │ {:>12} │ {:>12} │ {:>12} │ {:>12} │ {:>6} │",
            year.year,
            money(year.effective_gross_income),
            money(year.noi),
            money(year.net_cash_flow),
            money(year.cumulative_cash_flow),
            dscr
        )
    }));
    lines.extend([
        "└──────┴──────────────┴──────────────┴──────────────┴──────────────┴────────┘".to_string(),
        String::new(),
        format!("  NPV                  {:>14}", money(metrics.npv)),
        format!("  IRR                  {:>14}", metrics.irr.to_string()),
        format!("  Terminal value       {:>14}", money(metrics.terminal_value)),
        format!("  Equity multiple      {:>14.2}", metrics.equity_multiple),
        format!("  Avg cash-on-cash     {:>14}", percent(metrics.average_cash_on_cash)),
        format!(
            "  Payback year         {:>14}",
            metrics
                .payback_year
                .map_or_else(|| "never".to_string(), |y| y.to_string())
        ),
        format!("  Risk level           {:>14}", metrics.risk_level.to_string()),
        format!("  Recommendation       {:>14}", metrics.recommendation.to_string()),
    ]);
    render(lines)
}

fn distribution_row(label: &str, d: &DistributionSummary, fmt: fn(f64) -> String) -> String {
    format!(
        "│ {:<16} │ {:>12} │ {:>12} │ {:>12} │ {:>12} │ {:>12} │",
        label,
        fmt(d.p5),
        fmt(d.p25),
        fmt(d.median),
        fmt(d.p75),
        fmt(d.p95)
    )
}

/// Batch report: run summary, metric distributions, recommendation mix.
pub fn batch_table(batch: &BatchAnalysis) -> String {
    let summary = &batch.summary;
    let mut lines = vec![format!(
        "Scenarios: {} requested, {} succeeded, {} failed, {} skipped ({} ms){}",
        summary.requested,
        summary.succeeded,
        summary.failed,
        summary.skipped,
        summary.elapsed_ms,
        if summary.cancelled { ", cancelled" } else { "" }
    )];

    let Some(aggregate) = &batch.aggregate else {
        lines.push("No scenario produced metrics.".to_string());
        return render(lines);
    };

    lines.extend([
        String::new(),
        "┌──────────────────┬──────────────┬──────────────┬──────────────┬──────────────┬──────────────┐".to_string(),
        "│ Metric           │ P5           │ P25          │ Median       │ P75          │ P95          │".to_string(),
        "├──────────────────┼──────────────┼──────────────┼──────────────┼──────────────┼──────────────┤".to_string(),
        distribution_row("NPV", &aggregate.npv, money),
    ]);
    if let Some(irr) = &aggregate.irr {
        lines.push(distribution_row("IRR", irr, percent));
    }
    lines.extend([
        distribution_row("Equity multiple", &aggregate.equity_multiple, |v| {
            format!("{:.2}x", v)
        }),
        "└──────────────────┴──────────────┴──────────────┴──────────────┴──────────────┴──────────────┘".to_string(),
        String::new(),
        format!("  P(NPV > 0)        {:>8}", percent(aggregate.probability_positive_npv)),
        format!("  P(loss)           {:>8}", percent(aggregate.probability_of_loss)),
        format!("  IRR undefined     {:>8}", aggregate.irr_undefined),
        String::new(),
    ]);
    lines.extend(aggregate.recommendation_counts.iter().map(|(recommendation, count)| {
        format!(
            "  {:<12} {:>6}  {:>8}",
            recommendation.to_string(),
            count,
            percent(*count as f64 / aggregate.scenario_count as f64)
        )
    }));
    lines.push(format!("  Consensus: {}", aggregate.consensus));

    if !batch.failures.is_empty() {
        lines.push(String::new());
        lines.extend(batch.failures.iter().take(5).map(|failure| {
            format!(
                "  scenario {} failed at {}: {}",
                failure.scenario_id, failure.stage, failure.error
            )
        }));
        if batch.failures.len() > 5 {
            lines.push(format!("  ... and {} more", batch.failures.len() - 5));
        }
    }
    render(lines)
}
