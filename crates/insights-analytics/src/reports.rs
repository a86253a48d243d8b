//! Markdown rendition of the insights dashboard.

use crate::aggregations::Insights;
use crate::charts::DurationChart;

const NO_DATA: &str = "_No data available_\n\n";

/// Report generator for creating markdown summaries.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Generate the full dashboard report for the current view.
    pub fn dashboard_report(insights: &Insights<'_>) -> String {
        let mut report = String::new();

        report.push_str("# Conversation Insights\n\n");
        report.push_str(&format!(
            "Showing {} of {} conversations\n\n",
            insights.filtered().len(),
            insights.conversations().len()
        ));

        let active = insights.filters().describe();
        if !active.is_empty() {
            report.push_str("## Filters\n\n");
            for part in &active {
                report.push_str(&format!("- {}\n", part));
            }
            report.push('\n');
        }

        Self::push_kpis(&mut report, insights);
        Self::push_status_breakdown(&mut report, insights);
        Self::push_duration_chart(&mut report, &insights.duration_chart());
        Self::push_agent_breakdown(&mut report, insights);
        Self::push_call_type_breakdown(&mut report, insights);

        report
    }

    /// KPI section only, formatted like the dashboard cards.
    pub fn kpi_summary(insights: &Insights<'_>) -> String {
        let mut out = String::new();
        Self::push_kpis(&mut out, insights);
        out
    }

    fn push_kpis(report: &mut String, insights: &Insights<'_>) {
        report.push_str("## Key Metrics\n\n");
        report.push_str(&format!(
            "- **Total Calls:** {} ({} total)\n",
            insights.total_calls(),
            insights.conversations().len()
        ));
        report.push_str(&format!(
            "- **Success Rate:** {:.1}%\n",
            insights.success_rate()
        ));
        report.push_str(&format!(
            "- **Avg Call Duration:** {}s\n",
            insights.average_call_duration().round()
        ));
        report.push_str(&format!("- **Total Cost:** ${:.2}\n", insights.total_cost()));
        report.push_str(&format!(
            "- **Avg LLM Latency:** {}ms\n",
            insights.average_llm_latency().round()
        ));
        report.push_str(&format!(
            "- **Avg TTS Latency:** {}ms\n",
            insights.average_tts_latency().round()
        ));
        report.push_str(&format!(
            "- **Total Interruptions:** {}\n\n",
            insights.total_interruptions()
        ));
    }

    fn push_status_breakdown(report: &mut String, insights: &Insights<'_>) {
        report.push_str("## Call Status Breakdown\n\n");
        let rows: Vec<_> = insights
            .status_breakdown()
            .into_iter()
            .filter(|row| row.count > 0)
            .collect();
        if rows.is_empty() {
            report.push_str(NO_DATA);
            return;
        }
        report.push_str("| Status | Calls |\n");
        report.push_str("|--------|-------|\n");
        for row in rows {
            report.push_str(&format!("| {} | {} |\n", row.status, row.count));
        }
        report.push('\n');
    }

    fn push_agent_breakdown(report: &mut String, insights: &Insights<'_>) {
        report.push_str("## Calls by Agent\n\n");
        let rows = insights.agent_breakdown();
        if rows.is_empty() {
            report.push_str(NO_DATA);
            return;
        }
        report.push_str("| Agent | Calls |\n");
        report.push_str("|-------|-------|\n");
        for row in rows {
            report.push_str(&format!("| {} | {} |\n", row.agent, row.count));
        }
        report.push('\n');
    }

    fn push_call_type_breakdown(report: &mut String, insights: &Insights<'_>) {
        report.push_str("## Inbound vs Outbound\n\n");
        let rows: Vec<_> = insights
            .call_type_breakdown()
            .into_iter()
            .filter(|row| row.count > 0)
            .collect();
        if rows.is_empty() {
            report.push_str(NO_DATA);
            return;
        }
        report.push_str("| Type | Calls |\n");
        report.push_str("|------|-------|\n");
        for row in rows {
            report.push_str(&format!("| {} | {} |\n", row.call_type, row.count));
        }
        report.push('\n');
    }

    fn push_duration_chart(report: &mut String, chart: &DurationChart) {
        report.push_str(&format!("## {}\n\n", chart.title()));
        if chart.is_empty() {
            report.push_str(NO_DATA);
            return;
        }
        match chart {
            DurationChart::ByAgentAndType { rows } => {
                report.push_str("| Agent | Inbound | Outbound |\n");
                report.push_str("|-------|---------|----------|\n");
                for row in rows {
                    report.push_str(&format!(
                        "| {} | {} | {} |\n",
                        row.agent,
                        chart_seconds(row.inbound),
                        chart_seconds(row.outbound)
                    ));
                }
            }
            DurationChart::ByCallType { rows, .. } => {
                report.push_str("| Type | Avg Duration |\n");
                report.push_str("|------|--------------|\n");
                for row in rows {
                    report.push_str(&format!(
                        "| {} | {} |\n",
                        row.call_type,
                        chart_seconds(row.avg_duration)
                    ));
                }
            }
            DurationChart::ByAgent { rows, .. } => {
                report.push_str("| Agent | Avg Duration |\n");
                report.push_str("|-------|--------------|\n");
                for row in rows {
                    report.push_str(&format!(
                        "| {} | {} |\n",
                        row.agent,
                        chart_seconds(row.avg_duration)
                    ));
                }
            }
            DurationChart::Single { point, .. } => {
                report.push_str(&format!(
                    "- **{}:** {}\n",
                    point.label,
                    chart_seconds(point.avg_duration)
                ));
            }
        }
        report.push('\n');
    }
}

/// Chart values keep two decimals, as on the dashboard tooltip.
fn chart_seconds(seconds: f64) -> String {
    format!("{:.2}s", seconds)
}
