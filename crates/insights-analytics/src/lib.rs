//! KPIs, breakdowns, chart grouping, and reporting for call-insights.
//!
//! Computes derived metrics from a conversation set and its filter criteria,
//! plus a markdown dashboard report.

pub mod aggregations;
pub mod charts;
pub mod reports;

pub use aggregations::{AgentCount, CallTypeCount, Insights, InsightsSnapshot, StatusCount};
pub use charts::DurationChart;
pub use reports::ReportGenerator;
