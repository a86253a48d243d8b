//! KPIs and categorical breakdowns over a conversation set.
//!
//! Placeholder bounds (min/max duration and cost) and the agent list come from
//! the full record set so they stay stable while filters change. Everything
//! else describes the filtered view. Every metric has a defined value for an
//! empty set; none of them ever yields NaN.

use crate::charts::DurationChart;
use insights_core::filters::{self, FilterCriteria};
use insights_core::store::ConversationStore;
use insights_core::types::{CallStatus, CallType, Conversation};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: CallStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCount {
    pub agent: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTypeCount {
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub count: usize,
}

/// Derived metrics for one `(conversations, filters)` pair.
///
/// The filtered subset is computed once at construction; build a new
/// `Insights` after any mutation of records or filters.
pub struct Insights<'a> {
    all: &'a [Conversation],
    filters: &'a FilterCriteria,
    filtered: Vec<&'a Conversation>,
}

impl<'a> Insights<'a> {
    pub fn new(all: &'a [Conversation], filters: &'a FilterCriteria) -> Self {
        Self {
            all,
            filters,
            filtered: filters::apply(all, filters),
        }
    }

    pub fn from_store(store: &'a ConversationStore) -> Self {
        Self::new(store.conversations(), store.filters())
    }

    pub fn conversations(&self) -> &'a [Conversation] {
        self.all
    }

    pub fn filtered(&self) -> &[&'a Conversation] {
        &self.filtered
    }

    pub fn filters(&self) -> &'a FilterCriteria {
        self.filters
    }

    // ── KPIs over the filtered view ─────────────────────────────────────

    pub fn total_calls(&self) -> usize {
        self.filtered.len()
    }

    /// Percentage (0..=100) of filtered calls with status `success`.
    pub fn success_rate(&self) -> f64 {
        let total = self.filtered.len();
        if total == 0 {
            return 0.0;
        }
        let successful = self
            .filtered
            .iter()
            .filter(|c| c.status == CallStatus::Success)
            .count();
        successful as f64 / total as f64 * 100.0
    }

    pub fn average_call_duration(&self) -> f64 {
        mean(self.filtered.iter().map(|c| c.duration))
    }

    pub fn total_cost(&self) -> f64 {
        self.filtered.iter().map(|c| c.cost).sum()
    }

    /// Mean LLM latency over conversations that carry stats.
    pub fn average_llm_latency(&self) -> f64 {
        mean(self.filtered.iter().filter_map(|c| c.stats()).map(|s| s.llm_latency))
    }

    /// Mean TTS latency over conversations that carry stats.
    pub fn average_tts_latency(&self) -> f64 {
        mean(self.filtered.iter().filter_map(|c| c.stats()).map(|s| s.tts_latency))
    }

    /// Missing stats count as zero interruptions.
    pub fn total_interruptions(&self) -> u64 {
        self.filtered
            .iter()
            .map(|c| c.stats().map_or(0, |s| s.interruptions as u64))
            .sum()
    }

    // ── Placeholder bounds over the full set ────────────────────────────

    pub fn min_duration(&self) -> f64 {
        min_of(self.all.iter().map(|c| c.duration))
    }

    pub fn max_duration(&self) -> f64 {
        max_of(self.all.iter().map(|c| c.duration))
    }

    pub fn min_cost(&self) -> f64 {
        min_of(self.all.iter().map(|c| c.cost))
    }

    pub fn max_cost(&self) -> f64 {
        max_of(self.all.iter().map(|c| c.cost))
    }

    /// Distinct non-empty agents across all conversations, first-seen order.
    pub fn unique_agents(&self) -> Vec<&'a str> {
        let mut agents: Vec<&'a str> = Vec::new();
        let mut seen: HashSet<&'a str> = HashSet::new();
        for conv in self.all {
            if !conv.agent.is_empty() && seen.insert(conv.agent.as_str()) {
                agents.push(&conv.agent);
            }
        }
        agents
    }

    // ── Breakdowns over the filtered view ───────────────────────────────

    /// One row per status, in enumeration order, zeros included.
    pub fn status_breakdown(&self) -> Vec<StatusCount> {
        CallStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: self.filtered.iter().filter(|c| c.status == status).count(),
            })
            .collect()
    }

    /// One row per agent present in the filtered view, first-seen order.
    pub fn agent_breakdown(&self) -> Vec<AgentCount> {
        let mut rows: Vec<AgentCount> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for conv in &self.filtered {
            match index.get(conv.agent.as_str()) {
                Some(&i) => rows[i].count += 1,
                None => {
                    index.insert(&conv.agent, rows.len());
                    rows.push(AgentCount {
                        agent: conv.agent.clone(),
                        count: 1,
                    });
                }
            }
        }
        rows
    }

    /// Always two rows: inbound then outbound.
    pub fn call_type_breakdown(&self) -> Vec<CallTypeCount> {
        CallType::ALL
            .into_iter()
            .map(|call_type| CallTypeCount {
                call_type,
                count: self
                    .filtered
                    .iter()
                    .filter(|c| c.call_type() == call_type)
                    .count(),
            })
            .collect()
    }

    pub fn duration_chart(&self) -> DurationChart {
        DurationChart::build(&self.filtered, self.filters)
    }

    /// Owned copy of every derived value.
    pub fn snapshot(&self) -> InsightsSnapshot {
        InsightsSnapshot {
            total_count: self.all.len(),
            shown_count: self.filtered.len(),
            total_calls: self.total_calls(),
            success_rate: self.success_rate(),
            average_call_duration: self.average_call_duration(),
            total_cost: self.total_cost(),
            average_llm_latency: self.average_llm_latency(),
            average_tts_latency: self.average_tts_latency(),
            total_interruptions: self.total_interruptions(),
            min_duration: self.min_duration(),
            max_duration: self.max_duration(),
            min_cost: self.min_cost(),
            max_cost: self.max_cost(),
            unique_agents: self.unique_agents().into_iter().map(String::from).collect(),
            status_breakdown: self.status_breakdown(),
            agent_breakdown: self.agent_breakdown(),
            call_type_breakdown: self.call_type_breakdown(),
            duration_chart: self.duration_chart(),
            filters: self.filters.clone(),
        }
    }
}

/// Serializable bundle of all metrics for one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsSnapshot {
    pub total_count: usize,
    pub shown_count: usize,
    pub total_calls: usize,
    pub success_rate: f64,
    pub average_call_duration: f64,
    pub total_cost: f64,
    #[serde(rename = "averageLLMLatency")]
    pub average_llm_latency: f64,
    #[serde(rename = "averageTTSLatency")]
    pub average_tts_latency: f64,
    pub total_interruptions: u64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub min_cost: f64,
    pub max_cost: f64,
    pub unique_agents: Vec<String>,
    pub status_breakdown: Vec<StatusCount>,
    pub agent_breakdown: Vec<AgentCount>,
    pub call_type_breakdown: Vec<CallTypeCount>,
    pub duration_chart: DurationChart,
    pub filters: FilterCriteria,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (total, count) = values.fold((0.0, 0usize), |(t, n), v| (t + v, n + 1));
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn min_of(values: impl Iterator<Item = f64>) -> f64 {
    values.reduce(f64::min).unwrap_or(0.0)
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.reduce(f64::max).unwrap_or(0.0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use insights_core::filters::NumericRange;
    use insights_core::types::{CallInfo, CallStats};

    pub(crate) fn conv(
        id: &str,
        agent: &str,
        duration: f64,
        cost: f64,
        status: CallStatus,
        call_type: CallType,
    ) -> Conversation {
        Conversation {
            id: id.into(),
            agent: agent.into(),
            start_time: 0,
            duration,
            cost,
            status,
            call_info: CallInfo {
                caller: "+15550100".into(),
                callee: "+15550199".into(),
                call_type,
                stats: None,
            },
        }
    }

    pub(crate) fn with_stats(mut c: Conversation, llm: f64, tts: f64, interruptions: u32) -> Conversation {
        c.call_info.stats = Some(CallStats {
            llm_latency: llm,
            tts_latency: tts,
            interruptions,
        });
        c
    }

    fn two_records() -> Vec<Conversation> {
        vec![
            conv("1", "A", 10.0, 1.0, CallStatus::Success, CallType::Inbound),
            conv("2", "B", 30.0, 3.0, CallStatus::Dropped, CallType::Outbound),
        ]
    }

    #[test]
    fn test_empty_set_defaults() {
        let filters = FilterCriteria::default();
        let insights = Insights::new(&[], &filters);

        assert_eq!(insights.total_calls(), 0);
        assert_eq!(insights.success_rate(), 0.0);
        assert_eq!(insights.average_call_duration(), 0.0);
        assert_eq!(insights.total_cost(), 0.0);
        assert_eq!(insights.average_llm_latency(), 0.0);
        assert_eq!(insights.average_tts_latency(), 0.0);
        assert_eq!(insights.total_interruptions(), 0);
        assert_eq!(insights.min_duration(), 0.0);
        assert_eq!(insights.max_duration(), 0.0);
        assert_eq!(insights.min_cost(), 0.0);
        assert_eq!(insights.max_cost(), 0.0);
        assert!(insights.unique_agents().is_empty());
        assert!(insights.agent_breakdown().is_empty());

        let statuses = insights.status_breakdown();
        assert_eq!(statuses.len(), 5);
        assert!(statuses.iter().all(|row| row.count == 0));

        let types = insights.call_type_breakdown();
        assert_eq!(types.len(), 2);
        assert!(types.iter().all(|row| row.count == 0));
    }

    #[test]
    fn test_unfiltered_scenario() {
        let convs = two_records();
        let filters = FilterCriteria::default();
        let insights = Insights::new(&convs, &filters);

        assert_eq!(insights.total_calls(), 2);
        assert_eq!(insights.success_rate(), 50.0);
        assert_eq!(insights.average_call_duration(), 20.0);
        assert_eq!(insights.total_cost(), 4.0);
    }

    #[test]
    fn test_agent_filtered_scenario() {
        let convs = two_records();
        let filters = FilterCriteria {
            agent: Some("A".into()),
            ..Default::default()
        };
        let insights = Insights::new(&convs, &filters);

        assert_eq!(insights.total_calls(), 1);
        assert_eq!(insights.success_rate(), 100.0);
        assert_eq!(insights.average_call_duration(), 10.0);
    }

    #[test]
    fn test_bounds_and_agents_ignore_filters() {
        let convs = two_records();
        let filters = FilterCriteria {
            agent: Some("A".into()),
            duration_range: NumericRange::new(Some(5.0), Some(15.0)),
            ..Default::default()
        };
        let insights = Insights::new(&convs, &filters);

        assert_eq!(insights.total_calls(), 1);
        assert_eq!(insights.min_duration(), 10.0);
        assert_eq!(insights.max_duration(), 30.0);
        assert_eq!(insights.min_cost(), 1.0);
        assert_eq!(insights.max_cost(), 3.0);
        assert_eq!(insights.unique_agents(), vec!["A", "B"]);
    }

    #[test]
    fn test_latency_averages_skip_missing_stats() {
        let convs = vec![
            with_stats(
                conv("1", "A", 10.0, 1.0, CallStatus::Success, CallType::Inbound),
                200.0,
                100.0,
                2,
            ),
            conv("2", "A", 10.0, 1.0, CallStatus::Success, CallType::Inbound),
            with_stats(
                conv("3", "B", 10.0, 1.0, CallStatus::Busy, CallType::Outbound),
                400.0,
                50.0,
                3,
            ),
        ];
        let filters = FilterCriteria::default();
        let insights = Insights::new(&convs, &filters);

        assert_eq!(insights.average_llm_latency(), 300.0);
        assert_eq!(insights.average_tts_latency(), 75.0);
        assert_eq!(insights.total_interruptions(), 5);
    }

    #[test]
    fn test_unique_agents_over_interleaved_large_set() {
        let names = ["Cy", "Amy", "Bo"];
        let convs: Vec<Conversation> = (0..3000)
            .map(|i| {
                conv(
                    &i.to_string(),
                    names[i % 3],
                    1.0,
                    1.0,
                    CallStatus::Success,
                    CallType::Inbound,
                )
            })
            .collect();
        let filters = FilterCriteria::default();
        let insights = Insights::new(&convs, &filters);
        assert_eq!(insights.unique_agents(), vec!["Cy", "Amy", "Bo"]);
    }

    #[test]
    fn test_unique_agents_skip_empty_and_keep_first_seen_order() {
        let convs = vec![
            conv("1", "Zed", 1.0, 1.0, CallStatus::Success, CallType::Inbound),
            conv("2", "", 1.0, 1.0, CallStatus::Success, CallType::Inbound),
            conv("3", "Amy", 1.0, 1.0, CallStatus::Success, CallType::Inbound),
            conv("4", "Zed", 1.0, 1.0, CallStatus::Success, CallType::Inbound),
        ];
        let filters = FilterCriteria::default();
        let insights = Insights::new(&convs, &filters);
        assert_eq!(insights.unique_agents(), vec!["Zed", "Amy"]);
    }

    #[test]
    fn test_breakdowns() {
        let convs = vec![
            conv("1", "B", 1.0, 1.0, CallStatus::Dropped, CallType::Outbound),
            conv("2", "A", 1.0, 1.0, CallStatus::Success, CallType::Outbound),
            conv("3", "B", 1.0, 1.0, CallStatus::Dropped, CallType::Outbound),
        ];
        let filters = FilterCriteria::default();
        let insights = Insights::new(&convs, &filters);

        let statuses: Vec<_> = insights
            .status_breakdown()
            .into_iter()
            .map(|row| (row.status, row.count))
            .collect();
        assert_eq!(
            statuses,
            vec![
                (CallStatus::Busy, 0),
                (CallStatus::Success, 1),
                (CallStatus::Transfer, 0),
                (CallStatus::NoAnswer, 0),
                (CallStatus::Dropped, 2),
            ]
        );

        assert_eq!(
            insights.agent_breakdown(),
            vec![
                AgentCount {
                    agent: "B".into(),
                    count: 2
                },
                AgentCount {
                    agent: "A".into(),
                    count: 1
                },
            ]
        );

        assert_eq!(
            insights.call_type_breakdown(),
            vec![
                CallTypeCount {
                    call_type: CallType::Inbound,
                    count: 0
                },
                CallTypeCount {
                    call_type: CallType::Outbound,
                    count: 3
                },
            ]
        );
    }

    #[test]
    fn test_insights_from_store_follow_mutations() {
        let mut store = ConversationStore::with_conversations(two_records());
        assert_eq!(Insights::from_store(&store).total_calls(), 2);

        store.set_status(Some(CallStatus::Dropped));
        let insights = Insights::from_store(&store);
        assert_eq!(insights.total_calls(), 1);
        assert_eq!(insights.total_cost(), 3.0);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let convs = two_records();
        let filters = FilterCriteria::default();
        let snapshot = Insights::new(&convs, &filters).snapshot();
        assert_eq!(snapshot.shown_count, 2);
        assert_eq!(snapshot.total_count, 2);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["totalCalls"], 2);
        assert_eq!(json["successRate"], 50.0);
        assert_eq!(json["averageLLMLatency"], 0.0);
        assert_eq!(json["statusBreakdown"].as_array().unwrap().len(), 5);
        assert_eq!(json["statusBreakdown"][3]["status"], "no_answer");
        assert_eq!(json["callTypeBreakdown"][1]["type"], "outbound");
        assert_eq!(json["durationChart"]["mode"], "byAgentAndType");
        assert_eq!(json["uniqueAgents"], serde_json::json!(["A", "B"]));
    }
}
