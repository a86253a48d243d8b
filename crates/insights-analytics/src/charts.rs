//! Average-call-duration chart grouping.
//!
//! The grouping follows the agent / call-type filter state:
//!
//! | agent | call type | rows                         | category axis |
//! |-------|-----------|------------------------------|---------------|
//! | -     | -         | per agent, inbound+outbound  | `agent`       |
//! | set   | -         | per call type                | `type`        |
//! | -     | set       | per agent                    | `agent`       |
//! | set   | set       | one labeled point            | `label`       |

use insights_core::filters::FilterCriteria;
use insights_core::types::{CallType, Conversation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTypeDuration {
    pub agent: String,
    pub inbound: f64,
    pub outbound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDuration {
    #[serde(rename = "type")]
    pub call_type: CallType,
    pub avg_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDuration {
    pub agent: String,
    pub avg_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledDuration {
    pub label: String,
    pub avg_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum DurationChart {
    ByAgentAndType {
        rows: Vec<AgentTypeDuration>,
    },
    #[serde(rename_all = "camelCase")]
    ByCallType {
        agent: String,
        rows: Vec<TypeDuration>,
    },
    #[serde(rename_all = "camelCase")]
    ByAgent {
        call_type: CallType,
        rows: Vec<AgentDuration>,
    },
    #[serde(rename_all = "camelCase")]
    Single {
        agent: String,
        call_type: CallType,
        point: LabeledDuration,
    },
}

impl DurationChart {
    /// Build the chart for `filtered` according to the agent / call-type filters.
    pub fn build(filtered: &[&Conversation], filters: &FilterCriteria) -> Self {
        match (filters.agent.as_deref(), filters.call_type) {
            (None, None) => {
                let mut groups: Vec<(&str, Average, Average)> = Vec::new();
                for conv in filtered {
                    let idx = match groups.iter().position(|(agent, _, _)| *agent == conv.agent) {
                        Some(idx) => idx,
                        None => {
                            groups.push((conv.agent.as_str(), Average::default(), Average::default()));
                            groups.len() - 1
                        }
                    };
                    let (_, inbound, outbound) = &mut groups[idx];
                    match conv.call_type() {
                        CallType::Inbound => inbound.add(conv.duration),
                        CallType::Outbound => outbound.add(conv.duration),
                    }
                }
                DurationChart::ByAgentAndType {
                    rows: groups
                        .into_iter()
                        .map(|(agent, inbound, outbound)| AgentTypeDuration {
                            agent: agent.to_string(),
                            inbound: inbound.value(),
                            outbound: outbound.value(),
                        })
                        .collect(),
                }
            }
            (Some(agent), None) => {
                let groups = group_first_seen(
                    filtered.iter().copied().filter(|conv| conv.agent == agent),
                    |conv| conv.call_type(),
                );
                DurationChart::ByCallType {
                    agent: agent.to_string(),
                    rows: groups
                        .into_iter()
                        .map(|(call_type, avg)| TypeDuration {
                            call_type,
                            avg_duration: avg.value(),
                        })
                        .collect(),
                }
            }
            (None, Some(call_type)) => {
                let groups = group_first_seen(
                    filtered.iter().copied().filter(|conv| conv.call_type() == call_type),
                    |conv| conv.agent.as_str(),
                );
                DurationChart::ByAgent {
                    call_type,
                    rows: groups
                        .into_iter()
                        .map(|(agent, avg)| AgentDuration {
                            agent: agent.to_string(),
                            avg_duration: avg.value(),
                        })
                        .collect(),
                }
            }
            (Some(agent), Some(call_type)) => {
                let mut avg = Average::default();
                for conv in filtered {
                    if conv.agent == agent && conv.call_type() == call_type {
                        avg.add(conv.duration);
                    }
                }
                DurationChart::Single {
                    agent: agent.to_string(),
                    call_type,
                    point: LabeledDuration {
                        label: format!("{} ({})", agent, call_type),
                        avg_duration: avg.value(),
                    },
                }
            }
        }
    }

    /// Field used as the chart's category (x) axis.
    pub fn category_axis(&self) -> &'static str {
        match self {
            DurationChart::ByAgentAndType { .. } | DurationChart::ByAgent { .. } => "agent",
            DurationChart::ByCallType { .. } => "type",
            DurationChart::Single { .. } => "label",
        }
    }

    pub fn title(&self) -> String {
        match self {
            DurationChart::ByAgentAndType { .. } => "Average Call Duration by Agent and Type".into(),
            DurationChart::ByCallType { agent, .. } => {
                format!("Average Call Duration by Call Type ({})", agent)
            }
            DurationChart::ByAgent { call_type, .. } => {
                format!("Average Call Duration by Agent ({})", call_type)
            }
            DurationChart::Single {
                agent, call_type, ..
            } => format!("Average Call Duration ({}, {})", agent, call_type),
        }
    }

    /// True when there is nothing to plot. The single-point mode always has a point.
    pub fn is_empty(&self) -> bool {
        match self {
            DurationChart::ByAgentAndType { rows } => rows.is_empty(),
            DurationChart::ByCallType { rows, .. } => rows.is_empty(),
            DurationChart::ByAgent { rows, .. } => rows.is_empty(),
            DurationChart::Single { .. } => false,
        }
    }
}

/// Running sum/count; an empty group averages to 0.
#[derive(Debug, Default, Clone, Copy)]
struct Average {
    total: f64,
    count: usize,
}

impl Average {
    fn add(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Average durations grouped by `key`, groups in first-seen order.
fn group_first_seen<'a, K, I, F>(convs: I, key: F) -> Vec<(K, Average)>
where
    K: PartialEq,
    I: Iterator<Item = &'a Conversation>,
    F: Fn(&'a Conversation) -> K,
{
    let mut groups: Vec<(K, Average)> = Vec::new();
    for conv in convs {
        let k = key(conv);
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, avg)) => avg.add(conv.duration),
            None => {
                let mut avg = Average::default();
                avg.add(conv.duration);
                groups.push((k, avg));
            }
        }
    }
    groups
}
