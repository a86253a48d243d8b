//! Filter criteria and the conversation predicate.
//!
//! Every field is optional and an unset field imposes no constraint. Bounds
//! are `Option`s, so an explicit `0` is a real bound rather than "unset".

use crate::types::{CallStatus, CallType, Conversation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive bounds on `start_time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl DateRange {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.start.map_or(true, |start| value >= start) && self.end.map_or(true, |end| value <= end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Inclusive bounds on a numeric field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// A non-finite bound never excludes anything.
    pub fn contains(&self, value: f64) -> bool {
        if let Some(min) = self.min.filter(|b| b.is_finite()) {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max.filter(|b| b.is_finite()) {
            if value > max {
                return false;
            }
        }
        true
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// The set of optional constraints narrowing the conversation view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub date_range: DateRange,
    pub agent: Option<String>,
    pub call_type: Option<CallType>,
    pub status: Option<CallStatus>,
    pub duration_range: NumericRange,
    pub cost_range: NumericRange,
}

impl FilterCriteria {
    /// True when every field-level predicate accepts the conversation.
    pub fn matches(&self, conv: &Conversation) -> bool {
        self.date_range.contains(conv.start_time)
            && self.agent.as_ref().map_or(true, |agent| conv.agent == *agent)
            && self.call_type.map_or(true, |t| conv.call_type() == t)
            && self.status.map_or(true, |s| conv.status == s)
            && self.duration_range.contains(conv.duration)
            && self.cost_range.contains(conv.cost)
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Advisory problems with the current criteria. These never block a
    /// mutation and never change how records are filtered.
    pub fn issues(&self) -> Vec<FilterIssue> {
        let mut issues = Vec::new();

        if let (Some(start), Some(end)) = (self.date_range.start, self.date_range.end) {
            if start > end {
                issues.push(FilterIssue::InvertedDateRange { start, end });
            }
        }

        for (field, range) in [("duration", &self.duration_range), ("cost", &self.cost_range)] {
            for bound in [range.min, range.max].into_iter().flatten() {
                if !bound.is_finite() {
                    issues.push(FilterIssue::NonFiniteBound { field });
                }
            }
            if let (Some(min), Some(max)) = (range.min, range.max) {
                if min.is_finite() && max.is_finite() && min > max {
                    issues.push(FilterIssue::InvertedRange { field, min, max });
                }
            }
        }

        issues
    }

    /// Human-readable description of each active constraint.
    pub fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(agent) = &self.agent {
            parts.push(format!("agent = {}", agent));
        }
        if let Some(call_type) = self.call_type {
            parts.push(format!("call type = {}", call_type));
        }
        if let Some(status) = self.status {
            parts.push(format!("status = {}", status));
        }
        if !self.date_range.is_unbounded() {
            parts.push(format!(
                "start time {}",
                describe_bounds(self.date_range.start, self.date_range.end)
            ));
        }
        if !self.duration_range.is_unbounded() {
            parts.push(format!(
                "duration {}",
                describe_bounds(self.duration_range.min, self.duration_range.max)
            ));
        }
        if !self.cost_range.is_unbounded() {
            parts.push(format!(
                "cost {}",
                describe_bounds(self.cost_range.min, self.cost_range.max)
            ));
        }
        parts
    }
}

fn describe_bounds<T: fmt::Display>(min: Option<T>, max: Option<T>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("in [{}, {}]", min, max),
        (Some(min), None) => format!(">= {}", min),
        (None, Some(max)) => format!("<= {}", max),
        (None, None) => "unbounded".into(),
    }
}

/// A suspicious but accepted filter setting.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterIssue {
    InvertedDateRange { start: i64, end: i64 },
    InvertedRange { field: &'static str, min: f64, max: f64 },
    NonFiniteBound { field: &'static str },
}

impl fmt::Display for FilterIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterIssue::InvertedDateRange { start, end } => write!(
                f,
                "date range start {} is after end {}; no conversations can match",
                start, end
            ),
            FilterIssue::InvertedRange { field, min, max } => write!(
                f,
                "{} range min {} is greater than max {}; no conversations can match",
                field, min, max
            ),
            FilterIssue::NonFiniteBound { field } => {
                write!(f, "{} range has a non-finite bound, which is ignored", field)
            }
        }
    }
}

/// Conversations accepted by `criteria`, in their original order.
pub fn apply<'a>(conversations: &'a [Conversation], criteria: &FilterCriteria) -> Vec<&'a Conversation> {
    conversations.iter().filter(|conv| criteria.matches(conv)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{CallInfo, CallStats};

    pub(crate) fn conv(
        id: &str,
        agent: &str,
        start_time: i64,
        duration: f64,
        cost: f64,
        status: CallStatus,
        call_type: CallType,
    ) -> Conversation {
        Conversation {
            id: id.into(),
            agent: agent.into(),
            start_time,
            duration,
            cost,
            status,
            call_info: CallInfo {
                caller: "+15550100".into(),
                callee: "+15550199".into(),
                call_type,
                stats: Some(CallStats {
                    llm_latency: 300.0,
                    tts_latency: 100.0,
                    interruptions: 1,
                }),
            },
        }
    }

    fn sample() -> Vec<Conversation> {
        vec![
            conv("1", "A", 100, 10.0, 1.0, CallStatus::Success, CallType::Inbound),
            conv("2", "B", 200, 30.0, 3.0, CallStatus::Dropped, CallType::Outbound),
            conv("3", "A", 300, 0.0, 0.0, CallStatus::NoAnswer, CallType::Outbound),
            conv("4", "C", 400, 60.0, 5.5, CallStatus::Success, CallType::Inbound),
        ]
    }

    fn ids(filtered: &[&Conversation]) -> Vec<String> {
        filtered.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_empty_criteria_keeps_everything_in_order() {
        let convs = sample();
        let filtered = apply(&convs, &FilterCriteria::default());
        assert_eq!(ids(&filtered), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_each_field_restricts() {
        let convs = sample();

        let by_agent = FilterCriteria {
            agent: Some("A".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&convs, &by_agent)), vec!["1", "3"]);

        let by_type = FilterCriteria {
            call_type: Some(CallType::Inbound),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&convs, &by_type)), vec!["1", "4"]);

        let by_status = FilterCriteria {
            status: Some(CallStatus::Dropped),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&convs, &by_status)), vec!["2"]);

        let by_date = FilterCriteria {
            date_range: DateRange::new(Some(200), Some(300)),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&convs, &by_date)), vec!["2", "3"]);
    }

    #[test]
    fn test_fields_are_and_combined() {
        let convs = sample();
        let criteria = FilterCriteria {
            status: Some(CallStatus::Success),
            duration_range: NumericRange::new(Some(20.0), None),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&convs, &criteria)), vec!["4"]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let convs = sample();
        let criteria = FilterCriteria {
            duration_range: NumericRange::new(Some(10.0), Some(30.0)),
            cost_range: NumericRange::new(Some(1.0), Some(3.0)),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&convs, &criteria)), vec!["1", "2"]);
    }

    #[test]
    fn test_zero_bounds_are_real_bounds() {
        let convs = sample();

        let max_zero_cost = FilterCriteria {
            cost_range: NumericRange::new(None, Some(0.0)),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&convs, &max_zero_cost)), vec!["3"]);

        let min_zero_duration = FilterCriteria {
            duration_range: NumericRange::new(Some(0.0), None),
            ..Default::default()
        };
        assert_eq!(apply(&convs, &min_zero_duration).len(), 4);

        let date_end_zero = FilterCriteria {
            date_range: DateRange::new(None, Some(0)),
            ..Default::default()
        };
        assert!(apply(&convs, &date_end_zero).is_empty());
    }

    #[test]
    fn test_inverted_range_yields_empty_view_and_an_issue() {
        let convs = sample();
        let criteria = FilterCriteria {
            duration_range: NumericRange::new(Some(50.0), Some(5.0)),
            ..Default::default()
        };
        assert!(apply(&convs, &criteria).is_empty());
        assert_eq!(
            criteria.issues(),
            vec![FilterIssue::InvertedRange {
                field: "duration",
                min: 50.0,
                max: 5.0
            }]
        );
    }

    #[test]
    fn test_nan_bound_never_excludes() {
        let convs = sample();
        let criteria = FilterCriteria {
            cost_range: NumericRange::new(Some(f64::NAN), None),
            ..Default::default()
        };
        assert_eq!(apply(&convs, &criteria).len(), 4);
        assert_eq!(
            criteria.issues(),
            vec![FilterIssue::NonFiniteBound { field: "cost" }]
        );
    }

    #[test]
    fn test_infinite_bounds_never_exclude() {
        let convs = sample();
        let criteria = FilterCriteria {
            cost_range: NumericRange::new(Some(f64::INFINITY), None),
            duration_range: NumericRange::new(None, Some(f64::NEG_INFINITY)),
            ..Default::default()
        };
        assert_eq!(apply(&convs, &criteria).len(), 4);

        let both = FilterCriteria {
            cost_range: NumericRange::new(Some(f64::INFINITY), Some(f64::NEG_INFINITY)),
            ..Default::default()
        };
        assert_eq!(apply(&convs, &both).len(), 4);
        assert_eq!(
            both.issues(),
            vec![
                FilterIssue::NonFiniteBound { field: "cost" },
                FilterIssue::NonFiniteBound { field: "cost" },
            ]
        );
    }

    #[test]
    fn test_describe_lists_active_constraints() {
        let criteria = FilterCriteria {
            agent: Some("A".into()),
            status: Some(CallStatus::NoAnswer),
            cost_range: NumericRange::new(None, Some(2.5)),
            ..Default::default()
        };
        assert_eq!(
            criteria.describe(),
            vec!["agent = A", "status = no_answer", "cost <= 2.5"]
        );
        assert!(FilterCriteria::default().describe().is_empty());
        assert!(FilterCriteria::default().is_empty());
        assert!(!criteria.is_empty());
    }
}
