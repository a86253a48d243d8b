//! The conversation store: full record set, current filters, and load state.
//!
//! Filtered views are recomputed on every read from `(conversations, filters)`;
//! nothing derived is cached across a mutation.

use crate::error::Result;
use crate::filters::{self, DateRange, FilterCriteria, NumericRange};
use crate::source::ConversationSource;
use crate::types::{CallStatus, CallType, Conversation};

/// Handle for one in-flight load. Only the most recently issued ticket may
/// replace the store's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
}

impl LoadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What a finished load did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Records were replaced wholesale.
    Replaced { count: usize },
    /// The fetch failed; previous records were kept.
    Failed,
    /// A newer load was issued before this one finished; the result was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    filters: FilterCriteria,
    loading: bool,
    latest_request: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with records, as if a load had succeeded.
    pub fn with_conversations(conversations: Vec<Conversation>) -> Self {
        Self {
            conversations,
            ..Self::default()
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Conversations accepted by the current filters, in load order.
    pub fn filtered_conversations(&self) -> Vec<&Conversation> {
        filters::apply(&self.conversations, &self.filters)
    }

    // ── Load lifecycle ──────────────────────────────────────────────────

    /// Mark a load as started and issue its ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_request += 1;
        self.loading = true;
        LoadTicket {
            seq: self.latest_request,
        }
    }

    /// Apply the result of the load identified by `ticket`.
    ///
    /// Failures are logged and leave the records untouched. `loading` is
    /// cleared once the latest issued load finishes, whatever its result.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Conversation>>,
    ) -> LoadOutcome {
        if ticket.seq != self.latest_request {
            tracing::debug!(
                "Discarding stale load #{} (latest is #{})",
                ticket.seq,
                self.latest_request
            );
            return LoadOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(conversations) => {
                let count = conversations.len();
                self.conversations = conversations;
                tracing::info!("Loaded {} conversations", count);
                LoadOutcome::Replaced { count }
            }
            Err(e) => {
                tracing::error!("Failed to load conversations: {}", e);
                LoadOutcome::Failed
            }
        }
    }

    /// Fetch from `source` and replace the records. Never returns an error.
    pub async fn load(&mut self, source: &dyn ConversationSource) -> LoadOutcome {
        let ticket = self.begin_load();
        tracing::debug!("Load #{} from {}", ticket.seq, source.describe());
        let result = source.fetch().await;
        self.finish_load(ticket, result)
    }

    // ── Filter mutations ────────────────────────────────────────────────

    pub fn set_agent(&mut self, agent: Option<String>) {
        self.filters.agent = agent;
    }

    pub fn set_call_type(&mut self, call_type: Option<CallType>) {
        self.filters.call_type = call_type;
    }

    pub fn set_status(&mut self, status: Option<CallStatus>) {
        self.filters.status = status;
    }

    pub fn set_date_range(&mut self, start: Option<i64>, end: Option<i64>) {
        self.filters.date_range = DateRange::new(start, end);
        self.warn_on_issues();
    }

    pub fn set_duration_range(&mut self, min: Option<f64>, max: Option<f64>) {
        self.filters.duration_range = NumericRange::new(min, max);
        self.warn_on_issues();
    }

    pub fn set_cost_range(&mut self, min: Option<f64>, max: Option<f64>) {
        self.filters.cost_range = NumericRange::new(min, max);
        self.warn_on_issues();
    }

    /// Replace the whole criteria at once.
    pub fn set_filters(&mut self, filters: FilterCriteria) {
        self.filters = filters;
        self.warn_on_issues();
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterCriteria::default();
    }

    fn warn_on_issues(&self) {
        for issue in self.filters.issues() {
            tracing::warn!("Filter: {}", issue);
        }
    }
}
