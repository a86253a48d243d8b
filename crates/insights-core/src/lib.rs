pub mod config;
pub mod error;
pub mod filters;
pub mod source;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use error::InsightsError;
pub use filters::{DateRange, FilterCriteria, FilterIssue, NumericRange};
pub use source::{ConversationSource, FileSource, HttpSource};
pub use store::{ConversationStore, LoadOutcome, LoadTicket};
pub use types::{CallInfo, CallStats, CallStatus, CallType, Conversation};
