//! Typing indicators: local debounce and remote aggregation.

pub mod aggregator;
pub mod debouncer;

pub use aggregator::{TypingAggregator, typing_label, who_is_typing};
pub use debouncer::{DEFAULT_TYPING_TIMEOUT, TypingDebouncer, TypingPhase};
