//! "Who is typing" list for a conversation.

use chatpulse_core::config::typing::TypingConfig;
use chatpulse_core::types::id::ActorId;
use chatpulse_core::types::typing::TypingMap;

/// Label used for a typing actor whose display name is unknown.
pub const FALLBACK_LABEL: &str = "Someone";

/// Computes the display list of remote actors currently typing.
#[derive(Debug, Clone)]
pub struct TypingAggregator {
    fallback_label: String,
}

impl TypingAggregator {
    /// Create an aggregator with a custom fallback label.
    pub fn new(fallback_label: impl Into<String>) -> Self {
        Self {
            fallback_label: fallback_label.into(),
        }
    }

    /// Create an aggregator from configuration.
    pub fn from_config(config: &TypingConfig) -> Self {
        Self::new(config.fallback_label.clone())
    }

    /// Display names of actors with `typing == true`, excluding
    /// `exclude_actor_id`.
    ///
    /// Entries follow the map's key order, so the output is stable for a
    /// fixed input. A lookup that yields `None` or a blank name is replaced
    /// by the fallback label.
    pub fn who_is_typing<F>(
        &self,
        flags: &TypingMap,
        exclude_actor_id: &ActorId,
        display_name_of: F,
    ) -> Vec<String>
    where
        F: Fn(&ActorId) -> Option<String>,
    {
        flags
            .iter()
            .filter(|(actor_id, typing)| **typing && *actor_id != exclude_actor_id)
            .map(|(actor_id, _)| {
                display_name_of(actor_id)
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| self.fallback_label.clone())
            })
            .collect()
    }
}

impl Default for TypingAggregator {
    fn default() -> Self {
        Self::new(FALLBACK_LABEL)
    }
}

/// [`TypingAggregator::who_is_typing`] with the default fallback label.
pub fn who_is_typing<F>(flags: &TypingMap, exclude_actor_id: &ActorId, display_name_of: F) -> Vec<String>
where
    F: Fn(&ActorId) -> Option<String>,
{
    TypingAggregator::default().who_is_typing(flags, exclude_actor_id, display_name_of)
}

/// Banner text for a typing list, `None` when nobody types.
pub fn typing_label(names: &[String]) -> Option<String> {
    match names {
        [] => None,
        [one] => Some(format!("{one} is typing…")),
        [a, b] => Some(format!("{a} and {b} are typing…")),
        [a, b, c] => Some(format!("{a}, {b} and {c} are typing…")),
        [a, b, rest @ ..] => Some(format!(
            "{a}, {b} and {} others are typing…",
            rest.len()
        )),
    }
}
