use crate::widget::WidgetId;
use std::fmt;

/// A behavior was configured in a way it cannot run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A scrollview holds more than one child.
    TooManyChildren { widget: WidgetId, count: usize },
    InvalidSwipeDirection(String),
    /// `scroll_to_widget` was given something outside the scrolled content.
    NotADescendant { widget: WidgetId },
    InvalidTransition(String),
    InvalidTapMaxCount(u32),
    UnknownWidget(WidgetId),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TooManyChildren { widget, count } => {
                write!(f, "scrollview {widget} can only have one child, found {count}")
            }
            ConfigError::InvalidSwipeDirection(direction) => {
                write!(f, "invalid swipe direction {direction:?}")
            }
            ConfigError::NotADescendant { widget } => {
                write!(f, "{widget} is not a child or descendant of the scrollview content")
            }
            ConfigError::InvalidTransition(name) => write!(f, "unknown transition {name:?}"),
            ConfigError::InvalidTapMaxCount(count) => {
                write!(f, "tap_max_count must be at least 1, got {count}")
            }
            ConfigError::UnknownWidget(widget) => write!(f, "{widget} is not in the widget tree"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<tactile_animation::ParseTransitionError> for ConfigError {
    fn from(err: tactile_animation::ParseTransitionError) -> Self {
        ConfigError::InvalidTransition(err.0)
    }
}
