//! Toast notifications shown after a booking attempt.

use maud::{Markup, html};

/// Whether the notification reports a success or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// The label of the button that dismisses a notification.
pub const DISMISS_LABEL: &str = "OK";

const SUCCESS_STYLE: &str = "flex items-start justify-between gap-4 p-4 mb-4 \
    text-sm text-green-800 rounded-lg bg-green-50 dark:bg-gray-800 \
    dark:text-green-400";

const ERROR_STYLE: &str = "flex items-start justify-between gap-4 p-4 mb-4 \
    text-sm text-red-800 rounded-lg bg-red-50 dark:bg-gray-800 \
    dark:text-red-400";

const DISMISS_BUTTON_STYLE: &str = "px-3 py-1 text-xs font-medium rounded \
    bg-blue-400 hover:bg-blue-500 text-white";

/// A short message with an optional description and an "OK" button.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: Option<String>,
}

impl Notification {
    /// Create a new success notification.
    pub fn success(title: &str, description: &str) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.to_owned(),
            description: Some(description.to_owned()),
        }
    }

    /// Create a new error notification without a description.
    pub fn error(title: &str) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.to_owned(),
            description: None,
        }
    }

    /// Render the notification as an HTML fragment.
    ///
    /// Multi-line titles keep their line breaks.
    pub fn into_html(self) -> Markup {
        let (role, style) = match self.kind {
            NotificationKind::Success => ("status", SUCCESS_STYLE),
            NotificationKind::Error => ("alert", ERROR_STYLE),
        };

        html!(
            div role=(role) class=(style)
            {
                div
                {
                    p class="font-medium whitespace-pre-line" { (self.title.trim_end()) }

                    @if let Some(description) = &self.description {
                        p class="mt-1" { (description) }
                    }
                }

                button type="button" class=(DISMISS_BUTTON_STYLE) data-dismiss="notification"
                {
                    (DISMISS_LABEL)
                }
            }
        )
    }
}
