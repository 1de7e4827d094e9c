//! Turns the error payloads returned by the booking backend into text that
//! can be shown to the user.
//!
//! The backend reports failures in up to three places, checked in order:
//! 1. `_server_messages`: a JSON encoded array whose elements are themselves
//!    JSON encoded message objects (or plain strings),
//! 2. `exception`: a string of the form "ExceptionType: description",
//! 3. `message`: a generic message.
//!
//! Nothing in this module fails. A payload that cannot be understood still
//! produces something to display.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shown when a failed request carries no readable text at all.
pub const FALLBACK_ERROR_TEXT: &str = "Something went wrong. Please try again later.";

/// The title given to messages taken from the exception or message fields.
pub const ERROR_TITLE: &str = "Error";

/// The title given to server messages that do not specify one.
pub const DEFAULT_SERVER_MESSAGE_TITLE: &str = "Message";

/// Displayed in place of a server message that is empty and could not be parsed.
pub const UNREADABLE_SERVER_MESSAGE: &str = "The server sent a message that could not be read.";

/// The error body returned by a failed backend call.
///
/// Every field is optional, the backend only fills in what it knows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendError {
    /// A JSON encoded array of JSON encoded messages.
    #[serde(rename = "_server_messages", default, skip_serializing_if = "Option::is_none")]
    pub server_messages: Option<String>,

    /// The exception raised by the backend, e.g. "ValidationError: Slot unavailable".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,

    /// The type of the exception raised by the backend, e.g. "ValidationError".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exc_type: Option<String>,

    /// A generic message describing the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The HTTP status code of the failed request.
    #[serde(rename = "httpStatus", default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl BackendError {
    /// An error carrying only a generic message.
    pub fn from_message(message: &str) -> Self {
        Self {
            message: Some(message.to_owned()),
            ..Default::default()
        }
    }
}

/// One unit of user facing error text.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayMessage {
    /// The text of the message, if the backend gave any.
    pub message: Option<String>,
    /// A short heading for the message.
    pub title: String,
}

impl DisplayMessage {
    fn error(message: Option<String>) -> Self {
        Self {
            message,
            title: ERROR_TITLE.to_owned(),
        }
    }
}

/// A single element of the `_server_messages` array.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// The element was valid JSON.
    Parsed(DisplayMessage),
    /// The element could not be parsed as JSON.
    ///
    /// The element keeps its place in the list so that the number of
    /// messages shown matches the number the backend sent.
    Malformed {
        /// The element as sent by the backend.
        raw: String,
        /// Why the element could not be parsed.
        reason: String,
    },
}

impl From<ServerMessage> for DisplayMessage {
    fn from(value: ServerMessage) -> Self {
        match value {
            ServerMessage::Parsed(message) => message,
            ServerMessage::Malformed { raw, .. } if !raw.trim().is_empty() => {
                DisplayMessage::error(Some(raw))
            }
            ServerMessage::Malformed { .. } => {
                DisplayMessage::error(Some(UNREADABLE_SERVER_MESSAGE.to_owned()))
            }
        }
    }
}

/// Parse the `_server_messages` field of a [BackendError].
///
/// Returns an empty list if `encoded` is not a JSON array. Elements that
/// cannot be parsed are kept as [ServerMessage::Malformed].
pub fn parse_server_messages(encoded: &str) -> Vec<ServerMessage> {
    let elements: Vec<Value> = match serde_json::from_str(encoded) {
        Ok(elements) => elements,
        Err(error) => {
            tracing::warn!("ignoring server messages that are not a JSON array: {error}");
            return Vec::new();
        }
    };

    elements.into_iter().map(parse_server_message).collect()
}

fn parse_server_message(element: Value) -> ServerMessage {
    let value = match element {
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!("could not parse server message {raw:?}: {error}");
                return ServerMessage::Malformed {
                    raw,
                    reason: error.to_string(),
                };
            }
        },
        value => value,
    };

    let message = match value {
        Value::Object(fields) => DisplayMessage {
            message: fields.get("message").and_then(value_as_text),
            title: fields
                .get("title")
                .and_then(value_as_text)
                .unwrap_or_else(|| DEFAULT_SERVER_MESSAGE_TITLE.to_owned()),
        },
        Value::String(text) => DisplayMessage {
            message: Some(text),
            title: DEFAULT_SERVER_MESSAGE_TITLE.to_owned(),
        },
        _ => DisplayMessage {
            message: None,
            title: DEFAULT_SERVER_MESSAGE_TITLE.to_owned(),
        },
    };

    ServerMessage::Parsed(message)
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Get the description part of an exception string such as
/// "ValidationError: Slot unavailable".
///
/// An exception without a colon is used as is.
fn exception_description(exception: &str) -> Option<&str> {
    let description = match exception.split_once(':') {
        Some((_, description)) => description,
        None => exception,
    }
    .trim();

    if description.is_empty() {
        None
    } else {
        Some(description)
    }
}

/// Extract the messages to display for `error`.
///
/// Always returns at least one message. Server messages take priority, then
/// the description of the exception, and finally the generic message (which
/// may be missing).
pub fn extract_messages(error: &BackendError) -> Vec<DisplayMessage> {
    let server_messages = error
        .server_messages
        .as_deref()
        .map(parse_server_messages)
        .unwrap_or_default();

    if !server_messages.is_empty() {
        return server_messages.into_iter().map(DisplayMessage::from).collect();
    }

    if let Some(description) = error.exception.as_deref().and_then(exception_description) {
        return vec![DisplayMessage::error(Some(description.to_owned()))];
    }

    vec![DisplayMessage::error(error.message.clone())]
}

static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[^>]+(>|$)").expect("HTML tag pattern is a valid regex"));

/// Remove anything that looks like an HTML tag from `text`.
///
/// This is not an HTML parser: entities are left as is and an unterminated
/// tag is removed up to the end of the text.
pub fn remove_html_tags(text: &str) -> String {
    HTML_TAG_REGEX.replace_all(text, "").into_owned()
}

/// Format the messages of `error` as a single string with markup removed.
///
/// Each message is followed by a newline. Titles are not included. Returns
/// [FALLBACK_ERROR_TEXT] if there is no text left to show.
pub fn format_error_text(error: &BackendError) -> String {
    let text: String = extract_messages(error)
        .into_iter()
        .filter_map(|message| message.message)
        .map(|message| format!("{message}\n"))
        .collect();

    let text = remove_html_tags(&text);

    if text.is_empty() {
        FALLBACK_ERROR_TEXT.to_owned()
    } else {
        text
    }
}
