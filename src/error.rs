//! Defines the crate level error type.

/// The errors that may occur while resolving timezones or preparing a booking.
///
/// Errors raised while *displaying* a failed booking are not part of this
/// type: [crate::error_message] always produces something to show.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The timezone name is not in the timezone database.
    ///
    /// Callers must not fall back to UTC, since booking a slot with the wrong
    /// offset silently moves the appointment.
    #[error("invalid timezone \"{0}\"")]
    InvalidTimezoneError(String),

    /// The long-form offset text (e.g. "GMT+05:30") could not be parsed.
    #[error("unexpected timezone offset format \"{0}\"")]
    InvalidOffset(String),

    /// A duration string was not of the form "HH:MM:SS".
    #[error("invalid duration \"{0}\", expected HH:MM:SS")]
    InvalidDuration(String),

    /// The string is not a valid email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// The full name given in the contact form is too short.
    #[error("name must be at least 2 characters")]
    NameTooShort,

    /// The guest has already been added to the booking.
    #[error("{0} has already been added as a guest")]
    DuplicateGuest(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JSONSerializationError(value.to_string())
    }
}
