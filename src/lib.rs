//! Appointment booking helpers.
//!
//! This library resolves the UTC offset a booking is made in, prepares the
//! request that reserves a time slot, and turns the booking backend's error
//! payloads into text that can be shown to the person booking.

pub mod booking;
pub mod clock;
pub mod config;
mod error;
pub mod error_message;
pub mod notification;
pub mod text;
pub mod timezone;

pub use booking::{
    BookingForm, BookingRequest, BookingService, ContactDetails, GuestList, TimeSlot,
    submit_booking,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::Error;
pub use error_message::{BackendError, DisplayMessage, extract_messages, format_error_text};
pub use notification::{Notification, NotificationKind};
pub use timezone::{
    OffsetMinutes, TimezoneDatabase, Tzdb, get_local_timezone, list_supported_timezones,
    resolve_offset, resolve_offset_at,
};
