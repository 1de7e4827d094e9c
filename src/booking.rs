//! Booking a time slot: validating the contact form, building the request
//! sent to the backend, and turning the outcome into a notification.
//!
//! The transport that carries the request is not part of this crate, callers
//! provide it by implementing [BookingService].

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, macros::format_description};
use time_tz::OffsetDateTimeExt;

use crate::{
    Error,
    clock::Clock,
    error_message::{BackendError, format_error_text},
    notification::Notification,
    text::grapheme_count,
    timezone::{TimezoneDatabase, resolve_offset},
};

/// The remote method that reserves a time slot.
pub const BOOK_TIME_SLOT_METHOD: &str = "frappe_appointment.api.personal_meet.book_time_slot";

/// The minimum number of characters (grapheme clusters) in a requester's name.
pub const MIN_NAME_LENGTH: usize = 2;

/// The title of the notification shown after a successful booking.
pub const BOOKING_CONFIRMED_TITLE: &str = "Appointment has been scheduled";

time::serde::format_description!(booking_date, Date, "[year]-[month]-[day]");

/// The URL of the remote booking method on `site`, e.g. "https://meet.example.com".
pub fn booking_endpoint(site: &str) -> String {
    format!(
        "{}/api/method/{BOOK_TIME_SLOT_METHOD}",
        site.trim_end_matches('/')
    )
}

/// The people, other than the requester, invited to the appointment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuestList(Vec<String>);

impl GuestList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a guest's email address, ignoring surrounding whitespace.
    ///
    /// # Errors
    /// Returns [Error::InvalidEmail] if `raw_email` is not a valid address, or
    /// [Error::DuplicateGuest] if the guest is already on the list.
    pub fn add(&mut self, raw_email: &str) -> Result<(), Error> {
        let email = raw_email.trim();

        if !email.contains('@') || !EmailAddress::is_valid(email) {
            return Err(Error::InvalidEmail(email.to_owned()));
        }

        if self.0.iter().any(|guest| guest == email) {
            return Err(Error::DuplicateGuest(email.to_owned()));
        }

        self.0.push(email.to_owned());
        Ok(())
    }

    /// Remove a guest, returning whether they were on the list.
    pub fn remove(&mut self, email: &str) -> bool {
        let count = self.0.len();
        self.0.retain(|guest| guest != email);
        self.0.len() != count
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The guests as a single comma separated string.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

/// Validated contact details of the person booking the appointment.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactDetails {
    full_name: String,
    email: String,
    guests: GuestList,
}

impl ContactDetails {
    /// Validate the contact form.
    ///
    /// # Errors
    /// Returns [Error::NameTooShort] if `full_name` has fewer than two
    /// characters, or [Error::InvalidEmail] if `email` is not a valid address.
    pub fn new(full_name: &str, email: &str, guests: GuestList) -> Result<Self, Error> {
        let full_name = full_name.trim();
        if grapheme_count(full_name) < MIN_NAME_LENGTH {
            return Err(Error::NameTooShort);
        }

        let email = email.trim();
        if !EmailAddress::is_valid(email) {
            return Err(Error::InvalidEmail(email.to_owned()));
        }

        Ok(Self {
            full_name: full_name.to_owned(),
            email: email.to_owned(),
            guests,
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn guests(&self) -> &GuestList {
        &self.guests
    }
}

/// An available slot, as offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
}

/// Everything the requester chose while booking.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingForm {
    /// The ID of the appointment length the requester picked.
    pub duration_id: String,
    /// The day the requester picked.
    pub date: Date,
    pub slot: TimeSlot,
    /// The IANA name of the timezone the requester is booking in.
    pub timezone: String,
    pub contact: ContactDetails,
}

/// The body of a booking request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRequest {
    pub duration_id: String,
    #[serde(with = "booking_date")]
    pub date: Date,
    /// The requester's UTC offset in minutes.
    pub user_timezone_offset: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    pub user_name: String,
    pub user_email: String,
    pub other_participants: String,
}

impl BookingRequest {
    /// Build the request for `form`.
    ///
    /// The offset is the requester's offset *now*, not at the start of the
    /// slot, which is what the backend expects. The two differ when a
    /// daylight saving transition falls between now and the appointment.
    ///
    /// # Errors
    /// Returns an error if the offset of `form.timezone` cannot be resolved.
    pub fn new(
        form: &BookingForm,
        clock: &impl Clock,
        db: &impl TimezoneDatabase,
    ) -> Result<Self, Error> {
        let offset = resolve_offset(&form.timezone, clock, db)?;

        Ok(Self {
            duration_id: form.duration_id.clone(),
            date: form.date,
            user_timezone_offset: offset.to_string(),
            start_time: form.slot.start_time,
            end_time: form.slot.end_time,
            user_name: form.contact.full_name().to_owned(),
            user_email: form.contact.email().to_owned(),
            other_participants: form.contact.guests().joined(),
        })
    }

    /// The request as a JSON string.
    ///
    /// # Errors
    /// Returns [Error::JSONSerializationError] if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Sends booking requests to the backend.
pub trait BookingService {
    /// Reserve the slot described by `request`.
    ///
    /// # Errors
    /// Returns the error body sent by the backend when the slot could not be
    /// booked.
    fn book_time_slot(&self, request: &BookingRequest) -> Result<(), BackendError>;
}

/// Book the slot in `form` and describe the outcome as a notification.
///
/// A rejected booking is not an error: the backend's reasons are returned as
/// an error notification.
///
/// When `site_name` is given, the confirmation names the site the
/// appointment was booked with.
///
/// # Errors
/// Returns an error, without contacting `service`, if the timezone of `form`
/// cannot be resolved.
pub fn submit_booking(
    service: &impl BookingService,
    form: &BookingForm,
    site_name: Option<&str>,
    clock: &impl Clock,
    db: &impl TimezoneDatabase,
) -> Result<Notification, Error> {
    let request = BookingRequest::new(form, clock, db)?;

    tracing::info!(
        "booking {} to {} for {}",
        request.start_time,
        request.end_time,
        request.user_email
    );

    match service.book_time_slot(&request) {
        Ok(()) => Ok(confirmation(form, site_name, db)),
        Err(error) => {
            tracing::error!(
                http_status = ?error.http_status,
                exc_type = ?error.exc_type,
                "could not book time slot: {error:?}"
            );
            Ok(Notification::error(&format_error_text(&error)))
        }
    }
}

/// E.g. "Appointment has been scheduled with Acme Consulting".
fn confirmation_title(site_name: Option<&str>) -> String {
    match site_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(site_name) => format!("{BOOKING_CONFIRMED_TITLE} with {site_name}"),
        None => BOOKING_CONFIRMED_TITLE.to_owned(),
    }
}

fn confirmation(
    form: &BookingForm,
    site_name: Option<&str>,
    db: &impl TimezoneDatabase,
) -> Notification {
    let title = confirmation_title(site_name);

    match confirmation_description(form, db) {
        Ok(description) => Notification::success(&title, &description),
        Err(error) => {
            tracing::warn!("could not describe the booked slot: {error}");
            Notification {
                description: None,
                ..Notification::success(&title, "")
            }
        }
    }
}

/// E.g. "For 5 Mar, 2025 at 2 PM", with the time shown in the booking's timezone.
fn confirmation_description(
    form: &BookingForm,
    db: &impl TimezoneDatabase,
) -> Result<String, time::error::Format> {
    let start_time = match db.get(&form.timezone) {
        Some(tz) => form.slot.start_time.to_timezone(tz),
        None => form.slot.start_time,
    };

    let date = form
        .date
        .format(format_description!("[day padding:none] [month repr:short], [year]"))?;
    let time = start_time.format(format_description!("[hour repr:12 padding:none] [period]"))?;

    Ok(format!("For {date} at {time}"))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;
    use time::macros::{date, datetime};

    use crate::{
        Error,
        clock::FixedClock,
        error_message::{BackendError, FALLBACK_ERROR_TEXT},
        notification::{Notification, NotificationKind},
        timezone::Tzdb,
    };

    use super::{
        BOOKING_CONFIRMED_TITLE, BookingForm, BookingRequest, BookingService, ContactDetails,
        GuestList, TimeSlot, booking_endpoint, submit_booking,
    };

    const NOW: FixedClock = FixedClock(datetime!(2025-03-01 09:00 UTC));

    /// Records the request it receives and replies with `response`.
    struct FakeService {
        response: Result<(), BackendError>,
        received: RefCell<Option<BookingRequest>>,
    }

    impl FakeService {
        fn replying(response: Result<(), BackendError>) -> Self {
            Self {
                response,
                received: RefCell::new(None),
            }
        }
    }

    impl BookingService for FakeService {
        fn book_time_slot(&self, request: &BookingRequest) -> Result<(), BackendError> {
            self.received.replace(Some(request.clone()));
            self.response.clone()
        }
    }

    fn guests(emails: &[&str]) -> GuestList {
        let mut guests = GuestList::new();
        for email in emails {
            guests.add(email).unwrap();
        }
        guests
    }

    fn form_in(timezone: &str) -> BookingForm {
        BookingForm {
            duration_id: "30-min".to_owned(),
            date: date!(2025 - 03 - 05),
            slot: TimeSlot {
                start_time: datetime!(2025-03-05 08:30 UTC),
                end_time: datetime!(2025-03-05 09:00 UTC),
            },
            timezone: timezone.to_owned(),
            contact: ContactDetails::new(
                "Jane Doe",
                "jane@example.com",
                guests(&["bob@example.com", "amy@example.com"]),
            )
            .unwrap(),
        }
    }

    #[test]
    fn builds_request_with_offset_and_guests() {
        let got = BookingRequest::new(&form_in("Asia/Kolkata"), &NOW, &Tzdb).unwrap();

        assert_eq!(got.user_timezone_offset, "330");
        assert_eq!(got.other_participants, "bob@example.com, amy@example.com");
        assert_eq!(got.user_name, "Jane Doe");
    }

    #[test]
    fn serializes_request_with_wire_names() {
        let request = BookingRequest::new(&form_in("America/New_York"), &NOW, &Tzdb).unwrap();

        let got = serde_json::to_value(&request).unwrap();

        assert_eq!(
            got,
            json!({
                "duration_id": "30-min",
                "date": "2025-03-05",
                "user_timezone_offset": "-300",
                "start_time": "2025-03-05T08:30:00Z",
                "end_time": "2025-03-05T09:00:00Z",
                "user_name": "Jane Doe",
                "user_email": "jane@example.com",
                "other_participants": "bob@example.com, amy@example.com",
            })
        );
    }

    #[test]
    fn confirms_successful_booking() {
        let service = FakeService::replying(Ok(()));

        let got = submit_booking(&service, &form_in("Asia/Kolkata"), None, &NOW, &Tzdb);

        assert_eq!(
            got,
            Ok(Notification::success(
                BOOKING_CONFIRMED_TITLE,
                "For 5 Mar, 2025 at 2 PM"
            ))
        );
        assert!(service.received.borrow().is_some());
    }

    #[test]
    fn confirms_booking_with_site_name() {
        let service = FakeService::replying(Ok(()));

        let got = submit_booking(
            &service,
            &form_in("Asia/Kolkata"),
            Some("Acme Consulting"),
            &NOW,
            &Tzdb,
        );

        assert_eq!(
            got,
            Ok(Notification::success(
                "Appointment has been scheduled with Acme Consulting",
                "For 5 Mar, 2025 at 2 PM"
            ))
        );
    }

    #[test]
    fn blank_site_name_is_left_out_of_confirmation() {
        let service = FakeService::replying(Ok(()));

        let got = submit_booking(&service, &form_in("Asia/Kolkata"), Some("  "), &NOW, &Tzdb)
            .unwrap();

        assert_eq!(got.title, BOOKING_CONFIRMED_TITLE);
    }

    #[test]
    fn shows_backend_errors() {
        let service = FakeService::replying(Err(BackendError {
            exception: Some("ValidationError: Slot unavailable".to_owned()),
            ..Default::default()
        }));

        let got = submit_booking(&service, &form_in("Asia/Kolkata"), None, &NOW, &Tzdb).unwrap();

        assert_eq!(got.kind, NotificationKind::Error);
        assert_eq!(got.title, "Slot unavailable\n");
    }

    #[test]
    fn shows_fallback_text_for_empty_backend_error() {
        let service = FakeService::replying(Err(BackendError::default()));

        let got = submit_booking(&service, &form_in("Asia/Kolkata"), None, &NOW, &Tzdb).unwrap();

        assert_eq!(got, Notification::error(FALLBACK_ERROR_TEXT));
    }

    #[test]
    fn invalid_timezone_aborts_before_calling_backend() {
        let service = FakeService::replying(Ok(()));

        let got = submit_booking(&service, &form_in("Not/AZone"), None, &NOW, &Tzdb);

        assert_eq!(got, Err(Error::InvalidTimezoneError("Not/AZone".to_owned())));
        assert!(service.received.borrow().is_none());
    }

    #[test]
    fn builds_endpoint_url() {
        assert_eq!(
            booking_endpoint("https://meet.example.com/"),
            "https://meet.example.com/api/method/frappe_appointment.api.personal_meet.book_time_slot"
        );
    }

    #[test]
    fn adds_trimmed_guest() {
        let mut guests = GuestList::new();

        guests.add("  bob@example.com ").unwrap();

        assert_eq!(guests.as_slice(), ["bob@example.com"]);
    }

    #[test]
    fn rejects_guest_without_at_sign() {
        let mut guests = GuestList::new();

        assert_eq!(
            guests.add("bob.example.com"),
            Err(Error::InvalidEmail("bob.example.com".to_owned()))
        );
        assert_eq!(guests.add("  "), Err(Error::InvalidEmail(String::new())));
        assert!(guests.is_empty());
    }

    #[test]
    fn rejects_duplicate_guest() {
        let mut guests = guests(&["bob@example.com"]);

        assert_eq!(
            guests.add("bob@example.com"),
            Err(Error::DuplicateGuest("bob@example.com".to_owned()))
        );
        assert_eq!(guests.as_slice().len(), 1);
    }

    #[test]
    fn removes_guest() {
        let mut guests = guests(&["bob@example.com", "amy@example.com"]);

        assert!(guests.remove("bob@example.com"));
        assert!(!guests.remove("bob@example.com"));
        assert_eq!(guests.joined(), "amy@example.com");
    }

    #[test]
    fn empty_guest_list_joins_to_empty_string() {
        assert_eq!(GuestList::new().joined(), "");
    }

    #[test]
    fn rejects_short_name() {
        let got = ContactDetails::new(" J ", "jane@example.com", GuestList::new());

        assert_eq!(got, Err(Error::NameTooShort));
    }

    #[test]
    fn rejects_invalid_email() {
        let got = ContactDetails::new("Jane Doe", "jane", GuestList::new());

        assert_eq!(got, Err(Error::InvalidEmail("jane".to_owned())));
    }

    #[test]
    fn trims_contact_details() {
        let got = ContactDetails::new("  Jane Doe ", " jane@example.com ", GuestList::new()).unwrap();

        assert_eq!(got.full_name(), "Jane Doe");
        assert_eq!(got.email(), "jane@example.com");
    }
}
