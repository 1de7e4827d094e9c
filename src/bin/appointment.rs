use std::{
    error::Error,
    fs,
    io::{self, Read},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use appointment_rs::{
    BackendError, BookingForm, BookingRequest, Config, ContactDetails, GuestList, SystemClock,
    TimeSlot, Tzdb, booking::booking_endpoint, format_error_text, list_supported_timezones,
    resolve_offset, resolve_offset_at, timezone::timezone_label,
};

/// Timezone and booking utilities for the appointment scheduler.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the UTC offset of a timezone in minutes.
    Offset {
        /// The IANA name of the timezone, e.g. "Asia/Kolkata".
        zone: String,

        /// Resolve the offset at this RFC 3339 instant instead of now.
        #[arg(long, value_parser = parse_instant)]
        at: Option<OffsetDateTime>,
    },

    /// List the supported timezones.
    Zones {
        /// Show the current offset of each timezone.
        #[arg(long)]
        offsets: bool,
    },

    /// Print the timezone bookings are made in.
    Local,

    /// Print the text shown for a JSON error body returned by the backend.
    ExplainError {
        /// The file containing the error body. Reads stdin if omitted.
        file: Option<PathBuf>,
    },

    /// Print the request that would book a time slot, without sending it.
    Request {
        /// The ID of the appointment length.
        #[arg(long)]
        duration_id: String,

        /// The day of the appointment, e.g. 2025-03-05.
        #[arg(long, value_parser = parse_date)]
        date: Date,

        /// The RFC 3339 start time of the slot.
        #[arg(long, value_parser = parse_instant)]
        start: OffsetDateTime,

        /// The RFC 3339 end time of the slot.
        #[arg(long, value_parser = parse_instant)]
        end: OffsetDateTime,

        /// The full name of the person booking.
        #[arg(long)]
        name: String,

        /// The email address of the person booking.
        #[arg(long)]
        email: String,

        /// The email address of a guest. May be repeated.
        #[arg(long = "guest")]
        guests: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    match args.command {
        Command::Offset { zone, at } => {
            let offset = match at {
                Some(instant) => resolve_offset_at(&zone, instant, &Tzdb)?,
                None => resolve_offset(&zone, &SystemClock, &Tzdb)?,
            };
            println!("{offset}");
        }
        Command::Zones { offsets } => {
            for timezone in list_supported_timezones(&Tzdb) {
                if offsets {
                    println!("{}", timezone_label(timezone, &SystemClock, &Tzdb)?);
                } else {
                    println!("{timezone}");
                }
            }
        }
        Command::Local => println!("{}", args.config.timezone(&Tzdb)),
        Command::ExplainError { file } => {
            let body = match file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut body = String::new();
                    io::stdin().read_to_string(&mut body)?;
                    body
                }
            };
            let error: BackendError = serde_json::from_str(&body)?;
            print!("{}", format_error_text(&error));
        }
        Command::Request {
            duration_id,
            date,
            start,
            end,
            name,
            email,
            guests,
        } => {
            let mut guest_list = GuestList::new();
            for guest in &guests {
                guest_list.add(guest)?;
            }

            let form = BookingForm {
                duration_id,
                date,
                slot: TimeSlot {
                    start_time: start,
                    end_time: end,
                },
                timezone: args.config.timezone(&Tzdb),
                contact: ContactDetails::new(&name, &email, guest_list)?,
            };
            let request = BookingRequest::new(&form, &SystemClock, &Tzdb)?;

            if let Some(site_url) = &args.config.site_url {
                println!("POST {}", booking_endpoint(site_url));
            }
            println!("{}", request.to_json()?);
        }
    }

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(filter),
        )
        .init();
}

fn parse_instant(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(text, &Rfc3339)
}

fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
}
