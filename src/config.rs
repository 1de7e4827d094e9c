//! Runtime configuration, read from command line flags or the environment.

use clap::Args;

use crate::timezone::{TimezoneDatabase, get_local_timezone};

/// Settings shared by every command.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// The name of the site taking bookings, shown when a booking is confirmed.
    #[arg(long, env = "SITE_NAME", global = true)]
    pub site_name: Option<String>,

    /// The URL of the site hosting the booking backend, e.g. "https://meet.example.com".
    #[arg(long, env = "SITE_URL", global = true)]
    pub site_url: Option<String>,

    /// The IANA timezone to use instead of the host's timezone, e.g. "Pacific/Auckland".
    #[arg(long = "timezone", env = "APPOINTMENT_TIMEZONE", global = true)]
    pub timezone: Option<String>,
}

impl Config {
    /// The timezone to book in: the configured override, else the host's timezone.
    pub fn timezone(&self, db: &impl TimezoneDatabase) -> String {
        match &self.timezone {
            Some(timezone) => timezone.clone(),
            None => get_local_timezone(db),
        }
    }
}
