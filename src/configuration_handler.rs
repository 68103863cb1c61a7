use crate::configuration::Configuration;
use chrono::{FixedOffset, Local};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(version, about = "In-memory shift booking service")]
pub struct ConfigurationHandler {
    /// Address to listen on
    #[arg(long, env = "SHIFT_MANAGER_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, env = "SHIFT_MANAGER_PORT", default_value_t = 8080)]
    port: u16,

    /// Password expected in the `x-admin-password` header of admin requests
    #[arg(long, env = "SHIFT_MANAGER_ADMIN_PASSWORD")]
    admin_password: Option<String>,

    /// JSON array of shifts to serve instead of the generated examples
    #[arg(long, env = "SHIFT_MANAGER_SHIFTS_FILE")]
    shifts_file: Option<PathBuf>,

    /// Start with an empty shift list
    #[arg(long)]
    no_example_shifts: bool,

    /// Offset from UTC in minutes used for grouping shifts by day. Defaults to
    /// the offset of the local time zone.
    #[arg(
        long,
        env = "SHIFT_MANAGER_UTC_OFFSET_MINUTES",
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-1439..=1439)
    )]
    utc_offset_minutes: Option<i32>,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn host(&self) -> String {
        self.host.clone()
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn admin_password(&self) -> Option<String> {
        self.admin_password.clone()
    }

    fn shifts_file(&self) -> Option<PathBuf> {
        self.shifts_file.clone()
    }

    fn example_shifts(&self) -> bool {
        !self.no_example_shifts
    }

    fn utc_offset(&self) -> FixedOffset {
        let local = *Local::now().offset();
        self.utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or(local)
    }
}
