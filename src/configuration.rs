use chrono::FixedOffset;
use std::path::PathBuf;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn host(&self) -> String;
    fn port(&self) -> u16;
    /// `None` disables the admin routes.
    fn admin_password(&self) -> Option<String>;
    fn shifts_file(&self) -> Option<PathBuf>;
    fn example_shifts(&self) -> bool;
    /// Offset used to decide which calendar day a shift falls on.
    fn utc_offset(&self) -> FixedOffset;
}
