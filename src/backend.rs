use crate::{error::ShiftError, types::Shift};
use chrono::{DateTime, Utc};
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

pub trait ShiftBackend: Clone + Send + Sync + 'static {
    /// Yields the full ordered shift list now and after every change.
    fn shift_stream(&self) -> WatchStream<Vec<Shift>>;
    fn shifts(&self) -> Vec<Shift>;
    fn shift(&self, id: Uuid) -> Result<Shift, ShiftError>;
    fn book_shift(&self, id: Uuid) -> Result<Shift, ShiftError>;
    fn cancel_shift(&self, id: Uuid) -> Result<Shift, ShiftError>;
    fn add_shift(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        area: String,
    ) -> Result<Shift, ShiftError>;
    /// Replaces every stored shift.
    fn import_shifts(&self, shifts: Vec<Shift>) -> Result<(), ShiftError>;
    fn remove_shift(&self, id: Uuid) -> Result<(), ShiftError>;
    fn remove_all_shifts(&self);
}
