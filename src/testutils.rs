use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::sync::watch::{self, Sender};
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

use crate::{backend::ShiftBackend, error::ShiftError, types::Shift};

pub async fn read_from_shift_stream(stream: &mut WatchStream<Vec<Shift>>) -> Vec<Shift> {
    tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("No shifts received within a second")
        .expect("Shift stream closed")
}

pub struct MockShiftBackendInner {
    pub error: Mutex<Option<ShiftError>>,
    pub calls_to_shift_stream: AtomicU64,
    pub calls_to_shifts: AtomicU64,
    pub calls_to_shift: AtomicU64,
    pub calls_to_book_shift: AtomicU64,
    pub calls_to_cancel_shift: AtomicU64,
    pub calls_to_add_shift: AtomicU64,
    pub calls_to_import_shifts: AtomicU64,
    pub calls_to_remove_shift: AtomicU64,
    pub calls_to_remove_all_shifts: AtomicU64,
    pub shifts: Mutex<HashMap<Uuid, Shift>>,
    pub sender: Sender<Vec<Shift>>,
}

#[derive(Clone)]
pub struct MockShiftBackend(pub Arc<MockShiftBackendInner>);

impl MockShiftBackendInner {
    fn new() -> Self {
        let (sender, _) = watch::channel(vec![]);
        Self {
            error: Mutex::default(),
            calls_to_shift_stream: AtomicU64::default(),
            calls_to_shifts: AtomicU64::default(),
            calls_to_shift: AtomicU64::default(),
            calls_to_book_shift: AtomicU64::default(),
            calls_to_cancel_shift: AtomicU64::default(),
            calls_to_add_shift: AtomicU64::default(),
            calls_to_import_shifts: AtomicU64::default(),
            calls_to_remove_shift: AtomicU64::default(),
            calls_to_remove_all_shifts: AtomicU64::default(),
            shifts: Mutex::default(),
            sender,
        }
    }
}

impl MockShiftBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockShiftBackendInner::new()))
    }

    pub fn fail_with(&self, error: ShiftError) {
        *self.0.error.lock().unwrap() = Some(error);
    }

    pub fn insert(&self, shift: Shift) {
        self.0.shifts.lock().unwrap().insert(shift.id, shift);
    }

    pub fn calls(&self, operation: &str) -> u64 {
        let counter = match operation {
            "shift_stream" => &self.0.calls_to_shift_stream,
            "shifts" => &self.0.calls_to_shifts,
            "shift" => &self.0.calls_to_shift,
            "book" => &self.0.calls_to_book_shift,
            "cancel" => &self.0.calls_to_cancel_shift,
            "add" => &self.0.calls_to_add_shift,
            "import" => &self.0.calls_to_import_shifts,
            "remove" => &self.0.calls_to_remove_shift,
            "remove_all" => &self.0.calls_to_remove_all_shifts,
            _ => unimplemented!(),
        };
        counter.load(Ordering::SeqCst)
    }

    fn result(&self) -> Result<(), ShiftError> {
        match self.0.error.lock().unwrap().clone() {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    fn stored_or_placeholder(&self, id: Uuid, booked: bool) -> Shift {
        let mut shift = self
            .0
            .shifts
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_else(|| {
                let start_time = Utc::now() + chrono::Duration::hours(1);
                Shift {
                    id,
                    ..Shift::new("Helsinki", start_time, start_time + chrono::Duration::hours(2))
                }
            });
        shift.booked = booked;
        shift
    }
}

impl ShiftBackend for MockShiftBackend {
    fn shift_stream(&self) -> WatchStream<Vec<Shift>> {
        self.0.calls_to_shift_stream.fetch_add(1, Ordering::SeqCst);
        WatchStream::new(self.0.sender.subscribe())
    }

    fn shifts(&self) -> Vec<Shift> {
        self.0.calls_to_shifts.fetch_add(1, Ordering::SeqCst);
        let mut shifts: Vec<Shift> = self.0.shifts.lock().unwrap().values().cloned().collect();
        shifts.sort_by_key(|shift| shift.start_time);
        shifts
    }

    fn shift(&self, id: Uuid) -> Result<Shift, ShiftError> {
        self.0.calls_to_shift.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        self.0
            .shifts
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(ShiftError::NotFound(id))
    }

    fn book_shift(&self, id: Uuid) -> Result<Shift, ShiftError> {
        self.0.calls_to_book_shift.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        Ok(self.stored_or_placeholder(id, true))
    }

    fn cancel_shift(&self, id: Uuid) -> Result<Shift, ShiftError> {
        self.0.calls_to_cancel_shift.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        Ok(self.stored_or_placeholder(id, false))
    }

    fn add_shift(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        area: String,
    ) -> Result<Shift, ShiftError> {
        self.0.calls_to_add_shift.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        Ok(Shift::new(area, start_time, end_time))
    }

    fn import_shifts(&self, _shifts: Vec<Shift>) -> Result<(), ShiftError> {
        self.0.calls_to_import_shifts.fetch_add(1, Ordering::SeqCst);
        self.result()
    }

    fn remove_shift(&self, _id: Uuid) -> Result<(), ShiftError> {
        self.0.calls_to_remove_shift.fetch_add(1, Ordering::SeqCst);
        self.result()
    }

    fn remove_all_shifts(&self) {
        self.0
            .calls_to_remove_all_shifts
            .fetch_add(1, Ordering::SeqCst);
    }
}
