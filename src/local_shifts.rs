use crate::{backend::ShiftBackend, error::ShiftError, types::Shift};
use chrono::{DateTime, Utc};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::watch::{self, Sender};
use tokio_stream::wrappers::WatchStream;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LocalShifts {
    shifts: Arc<Mutex<HashMap<Uuid, Shift>>>,
    sender: Sender<Vec<Shift>>,
}

impl Default for LocalShifts {
    fn default() -> Self {
        let (sender, _) = watch::channel(vec![]);
        Self {
            shifts: Arc::new(Mutex::default()),
            sender,
        }
    }
}

impl LocalShifts {
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Shift>> {
        self.shifts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ordered(shifts: &HashMap<Uuid, Shift>) -> Vec<Shift> {
        let mut shifts: Vec<Shift> = shifts.values().cloned().collect();
        shifts.sort_unstable_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.area.cmp(&b.area))
                .then_with(|| a.id.cmp(&b.id))
        });
        shifts
    }

    /// Must be called while still holding the guard so subscribers observe
    /// changes in the order they were applied.
    fn publish(&self, shifts: &HashMap<Uuid, Shift>) {
        self.sender.send_replace(Self::ordered(shifts));
    }

    fn check_bookable(
        shifts: &HashMap<Uuid, Shift>,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ShiftError> {
        let shift = shifts.get(&id).ok_or(ShiftError::NotFound(id))?;
        if shift.booked {
            return Err(ShiftError::AlreadyBooked(id));
        }
        if shift.has_started(now) {
            return Err(ShiftError::AlreadyStarted(id));
        }
        if let Some(booked) = shifts
            .values()
            .find(|other| other.id != id && other.booked && other.overlaps(shift))
        {
            return Err(ShiftError::Overlapping {
                id,
                booked: booked.id,
            });
        }
        Ok(())
    }

    fn validate_import(shifts: &[Shift]) -> Result<(), ShiftError> {
        let mut ids = HashSet::with_capacity(shifts.len());
        for shift in shifts {
            if !ids.insert(shift.id) {
                return Err(ShiftError::DuplicateId(shift.id));
            }
            if shift.end_time <= shift.start_time {
                return Err(ShiftError::InvalidInterval);
            }
        }

        let booked: Vec<&Shift> = shifts.iter().filter(|shift| shift.booked).collect();
        for (index, a) in booked.iter().enumerate() {
            if let Some(b) = booked.iter().skip(index + 1).find(|b| a.overlaps(b)) {
                return Err(ShiftError::Overlapping {
                    id: b.id,
                    booked: a.id,
                });
            }
        }
        Ok(())
    }
}

impl ShiftBackend for LocalShifts {
    fn shift_stream(&self) -> WatchStream<Vec<Shift>> {
        WatchStream::new(self.sender.subscribe())
    }

    fn shifts(&self) -> Vec<Shift> {
        Self::ordered(&self.lock())
    }

    fn shift(&self, id: Uuid) -> Result<Shift, ShiftError> {
        self.lock().get(&id).cloned().ok_or(ShiftError::NotFound(id))
    }

    fn book_shift(&self, id: Uuid) -> Result<Shift, ShiftError> {
        let mut shifts = self.lock();
        if let Err(err) = Self::check_bookable(&shifts, id, Utc::now()) {
            warn!(%id, %err, "Booking rejected");
            return Err(err);
        }

        let shift = shifts.get_mut(&id).ok_or(ShiftError::NotFound(id))?;
        shift.booked = true;
        let shift = shift.clone();
        self.publish(&shifts);

        info!(%id, area = %shift.area, "Shift booked");
        Ok(shift)
    }

    fn cancel_shift(&self, id: Uuid) -> Result<Shift, ShiftError> {
        let mut shifts = self.lock();
        let shift = shifts.get_mut(&id).ok_or(ShiftError::NotFound(id))?;
        if !shift.booked {
            warn!(%id, "Cancellation rejected, shift is not booked");
            return Err(ShiftError::NotBooked(id));
        }
        if shift.has_started(Utc::now()) {
            warn!(%id, "Cancellation rejected, shift has already started");
            return Err(ShiftError::AlreadyStarted(id));
        }
        shift.booked = false;
        let shift = shift.clone();
        self.publish(&shifts);

        info!(%id, area = %shift.area, "Shift cancelled");
        Ok(shift)
    }

    fn add_shift(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        area: String,
    ) -> Result<Shift, ShiftError> {
        if end_time <= start_time {
            return Err(ShiftError::InvalidInterval);
        }

        let shift = Shift::new(area, start_time, end_time);
        let mut shifts = self.lock();
        shifts.insert(shift.id, shift.clone());
        self.publish(&shifts);

        info!(id = %shift.id, area = %shift.area, "Shift added");
        Ok(shift)
    }

    fn import_shifts(&self, new_shifts: Vec<Shift>) -> Result<(), ShiftError> {
        Self::validate_import(&new_shifts)?;

        let count = new_shifts.len();
        let mut shifts = self.lock();
        *shifts = new_shifts
            .into_iter()
            .map(|shift| (shift.id, shift))
            .collect();
        self.publish(&shifts);

        info!(count, "Shifts imported");
        Ok(())
    }

    fn remove_shift(&self, id: Uuid) -> Result<(), ShiftError> {
        let mut shifts = self.lock();
        if shifts.remove(&id).is_none() {
            warn!(%id, "Shift does not exist and can't therefore be removed");
            return Err(ShiftError::NotFound(id));
        }
        self.publish(&shifts);

        info!(%id, "Shift removed");
        Ok(())
    }

    fn remove_all_shifts(&self) {
        let mut shifts = self.lock();
        shifts.clear();
        self.publish(&shifts);
        info!("All shifts removed");
    }
}
