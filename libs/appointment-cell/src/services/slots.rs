use chrono::NaiveDate;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use doctor_cell::services::directory::DirectoryService;
use shared_config::AppConfig;
use shared_database::DocumentStore;

use crate::models::{AppointmentError, AvailableSlot};

pub struct DaySlots {
    pub date: NaiveDate,
    pub day_name: String,
    pub available_slots: Vec<AvailableSlot>,
    pub total_slots: usize,
    pub booked_slots: usize,
}

pub struct SlotService {
    store: DocumentStore,
    directory: DirectoryService,
}

impl SlotService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: DocumentStore::new(config),
            directory: DirectoryService::new(config),
        }
    }

    /// The doctor's weekday template minus slots already taken on that date.
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<DaySlots, AppointmentError> {
        let doctor = self
            .directory
            .get_doctor(doctor_id)
            .await
            .map_err(|_| AppointmentError::DoctorNotFound)?;

        let day_name = date.format("%A").to_string();
        debug!("Computing slots for doctor {} on {} ({})", doctor_id, date, day_name);

        let Some(day_availability) = doctor.availability.iter().find(|a| a.day == day_name) else {
            return Ok(DaySlots {
                date,
                day_name,
                available_slots: Vec::new(),
                total_slots: 0,
                booked_slots: 0,
            });
        };

        let existing = self
            .store
            .find(
                "appointments",
                json!({
                    "doctorId": doctor_id,
                    "appointmentDate": date,
                    "status": { "$in": ["scheduled", "confirmed"] }
                }),
                None,
                None,
                None,
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let booked_times: Vec<String> = existing
            .iter()
            .filter_map(|doc| doc["appointmentTime"].as_str().map(str::to_string))
            .collect();

        let available_slots: Vec<AvailableSlot> = day_availability
            .time_slots
            .iter()
            .filter(|slot| slot.is_available && !booked_times.contains(&slot.start_time))
            .map(|slot| AvailableSlot {
                start_time: slot.start_time.clone(),
                end_time: slot.end_time.clone(),
                available: true,
            })
            .collect();

        Ok(DaySlots {
            date,
            day_name,
            available_slots,
            total_slots: day_availability.time_slots.len(),
            booked_slots: booked_times.len(),
        })
    }
}
