use chrono::{NaiveDate, Utc};
use futures::future::try_join;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::time::format_hhmm;

use finance_cell::{FinanceError, FinanceService};
use patient_cell::{PatientError, PatientService};
use professional_cell::{Professional, ProfessionalError, ProfessionalService};

use crate::models::{
    Appointment, AppointmentError, AppointmentListQuery, AppointmentStatus,
    CreateAppointmentRequest, DayAvailability, UpdateAppointmentRequest,
};
use crate::services::availability::{candidate_slots, closure_reason, slots_for_day, BookedInterval};

fn db_error(err: anyhow::Error) -> AppointmentError {
    AppointmentError::DatabaseError(err.to_string())
}

fn billing_error(err: FinanceError) -> AppointmentError {
    AppointmentError::BillingError(err.to_string())
}

fn professional_error(err: ProfessionalError) -> AppointmentError {
    match err {
        ProfessionalError::NotFound => AppointmentError::ProfessionalNotFound,
        ProfessionalError::Inactive => AppointmentError::ProfessionalInactive,
        other => AppointmentError::DatabaseError(other.to_string()),
    }
}

fn patient_error(err: PatientError) -> AppointmentError {
    match err {
        PatientError::NotFound => AppointmentError::PatientNotFound,
        other => AppointmentError::DatabaseError(other.to_string()),
    }
}

fn parse_rows(rows: Vec<Value>) -> Result<Vec<Appointment>, AppointmentError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<Appointment>, _>>()
        .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
}

fn revenue_description(appointment: &Appointment, professional: &Professional) -> String {
    format!(
        "{} on {} at {} with {}",
        appointment.appointment_type,
        appointment.date,
        format_hhmm(&appointment.start_time),
        professional.full_name
    )
}

pub struct AppointmentService {
    supabase: SupabaseClient,
    patients: PatientService,
    professionals: ProfessionalService,
    finance: FinanceService,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            patients: PatientService::new(config),
            professionals: ProfessionalService::new(config),
            finance: FinanceService::new(config),
        }
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        request.validate()?;
        debug!(
            "Scheduling appointment for patient {} with {} on {} at {}",
            request.patient_id, request.professional_id, request.date, request.start_time
        );

        let (_, professional) = try_join(
            async {
                self.patients
                    .get_patient(request.patient_id, auth_token)
                    .await
                    .map_err(patient_error)
            },
            async {
                self.professionals
                    .get_active_professional(request.professional_id, auth_token)
                    .await
                    .map_err(professional_error)
            },
        )
        .await?;

        if let Some(reason) = closure_reason(request.date) {
            warn!("Appointment scheduled on a closed day {} ({:?})", request.date, reason);
        }

        let now = Utc::now().to_rfc3339();
        let appointment_data = json!({
            "patient_id": request.patient_id,
            "professional_id": request.professional_id,
            "date": request.date,
            "start_time": format_hhmm(&request.start_time),
            "duration_minutes": request.duration_minutes,
            "appointment_type": request.appointment_type,
            "price": request.price,
            "status": AppointmentStatus::Scheduled,
            "notes": request.notes,
            "created_at": now,
            "updated_at": now
        });

        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(appointment_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(db_error)?;

        let appointment = parse_rows(result)?
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Failed to create appointment".to_string()))?;

        if let Err(e) = self.mirror_revenue(&appointment, &professional, auth_token).await {
            warn!("Rolling back appointment {}: {}", appointment.id, e);
            self.delete_row(appointment.id, auth_token).await?;
            return Err(e);
        }

        info!("Appointment {} scheduled", appointment.id);
        Ok(appointment)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        parse_rows(result)?
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn list_appointments(
        &self,
        query: AppointmentListQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut filters = vec![];
        if let Some(date) = query.date {
            filters.push(format!("date=eq.{}", date));
        }
        if let Some(professional_id) = query.professional_id {
            filters.push(format!("professional_id=eq.{}", professional_id));
        }
        if let Some(patient_id) = query.patient_id {
            filters.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(status) = query.status {
            filters.push(format!("status=eq.{}", status));
        }
        filters.push("order=date.asc,start_time.asc".to_string());

        let path = format!("/rest/v1/appointments?{}", filters.join("&"));
        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        parse_rows(result)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        request.validate()?;
        debug!("Updating appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id, auth_token).await?;
        if current.status == AppointmentStatus::Cancelled {
            return Err(AppointmentError::InvalidStatusTransition(current.status));
        }
        if let Some(next) = request.status {
            if next != current.status && !current.status.can_transition_to(next) {
                return Err(AppointmentError::InvalidStatusTransition(current.status));
            }
        }

        let professional = match request.professional_id {
            Some(professional_id) if professional_id != current.professional_id => Some(
                self.professionals
                    .get_active_professional(professional_id, auth_token)
                    .await
                    .map_err(professional_error)?,
            ),
            _ => None,
        };

        let rebill = request.touches_billing();
        let mut update_data = Map::new();

        if let Some(professional_id) = request.professional_id {
            update_data.insert("professional_id".to_string(), json!(professional_id));
        }
        if let Some(date) = request.date {
            update_data.insert("date".to_string(), json!(date));
        }
        if let Some(start_time) = request.start_time {
            update_data.insert("start_time".to_string(), json!(format_hhmm(&start_time)));
        }
        if let Some(duration) = request.duration_minutes {
            update_data.insert("duration_minutes".to_string(), json!(duration));
        }
        if let Some(appointment_type) = request.appointment_type {
            update_data.insert("appointment_type".to_string(), json!(appointment_type));
        }
        if let Some(price) = request.price {
            update_data.insert("price".to_string(), json!(price));
        }
        if let Some(status) = request.status {
            update_data.insert("status".to_string(), json!(status));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }

        let updated = self.patch(appointment_id, update_data, auth_token).await?;

        let synced = if updated.status == AppointmentStatus::Cancelled {
            self.finance
                .remove_appointment_transactions(updated.id, auth_token)
                .await
                .map_err(billing_error)
        } else if rebill {
            self.rebill(&updated, professional, auth_token).await
        } else {
            Ok(())
        };

        if let Err(e) = synced {
            warn!("Reverting appointment {}: {}", appointment_id, e);
            self.restore(&current, auth_token).await?;
            return Err(e);
        }

        Ok(updated)
    }

    /// Replaces the appointment's ledger entry; ledger rows are never edited.
    async fn rebill(
        &self,
        appointment: &Appointment,
        professional: Option<Professional>,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let professional = match professional {
            Some(professional) => professional,
            None => self
                .professionals
                .get_professional(appointment.professional_id, auth_token)
                .await
                .map_err(professional_error)?,
        };

        self.finance
            .remove_appointment_transactions(appointment.id, auth_token)
            .await
            .map_err(billing_error)?;
        self.mirror_revenue(appointment, &professional, auth_token).await
    }

    /// Puts back the row and ledger entry an update started from.
    async fn restore(&self, previous: &Appointment, auth_token: &str) -> Result<(), AppointmentError> {
        let mut row = Map::new();
        row.insert("professional_id".to_string(), json!(previous.professional_id));
        row.insert("date".to_string(), json!(previous.date));
        row.insert("start_time".to_string(), json!(format_hhmm(&previous.start_time)));
        row.insert("duration_minutes".to_string(), json!(previous.duration_minutes));
        row.insert("appointment_type".to_string(), json!(previous.appointment_type));
        row.insert("price".to_string(), json!(previous.price));
        row.insert("status".to_string(), json!(previous.status));
        row.insert("notes".to_string(), json!(previous.notes));
        self.patch(previous.id, row, auth_token).await?;

        if previous.is_active() {
            if let Err(e) = self.rebill(previous, None, auth_token).await {
                error!("Ledger for appointment {} could not be restored: {}", previous.id, e);
            }
        }
        Ok(())
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;
        if !current.status.can_transition_to(AppointmentStatus::Cancelled) {
            return Err(AppointmentError::InvalidStatusTransition(current.status));
        }

        let mut update_data = Map::new();
        update_data.insert("status".to_string(), json!(AppointmentStatus::Cancelled));
        let cancelled = self.patch(appointment_id, update_data, auth_token).await?;

        self.finance
            .remove_appointment_transactions(appointment_id, auth_token)
            .await
            .map_err(billing_error)?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(cancelled)
    }

    pub async fn delete_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        self.get_appointment(appointment_id, auth_token).await?;

        self.finance
            .remove_appointment_transactions(appointment_id, auth_token)
            .await
            .map_err(billing_error)?;
        self.delete_row(appointment_id, auth_token).await?;

        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    /// Free candidate slots on `date`, optionally for one professional.
    pub async fn day_availability(
        &self,
        date: NaiveDate,
        professional_id: Option<Uuid>,
        duration_minutes: Option<u32>,
        auth_token: &str,
    ) -> Result<DayAvailability, AppointmentError> {
        if let Some(reason) = closure_reason(date) {
            debug!("{} is closed ({:?})", date, reason);
            return Ok(DayAvailability {
                date: Some(date),
                slots: Vec::new(),
                closed: true,
                reason: Some(reason),
            });
        }

        let bookings = self
            .list_appointments(
                AppointmentListQuery {
                    date: Some(date),
                    professional_id,
                    ..Default::default()
                },
                auth_token,
            )
            .await?;

        let booked: Vec<BookedInterval> = bookings
            .iter()
            .filter(|appointment| appointment.is_active())
            .map(Appointment::booked_interval)
            .collect();

        let candidates = candidate_slots();
        let slots = slots_for_day(date, &candidates, &booked, duration_minutes);
        debug!("{} of {} slots free on {}", slots.len(), candidates.len(), date);

        Ok(DayAvailability {
            date: Some(date),
            slots,
            closed: false,
            reason: None,
        })
    }

    async fn mirror_revenue(
        &self,
        appointment: &Appointment,
        professional: &Professional,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        if appointment.price <= 0.0 {
            return Ok(());
        }

        self.finance
            .record_appointment_revenue(
                appointment.id,
                appointment.date,
                appointment.price,
                &professional.role,
                revenue_description(appointment, professional),
                auth_token,
            )
            .await
            .map_err(billing_error)?;

        Ok(())
    }

    async fn patch(
        &self,
        appointment_id: Uuid,
        mut update_data: Map<String, Value>,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update_data)),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(db_error)?;

        parse_rows(result)?
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)
    }

    async fn delete_row(&self, appointment_id: Uuid, auth_token: &str) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        self.supabase
            .delete(&path, Some(auth_token))
            .await
            .map_err(db_error)
    }
}
