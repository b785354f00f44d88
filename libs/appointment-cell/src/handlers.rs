// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{RequestContext, ROLE_ADMIN, ROLE_PROFESSIONAL, ROLE_RECEPTIONIST};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{
    Appointment, AppointmentListQuery, AvailabilityQuery, ComputeSlotsRequest,
    CreateAppointmentRequest, DayAvailability, UpdateAppointmentRequest,
};
use crate::services::availability::{available_slots, closure_reason, slots_for_day, BookedInterval};
use crate::services::AppointmentService;

const STAFF: &[&str] = &[ROLE_ADMIN, ROLE_PROFESSIONAL, ROLE_RECEPTIONIST];

// ==============================================================================
// APPOINTMENT CRUD
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    require_role(&ctx.user, STAFF)?;
    let service = AppointmentService::new(&config);

    let appointment = service.create_appointment(request, ctx.token()).await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    require_role(&ctx.user, STAFF)?;
    let service = AppointmentService::new(&config);

    let appointment = service.get_appointment(appointment_id, ctx.token()).await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    require_role(&ctx.user, STAFF)?;
    let service = AppointmentService::new(&config);

    let appointments = service.list_appointments(query, ctx.token()).await?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    require_role(&ctx.user, STAFF)?;
    let service = AppointmentService::new(&config);

    let appointment = service.update_appointment(appointment_id, request, ctx.token()).await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    require_role(&ctx.user, STAFF)?;
    let service = AppointmentService::new(&config);

    let appointment = service.cancel_appointment(appointment_id, ctx.token()).await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_role(&ctx.user, &[ROLE_ADMIN, ROLE_RECEPTIONIST])?;
    let service = AppointmentService::new(&config);

    service.delete_appointment(appointment_id, ctx.token()).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment deleted"
    })))
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn get_available_slots(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<DayAvailability>, AppError> {
    require_role(&ctx.user, STAFF)?;
    query.validate()?;
    let service = AppointmentService::new(&config);

    let availability = service
        .day_availability(query.date, query.professional_id, query.duration, ctx.token())
        .await?;

    Ok(Json(availability))
}

/// Runs the slot filter over caller-supplied candidates and bookings.
#[axum::debug_handler]
pub async fn compute_available_slots(
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<ComputeSlotsRequest>,
) -> Result<Json<DayAvailability>, AppError> {
    require_role(&ctx.user, STAFF)?;
    request.validate()?;

    let booked: Vec<BookedInterval> = request
        .booked
        .iter()
        .map(|slot| BookedInterval::new(slot.time, slot.duration))
        .collect();

    let availability = match request.date {
        Some(date) => {
            let reason = closure_reason(date);
            DayAvailability {
                date: Some(date),
                slots: slots_for_day(date, &request.candidates, &booked, None),
                closed: reason.is_some(),
                reason,
            }
        }
        None => DayAvailability {
            date: None,
            slots: available_slots(&request.candidates, &booked),
            closed: false,
            reason: None,
        },
    };

    Ok(Json(availability))
}
