use serde::Serialize;

use crate::api::ApiClient;
use crate::error::{AppError, AppResult};
use crate::models::{Booking, BookingStatus};

/// Payload for creating (or recreating) a booking. The server resolves
/// `nombreInstructor` and stamps the initial status itself.
#[derive(Debug, Clone, Serialize)]
pub struct NewBooking {
    #[serde(rename = "alumno")]
    pub student: String,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "hora")]
    pub time: String,
    #[serde(rename = "instructorId")]
    pub instructor_id: i64,
    #[serde(rename = "lugar")]
    pub place: Option<String>,
    #[serde(rename = "tarifa")]
    pub rate: Option<f64>,
    #[serde(rename = "horas")]
    pub hours: Option<f64>,
    #[serde(rename = "horasPagadas")]
    pub amount_paid: Option<f64>,
    #[serde(rename = "hotelDerivacion")]
    pub hotel_referral: Option<String>,
    #[serde(rename = "estado")]
    pub status: BookingStatus,
}

pub async fn fetch_all(api: &ApiClient) -> AppResult<Vec<Booking>> {
    let mut bookings: Vec<Booking> = api.get_json("/api/agenda/listar").await?;
    sort_for_display(&mut bookings);
    Ok(bookings)
}

pub async fn fetch_for_instructor(api: &ApiClient, instructor_id: i64) -> AppResult<Vec<Booking>> {
    let mut bookings: Vec<Booking> = api
        .get_json(&format!("/api/agenda/instructor/{instructor_id}"))
        .await?;
    sort_for_display(&mut bookings);
    Ok(bookings)
}

/// Canonical display order: open requests first, then confirmed, then
/// rejected history; newest date wins within each group.
pub fn sort_for_display(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| {
        status_rank(a.status)
            .cmp(&status_rank(b.status))
            .then_with(|| b.date.cmp(&a.date))
            .then_with(|| b.time.cmp(&a.time))
    });
}

fn status_rank(status: BookingStatus) -> u8 {
    match status {
        BookingStatus::Pendiente => 0,
        BookingStatus::Confirmada => 1,
        BookingStatus::Rechazada => 2,
    }
}

/// Guard for the confirm/reject transition. PENDIENTE is the only state
/// that can move, and it can only move forward.
pub fn apply_transition(booking: &mut Booking, new_status: BookingStatus) -> AppResult<()> {
    if new_status == BookingStatus::Pendiente {
        return Err(AppError::Validation(
            "A booking cannot be moved back to PENDIENTE".to_string(),
        ));
    }
    if booking.status != BookingStatus::Pendiente {
        return Err(AppError::Validation(format!(
            "Only a PENDIENTE booking can become {new_status}; this one is {}",
            booking.status
        )));
    }
    booking.status = new_status;
    Ok(())
}

/// Optimistic confirm/reject: patch the local row, then persist. If the
/// server rejects the update, the whole list is reloaded so local state
/// never keeps a phantom transition.
pub async fn transition(
    api: &ApiClient,
    bookings: &mut Vec<Booking>,
    id: i64,
    new_status: BookingStatus,
) -> AppResult<()> {
    let booking = bookings
        .iter_mut()
        .find(|b| b.id == Some(id))
        .ok_or_else(|| AppError::NotFound(format!("No booking with id {id}")))?;
    apply_transition(booking, new_status)?;

    match api
        .put_text(&format!("/api/agenda/{id}/estado"), new_status.as_str())
        .await
    {
        Ok(()) => Ok(()),
        Err(e) => {
            match fetch_all(api).await {
                Ok(fresh) => *bookings = fresh,
                Err(reload) => {
                    tracing::warn!("Reload after a failed status update also failed: {reload}")
                }
            }
            Err(e)
        }
    }
}

pub async fn create(api: &ApiClient, draft: &NewBooking) -> AppResult<Booking> {
    api.post_json("/api/agenda/crear", draft).await
}

/// Builds the replacement booking for a rejected one: same class, a
/// possibly different instructor, status reset to PENDIENTE. This is a
/// create; the rejected record stays RECHAZADA for history.
pub fn reassignment_draft(rejected: &Booking, new_instructor_id: i64) -> AppResult<NewBooking> {
    if rejected.status != BookingStatus::Rechazada {
        return Err(AppError::Validation(format!(
            "Only a RECHAZADA booking can be reassigned; this one is {}",
            rejected.status
        )));
    }
    Ok(NewBooking {
        student: rejected.student.clone(),
        date: rejected.date.clone(),
        time: rejected.time.clone(),
        instructor_id: new_instructor_id,
        place: rejected.place.clone(),
        rate: rejected.rate,
        hours: rejected.hours,
        amount_paid: rejected.amount_paid,
        hotel_referral: rejected.hotel_referral.clone(),
        status: BookingStatus::Pendiente,
    })
}

pub async fn reassign(
    api: &ApiClient,
    rejected: &Booking,
    new_instructor_id: i64,
) -> AppResult<Booking> {
    let draft = reassignment_draft(rejected, new_instructor_id)?;
    create(api, &draft).await
}
