// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use mail_queue_cell::{CancellationMailJob, CancellationMailQueue};
use notification_cell::NotificationStore;
use shared_database::{PostgrestClient, StoreError};

use crate::models::{
    format_slot, start_of_hour, Appointment, AppointmentWithParties, BookAppointmentRequest,
    BookingError, ClientAppointment, ClientAppointmentRow, CANCELLATION_LEAD_TIME_HOURS,
};
use crate::queries::{
    FindActiveAppointmentBySlot, FindAppointmentWithParties, ListClientAppointments,
};
use crate::services::directory::AccountDirectory;

/// The Appointment Service: validates booking requests, enforces the
/// business rules, and orchestrates the stores. Store clients are injected
/// once at process start; the service holds no other state.
pub struct AppointmentBookingService {
    store: Arc<PostgrestClient>,
    directory: AccountDirectory,
    notifications: Arc<NotificationStore>,
    /// `None` when Redis is not configured or unreachable at startup; the
    /// cancellation path then logs instead of enqueueing.
    mail_queue: Option<Arc<CancellationMailQueue>>,
}

impl AppointmentBookingService {
    pub fn new(
        store: Arc<PostgrestClient>,
        notifications: Arc<NotificationStore>,
        mail_queue: Option<Arc<CancellationMailQueue>>,
    ) -> Self {
        let directory = AccountDirectory::new(Arc::clone(&store));
        Self {
            store,
            directory,
            notifications,
            mail_queue,
        }
    }

    /// List up to one page of the client's active appointments, oldest slot
    /// first, each with the provider's public identity attached.
    pub async fn list_appointments(
        &self,
        client_id: i64,
        page: u32,
    ) -> Result<Vec<ClientAppointment>, BookingError> {
        debug!("Listing appointments for client {} page {}", client_id, page);

        let query = ListClientAppointments { client_id, page };
        let rows: Vec<ClientAppointmentRow> = self
            .store
            .select(&query.to_path())
            .await
            .map_err(db_error)?;

        let now = Utc::now();
        Ok(rows
            .into_iter()
            .map(|row| ClientAppointment::from_row(row, now))
            .collect())
    }

    /// Book a slot with a provider. The validation pipeline runs in order
    /// and short-circuits on the first failing guard.
    pub async fn book_appointment(
        &self,
        client_id: i64,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        // Step 1: shape validation.
        let provider_id = request
            .provider_id
            .ok_or_else(|| BookingError::InvalidInput("provider_id is required".to_string()))?;
        let raw_date = request
            .date
            .as_deref()
            .ok_or_else(|| BookingError::InvalidInput("date is required".to_string()))?;
        let date = DateTime::parse_from_rfc3339(raw_date)
            .map_err(|_| {
                BookingError::InvalidInput("date must be a valid RFC 3339 timestamp".to_string())
            })?
            .with_timezone(&Utc);

        info!(
            "Booking appointment for client {} with provider {}",
            client_id, provider_id
        );

        // Step 2: self-booking guard.
        if provider_id == client_id {
            return Err(BookingError::SelfBookingNotAllowed);
        }

        // Step 3: the target must exist and carry the provider flag.
        let provider = self
            .directory
            .find_provider_by_id(provider_id)
            .await
            .map_err(db_error)?
            .ok_or(BookingError::NotAProvider)?;

        // Step 4: canonical slot granularity.
        let slot = start_of_hour(date);

        // Step 5: past-date guard.
        if slot < Utc::now() {
            return Err(BookingError::PastDateNotAllowed);
        }

        // Step 6: availability guard. Check-then-create is not atomic; the
        // store's partial unique index backstops concurrent bookings and
        // surfaces as a conflict on insert below.
        let query = FindActiveAppointmentBySlot { provider_id, slot };
        let taken: Vec<Appointment> = self
            .store
            .select(&query.to_path())
            .await
            .map_err(db_error)?;
        if !taken.is_empty() {
            return Err(BookingError::SlotUnavailable);
        }

        // Step 7: persist, then notify the provider best-effort.
        let appointment: Appointment = match self
            .store
            .insert(
                "appointments",
                json!({
                    "user_id": client_id,
                    "provider_id": provider_id,
                    "date": slot.to_rfc3339(),
                }),
            )
            .await
        {
            Ok(appointment) => appointment,
            Err(StoreError::Conflict(_)) => return Err(BookingError::SlotUnavailable),
            Err(e) => return Err(db_error(e)),
        };

        self.notify_provider(provider.id, client_id, slot).await;

        info!(
            "Appointment {} booked with provider {} at {}",
            appointment.id, provider_id, slot
        );
        Ok(appointment)
    }

    /// Cancel an appointment on behalf of its owner. Cancelling an
    /// already-cancelled appointment is idempotent: the record comes back
    /// unchanged and no second mail job is enqueued.
    pub async fn cancel_appointment(
        &self,
        requester_id: i64,
        appointment_id: i64,
    ) -> Result<Appointment, BookingError> {
        debug!("Cancelling appointment {}", appointment_id);

        let query = FindAppointmentWithParties { id: appointment_id };
        let rows: Vec<AppointmentWithParties> = self
            .store
            .select(&query.to_path())
            .await
            .map_err(db_error)?;
        let appointment = rows.into_iter().next().ok_or(BookingError::NotFound)?;

        if appointment.record.user_id != requester_id {
            return Err(BookingError::NotOwner);
        }

        if appointment.record.canceled_at.is_some() {
            debug!("Appointment {} already cancelled", appointment_id);
            return Ok(appointment.record);
        }

        let now = Utc::now();
        if appointment.record.date - ChronoDuration::hours(CANCELLATION_LEAD_TIME_HOURS) <= now {
            return Err(BookingError::CancellationWindowExpired);
        }

        let updated: Appointment = self
            .store
            .update(
                "appointments",
                &format!("id=eq.{}", appointment_id),
                json!({ "canceled_at": now.to_rfc3339() }),
            )
            .await
            .map_err(db_error)?;

        self.enqueue_cancellation_mail(&appointment, now).await;

        info!("Appointment {} cancelled", appointment_id);
        Ok(updated)
    }

    /// Best-effort provider notification; never fails the booking.
    async fn notify_provider(&self, provider_id: i64, client_id: i64, slot: DateTime<Utc>) {
        let client_name = match self.directory.find_by_id(client_id).await {
            Ok(Some(account)) => account.name,
            Ok(None) => {
                warn!(
                    "Client {} vanished before notification write, skipping",
                    client_id
                );
                return;
            }
            Err(e) => {
                warn!("Client lookup failed before notification write: {}", e);
                return;
            }
        };

        let content = format!(
            "New appointment from {} on {}",
            client_name,
            format_slot(slot)
        );
        if let Err(e) = self.notifications.create(&content, provider_id).await {
            warn!(
                "Failed to write booking notification for provider {}: {}",
                provider_id, e
            );
        }
    }

    /// Best-effort enqueue of the cancellation mail; never undoes the
    /// cancellation itself.
    async fn enqueue_cancellation_mail(
        &self,
        appointment: &AppointmentWithParties,
        canceled_at: DateTime<Utc>,
    ) {
        let Some(queue) = &self.mail_queue else {
            warn!(
                "Mail queue disabled, skipping cancellation mail for appointment {}",
                appointment.record.id
            );
            return;
        };

        let job = CancellationMailJob::new(
            appointment.record.id,
            appointment.record.date,
            canceled_at,
            appointment.client.name.clone(),
            appointment.provider.name.clone(),
            appointment.provider.email.clone(),
            format_slot(appointment.record.date),
        );

        if let Err(e) = queue.enqueue(&job).await {
            warn!(
                "Failed to enqueue cancellation mail for appointment {}: {}",
                appointment.record.id, e
            );
        }
    }
}

fn db_error(e: StoreError) -> BookingError {
    BookingError::Database(e.to_string())
}
