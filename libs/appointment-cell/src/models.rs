// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// How far ahead of the slot a client may still cancel.
pub const CANCELLATION_LEAD_TIME_HOURS: i64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    /// Client who booked the slot.
    pub user_id: i64,
    pub provider_id: i64,
    /// Hour-aligned slot; minutes and below are always zero.
    pub date: DateTime<Utc>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_past(&self) -> bool {
        self.date < Utc::now()
    }

    pub fn is_cancelable(&self) -> bool {
        self.canceled_at.is_none()
            && Utc::now() < self.date - Duration::hours(CANCELLATION_LEAD_TIME_HOURS)
    }
}

/// Account record from the user directory. Read-only here; the `provider`
/// flag is a capability marker, not a subtype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub provider: bool,
    pub avatar_url: Option<String>,
}

/// Client or provider identity as embedded in appointment lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyIdentity {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Appointment with both parties resolved, as needed by cancellation and
/// the mail job payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentWithParties {
    #[serde(flatten)]
    pub record: Appointment,
    pub client: PartyIdentity,
    pub provider: PartyIdentity,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Raw booking payload. Shape validation (presence, parseability) is part
/// of the booking pipeline, so both fields arrive optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub provider_id: Option<i64>,
    pub date: Option<String>,
}

/// Provider's public identity attached to listing entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSummary {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Listing row as returned by the store's embedded select.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientAppointmentRow {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub provider: ProviderSummary,
}

/// Listing entry enriched with the derived flags.
#[derive(Debug, Clone, Serialize)]
pub struct ClientAppointment {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub past: bool,
    pub cancelable: bool,
    pub provider: ProviderSummary,
}

impl ClientAppointment {
    pub fn from_row(row: ClientAppointmentRow, now: DateTime<Utc>) -> Self {
        Self {
            id: row.id,
            past: row.date < now,
            cancelable: now < row.date - Duration::hours(CANCELLATION_LEAD_TIME_HOURS),
            date: row.date,
            provider: row.provider,
        }
    }
}

// ==============================================================================
// TIME HELPERS
// ==============================================================================

/// Truncate a timestamp down to the start of its hour, the canonical slot
/// granularity. All slot comparisons operate on this value.
pub fn start_of_hour(date: DateTime<Utc>) -> DateTime<Utc> {
    date.with_minute(0)
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(date)
}

/// Human-readable slot for notifications and mail, e.g. "June 22 at 8:00 PM".
pub fn format_slot(date: DateTime<Utc>) -> String {
    date.format("%B %-d at %-I:%M %p").to_string()
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    InvalidInput(String),

    #[error("You cannot book an appointment with yourself")]
    SelfBookingNotAllowed,

    #[error("You can only create appointments with providers")]
    NotAProvider,

    #[error("Past dates are not permitted")]
    PastDateNotAllowed,

    #[error("Appointment date is not available")]
    SlotUnavailable,

    #[error("Appointment not found")]
    NotFound,

    #[error("You don't have permission to cancel this appointment")]
    NotOwner,

    #[error("You can only cancel appointments 2 hours in advance")]
    CancellationWindowExpired,

    #[error("Database error: {0}")]
    Database(String),
}
