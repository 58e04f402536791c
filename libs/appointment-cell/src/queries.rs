// libs/appointment-cell/src/queries.rs
//
// Named query structs, one per store lookup. Each renders the PostgREST
// path it stands for, so callers never assemble filter strings ad hoc.
use chrono::{DateTime, Utc};

/// Listing page size; also the hard cap per page.
pub const PAGE_SIZE: u32 = 20;

/// Directory lookup restricted to accounts carrying the provider flag.
#[derive(Debug, Clone, Copy)]
pub struct FindProviderById {
    pub id: i64,
}

impl FindProviderById {
    pub fn to_path(&self) -> String {
        format!("/rest/v1/users?id=eq.{}&provider=is.true&limit=1", self.id)
    }
}

/// Plain directory lookup, any account.
#[derive(Debug, Clone, Copy)]
pub struct FindAccountById {
    pub id: i64,
}

impl FindAccountById {
    pub fn to_path(&self) -> String {
        format!("/rest/v1/users?id=eq.{}&limit=1", self.id)
    }
}

/// The availability guard: is this provider's slot already taken by a
/// non-cancelled appointment?
#[derive(Debug, Clone, Copy)]
pub struct FindActiveAppointmentBySlot {
    pub provider_id: i64,
    pub slot: DateTime<Utc>,
}

impl FindActiveAppointmentBySlot {
    pub fn to_path(&self) -> String {
        let date = self.slot.to_rfc3339();
        format!(
            "/rest/v1/appointments?provider_id=eq.{}&canceled_at=is.null&date=eq.{}&limit=1",
            self.provider_id,
            urlencoding::encode(&date)
        )
    }
}

/// One client's active appointments, oldest slot first, paginated, with the
/// provider's public identity embedded.
#[derive(Debug, Clone, Copy)]
pub struct ListClientAppointments {
    pub client_id: i64,
    /// 1-indexed; values below 1 clamp to the first page.
    pub page: u32,
}

impl ListClientAppointments {
    pub fn offset(&self) -> u32 {
        (self.page.max(1) - 1) * PAGE_SIZE
    }

    pub fn to_path(&self) -> String {
        format!(
            "/rest/v1/appointments?user_id=eq.{}&canceled_at=is.null\
             &select=id,date,provider:users!provider_id(id,name,avatar_url)\
             &order=date.asc&limit={}&offset={}",
            self.client_id,
            PAGE_SIZE,
            self.offset()
        )
    }
}

/// Single appointment with client and provider identities embedded, as the
/// cancellation path needs them for the mail job.
#[derive(Debug, Clone, Copy)]
pub struct FindAppointmentWithParties {
    pub id: i64,
}

impl FindAppointmentWithParties {
    pub fn to_path(&self) -> String {
        format!(
            "/rest/v1/appointments?id=eq.{}\
             &select=*,client:users!user_id(id,name,email),provider:users!provider_id(id,name,email)\
             &limit=1",
            self.id
        )
    }
}
