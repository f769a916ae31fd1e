//! Seat assignments, the main consumer of [`Assignee`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::users::{Assignee, Team};
use crate::pagination::Page;

/// One billed seat and who it is assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatAssignment {
    /// User, team or organization holding the seat.
    pub assignee: Assignee,

    /// Team through which the seat was granted, if any.
    #[serde(default)]
    pub assigning_team: Option<Team>,

    #[serde(default)]
    pub pending_cancellation_date: Option<String>,

    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_activity_editor: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Envelope for the seat listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatsPage {
    pub total_seats: u64,
    pub seats: Vec<SeatAssignment>,
}

impl Page for SeatsPage {
    type Item = SeatAssignment;

    fn into_items(self) -> Vec<SeatAssignment> {
        self.seats
    }
}
