//! Identity types for Canvass entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Survey identifier using UUIDv7 for timestamp-sortable IDs.
pub type SurveyId = Uuid;

/// Response identifier.
pub type ResponseId = Uuid;

/// User identifier. Issued by the external identity collaborator and
/// carried verbatim in JWT claims; never minted by this service.
pub type UserId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 entity ID (timestamp-sortable).
pub fn new_entity_id() -> Uuid {
    Uuid::now_v7()
}
