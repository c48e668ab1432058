//! Item request model and lifecycle types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

use super::item::ItemShort;
use super::user::UserShort;

/// Lifecycle status of an item request.
///
/// `Accepted` and `Rejected` are both terminal for the record itself; they
/// differ in whether they block a new request for the same (item, requester)
/// pair. Only `Accepted` frees the pair for a new cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Accepted => "Accepted",
            RequestStatus::Rejected => "Rejected",
        }
    }

    /// Lenient parse for query-string filters: unrecognized values mean
    /// "no filter" rather than an error.
    pub fn parse_filter(value: Option<&str>) -> Option<RequestStatus> {
        value.and_then(|s| s.parse().ok())
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RequestStatus::Pending),
            "Accepted" => Ok(RequestStatus::Accepted),
            "Rejected" => Ok(RequestStatus::Rejected),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        RequestStatus::Pending
    }
}

// SQLx conversion for RequestStatus (stored as its string code)
impl sqlx::Type<Postgres> for RequestStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for RequestStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for RequestStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Item request row from the ledger.
///
/// Immutable after creation except for `status`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ItemRequest {
    pub id: i32,
    pub item_id: i32,
    pub requested_by_id: i32,
    pub status: RequestStatus,
    pub requested_date: DateTime<Utc>,
}

/// Request with item and requester details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestDetails {
    pub id: i32,
    pub status: RequestStatus,
    pub requested_date: DateTime<Utc>,
    pub item: ItemShort,
    pub requested_by: UserShort,
}

/// Outcome of a request submission.
///
/// `AlreadyRequested` is not a failure: the existing blocking request is
/// carried back to the caller for display, and no new row is written.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Created(ItemRequest),
    AlreadyRequested(ItemRequest),
}

impl SubmitOutcome {
    pub fn request(&self) -> &ItemRequest {
        match self {
            SubmitOutcome::Created(r) | SubmitOutcome::AlreadyRequested(r) => r,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, SubmitOutcome::Created(_))
    }
}

/// Query parameters for request listings
#[derive(Debug, Deserialize, IntoParams)]
pub struct RequestQuery {
    /// Status filter (Pending, Accepted, Rejected); unknown values are ignored
    pub status: Option<String>,
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 10)
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_through_string_code() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Accepted,
            RequestStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<RequestStatus>(), Ok(status));
        }
    }

    #[test]
    fn status_parse_rejects_unknown_values() {
        assert!("pending".parse::<RequestStatus>().is_err());
        assert!("Cancelled".parse::<RequestStatus>().is_err());
        assert!("".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn filter_parse_is_lenient() {
        assert_eq!(
            RequestStatus::parse_filter(Some("Pending")),
            Some(RequestStatus::Pending)
        );
        assert_eq!(RequestStatus::parse_filter(Some("bogus")), None);
        assert_eq!(RequestStatus::parse_filter(None), None);
    }

    #[test]
    fn default_status_is_pending() {
        assert_eq!(RequestStatus::default(), RequestStatus::Pending);
    }
}
