//! Item (listing) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// How an item is offered on the marketplace.
/// The give-away variant keeps the legacy `Share` code in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ItemType {
    #[serde(rename = "Share")]
    GiveAway,
    Sell,
    Rent,
}

impl ItemType {
    /// Return the legacy string code for this item type
    pub fn as_code(&self) -> &'static str {
        match self {
            ItemType::GiveAway => "Share",
            ItemType::Sell => "Sell",
            ItemType::Rent => "Rent",
        }
    }

    /// Whether this offer type requires a price
    pub fn requires_price(&self) -> bool {
        matches!(self, ItemType::Sell | ItemType::Rent)
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ItemType::GiveAway => "Give Away",
            ItemType::Sell => "Sell",
            ItemType::Rent => "Rent",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Share" => Ok(ItemType::GiveAway),
            "Sell" => Ok(ItemType::Sell),
            "Rent" => Ok(ItemType::Rent),
            _ => Err(format!("Invalid item type: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for ItemType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for ItemType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for ItemType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_code().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Marketplace status of an item, driven by the request lifecycle.
/// Independent of the `is_available` listing flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Requested,
    Given,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Requested => "requested",
            ItemStatus::Given => "given",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(ItemStatus::Available),
            "requested" => Ok(ItemStatus::Requested),
            "given" => Ok(ItemStatus::Given),
            _ => Err(format!("Invalid item status: {}", s)),
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Available
    }
}

impl sqlx::Type<Postgres> for ItemStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for ItemStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for ItemStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Item model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub description: String,
    pub category_id: Option<i32>,
    pub item_type: ItemType,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub is_available: bool,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact item representation for listings and request views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ItemShort {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub item_type: ItemType,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub is_available: bool,
    pub status: ItemStatus,
}

/// Create/update item payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ItemInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub category_id: Option<i32>,
    pub item_type: ItemType,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
}

impl ItemInput {
    /// Price rules depending on offer type: give-away items cannot carry a
    /// price, selling or renting items require one.
    pub fn check_price_rules(&self) -> Result<(), String> {
        match self.item_type {
            ItemType::GiveAway if self.price.is_some() => {
                Err("Give away items cannot have a price".to_string())
            }
            ItemType::Sell | ItemType::Rent if self.price.is_none() => {
                Err("Selling or renting items require a price".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Query parameters for item search
#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemQuery {
    /// Search in title and description
    pub search: Option<String>,
    /// Filter by category ID
    pub category: Option<i32>,
    /// Filter by item type code (Share, Sell, Rent)
    pub item_type: Option<String>,
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 12)
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn input(item_type: ItemType, price: Option<Decimal>) -> ItemInput {
        ItemInput {
            title: "Ladder".to_string(),
            description: "3m aluminium ladder".to_string(),
            category_id: None,
            item_type,
            price,
        }
    }

    #[test]
    fn give_away_items_cannot_have_a_price() {
        assert!(input(ItemType::GiveAway, Some(Decimal::new(500, 2)))
            .check_price_rules()
            .is_err());
        assert!(input(ItemType::GiveAway, None).check_price_rules().is_ok());
    }

    #[test]
    fn sell_and_rent_require_a_price() {
        assert!(input(ItemType::Sell, None).check_price_rules().is_err());
        assert!(input(ItemType::Rent, None).check_price_rules().is_err());
        assert!(input(ItemType::Sell, Some(Decimal::new(1000, 2)))
            .check_price_rules()
            .is_ok());
    }

    #[test]
    fn item_type_keeps_legacy_share_code() {
        assert_eq!(ItemType::GiveAway.as_code(), "Share");
        assert_eq!("Share".parse::<ItemType>(), Ok(ItemType::GiveAway));
        assert_eq!(ItemType::GiveAway.to_string(), "Give Away");
    }

    #[test]
    fn item_status_parse_is_case_insensitive() {
        assert_eq!("Requested".parse::<ItemStatus>(), Ok(ItemStatus::Requested));
        assert_eq!("available".parse::<ItemStatus>(), Ok(ItemStatus::Available));
        assert!("claimed".parse::<ItemStatus>().is_err());
    }
}
