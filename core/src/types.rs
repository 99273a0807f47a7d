//! Domain DTOs for the MessFinder API.
//!
//! # Design
//! The server is inconsistent about identifiers and relations: documents carry
//! `_id` or `id`, and a relation may arrive as a bare id string or as a
//! populated document, under `mess` on one endpoint and `mess_id` on another.
//! All of that is absorbed here, at deserialization time. [`Ref`] is the one
//! canonical relation shape, and every struct accepts the known aliases, so
//! nothing downstream of `ApiClient::parse` branches on wire shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Anything with a server-assigned identity.
pub trait Identified {
    fn id(&self) -> &str;
}

/// A relation to another server document.
///
/// `id` is always present. `doc` is set when the server populated the
/// relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Ref<T> {
    pub id: String,
    pub doc: Option<T>,
}

impl<T> Ref<T> {
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            doc: None,
        }
    }
}

impl<T: Identified> Ref<T> {
    pub fn populated(doc: T) -> Self {
        Self {
            id: doc.id().to_string(),
            doc: Some(doc),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RefWire<T> {
    Id(String),
    Doc(T),
}

impl<'de, T> Deserialize<'de> for Ref<T>
where
    T: Deserialize<'de> + Identified,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RefWire::<T>::deserialize(deserializer)? {
            RefWire::Id(id) => Ref::id_only(id),
            RefWire::Doc(doc) => Ref::populated(doc),
        })
    }
}

// Serializes back to the wire shape so a stored relation parses again.
impl<T: Serialize> Serialize for Ref<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.doc {
            Some(doc) => doc.serialize(serializer),
            None => serializer.serialize_str(&self.id),
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Owner,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Role::Student),
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Identified for User {
    fn id(&self) -> &str {
        &self.id
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Messes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessStatus {
    #[default]
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "booked")]
    Booked,
    #[serde(rename = "in progress")]
    InProgress,
}

impl MessStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MessStatus::Free => "free",
            MessStatus::Pending => "pending",
            MessStatus::Booked => "booked",
            MessStatus::InProgress => "in progress",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RatingInfo {
    pub average_rating: f64,
    pub total_reviews: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mess {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: MessStatus,
    #[serde(default)]
    pub pay_per_month: f64,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub room_type: String,
    #[serde(default)]
    pub gender_preference: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(rename = "owner", alias = "ownerId", alias = "owner_id", default)]
    pub owner: Option<Ref<User>>,
    #[serde(default)]
    pub rating_info: RatingInfo,
    #[serde(default)]
    pub view_count: u64,
}

impl Identified for Mess {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessPage {
    #[serde(default)]
    pub messes: Vec<Mess>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSlider {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub background_image: String,
}

impl Identified for HomeSlider {
    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Rejected,
    Completed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "rejected" => Some(BookingStatus::Rejected),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Online,
    Cash,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub name: String,
    pub phone: String,
}

/// A tenant may cancel only before the owner confirms and before paying.
pub fn is_cancellable(booking_status: BookingStatus, payment_status: PaymentStatus) -> bool {
    booking_status == BookingStatus::Pending && payment_status != PaymentStatus::Paid
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "user", alias = "userId", alias = "user_id", default)]
    pub user: Option<Ref<User>>,
    #[serde(rename = "mess", alias = "messId", alias = "mess_id")]
    pub mess: Ref<Mess>,
    #[serde(rename = "owner", alias = "ownerId", alias = "owner_id", default)]
    pub owner: Option<Ref<User>>,
    #[serde(default)]
    pub booking_status: BookingStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub check_in_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tenant_contact: Contact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn is_cancellable(&self) -> bool {
        is_cancellable(self.booking_status, self.payment_status)
    }
}

impl Identified for Booking {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingCounts {
    pub upcoming: u32,
    pub past: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingList {
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub counts: BookingCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub payment_url: String,
    pub transaction_id: String,
}

// ---------------------------------------------------------------------------
// Favorites and reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMess {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "user_id", alias = "user", alias = "userId", default)]
    pub user: Option<Ref<User>>,
    #[serde(rename = "mess_id", alias = "mess", alias = "messId")]
    pub mess: Ref<Mess>,
}

impl SavedMess {
    pub fn mess_id(&self) -> &str {
        &self.mess.id
    }
}

impl Identified for SavedMess {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FavoriteStatus {
    pub is_saved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "user", alias = "userId", alias = "user_id", default)]
    pub user: Option<Ref<User>>,
    #[serde(rename = "mess", alias = "messId", alias = "mess_id")]
    pub mess: Ref<Mess>,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Review {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Auth payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Response to a credential submission.
///
/// The usual answer is an OTP challenge. Accounts exempt from the second
/// factor receive `token` and `user` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginChallenge {
    #[serde(default = "default_true")]
    pub otp_required: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Mutation payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub mess_id: String,
    pub check_in_date: NaiveDate,
    pub tenant_contact: Contact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<Contact>,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBooking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusUpdate {
    pub booking_status: BookingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePayment {
    pub booking_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub mess_id: String,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFavorite {
    pub mess_id: String,
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminStats {
    pub total_users: u32,
    pub total_messes: u32,
    pub total_bookings: u32,
    pub pending_messes: u32,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserActive {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessStatusUpdate {
    pub status: MessStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlider {
    pub background_image: String,
}
