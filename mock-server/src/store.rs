//! In-memory data behind the mock API, with a fixed seed.
//!
//! Records keep relations as plain ids. The `*_json` renderers decide per
//! endpoint whether a relation goes out populated or as a bare id, the same
//! inconsistency the real backend has.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Every OTP the mock issues.
pub const DEMO_OTP: &str = "123456";
/// Password of every seeded account.
pub const DEMO_PASSWORD: &str = "password123";

pub const STUDENT_EMAIL: &str = "student@messfinder.test";
pub const OWNER_EMAIL: &str = "owner@messfinder.test";
pub const ADMIN_EMAIL: &str = "admin@messfinder.test";

pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[derive(Clone, Debug)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub password: String,
    pub is_active: bool,
}

impl User {
    pub fn to_json(&self) -> Value {
        json!({
            "_id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "role": self.role,
            "isActive": self.is_active,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Mess {
    pub id: String,
    pub title: String,
    pub description: String,
    pub address: String,
    pub status: String,
    pub pay_per_month: f64,
    pub facilities: Vec<String>,
    pub room_type: String,
    pub gender_preference: String,
    pub images: Vec<String>,
    pub owner_id: String,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Mess {
    /// `owner` populated when given, bare `ownerId` otherwise.
    pub fn to_json(&self, owner: Option<&User>) -> Value {
        let mut value = json!({
            "_id": self.id,
            "title": self.title,
            "description": self.description,
            "address": self.address,
            "status": self.status,
            "payPerMonth": self.pay_per_month,
            "facilities": self.facilities,
            "roomType": self.room_type,
            "genderPreference": self.gender_preference,
            "images": self.images,
            "ratingInfo": {
                "averageRating": self.average_rating,
                "totalReviews": self.total_reviews,
            },
            "viewCount": self.view_count,
            "createdAt": self.created_at,
        });
        match owner {
            Some(owner) => value["owner"] = owner.to_json(),
            None => value["ownerId"] = json!(self.owner_id),
        }
        value
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Clone, Debug)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub mess_id: String,
    pub owner_id: String,
    pub booking_status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub total_amount: f64,
    pub check_in_date: DateTime<Utc>,
    pub tenant_contact: Contact,
    pub emergency_contact: Option<Contact>,
    pub notes: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_cancellable(&self) -> bool {
        self.booking_status == "pending" && self.payment_status != "paid"
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.check_in_date >= now && matches!(self.booking_status.as_str(), "pending" | "confirmed")
    }

    /// The mess goes out populated under `messId` when given.
    pub fn to_json(&self, mess: Option<&Mess>) -> Value {
        let mut value = json!({
            "_id": self.id,
            "userId": self.user_id,
            "ownerId": self.owner_id,
            "bookingStatus": self.booking_status,
            "paymentStatus": self.payment_status,
            "paymentMethod": self.payment_method,
            "totalAmount": self.total_amount,
            "checkInDate": self.check_in_date,
            "tenantContact": self.tenant_contact,
            "createdAt": self.created_at,
        });
        value["messId"] = match mess {
            Some(mess) => mess.to_json(None),
            None => json!(self.mess_id),
        };
        if let Some(contact) = &self.emergency_contact {
            value["emergencyContact"] = json!(contact);
        }
        if let Some(notes) = &self.notes {
            value["notes"] = json!(notes);
        }
        if let Some(tx) = &self.transaction_id {
            value["transactionId"] = json!(tx);
        }
        value
    }
}

#[derive(Clone, Debug)]
pub struct Favorite {
    pub id: String,
    pub user_id: String,
    pub mess_id: String,
}

impl Favorite {
    /// Snake-case relation keys, as the favorites endpoints send them.
    pub fn to_json(&self, mess: Option<&Mess>) -> Value {
        json!({
            "_id": self.id,
            "user_id": self.user_id,
            "mess_id": match mess {
                Some(mess) => mess.to_json(None),
                None => json!(self.mess_id),
            },
        })
    }
}

#[derive(Clone, Debug)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub mess_id: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn to_json(&self, user: Option<&User>) -> Value {
        json!({
            "_id": self.id,
            "user": match user {
                Some(user) => user.to_json(),
                None => json!(self.user_id),
            },
            "messId": self.mess_id,
            "rating": self.rating,
            "comment": self.comment,
            "createdAt": self.created_at,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Slider {
    pub id: String,
    pub background_image: String,
}

impl Slider {
    pub fn to_json(&self) -> Value {
        json!({"_id": self.id, "backgroundImage": self.background_image})
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub users: Vec<User>,
    pub messes: Vec<Mess>,
    pub bookings: Vec<Booking>,
    pub favorites: Vec<Favorite>,
    pub reviews: Vec<Review>,
    pub sliders: Vec<Slider>,
    /// bearer token -> user id
    pub sessions: HashMap<String, String>,
    /// email -> outstanding OTP
    pub otps: HashMap<String, String>,
}

impl Store {
    pub fn seeded() -> Self {
        let now = Utc::now();
        let user = |id: &str, name: &str, email: &str, role: &str| User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: "01712345678".to_string(),
            role: role.to_string(),
            password: DEMO_PASSWORD.to_string(),
            is_active: true,
        };
        let users = vec![
            user("user-student", "Rafi Ahmed", STUDENT_EMAIL, "student"),
            user("user-owner", "Karim Mia", OWNER_EMAIL, "owner"),
            user("user-admin", "Admin", ADMIN_EMAIL, "admin"),
        ];

        let areas = ["Dhanmondi", "Mirpur", "Uttara", "Mohammadpur", "Farmgate", "Banani"];
        let messes = (1..=12u32)
            .map(|n| Mess {
                id: format!("mess-{n:02}"),
                title: format!("{} Student Mess {n}", areas[n as usize % areas.len()]),
                description: "Furnished rooms close to campus.".to_string(),
                address: format!("House {n}, Road {}, {}, Dhaka", n + 2, areas[n as usize % areas.len()]),
                status: if n == 3 { "booked" } else { "free" }.to_string(),
                pay_per_month: f64::from(3000 + n * 250),
                facilities: vec!["wifi".to_string(), "meal".to_string()],
                room_type: if n % 2 == 0 { "single" } else { "shared" }.to_string(),
                gender_preference: if n % 3 == 0 { "female" } else { "male" }.to_string(),
                images: vec![format!("https://img.messfinder.test/mess-{n:02}.jpg")],
                owner_id: "user-owner".to_string(),
                average_rating: 0.0,
                total_reviews: 0,
                view_count: 0,
                created_at: now - Duration::days(i64::from(n)),
            })
            .collect();

        let sliders = vec![
            Slider {
                id: "slider-1".to_string(),
                background_image: "https://img.messfinder.test/slider-1.jpg".to_string(),
            },
            Slider {
                id: "slider-2".to_string(),
                background_image: "https://img.messfinder.test/slider-2.jpg".to_string(),
            },
        ];

        Self {
            users,
            messes,
            sliders,
            ..Self::default()
        }
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn mess(&self, id: &str) -> Option<&Mess> {
        self.messes.iter().find(|m| m.id == id)
    }

    pub fn mess_with_owner(&self, mess: &Mess) -> Value {
        mess.to_json(self.user(&mess.owner_id))
    }

    pub fn booking_json(&self, booking: &Booking) -> Value {
        booking.to_json(self.mess(&booking.mess_id))
    }

    pub fn issue_token(&mut self, user_id: &str) -> String {
        let token = new_id();
        self.sessions.insert(token.clone(), user_id.to_string());
        token
    }

    /// Recompute a listing's rating summary from its reviews.
    pub fn refresh_rating(&mut self, mess_id: &str) {
        let ratings: Vec<u8> = self
            .reviews
            .iter()
            .filter(|r| r.mess_id == mess_id)
            .map(|r| r.rating)
            .collect();
        if let Some(mess) = self.messes.iter_mut().find(|m| m.id == mess_id) {
            mess.total_reviews = ratings.len() as u32;
            mess.average_rating = if ratings.is_empty() {
                0.0
            } else {
                ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64
            };
        }
    }
}

/// Midnight UTC of a `YYYY-MM-DD` date.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// `(page, limit, total_pages)` after clamping; page and limit are at least 1.
pub fn page_window(total: usize, page: Option<u32>, limit: Option<u32>) -> (u32, u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(10).clamp(1, 100);
    let total_pages = (total as u32).div_ceil(limit);
    (page, limit, total_pages)
}

pub fn paginate<T: Clone>(items: &[T], page: Option<u32>, limit: Option<u32>) -> (Vec<T>, Value) {
    let (page, limit, total_pages) = page_window(items.len(), page, limit);
    let start = ((page - 1) * limit) as usize;
    let slice = items.iter().skip(start).take(limit as usize).cloned().collect();
    let pagination = json!({
        "page": page,
        "limit": limit,
        "total": items.len(),
        "totalPages": total_pages,
    });
    (slice, pagination)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_two_pages_of_listings() {
        let store = Store::seeded();
        let (first, pagination) = paginate(&store.messes, Some(1), Some(10));
        assert_eq!(first.len(), 10);
        assert_eq!(pagination["totalPages"], 2);
        let (second, _) = paginate(&store.messes, Some(2), Some(10));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let (items, pagination) = paginate(&[1, 2, 3], Some(5), Some(2));
        assert!(items.is_empty());
        assert_eq!(pagination["page"], 5);
        assert_eq!(pagination["totalPages"], 2);
    }

    #[test]
    fn favorite_sends_snake_case_relation() {
        let store = Store::seeded();
        let favorite = Favorite {
            id: "f1".to_string(),
            user_id: "user-student".to_string(),
            mess_id: "mess-01".to_string(),
        };
        let populated = favorite.to_json(store.mess("mess-01"));
        assert_eq!(populated["mess_id"]["_id"], "mess-01");
        assert_eq!(favorite.to_json(None)["mess_id"], "mess-01");
    }

    #[test]
    fn booking_cancel_rule() {
        let now = Utc::now();
        let mut booking = Booking {
            id: "b1".to_string(),
            user_id: "u".to_string(),
            mess_id: "m".to_string(),
            owner_id: "o".to_string(),
            booking_status: "pending".to_string(),
            payment_status: "pending".to_string(),
            payment_method: "online".to_string(),
            total_amount: 1.0,
            check_in_date: now,
            tenant_contact: Contact::default(),
            emergency_contact: None,
            notes: None,
            transaction_id: None,
            created_at: now,
        };
        assert!(booking.is_cancellable());
        booking.payment_status = "paid".to_string();
        assert!(!booking.is_cancellable());
    }

    #[test]
    fn rating_summary_follows_reviews() {
        let mut store = Store::seeded();
        for rating in [4, 5] {
            store.reviews.push(Review {
                id: new_id(),
                user_id: "user-student".to_string(),
                mess_id: "mess-01".to_string(),
                rating,
                comment: "ok".to_string(),
                created_at: Utc::now(),
            });
        }
        store.refresh_rating("mess-01");
        let mess = store.mess("mess-01").unwrap();
        assert_eq!(mess.total_reviews, 2);
        assert!((mess.average_rating - 4.5).abs() < f64::EPSILON);
    }
}
