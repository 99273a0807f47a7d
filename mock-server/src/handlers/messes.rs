use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::store::{paginate, Mess, Store};
use crate::{authenticate, ok, require_role, AppError, Db, Reply};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessFilter {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub q: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub room_type: Option<String>,
    pub gender_preference: Option<String>,
    pub facilities: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

impl MessFilter {
    fn matches(&self, mess: &Mess) -> bool {
        let text = self
            .q
            .as_deref()
            .or(self.search.as_deref())
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        if let Some(text) = text {
            let hit = mess.title.to_lowercase().contains(&text)
                || mess.address.to_lowercase().contains(&text)
                || mess.description.to_lowercase().contains(&text);
            if !hit {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| mess.pay_per_month < min)
            || self.max_price.is_some_and(|max| mess.pay_per_month > max)
        {
            return false;
        }
        if self.room_type.as_ref().is_some_and(|t| *t != mess.room_type)
            || self.gender_preference.as_ref().is_some_and(|g| *g != mess.gender_preference)
            || self.status.as_ref().is_some_and(|s| *s != mess.status)
        {
            return false;
        }
        match &self.facilities {
            Some(wanted) => wanted
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .all(|f| mess.facilities.iter().any(|have| have == f)),
            None => true,
        }
    }

    fn order(&self, messes: &mut [Mess]) {
        match self.sort.as_deref() {
            Some("price_low") => messes.sort_by(|a, b| a.pay_per_month.total_cmp(&b.pay_per_month)),
            Some("price_high") => messes.sort_by(|a, b| b.pay_per_month.total_cmp(&a.pay_per_month)),
            Some("rating") => messes.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating)),
            _ => messes.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }

    fn render(&self, store: &Store, owner_id: Option<&str>) -> Value {
        let mut found: Vec<Mess> = store
            .messes
            .iter()
            .filter(|mess| owner_id.is_none_or(|owner| mess.owner_id == owner))
            .filter(|mess| self.matches(mess))
            .cloned()
            .collect();
        self.order(&mut found);
        let (items, pagination) = paginate(&found, self.page, self.limit);
        let messes: Vec<Value> = items.iter().map(|mess| mess.to_json(None)).collect();
        json!({"messes": messes, "pagination": pagination})
    }
}

pub async fn list(State(db): State<Db>, Query(filter): Query<MessFilter>) -> Reply {
    let store = db.read().await;
    ok("Messes fetched", filter.render(&store, None))
}

pub async fn search(State(db): State<Db>, Query(filter): Query<MessFilter>) -> Reply {
    let store = db.read().await;
    ok("Search results", filter.render(&store, None))
}

/// Detail view; counts as a view.
pub async fn get_one(State(db): State<Db>, Path(id): Path<String>) -> Reply {
    let mut store = db.write().await;
    let mess = store
        .messes
        .iter_mut()
        .find(|mess| mess.id == id)
        .ok_or_else(|| AppError::not_found("Mess not found"))?;
    mess.view_count += 1;
    let mess = mess.clone();
    ok("Mess fetched", store.mess_with_owner(&mess))
}

pub async fn owner_listings(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filter): Query<MessFilter>,
) -> Reply {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    require_role(&user, &["owner", "admin"])?;
    ok("Your messes", filter.render(&store, Some(&user.id)))
}

pub async fn sliders(State(db): State<Db>) -> Reply {
    let store = db.read().await;
    let sliders: Vec<Value> = store.sliders.iter().map(|slider| slider.to_json()).collect();
    ok("Sliders fetched", json!(sliders))
}
