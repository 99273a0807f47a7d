//! Listing endpoints and the home carousel.

use super::Call;
use crate::client::ApiClient;
use crate::types::{HomeSlider, Mess, MessPage, MessStatus};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessSort {
    Newest,
    PriceLow,
    PriceHigh,
    Rating,
}

impl MessSort {
    pub fn as_str(self) -> &'static str {
        match self {
            MessSort::Newest => "newest",
            MessSort::PriceLow => "price_low",
            MessSort::PriceHigh => "price_high",
            MessSort::Rating => "rating",
        }
    }
}

/// Page and filters for listing and search. Unset filters are not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub room_type: Option<String>,
    pub gender_preference: Option<String>,
    pub facilities: Vec<String>,
    pub status: Option<MessStatus>,
    pub sort: Option<MessSort>,
}

impl Default for MessQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
            min_price: None,
            max_price: None,
            room_type: None,
            gender_preference: None,
            facilities: Vec::new(),
            status: None,
            sort: None,
        }
    }
}

impl MessQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Same filters, different page.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.max(1).to_string()),
        ];
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        if let Some(min) = self.min_price {
            params.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.max_price {
            params.push(("maxPrice", max.to_string()));
        }
        if let Some(room_type) = &self.room_type {
            params.push(("roomType", room_type.clone()));
        }
        if let Some(gender) = &self.gender_preference {
            params.push(("genderPreference", gender.clone()));
        }
        if !self.facilities.is_empty() {
            params.push(("facilities", self.facilities.join(",")));
        }
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(sort) = self.sort {
            params.push(("sort", sort.as_str().to_string()));
        }
        params
    }
}

pub fn list(client: &ApiClient, query: &MessQuery) -> Call<MessPage> {
    client.get("/messes", &query.params())
}

/// Free-text search; `query.search` is sent as `q`.
pub fn search(client: &ApiClient, query: &MessQuery) -> Call<MessPage> {
    let params: Vec<(&str, String)> = query
        .params()
        .into_iter()
        .map(|(key, value)| if key == "search" { ("q", value) } else { (key, value) })
        .collect();
    client.get("/messes/search", &params)
}

/// Fetching a listing also bumps its view counter server-side.
pub fn get_by_id(client: &ApiClient, id: &str) -> Call<Mess> {
    client.get(&format!("/messes/{id}"), &[])
}

pub fn owner_listings(client: &ApiClient, query: &MessQuery) -> Call<MessPage> {
    client.get("/messes/owner/my-messes", &query.params())
}

pub fn home_sliders(client: &ApiClient) -> Call<Vec<HomeSlider>> {
    client.get("/home-sliders", &[])
}
