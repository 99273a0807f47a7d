use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::store::{new_id, Favorite};
use crate::{authenticate, created, ok, AppError, Db, Reply};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveInput {
    pub mess_id: String,
}

/// Populated listings under `mess_id`.
pub async fn list(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let saved: Vec<Value> = store
        .favorites
        .iter()
        .filter(|f| f.user_id == user.id)
        .map(|f| f.to_json(store.mess(&f.mess_id)))
        .collect();
    ok("Favorites fetched", json!(saved))
}

/// Answers with the bare join record.
pub async fn save(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<SaveInput>,
) -> Reply {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    if store.mess(&input.mess_id).is_none() {
        return Err(AppError::not_found("Mess not found"));
    }
    if store
        .favorites
        .iter()
        .any(|f| f.user_id == user.id && f.mess_id == input.mess_id)
    {
        return Err(AppError::conflict("Mess already saved"));
    }
    let favorite = Favorite {
        id: new_id(),
        user_id: user.id,
        mess_id: input.mess_id,
    };
    let body = favorite.to_json(None);
    store.favorites.push(favorite);
    created("Mess saved", body)
}

pub async fn remove(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(mess_id): Path<String>,
) -> Reply {
    let mut store = db.write().await;
    let user = authenticate(&store, &headers)?;
    let before = store.favorites.len();
    store
        .favorites
        .retain(|f| !(f.user_id == user.id && f.mess_id == mess_id));
    if store.favorites.len() == before {
        return Err(AppError::not_found("Favorite not found"));
    }
    ok("Mess removed from favorites", Value::Null)
}

pub async fn check(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(mess_id): Path<String>,
) -> Reply {
    let store = db.read().await;
    let user = authenticate(&store, &headers)?;
    let is_saved = store
        .favorites
        .iter()
        .any(|f| f.user_id == user.id && f.mess_id == mess_id);
    ok("Favorite status", json!({"isSaved": is_saved}))
}
