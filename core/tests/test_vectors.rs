//! Verify request building, envelope parsing, the route guard and payment
//! redirect detection against JSON test vectors stored in `test-vectors/`.
//!
//! The vectors are shared with hosts that embed the core over FFI. Comparing
//! parsed JSON (not raw strings) avoids false negatives from field-ordering
//! differences.

use std::collections::BTreeMap;
use std::sync::Arc;

use messfinder_core::guard::RouteGuard;
use messfinder_core::redirect;
use messfinder_core::services::bookings::{self, BookingFilter};
use messfinder_core::services::messes::{self, MessQuery};
use messfinder_core::services::{auth, favorites, payments, reviews};
use messfinder_core::storage::{load_token, TOKEN_KEY};
use messfinder_core::types::{LoginRequest, Role, User};
use messfinder_core::{
    ApiClient, ApiError, ClientConfig, GuardDecision, HttpMethod, HttpRequest, HttpResponse,
    MemoryStorage, Session, SessionStorage,
};
use serde_json::Value;

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn client(base_url: &str, token: Option<&str>) -> (ApiClient, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    if let Some(token) = token {
        storage.set(TOKEN_KEY, token).unwrap();
    }
    (ApiClient::new(ClientConfig::new(base_url), storage.clone()), storage)
}

fn text(args: &Value, key: &str) -> String {
    args[key].as_str().unwrap().to_string()
}

fn mess_query(args: &Value) -> MessQuery {
    MessQuery {
        page: args["page"].as_u64().unwrap_or(1) as u32,
        search: args["search"].as_str().map(str::to_string),
        min_price: args["minPrice"].as_u64().map(|v| v as u32),
        max_price: args["maxPrice"].as_u64().map(|v| v as u32),
        facilities: args["facilities"]
            .as_array()
            .map(|list| list.iter().map(|f| f.as_str().unwrap().to_string()).collect())
            .unwrap_or_default(),
        ..MessQuery::default()
    }
}

/// Map a vector's `call` name onto the service function it names.
fn build(client: &ApiClient, call: &str, args: &Value) -> HttpRequest {
    match call {
        "login" => {
            let input = LoginRequest {
                email: text(args, "email"),
                password: text(args, "password"),
            };
            auth::login(client, &input).unwrap().into_request()
        }
        "verify_otp" => auth::verify_otp(client, &text(args, "email"), &text(args, "otp"))
            .unwrap()
            .into_request(),
        "check_auth" => auth::check_auth(client).into_request(),
        "logout" => auth::logout(client).into_request(),
        "list_messes" => messes::list(client, &mess_query(args)).into_request(),
        "search_messes" => messes::search(client, &mess_query(args)).into_request(),
        "get_mess" => messes::get_by_id(client, &text(args, "id")).into_request(),
        "my_bookings" => {
            let filter = match args["filter"].as_str().unwrap() {
                "upcoming" => BookingFilter::Upcoming,
                "past" => BookingFilter::Past,
                _ => BookingFilter::All,
            };
            bookings::list_mine(client, filter).into_request()
        }
        "cancel_booking" => bookings::cancel(client, &text(args, "id"), args["reason"].as_str())
            .unwrap()
            .into_request(),
        "initiate_payment" => payments::initiate(client, &text(args, "bookingId"))
            .unwrap()
            .into_request(),
        "save_favorite" => favorites::save(client, &text(args, "messId"))
            .unwrap()
            .into_request(),
        "remove_favorite" => favorites::remove(client, &text(args, "messId")).into_request(),
        "reviews_for_mess" => {
            let page = args["page"].as_u64().unwrap() as u32;
            reviews::list_for_mess(client, &text(args, "messId"), page, messes::DEFAULT_PAGE_SIZE)
                .into_request()
        }
        other => panic!("unknown call: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let (c, _) = client(base_url, case["token"].as_str());
        let req = build(&c, case["call"].as_str().unwrap(), &case["args"]);
        let expected = &case["expected_request"];

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");

        let (path, query) = req.url.split_once('?').unwrap_or((req.url.as_str(), ""));
        assert_eq!(path, format!("{base_url}{}", expected["path"].as_str().unwrap()), "{name}: path");
        let query: BTreeMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        let expected_query: BTreeMap<String, String> =
            serde_json::from_value(expected["query"].clone()).unwrap();
        assert_eq!(query, expected_query, "{name}: query");

        assert_eq!(req.header("authorization"), expected["auth"].as_str(), "{name}: auth");

        match &expected["body"] {
            Value::Null => {
                assert!(req.body.is_none(), "{name}: body should be None");
                assert!(req.header("content-type").is_none(), "{name}: content-type");
            }
            body => {
                let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&sent, body, "{name}: body");
                assert_eq!(req.header("content-type"), Some("application/json"), "{name}: content-type");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[test]
fn envelope_test_vectors() {
    for case in load(include_str!("../../test-vectors/envelope.json")) {
        let name = case["name"].as_str().unwrap();
        let (c, storage) = client("http://api.test/api/v1", Some("tok"));
        let response = HttpResponse::new(
            case["response"]["status"].as_u64().unwrap() as u16,
            case["response"]["body"].as_str().unwrap(),
        );

        let result = c.parse::<Value>(response);
        let expected = &case["expected"];
        match expected.get("error") {
            None => {
                let envelope = result.unwrap();
                assert_eq!(envelope.data.unwrap_or(Value::Null), expected["data"], "{name}: data");
            }
            Some(error) => {
                let err = result.unwrap_err();
                let kind_matches = match error["kind"].as_str().unwrap() {
                    "http" => matches!(err, ApiError::Http { .. }),
                    "unauthorized" => matches!(err, ApiError::Unauthorized { .. }),
                    "deserialization" => matches!(err, ApiError::Deserialization(_)),
                    other => panic!("{name}: unknown error kind: {other}"),
                };
                assert!(kind_matches, "{name}: got {err:?}");
                assert_eq!(err.status_code().map(u64::from), error["status"].as_u64(), "{name}: status");
                if let Some(message) = error["message"].as_str() {
                    assert_eq!(err.message(), message, "{name}: message");
                }
            }
        }

        let purged = load_token(&*storage).unwrap().is_none();
        assert_eq!(purged, case["purged"].as_bool().unwrap(), "{name}: purge");
    }
}

// ---------------------------------------------------------------------------
// Route guard
// ---------------------------------------------------------------------------

fn session_from(shape: &Value) -> Session {
    let mut session = Session::new();
    match shape["phase"].as_str().unwrap() {
        "booting" => {}
        "signed_out" => session.bootstrap_without_token(),
        "otp_pending" => {
            session.bootstrap_without_token();
            session.login_succeeded("student@uni.edu");
        }
        "signed_in" => {
            let role = Role::parse(shape["role"].as_str().unwrap()).unwrap();
            let user = User {
                id: "u1".to_string(),
                name: "Test".to_string(),
                email: "test@uni.edu".to_string(),
                phone: "01712345678".to_string(),
                role,
                is_active: true,
            };
            session.finish_bootstrap(Ok((user, "tok".to_string())));
        }
        other => panic!("unknown phase: {other}"),
    }
    if let Some(path) = shape["redirect_path"].as_str() {
        session.set_redirect_path(path);
    }
    session
}

#[test]
fn guard_test_vectors() {
    for case in load(include_str!("../../test-vectors/guard.json")) {
        let name = case["name"].as_str().unwrap();
        let session = session_from(&case["session"]);
        let segments: Vec<&str> = case["segments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s.as_str().unwrap())
            .collect();

        let decision = RouteGuard::evaluate(&session, &segments);
        let expected = match &case["expected"] {
            Value::Null => GuardDecision::Allow,
            redirect => GuardDecision::Redirect {
                to: redirect["to"].as_str().unwrap().to_string(),
                remember: redirect["remember"].as_str().map(str::to_string),
            },
        };
        assert_eq!(decision, expected, "{name}");
    }
}

// ---------------------------------------------------------------------------
// Payment redirect
// ---------------------------------------------------------------------------

#[test]
fn payment_redirect_test_vectors() {
    for case in load(include_str!("../../test-vectors/payment_redirect.json")) {
        let url = case["url"].as_str().unwrap();
        let outcome = redirect::classify(url).map(|outcome| outcome.as_str());
        assert_eq!(outcome, case["expected"].as_str(), "{url}");
    }
}
