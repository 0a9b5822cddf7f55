use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};

use xwaste::config::AppConfig;
use xwaste::controllers::{AccountMode, BinKind, FormStatus};
use xwaste::errors::AppError;
use xwaste::gateways::IdempotencyKey;
use xwaste::models::{Collection, Coordinate, Feedback, PaymentMethod, Plan};
use xwaste::notify::Toast;
use xwaste::services::store::firebase::FirebaseRealtimeStore;
use xwaste::services::store::RemoteStore;
use xwaste::shell::{Route, Screen, Shell};
use xwaste::state::AppState;

// ── Fake backend ──

#[derive(Default)]
struct Backend {
    db: HashMap<String, BTreeMap<String, Value>>,
    accounts: HashMap<String, (String, String)>,
    next_id: u64,
    geocoder_agents: Vec<String>,
}

type Shared = Arc<Mutex<Backend>>;

fn fail(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn grant(uid: &str, email: &str) -> Response {
    Json(json!({
        "localId": uid,
        "email": email,
        "idToken": format!("token-{uid}"),
        "refreshToken": "refresh",
        "expiresIn": "3600",
    }))
    .into_response()
}

// POST /v1/accounts:<method>?key=...
async fn accounts(
    State(backend): State<Shared>,
    Path(method): Path<String>,
    Query(q): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    let auth_error = |msg: &str| {
        fail(
            StatusCode::BAD_REQUEST,
            json!({"error": {"code": 400, "message": msg}}),
        )
    };
    if q.get("key").map(String::as_str) != Some("test-key") {
        return auth_error("API key not valid. Please pass a valid API key.");
    }

    let mut b = backend.lock().unwrap();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    match method.as_str() {
        "accounts:signUp" => {
            if b.accounts.contains_key(&email) {
                return auth_error("EMAIL_EXISTS");
            }
            b.next_id += 1;
            let uid = format!("uid-{}", b.next_id);
            b.accounts.insert(email.clone(), (password, uid.clone()));
            grant(&uid, &email)
        }
        "accounts:signInWithPassword" => match b.accounts.get(&email) {
            Some((pw, uid)) if *pw == password => grant(uid, &email),
            _ => auth_error("INVALID_LOGIN_CREDENTIALS"),
        },
        "accounts:signInWithIdp" => {
            let post_body = body["postBody"].as_str().unwrap_or_default();
            let token = post_body
                .split('&')
                .find_map(|kv| kv.strip_prefix("id_token="))
                .unwrap_or_default();
            if token.is_empty() || !post_body.contains("providerId=google.com") {
                return auth_error("INVALID_IDP_RESPONSE");
            }
            grant(&format!("google-{token}"), "g@example.com")
        }
        _ => auth_error("UNKNOWN_METHOD"),
    }
}

fn authorized(q: &HashMap<String, String>) -> bool {
    q.get("auth").map(|t| t.starts_with("token-")).unwrap_or(false)
}

fn denied() -> Response {
    fail(StatusCode::UNAUTHORIZED, json!({"error": "Permission denied"}))
}

fn strip_json(segment: &str) -> String {
    segment.trim_end_matches(".json").to_string()
}

// POST /<collection>.json
async fn push_record(
    State(backend): State<Shared>,
    Path(collection): Path<String>,
    Query(q): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&q) {
        return denied();
    }
    let mut b = backend.lock().unwrap();
    b.next_id += 1;
    let key = format!("-N{:08}", b.next_id);
    b.db.entry(strip_json(&collection))
        .or_default()
        .insert(key.clone(), body);
    Json(json!({ "name": key })).into_response()
}

// GET /<collection>.json?orderBy="$key"&limitToLast=n
async fn list_records(
    State(backend): State<Shared>,
    Path(collection): Path<String>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&q) {
        return denied();
    }
    if q.get("orderBy").map(String::as_str) != Some("\"$key\"") {
        return fail(StatusCode::BAD_REQUEST, json!({"error": "orderBy must be defined"}));
    }
    let limit: usize = q
        .get("limitToLast")
        .and_then(|v| v.parse().ok())
        .unwrap_or(usize::MAX);

    let b = backend.lock().unwrap();
    let all = b.db.get(&strip_json(&collection)).cloned().unwrap_or_default();
    let skip = all.len().saturating_sub(limit);
    let picked: serde_json::Map<String, Value> = all.into_iter().skip(skip).collect();
    if picked.is_empty() {
        return Json(Value::Null).into_response();
    }
    Json(Value::Object(picked)).into_response()
}

// GET /<collection>/<key>.json
async fn get_record(
    State(backend): State<Shared>,
    Path((collection, key)): Path<(String, String)>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&q) {
        return denied();
    }
    let b = backend.lock().unwrap();
    let v = b
        .db
        .get(&collection)
        .and_then(|m| m.get(&strip_json(&key)))
        .cloned()
        .unwrap_or(Value::Null);
    Json(v).into_response()
}

// PUT /<collection>/<key>.json
async fn put_record(
    State(backend): State<Shared>,
    Path((collection, key)): Path<(String, String)>,
    Query(q): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&q) {
        return denied();
    }
    let mut b = backend.lock().unwrap();
    b.db.entry(collection)
        .or_default()
        .insert(strip_json(&key), body.clone());
    Json(body).into_response()
}

const KENCOM: (f64, f64) = (-1.2841, 36.8255);
const KENCOM_NAME: &str = "Kencom House, Moi Avenue, Nairobi, Kenya";

// GET /search?q=...&format=json&limit=1
async fn search(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Value> {
    if let Some(agent) = headers.get("user-agent").and_then(|v| v.to_str().ok()) {
        backend.lock().unwrap().geocoder_agents.push(agent.to_string());
    }
    let query = q.get("q").cloned().unwrap_or_default().to_lowercase();
    if query.contains("kencom") {
        Json(json!([{
            "lat": KENCOM.0.to_string(),
            "lon": KENCOM.1.to_string(),
            "display_name": KENCOM_NAME,
        }]))
    } else {
        Json(json!([]))
    }
}

// GET /reverse?lat=..&lon=..&format=json
async fn reverse(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let lat: f64 = q.get("lat").and_then(|v| v.parse().ok()).unwrap_or(0.0);
    let lon: f64 = q.get("lon").and_then(|v| v.parse().ok()).unwrap_or(0.0);
    if (lat - KENCOM.0).abs() < 1e-3 && (lon - KENCOM.1).abs() < 1e-3 {
        Json(json!({ "display_name": KENCOM_NAME }))
    } else {
        Json(json!({ "error": "Unable to geocode" }))
    }
}

// ── Helpers ──

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

struct TestEnv {
    backend: Shared,
    state: Arc<AppState>,
    toasts: tokio::sync::broadcast::Receiver<Toast>,
    database_url: String,
}

impl TestEnv {
    async fn start() -> Self {
        let backend: Shared = Arc::new(Mutex::new(Backend::default()));

        let auth_url = serve(
            Router::new()
                .route("/v1/:method", post(accounts))
                .with_state(backend.clone()),
        )
        .await;
        let database_url = serve(
            Router::new()
                .route("/:collection", post(push_record).get(list_records))
                .route("/:collection/:key", get(get_record).put(put_record))
                .with_state(backend.clone()),
        )
        .await;
        let geocoder_url = serve(
            Router::new()
                .route("/search", get(search))
                .route("/reverse", get(reverse))
                .with_state(backend.clone()),
        )
        .await;

        let config = AppConfig {
            firebase_api_key: "test-key".to_string(),
            database_url: database_url.clone(),
            auth_url,
            geocoder_url,
            geocoder_user_agent: "xwaste-tests/1.0".to_string(),
            ledger_path: ":memory:".to_string(),
        };
        let state = Arc::new(AppState::from_config(&config).unwrap());
        let toasts = state.notifier.receiver();

        Self {
            backend,
            state,
            toasts,
            database_url,
        }
    }

    async fn signed_in() -> (Self, Shell) {
        let env = Self::start().await;
        env.state
            .auth
            .register_with_email("kamau", "k@example.com", "0712345678", "secret")
            .await
            .unwrap();
        let shell = Shell::new(env.state.clone());
        (env, shell)
    }

    fn records(&self, collection: &str) -> Vec<(String, Value)> {
        let b = self.backend.lock().unwrap();
        b.db.get(collection)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    fn seed(&self, collection: &str, key: &str, value: Value) {
        let mut b = self.backend.lock().unwrap();
        b.db.entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn toasts(&mut self) -> Vec<String> {
        let mut out = vec![];
        while let Ok(t) = self.toasts.try_recv() {
            out.push(t.message);
        }
        out
    }
}

// ── Auth ──

#[tokio::test]
async fn test_register_creates_profile_keyed_by_uid() {
    let env = TestEnv::start().await;

    let user = env
        .state
        .auth
        .register_with_email("kamau", "k@example.com", "0712345678", "secret")
        .await
        .unwrap();

    assert_eq!(env.state.auth.current_user().unwrap().uid, user.uid);
    let users = env.records("users");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].0, user.uid);
    assert_eq!(
        users[0].1,
        json!({"username": "kamau", "email": "k@example.com", "phone": "0712345678"})
    );
}

#[tokio::test]
async fn test_sign_in_screen_flow() {
    let mut env = TestEnv::start().await;
    env.state
        .auth
        .register_with_email("kamau", "k@example.com", "0712", "secret")
        .await
        .unwrap();
    env.state.auth.sign_out();

    let mut shell = Shell::new(env.state.clone());
    assert_eq!(shell.current_route(), Route::SignIn);
    let Screen::SignIn(screen) = shell.screen() else {
        panic!("expected sign-in screen");
    };

    screen.set_email("k@example.com");
    screen.set_password("wrong");
    assert!(screen.submit().await.is_err());
    assert_eq!(env.toasts(), vec!["INVALID_LOGIN_CREDENTIALS"]);
    assert_eq!(screen.form().email, "k@example.com");

    screen.set_password("secret");
    let next = screen.submit().await.unwrap();
    shell.navigate(next);
    assert_eq!(shell.current_route(), Route::Dashboard);
    assert_eq!(shell.back_stack(), &[Route::Dashboard]);
}

#[tokio::test]
async fn test_google_sign_in() {
    let env = TestEnv::start().await;
    let mut shell = Shell::new(env.state.clone());
    let Screen::SignIn(screen) = shell.screen() else {
        panic!("expected sign-in screen");
    };

    let next = screen.sign_in_with_google("abc123").await.unwrap();
    shell.navigate(next);

    assert_eq!(env.state.auth.current_user().unwrap().uid, "google-abc123");
    assert_eq!(shell.current_route(), Route::Dashboard);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let mut env = TestEnv::start().await;
    env.state
        .auth
        .register_with_email("a", "dup@example.com", "1", "pw")
        .await
        .unwrap();

    let err = env
        .state
        .auth
        .register_with_email("b", "dup@example.com", "2", "pw")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Auth(ref m) if m == "EMAIL_EXISTS"));
    assert_eq!(env.records("users").len(), 1);
    assert!(env.toasts().is_empty());
}

// ── Screens ──

#[tokio::test]
async fn test_feedback_submission() {
    let (mut env, mut shell) = TestEnv::signed_in().await;
    let Screen::Feedback(screen) = shell.navigate(Route::Feedback) else {
        panic!("expected feedback screen");
    };

    screen.set_email("a@b.com");
    screen.set_message("hello");
    screen.submit().await.unwrap();

    let feedback = env.records("Feedback");
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[0].1, json!({"email": "a@b.com", "message": "hello"}));
    assert!(screen.form().email.is_empty());
    assert!(screen.form().message.is_empty());
    assert_eq!(env.toasts(), vec!["Feedback submitted successfully!"]);
}

#[tokio::test]
async fn test_blank_fields_never_reach_backend() {
    let (mut env, mut shell) = TestEnv::signed_in().await;

    let Screen::Feedback(feedback) = shell.navigate(Route::Feedback) else {
        panic!("expected feedback screen");
    };
    feedback.set_email("a@b.com");
    assert!(feedback.submit().await.is_err());

    let Screen::GarbageBins(bins) = shell.navigate(Route::Bins) else {
        panic!("expected bins screen");
    };
    bins.toggle_bin(BinKind::Organic);
    assert!(bins.submit().await.is_err());

    let Screen::Scheduling(schedule) = shell.navigate(Route::Schedule) else {
        panic!("expected scheduling screen");
    };
    assert!(schedule.submit().await.is_err());

    assert!(env.records("Feedback").is_empty());
    assert!(env.records("garbageBins").is_empty());
    assert!(env.records("scheduling").is_empty());
    assert_eq!(
        env.toasts(),
        vec!["Please fill all fields", "Please fill all fields", "Please select a date"]
    );
}

#[tokio::test]
async fn test_yearly_card_subscription_routes_to_payment() {
    let (mut env, mut shell) = TestEnv::signed_in().await;
    let Screen::Subscription(screen) = shell.navigate(Route::Subscribe) else {
        panic!("expected subscription screen");
    };

    screen.select_plan(Plan::Yearly);
    screen.pick_payment_date(NaiveDate::from_ymd_opt(2024, 7, 13).unwrap());
    screen.select_payment_method(PaymentMethod::Card);
    let outcome = screen.submit().await.unwrap();

    let next = outcome.next.expect("card goes on to payment");
    let Screen::Payment(payment) = shell.navigate(next) else {
        panic!("expected payment screen");
    };

    let subs = env.records("subscriptions");
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].1["plan"], "Yearly");
    assert_eq!(subs[0].1["paymentMethod"], "Card");

    payment.set_card_number("4242424242424242");
    payment.set_expiry_date("12/27");
    payment.set_cvv("123");
    payment.submit().unwrap();

    // Only the subscription intent was ever written (plus the profile).
    let b = env.backend.lock().unwrap();
    let mut collections: Vec<&String> = b.db.keys().collect();
    collections.sort();
    assert_eq!(collections, vec!["subscriptions", "users"]);
    drop(b);
    assert_eq!(
        env.toasts(),
        vec!["Payment initiated with Yearly plan and Card", "Payment Processing..."]
    );
}

#[tokio::test]
async fn test_household_registration_with_geocoding() {
    let (mut env, mut shell) = TestEnv::signed_in().await;
    let Screen::Household(screen) = shell.navigate(Route::Register) else {
        panic!("expected household screen");
    };

    screen.set_household_name("Kamau's Household");
    screen.set_location("Kencom House");
    let place = screen.locate().await.unwrap();
    assert_eq!(screen.form().map.marker.unwrap().at, place.at);

    screen.submit().await.unwrap();

    let households = env.records("households");
    assert_eq!(households.len(), 1);
    let v = &households[0].1;
    assert_eq!(v["householdName"], "Kamau's Household");
    assert_eq!(v["location"], "Kencom House");
    assert_eq!(v["latitude"], KENCOM.0);
    assert_eq!(v["longitude"], KENCOM.1);
    assert_eq!(env.toasts(), vec!["Household registered!"]);

    let agents = env.backend.lock().unwrap().geocoder_agents.clone();
    assert_eq!(agents, vec!["xwaste-tests/1.0"]);
}

#[tokio::test]
async fn test_geocoding_round_trip() {
    let env = TestEnv::start().await;

    let place = env.state.map.forward_geocode("Kencom House, Moi Avenue").await.unwrap();
    assert_eq!(place.at, Coordinate::new(KENCOM.0, KENCOM.1));

    let address = env.state.map.reverse_geocode(place.at).await.unwrap();
    assert_eq!(address, place.address);

    let miss = env.state.map.forward_geocode("Atlantis").await.unwrap_err();
    assert_eq!(miss.toast_message().as_deref(), Some("Address not found"));
    let miss = env
        .state
        .map
        .reverse_geocode(Coordinate::new(0.0, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(miss, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_map_tap_then_register() {
    let (env, mut shell) = TestEnv::signed_in().await;
    let Screen::Household(screen) = shell.navigate(Route::Register) else {
        panic!("expected household screen");
    };

    screen.set_household_name("Office");
    let address = screen
        .select_on_map(Coordinate::new(KENCOM.0, KENCOM.1))
        .await
        .unwrap();
    assert_eq!(address, KENCOM_NAME);
    screen.submit().await.unwrap();

    let households = env.records("households");
    assert_eq!(households[0].1["location"], KENCOM_NAME);
}

#[tokio::test]
async fn test_garbage_bins_prefill_and_submit() {
    let (mut env, mut shell) = TestEnv::signed_in().await;
    env.seed("households", "-A1", json!({"householdName": "a", "location": "Westlands"}));
    env.seed("households", "-A2", json!({"householdName": "b", "location": "Kilimani"}));

    let screen = shell.navigate(Route::Bins);
    screen.enter().await;
    let Screen::GarbageBins(bins) = screen else {
        panic!("expected bins screen");
    };
    assert_eq!(bins.form().delivery_address, "Kilimani");

    bins.toggle_bin(BinKind::Recyclable);
    bins.submit().await.unwrap();
    assert_eq!(bins.form().session.status(), FormStatus::SubmittedOrIdle);

    let saved = env.records("garbageBins");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].1["deliveryAddress"], "Kilimani");
    assert_eq!(saved[0].1["recyclable"], true);
    assert_eq!(saved[0].1["organic"], false);
    assert_eq!(env.toasts(), vec!["Garbage bins selection saved!"]);
}

#[tokio::test]
async fn test_scheduling_entry() {
    let (env, mut shell) = TestEnv::signed_in().await;
    let Screen::Scheduling(screen) = shell.navigate(Route::Schedule) else {
        panic!("expected scheduling screen");
    };

    screen.pick_date(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    screen.submit().await.unwrap();

    let entries = env.records("scheduling");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1["date"], "1/5/2025");
    assert_eq!(entries[0].1["status"], "Scheduled");
}

#[tokio::test]
async fn test_account_view_edit_save() {
    let (env, mut shell) = TestEnv::signed_in().await;
    let screen = shell.open_account();
    screen.enter().await;
    let Screen::Account(account) = screen else {
        panic!("expected account screen");
    };

    assert_eq!(account.form().details["username"], "kamau");
    assert!(!account.set_field("phone", "0799"));

    account.edit();
    assert_eq!(account.title(), "Edit Account Details");
    assert!(account.set_field("phone", "0799000000"));
    account.save().await.unwrap();
    assert_eq!(account.form().mode, AccountMode::Viewing);

    let uid = env.state.auth.current_user().unwrap().uid;
    let users = env.records("users");
    let (key, profile) = &users[0];
    assert_eq!(key, &uid);
    assert_eq!(profile["phone"], "0799000000");
    assert_eq!(profile["email"], "k@example.com");
}

// ── Data gateway ──

#[tokio::test]
async fn test_anonymous_write_surfaces_store_error() {
    let env = TestEnv::start().await;

    let err = env
        .state
        .data
        .create(
            Collection::Feedback,
            &Feedback {
                email: "a@b.com".to_string(),
                message: "hi".to_string(),
            },
            &IdempotencyKey::generate(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.toast_message().as_deref(), Some("Error: Permission denied"));
    assert!(env.records("Feedback").is_empty());
}

#[tokio::test]
async fn test_raw_pushes_are_not_idempotent() {
    let env = TestEnv::start().await;
    let store = FirebaseRealtimeStore::new(env.database_url.clone());
    let record = json!({"email": "a@b.com", "message": "hello"});

    let k1 = store
        .push(Collection::Feedback, &record, Some("token-x"))
        .await
        .unwrap();
    let k2 = store
        .push(Collection::Feedback, &record, Some("token-x"))
        .await
        .unwrap();

    assert_ne!(k1, k2);
    assert_eq!(env.records("Feedback").len(), 2);

    let latest = store
        .latest(Collection::Feedback, 1, Some("token-x"))
        .await
        .unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].0, k2);
}

#[tokio::test]
async fn test_html_error_page_reports_status() {
    async fn bad_gateway() -> Response {
        (
            StatusCode::BAD_GATEWAY,
            [("content-type", "text/html")],
            "<html><body>502 Bad Gateway</body></html>",
        )
            .into_response()
    }
    let url = serve(Router::new().route("/:collection", post(bad_gateway))).await;
    let store = FirebaseRealtimeStore::new(url);

    let err = store
        .push(Collection::Feedback, &json!({"email": "a@b.com"}), Some("token-x"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "realtime database error (502 Bad Gateway)");
}

#[tokio::test]
async fn test_idempotency_key_collapses_resubmission() {
    let (env, _shell) = TestEnv::signed_in().await;
    let key = IdempotencyKey::generate();
    let record = Feedback {
        email: "a@b.com".to_string(),
        message: "hello".to_string(),
    };

    let first = env
        .state
        .data
        .create(Collection::Feedback, &record, &key)
        .await
        .unwrap();
    let second = env
        .state
        .data
        .create(Collection::Feedback, &record, &key)
        .await
        .unwrap();

    assert_eq!(first.key, second.key);
    assert!(second.deduplicated);
    assert_eq!(env.records("Feedback").len(), 1);
}

#[tokio::test]
async fn test_logout_from_top_bar() {
    let (env, mut shell) = TestEnv::signed_in().await;
    shell.navigate(Route::Feedback);
    shell.logout();

    assert!(env.state.auth.current_user().is_none());
    assert_eq!(shell.current_route(), Route::SignIn);
    assert_eq!(shell.navigate(Route::Payment).route(), Route::SignIn);
}
