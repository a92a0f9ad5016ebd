//! Events Lambda - CRUD over the events table.
//!
//! Endpoints:
//! - GET /events - List all events
//! - POST /events - Create an event (form fields: eventid, name, location, organizer, date)
//! - GET /events/{id} - Get one event
//! - PUT /events/{id} - Update an event's name, location, organizer or date
//! - DELETE /events/{id} - Delete one event
//! - DELETE /events - Delete ALL events (unscoped, no confirmation)
//! - GET / - Home page

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, RequestPayloadExt, Response};
use serde::de::DeserializeOwned;
use shared::http::{error_response, failure_response, json_response, text_response};
use shared::{Config, CreateEventRequest, EventStore, JsonResponse, UpdateEventRequest};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const MISSING_ID: &str = "You are missing eventId parameter.";
const INSERTED: &str = "The movie has been inserted successfully!";
const UPDATED: &str = "The event has been updated successfully!";
const DELETED: &str = "The event has been deleted successfully!";
const DELETED_ALL: &str = "All events have been deleted successfully!";

/// Application state shared across requests.
struct AppState {
    store: EventStore,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let pool = shared::create_pool(&config).await?;
        let store = EventStore::from_config(pool, &config)?;

        Ok(Self { store })
    }
}

#[derive(Debug, PartialEq)]
enum Route {
    Home,
    Events,
    Event(String),
}

/// Map a request path onto a route, ignoring an `/api` stage prefix.
fn route(raw_path: &str) -> Option<Route> {
    let path = match raw_path.strip_prefix("/api") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => raw_path,
    };

    match path {
        "" | "/" => Some(Route::Home),
        "/events" => Some(Route::Events),
        _ => {
            let id = path.strip_prefix("/events/")?;
            if id.contains('/') {
                return None;
            }
            let id = urlencoding::decode(id)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| id.to_string());
            Some(Route::Event(id))
        }
    }
}

/// Read form fields from the body, or from the query string when there is no body.
fn form_fields<T: DeserializeOwned>(event: &Request) -> Result<T, shared::Error> {
    match event.payload::<T>() {
        Ok(Some(fields)) => Ok(fields),
        Ok(None) => {
            let params = event.query_string_parameters();
            let fields: serde_json::Map<String, serde_json::Value> = params
                .iter()
                .map(|(key, value)| (key.to_string(), serde_json::Value::from(value)))
                .collect();
            Ok(serde_json::from_value(serde_json::Value::Object(fields))?)
        }
        Err(e) => Err(shared::Error::Validation(format!("Invalid request body: {}", e))),
    }
}

fn is_missing(event_id: &str) -> bool {
    event_id.trim().is_empty()
}

fn storage_failure(action: &str, err: &shared::Error) -> Result<Response<Body>, Error> {
    error!("Failed to {}: {}", action, err);
    failure_response(err)
}

async fn list_events(state: &AppState) -> Result<Response<Body>, Error> {
    match state.store.list().await {
        Ok(events) => {
            info!("Listed {} events", events.len());
            json_response(200, &JsonResponse::data(events))
        }
        Err(e) => storage_failure("list events", &e),
    }
}

async fn create_event(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    let request: CreateEventRequest = match form_fields(event) {
        Ok(request) => request,
        Err(e) => return failure_response(&e),
    };

    let event_id = match request.event_id.clone() {
        Some(id) if !is_missing(&id) => id,
        _ => return error_response(400, MISSING_ID),
    };
    let new_event = request.into_event(event_id);

    info!("Inserting event {}", new_event.event_id);

    match state.store.create(&new_event).await {
        Ok(()) => json_response(200, &JsonResponse::success(INSERTED)),
        Err(e) => storage_failure("insert event", &e),
    }
}

async fn get_event(state: &AppState, event_id: &str) -> Result<Response<Body>, Error> {
    if is_missing(event_id) {
        return error_response(400, MISSING_ID);
    }

    match state.store.get(event_id).await {
        Ok(found) => json_response(200, &JsonResponse::data(vec![found])),
        Err(e @ shared::Error::NotFound(_)) => failure_response(&e),
        Err(e) => storage_failure("get event", &e),
    }
}

async fn update_event(state: &AppState, event_id: &str, event: &Request) -> Result<Response<Body>, Error> {
    if is_missing(event_id) {
        return error_response(400, MISSING_ID);
    }

    let changes: UpdateEventRequest = match form_fields(event) {
        Ok(changes) => changes,
        Err(e) => return failure_response(&e),
    };

    match state.store.update(event_id, &changes).await {
        Ok(()) => {
            info!("Updated event {}", event_id);
            json_response(200, &JsonResponse::success(UPDATED))
        }
        Err(e @ shared::Error::NotFound(_)) => failure_response(&e),
        Err(e) => storage_failure("update event", &e),
    }
}

async fn delete_event(state: &AppState, event_id: &str) -> Result<Response<Body>, Error> {
    if is_missing(event_id) {
        return error_response(400, MISSING_ID);
    }

    // Success is reported whether or not a row matched.
    match state.store.delete(event_id).await {
        Ok(removed) => {
            info!("Deleted event {} ({} rows)", event_id, removed);
            json_response(200, &JsonResponse::success(DELETED))
        }
        Err(e) => storage_failure("delete event", &e),
    }
}

async fn delete_all_events(state: &AppState) -> Result<Response<Body>, Error> {
    warn!("Deleting all events from {}", state.store.table());

    match state.store.delete_all().await {
        Ok(removed) => {
            warn!("Deleted all events ({} rows)", removed);
            json_response(200, &JsonResponse::success(DELETED_ALL))
        }
        Err(e) => storage_failure("delete all events", &e),
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let path = event.uri().path();
    let method = event.method().as_str();

    info!("Received request: method={}, path={}", method, path);

    match (method, route(path)) {
        ("GET", Some(Route::Home)) => text_response(200, "Home page"),
        ("GET", Some(Route::Events)) => list_events(&state).await,
        ("POST", Some(Route::Events)) => create_event(&state, &event).await,
        ("DELETE", Some(Route::Events)) => delete_all_events(&state).await,
        ("GET", Some(Route::Event(id))) => get_event(&state, &id).await,
        ("PUT", Some(Route::Event(id))) => update_event(&state, &id, &event).await,
        ("DELETE", Some(Route::Event(id))) => delete_event(&state, &id).await,
        (_, Some(_)) => error_response(405, "Method not allowed"),
        (_, None) => error_response(404, "Not found"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = match AppState::new().await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to start events gateway: {}", e);
            return Err(e);
        }
    };

    info!("Events gateway ready, table={}", state.store.table());

    let served = run(service_fn({
        let state = Arc::clone(&state);
        move |event| {
            let state = Arc::clone(&state);
            async move { handler(state, event).await }
        }
    }))
    .await;

    state.store.close().await;
    served
}
