use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::schedule::{
    classify_str, fixed_time_grid, slot_prompt, ScheduleView, SlotAction, SlotTap, WeeklySchedule,
};
use crate::store::ScheduleStore;

pub struct AppState {
    pub store: Arc<dyn ScheduleStore>,
    pub auth_token: String,
}

impl AppState {
    pub fn new(store: Arc<dyn ScheduleStore>, auth_token: impl Into<String>) -> Self {
        Self {
            store,
            auth_token: auth_token.into(),
        }
    }
}

/// `weeklySchedule` is required: a save replaces everything, so a missing
/// or misspelled key must not wipe the schedule
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveScheduleRequest {
    weekly_schedule: WeeklySchedule,
}

#[derive(Deserialize)]
pub struct GridQuery {
    start: Option<String>,
    end: Option<String>,
    interval: Option<u32>,
}

/// Constant-time token comparison; only the length can leak
fn tokens_match(presented: &str, expected: &str) -> bool {
    !presented.is_empty() && bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

/// Rejects requests without `Authorization: Bearer <token>`
fn require_sign_in(req: &HttpRequest, state: &AppState) -> Result<()> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if !tokens_match(token, &state.auth_token) {
        debug!(path = %req.path(), "Rejected unauthenticated request");
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Current snapshot
async fn get_schedule(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    require_sign_in(&req, &state)?;
    let snapshot = state.store.load()?;
    Ok(HttpResponse::Ok().json(snapshot.to_payload()))
}

// Full replace of the weekly schedule
async fn save_schedule(
    req: HttpRequest,
    body: web::Json<SaveScheduleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    require_sign_in(&req, &state)?;
    let snapshot = state.store.save(body.into_inner().weekly_schedule)?;
    info!(
        total = snapshot.stats.total_slots,
        booked = snapshot.stats.booked_slots,
        "Schedule replaced"
    );
    Ok(HttpResponse::Ok().json(snapshot.to_payload()))
}

// Render-ready view, optionally over a fixed grid
async fn get_view(
    req: HttpRequest,
    query: web::Query<GridQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    require_sign_in(&req, &state)?;
    let snapshot = state.store.load()?;

    let view = match (&query.start, &query.end) {
        (None, None) => ScheduleView::build(&snapshot),
        (Some(start), Some(end)) => {
            let times = fixed_time_grid(start, end, query.interval.unwrap_or(60))?;
            ScheduleView::build_with_times(&snapshot, times)
        }
        _ => {
            return Err(AppError::Validation(
                "Both start and end are required for a fixed grid".to_string(),
            ))
        }
    };

    Ok(HttpResponse::Ok().json(view))
}

// Prompt for a slot, status looked up from the current snapshot
async fn get_slot(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    require_sign_in(&req, &state)?;
    let (day, time) = path.into_inner();
    let snapshot = state.store.load()?;
    let status = classify_str(&snapshot.weekly_schedule, &day, &time);
    Ok(HttpResponse::Ok().json(slot_prompt(&day, &time, status.as_str())))
}

// Prompt for a tap reported by the renderer, status taken verbatim
async fn tap_slot(
    req: HttpRequest,
    body: web::Json<SlotTap>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    require_sign_in(&req, &state)?;
    Ok(HttpResponse::Ok().json(body.prompt()))
}

// Edit stub: records the request, changes nothing
async fn edit_slot(
    req: HttpRequest,
    body: web::Json<SlotTap>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    require_sign_in(&req, &state)?;
    match body.choose(SlotAction::Edit) {
        Some(request) => Ok(HttpResponse::Accepted().json(request)),
        None => Err(AppError::Internal("edit action produced no request".to_string())),
    }
}

/// Registers every route; the caller supplies `web::Data<AppState>`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .route("/health", web::get().to(health))
    .route("/api/schedule", web::get().to(get_schedule))
    .route("/api/schedule", web::put().to(save_schedule))
    .route("/api/schedule/view", web::get().to(get_view))
    .route("/api/schedule/slot", web::post().to(tap_slot))
    .route("/api/schedule/slot/edit", web::post().to(edit_slot))
    .service(web::resource("/api/schedule/slot/{day}/{time}").route(web::get().to(get_slot)));
}

pub async fn start_server(port: u16, state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(state);

    info!("Serving schedule API on http://0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
