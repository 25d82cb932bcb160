use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use intel_core::api::{AircraftResponse, ErrorBody, IssResponse, SdrResponse, StatusResponse};
use intel_core::geo::distance_to;
use intel_core::model::{Observer, PushResult, Snapshot, Source};
use intel_core::{round_tenth, RenderError};
use intel_remote::RemoteShell;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::push::PushPipeline;
use crate::render::Renderer;
use crate::store::StateStore;
use crate::weather::WeatherClient;

pub const WEATHER_UNAVAILABLE: &str = "could not fetch weather data";

pub struct AppState<R> {
    pub store: StateStore,
    pub observer: Observer,
    pub push: Arc<PushPipeline<R>>,
    pub renderer: Arc<dyn Renderer>,
    pub weather: WeatherClient,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            observer: self.observer,
            push: Arc::clone(&self.push),
            renderer: Arc::clone(&self.renderer),
            weather: self.weather.clone(),
        }
    }
}

pub fn router<R>(state: AppState<R>) -> Router
where
    R: RemoteShell + 'static,
{
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/status", get(status::<R>))
        .route("/api/iss", get(iss::<R>))
        .route("/api/aircraft", get(aircraft::<R>))
        .route("/api/sdr", get(sdr::<R>))
        .route("/api/push/satellite", post(push_satellite::<R>))
        .route("/api/push/dashboard", post(push_dashboard::<R>))
        .route("/api/push/weather", post(push_weather::<R>))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> Json<&'static str> {
    Json("ok")
}

async fn not_found() -> Response {
    let body = Json(ErrorBody {
        error: "not found".into(),
    });
    (StatusCode::NOT_FOUND, body).into_response()
}

fn distance_km(observer: &Observer, snap: &Snapshot) -> f64 {
    round_tenth(distance_to(observer, &snap.orbital_position))
}

async fn status<R: RemoteShell + 'static>(
    State(st): State<AppState<R>>,
) -> Json<StatusResponse> {
    let snap = st.store.get().await;
    Json(StatusResponse {
        distance_km: distance_km(&st.observer, &snap),
        aircraft_count: snap.aircraft.len(),
        timestamp: st.store.clock().now(),
        sdr_status: snap.device_status,
        sdr_log: snap.device_log,
        iss: snap.orbital_position,
        iss_crew: snap.crew_manifest,
        iss_passes: snap.pass_predictions,
        aircraft: snap.aircraft,
        last_update: snap.last_update,
    })
}

async fn iss<R: RemoteShell + 'static>(State(st): State<AppState<R>>) -> Json<IssResponse> {
    let snap = st.store.get().await;
    Json(IssResponse {
        distance_km: distance_km(&st.observer, &snap),
        position: snap.orbital_position,
        crew: snap.crew_manifest,
        passes: snap.pass_predictions,
    })
}

async fn aircraft<R: RemoteShell + 'static>(
    State(st): State<AppState<R>>,
) -> Json<AircraftResponse> {
    let snap = st.store.get().await;
    Json(AircraftResponse {
        last_update: snap.last_update_of(Source::Aircraft).unwrap_or(0.0),
        count: snap.aircraft.len(),
        aircraft: snap.aircraft,
    })
}

async fn sdr<R: RemoteShell + 'static>(State(st): State<AppState<R>>) -> Json<SdrResponse> {
    let snap = st.store.get().await;
    Json(SdrResponse {
        last_update: snap.last_update_of(Source::DeviceStatus).unwrap_or(0.0),
        status: snap.device_status,
        log: snap.device_log,
    })
}

async fn push_satellite<R: RemoteShell + 'static>(
    State(st): State<AppState<R>>,
) -> Json<PushResult> {
    Json(st.push.push_latest_capture().await)
}

/// Renders from the current snapshot; a weather reading is added when one can be fetched.
async fn push_dashboard<R: RemoteShell + 'static>(
    State(st): State<AppState<R>>,
) -> Json<PushResult> {
    let snap = st.store.get().await;
    let weather = match st.weather.fetch().await {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!(error = %e, "dashboard rendered without weather");
            None
        }
    };

    let renderer = Arc::clone(&st.renderer);
    let observer = st.observer;
    let rendered =
        run_render(move || renderer.render_dashboard(&snap, weather.as_ref(), &observer)).await;
    let artifact = match rendered {
        Ok(path) => path,
        Err(msg) => return Json(PushResult::not_attempted(msg)),
    };
    Json(st.push.push_to_display(&artifact).await)
}

async fn push_weather<R: RemoteShell + 'static>(
    State(st): State<AppState<R>>,
) -> Json<PushResult> {
    let reading = match st.weather.fetch().await {
        Ok(w) => w,
        Err(e) => {
            tracing::warn!(error = %e, "weather fetch failed");
            return Json(PushResult::not_attempted(WEATHER_UNAVAILABLE));
        }
    };

    let renderer = Arc::clone(&st.renderer);
    let artifact = match run_render(move || renderer.render_weather(&reading)).await {
        Ok(path) => path,
        Err(msg) => return Json(PushResult::not_attempted(msg)),
    };
    Json(st.push.push_to_display(&artifact).await)
}

/// Runs a renderer call on the blocking pool. Errors come back as the push message.
async fn run_render<F>(f: F) -> Result<PathBuf, String>
where
    F: FnOnce() -> Result<PathBuf, RenderError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(path)) => Ok(path),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "render failed");
            Err(format!("render failed: {e}"))
        }
        Err(e) => {
            tracing::error!(error = %e, "render task aborted");
            Err(format!("render failed: {e}"))
        }
    }
}
