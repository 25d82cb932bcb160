#![forbid(unsafe_code)]

//! Station daemon binary.

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use intel_core::model::{Observer, RemoteHost};
use intel_daemon::{
    config::{self, Secret, StationConfig},
    http::{self, AppState},
    push::PushPipeline,
    render::PanelRenderer,
    scheduler::{ScheduleConfig, Scheduler},
    sources::{AircraftClient, CrewClient, DeviceLogClient, LiveFeeds, OrbitalClient, PassClient},
    store::StateStore,
    weather::WeatherClient,
};
use intel_remote::{SshConfig, SshExecutor};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "intel-daemon", version, about = "Neighborhood intel station aggregator")]
struct Args {
    /// Listen address, e.g. 0.0.0.0:5000
    #[arg(long, default_value = "0.0.0.0:5000")]
    listen: String,

    /// Log level (env-filter syntax).
    #[arg(long, default_value = "info")]
    log: String,

    /// Observer latitude in degrees.
    #[arg(long, default_value_t = 29.4953, allow_negative_numbers = true)]
    lat: f64,

    /// Observer longitude in degrees.
    #[arg(long, default_value_t = -95.1547, allow_negative_numbers = true)]
    lon: f64,

    /// Observer altitude in meters.
    #[arg(long, default_value_t = 15.0)]
    alt: f64,

    #[arg(long, default_value = "192.168.1.192")]
    sdr_host: String,

    #[arg(long, default_value = "mem")]
    sdr_user: String,

    #[arg(long, default_value = "192.168.1.220")]
    epaper_host: String,

    #[arg(long, default_value = "epaper")]
    epaper_user: String,

    /// Crew manifest is filtered to this craft.
    #[arg(long, default_value = "ISS")]
    tracked_craft: String,

    #[arg(long, default_value = config::DEFAULT_OPEN_NOTIFY_URL)]
    open_notify_url: String,

    #[arg(long, default_value = config::DEFAULT_OPENSKY_URL)]
    opensky_url: String,

    #[arg(long, default_value = config::DEFAULT_WEATHER_URL)]
    weather_url: String,

    #[arg(long, env = "AMBIENT_API_KEY", default_value = "", hide_env_values = true)]
    weather_api_key: String,

    #[arg(long, env = "AMBIENT_APP_KEY", default_value = "", hide_env_values = true)]
    weather_app_key: String,

    /// Where rendered and downloaded PNGs are written. Defaults to the system temp dir.
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// ssh/scp connection-establishment timeout.
    #[arg(long, default_value_t = 3)]
    connect_timeout_secs: u64,

    /// Pause after the position and device steps.
    #[arg(long, default_value_t = 1)]
    step_pause_secs: u64,

    /// Pause at the end of every poll pass.
    #[arg(long, default_value_t = 3)]
    pass_pause_secs: u64,

    /// Sleep after a poll pass aborted.
    #[arg(long, default_value_t = 10)]
    error_backoff_secs: u64,

    #[arg(long, default_value_t = 600)]
    crew_every_secs: u64,

    #[arg(long, default_value_t = 300)]
    passes_every_secs: u64,

    #[arg(long, default_value_t = 15)]
    aircraft_every_secs: u64,
}

impl Args {
    fn into_config(self) -> StationConfig {
        StationConfig {
            listen: self.listen,
            observer: Observer {
                lat: self.lat,
                lon: self.lon,
                alt: self.alt,
            },
            sdr: RemoteHost::new(self.sdr_host, self.sdr_user),
            epaper: RemoteHost::new(self.epaper_host, self.epaper_user),
            tracked_craft: self.tracked_craft,
            open_notify_url: self.open_notify_url,
            opensky_url: self.opensky_url,
            weather_url: self.weather_url,
            weather_api_key: Secret(self.weather_api_key),
            weather_app_key: Secret(self.weather_app_key),
            artifact_dir: self.artifact_dir.unwrap_or_else(std::env::temp_dir),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            schedule: ScheduleConfig {
                step_pause: Duration::from_secs(self.step_pause_secs),
                pass_pause: Duration::from_secs(self.pass_pause_secs),
                error_backoff: Duration::from_secs(self.error_backoff_secs),
                crew_every: Duration::from_secs(self.crew_every_secs),
                passes_every: Duration::from_secs(self.passes_every_secs),
                aircraft_every: Duration::from_secs(self.aircraft_every_secs),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = args.into_config();
    tracing::info!(config = ?cfg, "station starting");

    tokio::fs::create_dir_all(&cfg.artifact_dir).await?;

    let http_client = reqwest::Client::builder().build()?;
    let ssh = Arc::new(SshExecutor::new(SshConfig {
        connect_timeout: cfg.connect_timeout,
        ..SshConfig::default()
    }));
    let store = StateStore::default();

    let feeds = Arc::new(LiveFeeds {
        orbital: OrbitalClient::new(http_client.clone(), &cfg.open_notify_url),
        crew: CrewClient::new(http_client.clone(), &cfg.open_notify_url, &cfg.tracked_craft),
        passes: PassClient::new(http_client.clone(), &cfg.open_notify_url, cfg.observer),
        aircraft: AircraftClient::new(http_client.clone(), &cfg.opensky_url, &cfg.observer),
        device: DeviceLogClient::new(Arc::clone(&ssh), cfg.sdr.clone()),
    });

    let scheduler = Arc::new(Scheduler::new(feeds, store.clone(), cfg.schedule.clone()));
    scheduler.warm_up().await;
    let _poller = Arc::clone(&scheduler).spawn();

    let state = AppState {
        store,
        observer: cfg.observer,
        push: Arc::new(PushPipeline::new(
            ssh,
            cfg.epaper.clone(),
            cfg.sdr.clone(),
            &cfg.artifact_dir,
        )),
        renderer: Arc::new(PanelRenderer::new(&cfg.artifact_dir)),
        weather: WeatherClient::new(
            http_client,
            &cfg.weather_url,
            cfg.weather_api_key.expose(),
            cfg.weather_app_key.expose(),
        ),
    };
    let app = http::router(state);

    let listener = tokio::net::TcpListener::bind(cfg.listen.as_str()).await?;
    tracing::info!(listen = %cfg.listen, "serving");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}
