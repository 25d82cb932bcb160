//! PNG artifacts for the 7.3" six-colour e-paper panel.
//!
//! Only panel geometry and colour indicators are drawn.

use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat, Rgb, RgbImage};
use intel_core::geo::{distance_to, EARTH_RADIUS_KM};
use intel_core::model::{DeviceStatus, Observer, Snapshot, WeatherReading, MAX_AIRCRAFT};
use intel_core::RenderError;

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 480;

pub const DASHBOARD_FILE: &str = "nis_dashboard.png";
pub const WEATHER_FILE: &str = "nis_weather.png";

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);

/// Half the equatorial circumference; the farthest a ground point can be.
const MAX_GROUND_DISTANCE_KM: f64 = std::f64::consts::PI * EARTH_RADIUS_KM;
const UV_SCALE_MAX: f64 = 11.0;

/// Axis-aligned rectangle in panel pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    fn inset(&self, by: u32) -> Self {
        Self::new(
            self.x + by,
            self.y + by,
            self.w.saturating_sub(2 * by),
            self.h.saturating_sub(2 * by),
        )
    }
}

/// Fixed panel geometry shared by the renderer and its tests.
pub mod layout {
    use super::Rect;

    pub const HEADER: Rect = Rect::new(0, 0, 800, 40);
    pub const WEATHER_PANEL: Rect = Rect::new(8, 48, 388, 192);
    pub const ISS_PANEL: Rect = Rect::new(404, 48, 388, 192);
    pub const SDR_PANEL: Rect = Rect::new(8, 248, 388, 192);
    pub const AIRSPACE_PANEL: Rect = Rect::new(404, 248, 388, 192);
    pub const STATUS_STRIP: Rect = Rect::new(0, 448, 800, 32);

    pub const SDR_INDICATOR: Rect = Rect::new(24, 264, 48, 48);
    pub const SDR_NODE_INDICATOR: Rect = Rect::new(16, 456, 16, 16);
    pub const DISPLAY_NODE_INDICATOR: Rect = Rect::new(40, 456, 16, 16);
    pub const DISTANCE_GAUGE: Rect = Rect::new(420, 200, 356, 24);
    pub const AIRCRAFT_GAUGE: Rect = Rect::new(420, 400, 356, 24);
    pub const DASH_UV_GAUGE: Rect = Rect::new(24, 200, 356, 24);

    pub const WEATHER_HEADER: Rect = Rect::new(0, 0, 800, 48);
    pub const WEATHER_FOOTER: Rect = Rect::new(0, 440, 800, 40);
    pub const DIVIDERS: [Rect; 2] = [Rect::new(16, 180, 768, 2), Rect::new(16, 320, 768, 2)];
    pub const UV_GAUGE: Rect = Rect::new(32, 240, 736, 40);
    pub const PRESSURE_MARKER: Rect = Rect::new(32, 360, 48, 48);
    pub const RAIN_MARKER: Rect = Rect::new(112, 360, 48, 48);
}

/// Produces the PNG artifacts pushed to the display.
///
/// Rendering is CPU-bound and blocking; async callers should run it on a
/// blocking thread.
pub trait Renderer: Send + Sync {
    fn render_dashboard(
        &self,
        snapshot: &Snapshot,
        weather: Option<&WeatherReading>,
        observer: &Observer,
    ) -> Result<PathBuf, RenderError>;

    fn render_weather(&self, reading: &WeatherReading) -> Result<PathBuf, RenderError>;
}

/// [`Renderer`] writing 800×480 PNGs in the panel's palette.
#[derive(Debug, Clone)]
pub struct PanelRenderer {
    artifact_dir: PathBuf,
}

impl PanelRenderer {
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
        }
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    fn save(&self, img: &RgbImage, name: &str) -> Result<PathBuf, RenderError> {
        std::fs::create_dir_all(&self.artifact_dir).map_err(|source| RenderError::Io {
            path: self.artifact_dir.display().to_string(),
            source,
        })?;
        let path = self.artifact_dir.join(name);
        img.save_with_format(&path, ImageFormat::Png)
            .map_err(|e| match e {
                ImageError::IoError(source) => RenderError::Io {
                    path: path.display().to_string(),
                    source,
                },
                other => RenderError::Encode(other.to_string()),
            })?;
        tracing::debug!(path = %path.display(), "artifact written");
        Ok(path)
    }
}

impl Renderer for PanelRenderer {
    fn render_dashboard(
        &self,
        snapshot: &Snapshot,
        weather: Option<&WeatherReading>,
        observer: &Observer,
    ) -> Result<PathBuf, RenderError> {
        let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, WHITE);

        fill(&mut img, layout::HEADER, BLACK);
        for panel in [
            layout::WEATHER_PANEL,
            layout::ISS_PANEL,
            layout::SDR_PANEL,
            layout::AIRSPACE_PANEL,
        ] {
            outline(&mut img, panel, 2, BLACK);
        }
        fill(&mut img, layout::STATUS_STRIP, BLACK);

        match weather.and_then(|w| w.uv) {
            Some(uv) => gauge(&mut img, layout::DASH_UV_GAUGE, uv / UV_SCALE_MAX, uv_colour(uv)),
            None => outline(&mut img, layout::DASH_UV_GAUGE, 2, BLACK),
        }

        let distance = distance_to(observer, &snapshot.orbital_position);
        gauge(
            &mut img,
            layout::DISTANCE_GAUGE,
            1.0 - distance / MAX_GROUND_DISTANCE_KM,
            GREEN,
        );

        fill(
            &mut img,
            layout::SDR_INDICATOR,
            device_colour(snapshot.device_status),
        );

        gauge(
            &mut img,
            layout::AIRCRAFT_GAUGE,
            snapshot.aircraft.len() as f64 / MAX_AIRCRAFT as f64,
            BLUE,
        );

        let reachable = snapshot.device_status != DeviceStatus::Unreachable;
        fill(
            &mut img,
            layout::SDR_NODE_INDICATOR,
            if reachable { GREEN } else { RED },
        );
        // Display node: the artifact is about to be pushed to it.
        fill(&mut img, layout::DISPLAY_NODE_INDICATOR, GREEN);

        self.save(&img, DASHBOARD_FILE)
    }

    fn render_weather(&self, reading: &WeatherReading) -> Result<PathBuf, RenderError> {
        if reading.tempf.is_none() && reading.humidity.is_none() {
            return Err(RenderError::MissingData(
                "weather reading has neither temperature nor humidity".into(),
            ));
        }

        let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, WHITE);
        fill(&mut img, layout::WEATHER_HEADER, BLACK);
        fill(&mut img, layout::WEATHER_FOOTER, BLACK);
        for divider in layout::DIVIDERS {
            fill(&mut img, divider, BLACK);
        }

        let uv = reading.uv.unwrap_or(0.0);
        gauge(&mut img, layout::UV_GAUGE, uv / UV_SCALE_MAX, uv_colour(uv));

        fill(
            &mut img,
            layout::PRESSURE_MARKER,
            pressure_colour(reading.baromrelin),
        );

        match reading.hourlyrainin {
            Some(rate) if rate > 0.0 => fill(&mut img, layout::RAIN_MARKER, BLUE),
            _ => outline(&mut img, layout::RAIN_MARKER, 2, BLUE),
        }

        self.save(&img, WEATHER_FILE)
    }
}

/// Red while recording, green when armed or running, black otherwise.
pub fn device_colour(status: DeviceStatus) -> Rgb<u8> {
    match status {
        DeviceStatus::Recording => RED,
        DeviceStatus::Armed | DeviceStatus::Running => GREEN,
        _ => BLACK,
    }
}

pub fn uv_colour(uv: f64) -> Rgb<u8> {
    if uv < 3.0 {
        GREEN
    } else if uv < 6.0 {
        YELLOW
    } else {
        RED
    }
}

/// High pressure (above 30.10 inHg) is green, low (below 29.80) is red, black otherwise.
pub fn pressure_colour(baromrelin: Option<f64>) -> Rgb<u8> {
    match baromrelin {
        Some(p) if p > 30.1 => GREEN,
        Some(p) if p < 29.8 => RED,
        _ => BLACK,
    }
}

fn fill(img: &mut RgbImage, r: Rect, colour: Rgb<u8>) {
    let x_end = (r.x + r.w).min(img.width());
    let y_end = (r.y + r.h).min(img.height());
    for y in r.y..y_end {
        for x in r.x..x_end {
            img.put_pixel(x, y, colour);
        }
    }
}

fn outline(img: &mut RgbImage, r: Rect, thickness: u32, colour: Rgb<u8>) {
    let t = thickness.min(r.w / 2).min(r.h / 2);
    fill(img, Rect::new(r.x, r.y, r.w, t), colour);
    fill(img, Rect::new(r.x, r.y + r.h - t, r.w, t), colour);
    fill(img, Rect::new(r.x, r.y, t, r.h), colour);
    fill(img, Rect::new(r.x + r.w - t, r.y, t, r.h), colour);
}

/// Outlined bar filled from the left to `fraction` (clamped to [0, 1]).
fn gauge(img: &mut RgbImage, r: Rect, fraction: f64, colour: Rgb<u8>) {
    outline(img, r, 2, BLACK);
    let inner = r.inset(3);
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (inner.w as f64 * fraction).round() as u32;
    fill(img, Rect::new(inner.x, inner.y, filled, inner.h), colour);
}

#[cfg(test)]
mod tests {
    use super::*;
    use intel_core::model::{Aircraft, OrbitalPosition};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("intel-render-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn pixel_at(path: &Path, at: (u32, u32)) -> Rgb<u8> {
        let img = image::open(path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        *img.get_pixel(at.0, at.1)
    }

    fn aircraft(n: usize) -> Vec<Aircraft> {
        (0..n)
            .map(|i| Aircraft {
                icao24: format!("ac{i:04}"),
                callsign: String::new(),
                country: None,
                lat: 29.5,
                lon: -95.1,
                alt_m: 1000.0,
                alt_ft: 3281,
                velocity_kt: 200,
                heading: 0.0,
                vertical_rate: 0.0,
                on_ground: Some(false),
                squawk: None,
            })
            .collect()
    }

    #[test]
    fn dashboard_indicators_follow_device_status() {
        let dir = scratch_dir("dash");
        let renderer = PanelRenderer::new(&dir);
        let mut snap = Snapshot {
            device_status: DeviceStatus::Recording,
            aircraft: aircraft(MAX_AIRCRAFT),
            ..Snapshot::default()
        };

        let path = renderer
            .render_dashboard(&snap, None, &Observer::default())
            .unwrap();
        assert_eq!(path, dir.join(DASHBOARD_FILE));
        assert_eq!(pixel_at(&path, layout::SDR_INDICATOR.center()), RED);
        assert_eq!(pixel_at(&path, layout::SDR_NODE_INDICATOR.center()), GREEN);
        // A full sky fills the gauge to its right edge.
        let g = layout::AIRCRAFT_GAUGE;
        assert_eq!(pixel_at(&path, (g.x + g.w - 5, g.y + g.h / 2)), BLUE);

        snap.device_status = DeviceStatus::Unreachable;
        let path = renderer
            .render_dashboard(&snap, None, &Observer::default())
            .unwrap();
        assert_eq!(pixel_at(&path, layout::SDR_INDICATOR.center()), BLACK);
        assert_eq!(pixel_at(&path, layout::SDR_NODE_INDICATOR.center()), RED);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn distance_gauge_is_full_when_overhead() {
        let dir = scratch_dir("dist");
        let observer = Observer::default();
        let snap = Snapshot {
            orbital_position: OrbitalPosition {
                latitude: observer.lat,
                longitude: observer.lon,
                timestamp: 0,
            },
            ..Snapshot::default()
        };
        let path = PanelRenderer::new(&dir)
            .render_dashboard(&snap, None, &observer)
            .unwrap();
        let g = layout::DISTANCE_GAUGE;
        assert_eq!(pixel_at(&path, (g.x + g.w - 5, g.y + g.h / 2)), GREEN);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn weather_panel_markers() {
        let dir = scratch_dir("wx");
        let reading = WeatherReading {
            tempf: Some(91.0),
            uv: Some(7.0),
            baromrelin: Some(29.5),
            hourlyrainin: Some(0.2),
            ..WeatherReading::default()
        };
        let path = PanelRenderer::new(&dir).render_weather(&reading).unwrap();
        assert_eq!(path, dir.join(WEATHER_FILE));

        let g = layout::UV_GAUGE;
        assert_eq!(pixel_at(&path, (g.x + 10, g.y + g.h / 2)), RED);
        assert_eq!(pixel_at(&path, (g.x + g.w - 10, g.y + g.h / 2)), WHITE);
        assert_eq!(pixel_at(&path, layout::PRESSURE_MARKER.center()), RED);
        assert_eq!(pixel_at(&path, layout::RAIN_MARKER.center()), BLUE);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_reading_is_missing_data() {
        let dir = scratch_dir("empty");
        let err = PanelRenderer::new(&dir)
            .render_weather(&WeatherReading::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingData(_)));
        assert!(!dir.join(WEATHER_FILE).exists());
    }

    #[test]
    fn uv_thresholds() {
        assert_eq!(uv_colour(0.0), GREEN);
        assert_eq!(uv_colour(2.9), GREEN);
        assert_eq!(uv_colour(3.0), YELLOW);
        assert_eq!(uv_colour(5.9), YELLOW);
        assert_eq!(uv_colour(6.0), RED);
        assert_eq!(uv_colour(11.0), RED);
    }

    #[test]
    fn pressure_bands() {
        assert_eq!(pressure_colour(Some(30.2)), GREEN);
        assert_eq!(pressure_colour(Some(30.1)), BLACK);
        assert_eq!(pressure_colour(Some(30.0)), BLACK);
        assert_eq!(pressure_colour(Some(29.8)), BLACK);
        assert_eq!(pressure_colour(Some(29.79)), RED);
        assert_eq!(pressure_colour(None), BLACK);
    }

    #[test]
    fn never_checked_node_is_not_flagged_unreachable() {
        let dir = scratch_dir("unknown");
        let path = PanelRenderer::new(&dir)
            .render_dashboard(&Snapshot::default(), None, &Observer::default())
            .unwrap();
        assert_eq!(pixel_at(&path, layout::SDR_NODE_INDICATOR.center()), GREEN);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn armed_and_running_are_green() {
        assert_eq!(device_colour(DeviceStatus::Armed), GREEN);
        assert_eq!(device_colour(DeviceStatus::Running), GREEN);
        assert_eq!(device_colour(DeviceStatus::Sleeping), BLACK);
        assert_eq!(device_colour(DeviceStatus::Offline), BLACK);
    }
}
