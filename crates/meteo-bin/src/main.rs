//! Composition root: parses the CLI, loads configuration, wires the
//! concrete widgets and the placeholder panel driver into a [`Compositor`]
//! and [`RenderLoop`], and runs the loop until a fatal error surfaces.

mod cli;
mod logging;
mod panel;
mod render_loop;
mod service;
mod stubs;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command, RunArgs};
use core_compositor::Compositor;
use core_config::flags::CommandFlags;
use core_config::Config;
use core_panel::EpdGuard;
use core_widget::WidgetKind;
use panel::LoggingPanel;
use render_loop::RenderLoop;
use tracing::info;
use widgets::collaborators::HtmlRenderer;
use widgets::{
    CalendarWidget, ClockWidget, ForecastWidget, PressureWidget, SensorEntityIds,
    SunriseSunsetWidget, TemperatureWidget,
};

/// The panel this station ships with. The real driver reports these after
/// SPI init; the placeholder driver is handed them directly since it has
/// no hardware to ask.
const PANEL_WIDTH: u32 = 1872;
const PANEL_HEIGHT: u32 = 1404;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging::configure_logging()?;
    logging::install_panic_hook();

    let args = Args::parse();
    match args.command {
        Command::Run(run_args) => run(run_args).await,
        Command::Service { action } => service::run(action),
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let config = core_config::load_from(args.config.clone())?;
    config.validate_screen_layout(PANEL_WIDTH, PANEL_HEIGHT)?;

    info!(
        target: "runtime.startup",
        vcom = args.vcom,
        no_web_server = args.no_web_server,
        interface = %args.interface,
        port = args.port,
        "starting meteo station render loop"
    );

    let mut panel = LoggingPanel::init(args.vcom, PANEL_WIDTH, PANEL_HEIGHT);
    let guard = EpdGuard::new(&mut panel);
    let compositor = build_compositor(&config);
    let flags = CommandFlags::new();

    let mut render_loop = RenderLoop::new(guard, compositor, flags);

    if !args.no_web_server {
        info!(
            target: "runtime.startup",
            interface = %args.interface,
            port = args.port,
            "companion web UI is out of scope for this build; command flags remain available for scripted testing"
        );
    }

    render_loop.run().await
}

/// Builds the six dashboard widgets at their configured rectangles, wired
/// to placeholder collaborators, and hands them to a fresh [`Compositor`].
fn build_compositor(config: &Config) -> Compositor {
    let layout = &config.file.screen_layout;
    let html_renderer = || -> Box<dyn HtmlRenderer> { Box::new(stubs::BlankHtmlRenderer) };

    let widgets: Vec<Box<dyn WidgetKind>> = vec![
        Box::new(ClockWidget::new(
            layout.clock.into(),
            Box::new(stubs::SolidDigitGlyphs::new()),
        )),
        Box::new(TemperatureWidget::new(
            layout.temperature.into(),
            Box::new(stubs::UnconfiguredSensor),
            sensor_entity_ids(config),
            html_renderer(),
        )),
        Box::new(PressureWidget::new(
            layout.pressure.into(),
            Box::new(stubs::UnconfiguredSensor),
            config.file.home_assistant.pressure_sensor.clone(),
            html_renderer(),
        )),
        Box::new(SunriseSunsetWidget::new(
            layout.sunrise_sunset.into(),
            Box::new(stubs::NoopDaylight),
            config.file.daylight.latitude,
            config.file.daylight.longitude,
            html_renderer(),
        )),
        Box::new(CalendarWidget::new(
            layout.calendar.into(),
            config.file.special_days.clone(),
            html_renderer(),
        )),
        Box::new(ForecastWidget::new(
            layout.forecast.into(),
            Box::new(stubs::UnconfiguredWeather),
            html_renderer(),
        )),
    ];

    Compositor::new(PANEL_WIDTH, PANEL_HEIGHT, widgets, false)
}

fn sensor_entity_ids(config: &Config) -> SensorEntityIds {
    let ha = &config.file.home_assistant;
    SensorEntityIds {
        internal_temperature: ha.internal_temperature_sensor.clone(),
        external_temperature: ha.external_temperature_sensor.clone(),
        internal_humidity: ha.internal_humidity_sensor.clone(),
        external_humidity: ha.external_humidity_sensor.clone(),
    }
}
