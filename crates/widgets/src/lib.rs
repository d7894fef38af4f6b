//! Concrete dashboard widgets. Each implements `core_widget::WidgetKind`
//! and owns exactly the cadence and raster-caching logic the station
//! needs; content generation is delegated to the collaborator traits in
//! [`collaborators`].

pub mod collaborators;
pub mod util;

pub mod calendar;
pub mod clock;
pub mod forecast;
pub mod pressure;
pub mod sunrise_sunset;
pub mod temperature;

pub use calendar::CalendarWidget;
pub use clock::ClockWidget;
pub use forecast::ForecastWidget;
pub use pressure::PressureWidget;
pub use sunrise_sunset::SunriseSunsetWidget;
pub use temperature::{SensorEntityIds, TemperatureWidget};
