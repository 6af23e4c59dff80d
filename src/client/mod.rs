//! Typed client for the consumption API and the dashboard view models
//! built from its responses.

pub mod dashboard;
pub mod endpoints;
pub mod http;
pub mod normalize;
pub mod state;

pub use dashboard::Dashboard;
pub use http::{ApiClient, ApiError};
pub use normalize::{
    AlertItem, AlertKind, GeneratorCard, GeneratorState, LandingSummary, MeterCard, MeterLogRow,
    ZoneSeries,
};
pub use state::{DashboardContext, ErrorPolicy, FetchState, Screen, Selection};
