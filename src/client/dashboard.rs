use super::http::{ApiClient, ApiError};
use super::normalize::{
    alert_feed, generator_cards, heatmap_grid, hourly_series, meter_cards, meter_log_rows,
    zone_series, AlertItem, GeneratorCard, LandingSummary, MeterCard, MeterLogRow, ZoneSeries,
    HOURS_PER_DAY,
};
use super::state::{DashboardContext, ErrorPolicy, Screen, Selection};
use crate::domain::{DayRange, Metric};
use tokio::sync::watch;
use tracing::{info, warn};

/// The dashboard screens, all driven by one shared selection.
#[derive(Clone)]
pub struct Dashboard {
    client: ApiClient,
    context: DashboardContext,
    pub hourly: Screen<[f64; HOURS_PER_DAY]>,
    pub meters: Screen<Vec<MeterCard>>,
    pub zones: Screen<Vec<ZoneSeries>>,
    pub heatmap: Screen<Vec<[f64; HOURS_PER_DAY]>>,
    pub summary: Screen<LandingSummary>,
    pub generators: Screen<Vec<GeneratorCard>>,
    pub meter_log: Screen<Vec<MeterLogRow>>,
    pub alerts: Screen<Vec<AlertItem>>,
}

impl Dashboard {
    pub fn new(client: ApiClient, context: DashboardContext) -> Self {
        Self {
            client,
            context,
            hourly: Screen::new("hourly", ErrorPolicy::Clear),
            meters: Screen::new("meters", ErrorPolicy::RetainStale),
            zones: Screen::new("zones", ErrorPolicy::RetainStale),
            heatmap: Screen::new("heatmap", ErrorPolicy::Clear),
            summary: Screen::new("summary", ErrorPolicy::RetainStale),
            generators: Screen::new("generators", ErrorPolicy::RetainStale),
            meter_log: Screen::new("meter_log", ErrorPolicy::Clear),
            alerts: Screen::new("alerts", ErrorPolicy::RetainStale),
        }
    }

    pub fn context(&self) -> &DashboardContext {
        &self.context
    }

    pub async fn refresh_hourly(&self) -> bool {
        let Selection { range, unit } = self.context.selection();
        self.hourly
            .load(async {
                let body = self.client.get_hourly(&range, unit).await?;
                Ok::<_, ApiError>(hourly_series(&body.consumption_data))
            })
            .await
    }

    /// Meter cards use apparent energy. A failed facility total is shown
    /// as 0 rather than failing the screen.
    pub async fn refresh_meters(&self) -> bool {
        let range = self.context.selection().range;
        self.meters
            .load(async {
                let (records, total) = tokio::join!(
                    self.client.get_meter_consumption(&range),
                    self.client.get_facility_total(&range, Metric::Kvah),
                );
                let total = total.unwrap_or_else(|err| {
                    warn!(error = %err, "facility total unavailable, using 0");
                    0.0
                });
                Ok::<_, ApiError>(meter_cards(&records?.consumption_data, total))
            })
            .await
    }

    pub async fn refresh_zones(&self, zone: Option<i32>) -> bool {
        let Selection { range, unit } = self.context.selection();
        let metric = unit.metric();
        self.zones
            .load(async {
                let body = self.client.get_zone_hourly(&range, metric, zone).await?;
                Ok::<_, ApiError>(zone_series(&body.consumption_data, metric))
            })
            .await
    }

    pub async fn refresh_heatmap(&self, days: DayRange) -> bool {
        self.heatmap
            .load(async {
                let body = self.client.get_heatmap(&days).await?;
                Ok::<_, ApiError>(heatmap_grid(&body.consumption_data, &days))
            })
            .await
    }

    pub async fn refresh_summary(&self) -> bool {
        let range = self.context.selection().range;
        self.summary
            .load(async {
                let (kwh, kvah, peak, cost) = tokio::try_join!(
                    self.client.get_landing_kwh(&range),
                    self.client.get_landing_kvah(&range),
                    self.client.get_peak_demand(&range),
                    self.client.get_cost(&range),
                )?;
                Ok::<_, ApiError>(LandingSummary::new(
                    kwh,
                    kvah,
                    peak.peak_demand,
                    cost.total_cost,
                    cost.currency,
                ))
            })
            .await
    }

    /// Generator state is judged against the local wall clock.
    pub async fn refresh_generators(&self) -> bool {
        let range = self.context.selection().range;
        self.generators
            .load(async {
                let body = self.client.get_generator_status(&range).await?;
                let now = chrono::Local::now().naive_local();
                Ok::<_, ApiError>(generator_cards(&body, now))
            })
            .await
    }

    pub async fn refresh_meter_log(&self) -> bool {
        let range = self.context.selection().range;
        self.meter_log
            .load(async {
                let body = self.client.get_meter_log(&range).await?;
                Ok::<_, ApiError>(meter_log_rows(&body.data))
            })
            .await
    }

    pub async fn refresh_alerts(&self) -> bool {
        let range = self.context.selection().range;
        self.alerts
            .load(async {
                let body = self.client.get_alerts(&range).await?;
                Ok::<_, ApiError>(alert_feed(&body))
            })
            .await
    }

    /// Refresh every screen for the current selection. The heatmap covers
    /// the calendar days of the selected range.
    pub async fn refresh_all(&self) {
        let days = DayRange::covering(&self.context.selection().range);
        tokio::join!(
            self.refresh_hourly(),
            self.refresh_meters(),
            self.refresh_zones(None),
            self.refresh_heatmap(days),
            self.refresh_summary(),
            self.refresh_generators(),
            self.refresh_meter_log(),
            self.refresh_alerts(),
        );
    }

    /// Refresh on every selection change. The dashboard keeps the context
    /// alive, so this runs until its task is aborted.
    pub async fn follow(self, mut changes: watch::Receiver<Selection>) {
        while changes.changed().await.is_ok() {
            let selection = changes.borrow_and_update().clone();
            info!(
                start = %selection.range.start_param(),
                end = %selection.range.end_param(),
                unit = selection.unit.as_str(),
                "selection changed, refreshing"
            );
            self.refresh_all().await;
        }
    }
}
