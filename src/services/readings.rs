use super::ConsumptionService;
use crate::domain::power::generator_events;
use crate::domain::zones::{FACILITY_METERS, GENERATOR_METERS, LOGGED_METERS};
use crate::domain::{DateRange, GeneratorEvent, MeterReading, MinuteDemand, ReadingBounds};
use crate::error::Result;

/// Everything the alert feed shows for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct Alerts {
    pub threshold_kva: f64,
    pub peak_demand: Vec<MinuteDemand>,
    pub generator_events: Vec<GeneratorEvent>,
}

impl ConsumptionService {
    /// First and last reading of every logged meter, including generators.
    pub async fn meter_log(&self, range: &DateRange) -> Result<Vec<ReadingBounds>> {
        self.repository.reading_bounds(range, LOGGED_METERS).await
    }

    /// Latest reading of each generator inside the window. Generators
    /// without readings are absent.
    pub async fn generator_status(&self, range: &DateRange) -> Result<Vec<MeterReading>> {
        let bounds = self.repository.reading_bounds(range, GENERATOR_METERS).await?;
        Ok(bounds.into_iter().map(|b| b.last).collect())
    }

    pub async fn alerts(&self, range: &DateRange) -> Result<Alerts> {
        let threshold_kva = self.alerts.peak_demand_threshold_kva;
        let (peak_demand, transitions) = tokio::try_join!(
            self.repository
                .minute_demand_above(range, FACILITY_METERS, threshold_kva),
            self.repository.generator_transitions(
                range,
                GENERATOR_METERS,
                self.alerts.generator_running_kw
            ),
        )?;
        Ok(Alerts {
            threshold_kva,
            peak_demand,
            generator_events: generator_events(&transitions),
        })
    }
}
