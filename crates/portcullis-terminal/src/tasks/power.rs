use std::sync::Arc;
use std::time::Duration;

use portcullis_hardware::{BatteryGauge, Indicator, IndicatorState, PowerSensor};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::TerminalConfig;
use crate::error::Result;
use crate::gate::AcquireTimeout;
use crate::power::{PowerMonitor, PowerTransition};
use crate::resources::SharedResources;

/// Samples power and holds the indicator orange for the whole of a battery
/// warning.
///
/// The indicator gate is taken with an unbounded wait on entry to Warning and
/// kept until external power returns. While it is held the credential task
/// cannot show verdicts.
pub struct PowerMonitorTask<P, T, I> {
    sensor: P,
    resources: Arc<SharedResources<T, I>>,
    cancel: CancellationToken,
    gauge: BatteryGauge,
    interval: Duration,
}

impl<P, T, I> PowerMonitorTask<P, T, I>
where
    P: PowerSensor,
    T: Send,
    I: Indicator,
{
    pub fn new(
        sensor: P,
        resources: Arc<SharedResources<T, I>>,
        config: &TerminalConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            sensor,
            resources,
            cancel,
            gauge: BatteryGauge::new(config.battery_critical_mv),
            interval: config.power_sample_interval(),
        }
    }

    /// Run until cancelled.
    pub async fn run(self) -> Result<()> {
        let Self {
            mut sensor,
            resources,
            cancel,
            gauge,
            interval,
        } = self;
        info!(interval_ms = interval.as_millis() as u64, "Power monitor task started");

        let mut monitor = PowerMonitor::new();
        let mut warning = None;

        loop {
            let Some(reading) = cancel.run_until_cancelled(sensor.read()).await else {
                break;
            };

            match reading {
                Ok(reading) => match monitor.observe(gauge.classify(reading)) {
                    Some(PowerTransition::EnterWarning) => {
                        warn!(battery_mv = reading.battery_mv, "Battery critical, showing warning");
                        let Ok(mut panel) = resources
                            .indicator
                            .acquire(AcquireTimeout::Unbounded, &cancel)
                            .await
                        else {
                            break;
                        };
                        if let Err(e) = panel.set(IndicatorState::Orange).await {
                            warn!(error = %e, "Failed to show battery warning");
                        }
                        warning = Some(panel);
                    }
                    Some(PowerTransition::ExitWarning) => {
                        info!(battery_mv = reading.battery_mv, "External power restored");
                        if let Some(mut panel) = warning.take() {
                            if let Err(e) = panel.set(IndicatorState::Off).await {
                                warn!(error = %e, "Failed to clear battery warning");
                            }
                        }
                    }
                    None => {}
                },
                Err(e) => warn!(error = %e, "Power sample failed"),
            }

            if cancel
                .run_until_cancelled(tokio::time::sleep(interval))
                .await
                .is_none()
            {
                break;
            }
        }

        if let Some(mut panel) = warning.take() {
            if let Err(e) = panel.set(IndicatorState::Off).await {
                warn!(error = %e, "Failed to clear battery warning on shutdown");
            }
        }
        info!(state = %monitor.state(), "Power monitor task stopped");
        Ok(())
    }
}
