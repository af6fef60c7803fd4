//! Alert listing filter.

use tracing::debug;

use super::Enforcement;
use crate::api::AlertsData;

/// Keep, in order, only the alerts the tenant may see.
pub fn filter_alerts(data: AlertsData, enforcement: &Enforcement<'_>) -> AlertsData {
    let original_count = data.alerts.len();
    let alerts: Vec<_> = data
        .alerts
        .into_iter()
        .filter(|alert| enforcement.allows(&alert.labels))
        .collect();

    let filtered_count = original_count - alerts.len();
    if filtered_count > 0 {
        debug!(
            label = enforcement.label,
            filtered = filtered_count,
            remaining = alerts.len(),
            "Filtered alerts by label"
        );
    }

    AlertsData { alerts }
}
