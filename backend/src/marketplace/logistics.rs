use axent_common::marketplace::{Delivery, DeliveryStatus, OperatorStatus, TransportStatus};
use serde::Serialize;

/// Progress bar percentage for a delivery. Later stages override earlier
/// ones, so a dispatched truck reads 75 even while the status lags.
pub fn progress(delivery: &Delivery) -> u8 {
    let mut progress = 0;
    if delivery.status == DeliveryStatus::Pending {
        progress = 10;
    }
    if delivery.status == DeliveryStatus::OperatorAssigned
        || (delivery.operator_status == OperatorStatus::NotNeeded
            && delivery.transport_status == TransportStatus::Pending)
    {
        progress = 40;
    }
    if delivery.status == DeliveryStatus::InTransit || delivery.transport_status == TransportStatus::Dispatched {
        progress = 75;
    }
    if delivery.status == DeliveryStatus::Delivered || delivery.transport_status == TransportStatus::Arrived {
        progress = 100;
    }
    progress
}

/// Delivery plus derived progress, as rendered on the customer dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct TrackedDelivery {
    #[serde(flatten)]
    pub delivery: Delivery,
    pub progress: u8,
    pub has_issue: bool,
}

impl From<Delivery> for TrackedDelivery {
    fn from(delivery: Delivery) -> Self {
        Self {
            progress: progress(&delivery),
            has_issue: delivery.status == DeliveryStatus::Issue,
            delivery,
        }
    }
}
