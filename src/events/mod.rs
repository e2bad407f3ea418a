use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Domain events emitted by ledger-mutating operations. Consumers are
/// in-process only; delivery to external systems is out of scope, but the
/// seam stays so it can be added without touching the services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    WarehouseCreated(Uuid),
    VendorCreated(Uuid),
    RawMaterialCreated(Uuid),

    PurchaseOrderCreated(Uuid),
    PurchaseOrderItemReceived {
        item_id: Uuid,
        raw_material_id: Uuid,
        warehouse_id: Uuid,
        delta_received: Decimal,
        stock_entry_id: Uuid,
    },

    StockEntryRecorded {
        entry_id: Uuid,
        raw_material_id: Uuid,
        warehouse_id: Uuid,
        entry_type: String,
        quantity: Decimal,
    },

    CleaningJobCreated {
        job_id: Uuid,
        job_number: String,
        reserved_quantity: Decimal,
    },
    CleaningJobResolved {
        job_id: Uuid,
        status: String,
        wastage_quantity: Decimal,
    },
    CleaningJobCancelled {
        job_id: Uuid,
        released_quantity: Decimal,
    },

    ProcessingJobCreated {
        job_id: Uuid,
        job_number: String,
        quantity_input: Decimal,
    },
    ProcessingJobFinished {
        job_id: Uuid,
        finished_good_id: Uuid,
        finished_quantity: Decimal,
        by_product_quantity: Decimal,
    },
    ProcessingJobCancelled(Uuid),

    QualityReportFiled {
        report_id: Uuid,
        grn: String,
        filed_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates a bounded event channel with its sender half wrapped.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging every event. Runs until all senders
/// drop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "domain event");
    }
    info!("event channel closed; event processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn send_and_receive_roundtrip() {
        let (sender, mut rx) = channel(8);
        sender
            .send(Event::CleaningJobCreated {
                job_id: Uuid::new_v4(),
                job_number: "CJ00001".to_string(),
                reserved_quantity: dec!(100),
            })
            .await
            .unwrap();

        match rx.recv().await {
            Some(Event::CleaningJobCreated { job_number, .. }) => {
                assert_eq!(job_number, "CJ00001");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
