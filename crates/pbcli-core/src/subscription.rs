// ── Subscription ──
//
// The live handle a listen session consumes: four independent FIFO
// channels, one per event kind. Each channel has a single producer (the
// listener task) and a single consumer (the dispatcher).

use tokio::sync::mpsc;

use crate::model::{Device, Ephemeral, Push, StreamError};

/// Receiving side, owned by the dispatcher for the whole session.
#[derive(Debug)]
pub struct Subscription {
    pub pushes: mpsc::Receiver<Push>,
    pub ephemerals: mpsc::Receiver<Ephemeral>,
    pub devices: mpsc::Receiver<Device>,
    pub errors: mpsc::Receiver<StreamError>,
}

/// Producing side, owned by whatever feeds the session.
#[derive(Debug, Clone)]
pub struct SubscriptionSender {
    pub pushes: mpsc::Sender<Push>,
    pub ephemerals: mpsc::Sender<Ephemeral>,
    pub devices: mpsc::Sender<Device>,
    pub errors: mpsc::Sender<StreamError>,
}

/// Create a connected sender/subscription pair with `capacity` slots per
/// channel.
pub fn channel(capacity: usize) -> (SubscriptionSender, Subscription) {
    let capacity = capacity.max(1);
    let (push_tx, push_rx) = mpsc::channel(capacity);
    let (eph_tx, eph_rx) = mpsc::channel(capacity);
    let (dev_tx, dev_rx) = mpsc::channel(capacity);
    let (err_tx, err_rx) = mpsc::channel(capacity);

    (
        SubscriptionSender {
            pushes: push_tx,
            ephemerals: eph_tx,
            devices: dev_tx,
            errors: err_tx,
        },
        Subscription {
            pushes: push_rx,
            ephemerals: eph_rx,
            devices: dev_rx,
            errors: err_rx,
        },
    )
}
