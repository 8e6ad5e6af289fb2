//! Out-of-band delivery of parameter snapshots.
//!
//! The remote service is authoritative over parameter rows. [`ParameterFeed`]
//! runs a background task that fetches the current rows on a fixed interval
//! and whenever it is nudged (typically right after a command was submitted),
//! forwarding every snapshot over a channel. The UI only ever renders what
//! arrives here.

use std::sync::Arc;
use std::time::Duration;

use paramdeck_api::ModelService;
use paramdeck_types::Parameter;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

const FEED_CHANNEL_CAPACITY: usize = 16;

/// One delivery from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedUpdate {
    /// The service answered; `None` means it had no usable row list.
    Rows(Option<Vec<Parameter>>),
    /// The service could not be reached; rows shown so far are stale.
    Unreachable(String),
}

/// Handle used to request an immediate refresh.
#[derive(Debug, Clone)]
pub struct FeedRefresher {
    nudge: Arc<Notify>,
}

impl FeedRefresher {
    pub fn refresh(&self) {
        self.nudge.notify_one();
    }
}

/// Background polling task. Aborted when dropped.
#[derive(Debug)]
pub struct ParameterFeed {
    nudge: Arc<Notify>,
    task: JoinHandle<()>,
}

impl ParameterFeed {
    /// Start polling `entity`. The first snapshot is fetched immediately.
    pub fn spawn(service: Arc<dyn ModelService>, entity: String, interval: Duration) -> (Self, mpsc::Receiver<FeedUpdate>) {
        let (sender, receiver) = mpsc::channel(FEED_CHANNEL_CAPACITY);
        let nudge = Arc::new(Notify::new());
        let task = tokio::spawn(run_feed(service, entity, interval, Arc::clone(&nudge), sender));
        (Self { nudge, task }, receiver)
    }

    pub fn refresher(&self) -> FeedRefresher {
        FeedRefresher {
            nudge: Arc::clone(&self.nudge),
        }
    }
}

impl Drop for ParameterFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_feed(
    service: Arc<dyn ModelService>,
    entity: String,
    interval: Duration,
    nudge: Arc<Notify>,
    sender: mpsc::Sender<FeedUpdate>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = nudge.notified() => {
                ticker.reset();
            }
        }
        let update = match service.fetch_parameters(&entity).await {
            Ok(rows) => {
                debug!(entity = %entity, rows = rows.as_ref().map(Vec::len), "parameter snapshot received");
                FeedUpdate::Rows(rows)
            }
            Err(error) => {
                warn!(entity = %entity, %error, "parameter snapshot unavailable");
                FeedUpdate::Unreachable(error.to_string())
            }
        };
        if sender.send(update).await.is_err() {
            debug!(entity = %entity, "feed receiver closed; stopping");
            break;
        }
    }
}
