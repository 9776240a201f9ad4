use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::config::DashboardConfig;
use crate::event::Event;

/// Repeating timer owned by a shell. The first tick fires one full period
/// after start; the task is aborted when the ticker is dropped.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Must be called from within a tokio runtime.
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                on_tick();
            }
        });
        Self { handle }
    }

    /// Forwards `event` into the shell's event queue on every tick. Stops
    /// quietly once the receiver is gone.
    pub fn forwarding(period: Duration, event: Event, sender: UnboundedSender<Event>) -> Self {
        Self::start(period, move || {
            if sender.send(event.clone()).is_err() {
                debug!("tick receiver dropped");
            }
        })
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The stats and prediction timers a mounted dashboard keeps alive.
#[derive(Debug)]
pub struct DashboardTickers {
    pub stats: Ticker,
    pub predictions: Ticker,
}

impl DashboardTickers {
    pub fn start(config: &DashboardConfig, sender: &UnboundedSender<Event>) -> Self {
        Self {
            stats: Ticker::forwarding(config.stats_tick(), Event::StatsTick, sender.clone()),
            predictions: Ticker::forwarding(
                config.prediction_tick(),
                Event::PredictionTick,
                sender.clone(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period_until_dropped() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let ticker = Ticker::start(Duration::from_secs(30), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sleep(Duration::from_secs(95)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(ticker.is_running());

        drop(ticker);
        sleep(Duration::from_secs(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dashboard_tickers_interleave() {
        let (tx, mut rx) = unbounded_channel();
        let tickers = DashboardTickers::start(&DashboardConfig::default(), &tx);

        sleep(Duration::from_secs(61)).await;
        drop(tickers);

        let mut received = Vec::new();
        while let Ok(event) = rx.try_recv() {
            received.push(event);
        }
        let stats = received.iter().filter(|e| **e == Event::StatsTick).count();
        let predictions = received
            .iter()
            .filter(|e| **e == Event::PredictionTick)
            .count();
        assert_eq!(stats, 2);
        assert_eq!(predictions, 1);
    }
}
