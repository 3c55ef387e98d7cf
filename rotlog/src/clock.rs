use chrono::{DateTime, Local, TimeZone, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

// ===== Часы =====

/// Источник времени для ротации: имена файлов считаются в поясе `Tz`.
pub trait Clock: Send + Sync + 'static {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;

    /// Завершается не раньше, чем `now()` дойдёт до `deadline`.
    fn sleep_until(&self, deadline: DateTime<Utc>) -> impl Future<Output = ()> + Send;
}

/// Местное время и таймеры tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep_until(&self, deadline: DateTime<Utc>) {
        // системные часы могут уйти от монотонных, поэтому сверяемся после сна
        loop {
            let left = deadline - Utc::now();
            match left.to_std() {
                Ok(left) if !left.is_zero() => tokio::time::sleep(left).await,
                _ => return,
            }
        }
    }
}

/// Часы, которые двигаются только вручную. Время в UTC.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<watch::Sender<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        let (now, _) = watch::channel(start);
        ManualClock { now: Arc::new(now) }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.send_replace(at);
    }

    pub fn advance(&self, by: Duration) {
        let by = chrono::TimeDelta::from_std(by).unwrap_or(chrono::TimeDelta::MAX);
        self.now.send_modify(|now| *now += by);
    }
}

impl Clock for ManualClock {
    type Tz = Utc;

    fn now(&self) -> DateTime<Utc> {
        *self.now.borrow()
    }

    async fn sleep_until(&self, deadline: DateTime<Utc>) {
        let mut rx = self.now.subscribe();
        loop {
            let reached = *rx.borrow_and_update() >= deadline;
            if reached || rx.changed().await.is_err() {
                return;
            }
        }
    }
}
