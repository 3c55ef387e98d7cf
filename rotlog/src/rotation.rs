use crate::clock::Clock;
use crate::diag;
use crate::sink::{open_log_file, ActiveSink, Fallback, RotationState, Sink};
use crate::sweep::{sweep, Retention};
use crate::template::Template;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ===== Ротация по времени =====

enum State {
    Installing,
    Armed(DateTime<Utc>),
    Stopped,
}

/// Задача ротации одного логгера. Единственная, кто меняет его приёмник.
pub(crate) struct Rotation<C: Clock> {
    template: Template,
    retention: Retention,
    clock: C,
    fallback: Fallback,
    sink: Arc<ActiveSink>,
}

impl<C: Clock> Rotation<C> {
    pub(crate) fn new(
        template: Template,
        retention: Retention,
        clock: C,
        fallback: Fallback,
        sink: Arc<ActiveSink>,
    ) -> Self {
        Rotation {
            template,
            retention,
            clock,
            fallback,
            sink,
        }
    }

    /// Открывает файл текущего периода и делает его активным.
    /// Если открыть не вышло, пишем в запасной приёмник до следующего срока.
    /// Возвращает срок следующей смены.
    pub(crate) fn install(&self) -> DateTime<Utc> {
        self.sink.set_state(RotationState::Installing);

        let now = self.clock.now();
        let period = self.template.period_at(&now);
        let path = PathBuf::from(&period.file_name);

        match open_log_file(&path) {
            Ok(file) => {
                self.sink.install(Sink::File(file), period.file_name);
                sweep(&self.template, self.retention, &now, Some(&path));
            }
            Err(e) => {
                diag::error(&format!(
                    "Failed to open log file {}: {}, using fallback sink",
                    path.display(),
                    e
                ));
                self.sink.install((self.fallback)(), period.file_name);
            }
        }

        period.deadline.with_timezone(&Utc)
    }

    /// Цикл Armed → Installing → Armed до отмены. Первый `install`
    /// уже сделан синхронно при создании логгера, остальные идут в
    /// пуле блокирующих задач: там открытие файла и чистка каталога.
    pub(crate) async fn run(self: Arc<Self>, first_deadline: DateTime<Utc>, cancel: CancellationToken) {
        let mut state = State::Armed(first_deadline);
        loop {
            state = match state {
                State::Installing => {
                    let rotation = Arc::clone(&self);
                    match tokio::task::spawn_blocking(move || rotation.install()).await {
                        Ok(deadline) => State::Armed(deadline),
                        Err(e) => {
                            diag::error(&format!("Log rotation task failed: {}", e));
                            State::Stopped
                        }
                    }
                }
                State::Armed(deadline) => {
                    self.sink.set_state(RotationState::Armed);
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => State::Stopped,
                        _ = self.clock.sleep_until(deadline) => State::Installing,
                    }
                }
                State::Stopped => {
                    // приёмник остаётся открытым для последних записей
                    self.sink.set_state(RotationState::Stopped);
                    return;
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sink::SinkKind;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use std::future::Future;
    use std::thread::{self, ThreadId};
    use std::time::Duration;

    /// Запоминает, в каком потоке спрашивали время.
    #[derive(Clone)]
    struct Recording {
        inner: ManualClock,
        threads: Arc<Mutex<Vec<ThreadId>>>,
    }

    impl Clock for Recording {
        type Tz = Utc;

        fn now(&self) -> DateTime<Utc> {
            self.threads.lock().push(thread::current().id());
            self.inner.now()
        }

        fn sleep_until(&self, deadline: DateTime<Utc>) -> impl Future<Output = ()> + Send {
            self.inner.sleep_until(deadline)
        }
    }

    fn stderr() -> Fallback {
        Box::new(|| Sink::Stderr)
    }

    async fn settle<F: Fn() -> bool>(done: F) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !done() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("rotation task did not settle");
    }

    #[tokio::test]
    async fn rotates_at_each_deadline_until_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let template = Template::parse(&format!("{}/r.log-*-*-*-*", dir.path().display())).unwrap();
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 10, 15, 0).unwrap();
        let clock = ManualClock::new(start);
        let sink = Arc::new(ActiveSink::new(Sink::Discard, RotationState::Installing));

        let rotation = Rotation::new(template, Retention::Forever, clock.clone(), stderr(), sink.clone());
        let deadline = rotation.install();
        assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 10, 19, 11, 0, 0).unwrap());
        assert_eq!(sink.kind(), SinkKind::File);

        let cancel = CancellationToken::new();
        let task = tokio::spawn(Arc::new(rotation).run(deadline, cancel.clone()));
        settle(|| sink.state() == RotationState::Armed).await;

        clock.set(deadline);
        settle(|| sink.installs() == 2 && sink.state() == RotationState::Armed).await;
        assert!(sink.file_name().unwrap().ends_with("r.log-2026-10-19-11"));

        cancel.cancel();
        task.await.unwrap();
        assert_eq!(sink.state(), RotationState::Stopped);

        clock.advance(Duration::from_secs(3 * 3600));
        tokio::task::yield_now().await;
        assert_eq!(sink.installs(), 2);
    }

    #[tokio::test]
    async fn later_installs_leave_the_runtime_thread() {
        let dir = tempfile::tempdir().unwrap();
        let template = Template::parse(&format!("{}/b.log-*-*-*-*", dir.path().display())).unwrap();
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 10, 15, 0).unwrap();
        let clock = Recording {
            inner: ManualClock::new(start),
            threads: Arc::default(),
        };
        let sink = Arc::new(ActiveSink::new(Sink::Discard, RotationState::Installing));

        let rotation = Rotation::new(template, Retention::Forever, clock.clone(), stderr(), sink.clone());
        let deadline = rotation.install();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(Arc::new(rotation).run(deadline, cancel.clone()));
        settle(|| sink.state() == RotationState::Armed).await;

        clock.inner.set(deadline);
        settle(|| sink.installs() == 2 && sink.state() == RotationState::Armed).await;
        cancel.cancel();
        task.await.unwrap();

        let runtime_thread = thread::current().id();
        let threads = clock.threads.lock().clone();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0], runtime_thread);
        assert_ne!(threads[1], runtime_thread);
    }

    #[tokio::test]
    async fn failed_open_installs_the_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let template = Template::parse(&format!("{}/f.log-*-*-*", dir.path().display())).unwrap();
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 10, 15, 0).unwrap();
        std::fs::create_dir(dir.path().join("f.log-2026-10-19")).unwrap();
        let sink = Arc::new(ActiveSink::new(Sink::Discard, RotationState::Installing));

        let rotation = Rotation::new(
            template,
            Retention::Forever,
            ManualClock::new(start),
            Box::new(|| Sink::Writer(Box::new(std::io::sink()))),
            sink.clone(),
        );
        rotation.install();
        assert_eq!(sink.kind(), SinkKind::Writer);
        assert!(sink.file_name().unwrap().ends_with("f.log-2026-10-19"));
    }
}
