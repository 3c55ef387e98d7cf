// example_rotation — ротация раз в минуту, хранение ноль дней

use rotlog::{debug, warn, CancellationToken, Config, Level, Logger, Retention};
use std::sync::Arc;
use std::time::Duration;

const APP_NAME: &str = "example_rotation";
const APP_VERSION: &str = "1.0.0";

// Пять звёздочек — новый файл каждую минуту
const LOG_FILE: &str = "logs/rotation.log-*-*-*_*-*";

#[tokio::main]
async fn main() {
    // 1. Преамбула
    rotlog::ginfo!("Starting {} v{}", APP_NAME, APP_VERSION);

    // 2. Инициализация: файловый лог с ротацией
    let shutdown = CancellationToken::new();
    let config = Config {
        file: LOG_FILE.to_owned(),
        level: Level::Debug,
        expire: Retention::Days(0),
        trace: 0,
    };
    let file_logger = match Logger::new(&config, &shutdown) {
        Ok(l) => Arc::new(l),
        Err(e) => {
            eprintln!("[FATAL] Failed to create log file: {}", e);
            std::process::exit(1);
        }
    };

    debug!(file_logger, "Logger initialized, current file {:?}", file_logger.file_name());

    // 3. Основной код: пишем три минуты, чтобы увидеть две-три смены файла
    let mut last = file_logger.file_name();
    for i in 0..180 {
        debug!(file_logger, "This is a debug message number {}", i);
        if i % 30 == 0 {
            warn!(file_logger, "Warning message at iteration {}", i);
        }

        let current = file_logger.file_name();
        if current != last {
            rotlog::ginfo!("Rotated to {:?} ({} installs)", current, file_logger.rotations());
            last = current;
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    // 4. Финальная часть
    shutdown.cancel();
    debug!(file_logger, "Log generation completed. Check 'logs/' directory.");
    rotlog::ginfo!("Application finished successfully");
}
