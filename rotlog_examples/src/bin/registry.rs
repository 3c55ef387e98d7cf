// example_registry — именованные логгеры из JSON, остановка по Ctrl-C

use rotlog::{ginfo, info, warn, CancellationToken, Config};
use std::collections::HashMap;
use std::time::Duration;

const APP_NAME: &str = "example_registry";
const APP_VERSION: &str = "1.0.0";

const CONFIG: &str = r#"{
    "access": {"file": "logs/access.log-*-*-*", "level": "debug", "expire": 7, "trace": -1},
    "run":    {"file": "logs/run.log-*-*-*",    "level": "info",  "expire": 7, "trace": 0},
    "error":  {"file": "logs/error.log-*-*",    "level": "warn",  "expire": 90},
    "null":   {"file": "/dev/null"}
}"#;

#[tokio::main]
async fn main() {
    // 1. Преамбула
    ginfo!("Starting {} v{}", APP_NAME, APP_VERSION);

    // 2. Инициализация реестра
    let configs: HashMap<String, Config> = match serde_json::from_str(CONFIG) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[FATAL] Bad logger configuration: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = CancellationToken::new();
    if let Err(e) = rotlog::init(configs, &shutdown) {
        eprintln!("[FATAL] Cannot initialize loggers: {}", e);
        std::process::exit(1);
    }

    // 3. Основной код: пишем, пока не нажмут Ctrl-C
    let worker = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            let mut n = 0u64;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tick.tick() => {
                        n += 1;
                        info!(rotlog::get("access"), "request #{}", n);
                        info!(rotlog::get("run"), "tick {}", n);
                        if n % 10 == 0 {
                            warn!(rotlog::get("error"), "every tenth tick is suspicious: {}", n);
                        }
                        info!(rotlog::get("null"), "discarded {}", n);
                    }
                }
            }
        })
    };

    let _ = tokio::signal::ctrl_c().await;
    shutdown.cancel();
    let _ = worker.await;

    // 4. Финальная часть: файлы ещё открыты, последние строки доходят
    info!(rotlog::get("run"), "Application finished successfully");
    ginfo!("Application finished successfully");
}
