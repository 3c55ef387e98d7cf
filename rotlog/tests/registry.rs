use rotlog::{CancellationToken, Config, Error, Level, Retention, RotationState, SinkKind, DISCARD};
use std::collections::HashMap;
use std::fs;

#[tokio::test]
async fn global_registry_routes_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().display().to_string();

    let configs: HashMap<String, Config> = serde_json::from_str(&format!(
        r#"{{
            "access": {{"file": "{base}/access.log-*-*-*", "level": "debug", "expire": 1, "trace": -1}},
            "run":    {{"file": "{base}/run.log-*-*-*",    "level": "info",  "expire": 1, "trace": -1}},
            "state":  {{"file": "{base}/state.log-*-*-*",  "level": "warn",  "expire": 1, "trace": -1}},
            "error":  {{"file": "{base}/error.log-*-*-*",  "level": "fatal", "expire": 1, "trace": -1}},
            "null":   {{"file": "{DISCARD}"}}
        }}"#
    ))
    .unwrap();

    // до init любое имя — логгер по умолчанию
    assert!(std::ptr::eq(rotlog::get("access"), rotlog::default_logger()));

    let cancel = CancellationToken::new();
    let registry = rotlog::init(configs.clone(), &cancel).unwrap();
    assert!(matches!(
        rotlog::init(configs, &cancel),
        Err(Error::AlreadyInitialized)
    ));

    for name in ["access", "run", "state", "error"] {
        rotlog::get(name).infof(format_args!("{}", name));
    }
    rotlog::get("noset").infof(format_args!("falls back to stdout"));

    assert!(std::ptr::eq(rotlog::get("noset"), rotlog::default_logger()));
    assert_eq!(rotlog::get("null").sink_kind(), SinkKind::Discard);
    assert_eq!(registry.get("error").level(), Level::Fatal);

    let written = |name: &str| {
        let file = rotlog::get(name).file_name().unwrap();
        fs::read_to_string(file).unwrap()
    };
    assert!(written("access").ends_with("INFO access\n"));
    assert!(written("run").ends_with("INFO run\n"));
    assert!(written("state").is_empty());
    assert!(written("error").is_empty());

    cancel.cancel();
    for name in ["access", "run", "state", "error"] {
        let logger = rotlog::get(name);
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while logger.rotation_state() != RotationState::Stopped {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }
}

#[test]
fn default_and_discard_loggers_need_no_runtime() {
    rotlog::ginfo!("this is {}", "infof");
    rotlog::gdebug!("this is {}", "debugf");
    rotlog::gwarn!("this is {}", "warnf");
    rotlog::gfatal!("this is {}", "fatalf");
    rotlog::default_logger().info(&[&"this is", &"info"]);

    let null = rotlog::discard();
    null.fatal(&[&"dropped"]);
    assert_eq!(null.sink_kind(), SinkKind::Discard);
    assert_eq!(null.level(), Level::All);
}

#[test]
fn config_keeps_caller_copy_untouched() {
    let config = Config {
        file: DISCARD.to_owned(),
        level: Level::Warn,
        expire: Retention::Days(3),
        trace: 0,
    };
    let before = config.clone();
    let _logger = rotlog::Logger::new(&config, &CancellationToken::new()).unwrap();
    assert_eq!(config, before);
}
