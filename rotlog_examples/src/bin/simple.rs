// example_simple — логгер по умолчанию, пустышка и логгер поверх stderr

use rotlog::{debug, fatal, gdebug, ginfo, gwarn, info, Level, Logger};

const APP_NAME: &str = "example_simple";
const APP_VERSION: &str = "1.0.0";

fn main() {
    // 1. Преамбула: логгер процесса пишет в stdout
    ginfo!("Starting {} v{}", APP_NAME, APP_VERSION);

    // 2. Свой логгер без ротации: только предупреждения и выше, в stderr
    let errors = Logger::to_writer(Level::Warn, 0, std::io::stderr());
    debug!(errors, "This line is filtered out");
    info!(errors, "So is this one");
    fatal!(errors, "Only warn and fatal reach stderr");

    // 3. Основной код
    gdebug!("Processing data block #{}", 1);
    rotlog::default_logger().info(&[&"values", &"are", &"space", &"joined", &42]);
    rotlog::discard().fatal(&[&"nobody will see this"]);
    gwarn!("Non-critical issue detected");

    // 4. Финальная часть
    ginfo!("Application finished successfully");
}
