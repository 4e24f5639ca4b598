use std::fs::OpenOptions;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use crate::config::DisplayTarget;
use crate::error::Result;

/// Log target for records that only belong in the log file, e.g. lines that are
/// already printed to stderr some other way.
pub const FILE_ONLY: &str = "ship_game::file_only";

/// Installs the global logger. Everything goes to `log_file`; outside terminal
/// mode it is echoed to stderr too, in terminal mode the terminal is the screen
/// we draw on.
pub fn init(target: DisplayTarget, level: LevelFilter, log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let mut loggers: Vec<Box<dyn SharedLogger>> =
        vec![WriteLogger::new(level, Config::default(), file)];
    if target != DisplayTarget::Terminal {
        loggers.push(TermLogger::new(
            level,
            ConfigBuilder::new().add_filter_ignore_str(FILE_ONLY).build(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}

/// A logger for tests that keeps every record in memory.
#[cfg(test)]
pub(crate) mod capture {
    use std::sync::Mutex;

    use log::{Level, LevelFilter, Log, Metadata, Record};

    struct Capture {
        records: Mutex<Vec<(String, Level, String)>>,
    }

    static CAPTURE: Capture = Capture {
        records: Mutex::new(Vec::new()),
    };

    impl Log for Capture {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.records.lock().unwrap().push((
                record.target().to_string(),
                record.level(),
                record.args().to_string(),
            ));
        }

        fn flush(&self) {}
    }

    /// Safe to call from every test; only the first call installs anything.
    pub fn install() {
        if log::set_logger(&CAPTURE).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    }

    /// Whether `message` was logged at `level`, returning its target.
    pub fn find(level: Level, message: &str) -> Option<String> {
        CAPTURE
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|(_, l, m)| *l == level && m == message)
            .map(|(target, _, _)| target.clone())
    }
}
