use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Environment variable that overrides the build-mode default log level.
pub const LOG_LEVEL_ENV: &str = "STANCE_LOG";

/// Wall-clock time broken down into UTC calendar fields.
///
/// One snapshot is taken per record so the file a line lands in always
/// matches the date printed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcTime {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millis: u32,
}

impl UtcTime {
    pub fn now() -> Self {
        Self::from_unix(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default())
    }

    pub fn from_unix(since_epoch: Duration) -> Self {
        let secs = since_epoch.as_secs();
        let (year, month, day) = civil_from_days((secs / 86_400) as i64);
        let time_of_day = (secs % 86_400) as u32;
        Self {
            year,
            month,
            day,
            hour: time_of_day / 3600,
            minute: time_of_day % 3600 / 60,
            second: time_of_day % 60,
            millis: since_epoch.subsec_millis(),
        }
    }

    /// `YYYY-MM-DD`, also the stem of the day's log file
    pub fn date(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// `YYYY-MM-DDTHH:MM:SS.mmm`
    pub fn timestamp(&self) -> String {
        format!(
            "{}T{:02}:{:02}:{:02}.{:03}",
            self.date(),
            self.hour,
            self.minute,
            self.second,
            self.millis
        )
    }
}

/// Days since the Unix epoch to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    // Shift the epoch to 0000-03-01 so leap days fall at the end of a year
    let shifted = days + 719_468;
    let era = shifted.div_euclid(146_097);
    let day_of_era = shifted.rem_euclid(146_097) as u32;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let march_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * march_month + 2) / 5 + 1;
    let month = if march_month < 10 { march_month + 3 } else { march_month - 9 };
    let year = era * 400 + year_of_era as i64 + i64::from(month <= 2);
    (year, month, day)
}

/// Render a record as `TIMESTAMP [LEVEL] [thread:ID] target file:line - message`.
pub fn format_record(record: &Record, at: &UtcTime) -> String {
    format!(
        "{} [{}] [thread:{:?}] {} {}:{} - {}",
        at.timestamp(),
        record.level(),
        std::thread::current().id(),
        record.target(),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        record.args()
    )
}

/// Logger printing every enabled record to stdout
pub struct StdoutLogger;

impl Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{}", format_record(record, &UtcTime::now()));
        }
    }

    fn flush(&self) {
        std::io::stdout().flush().ok();
    }
}

/// Logger appending to `<dir>/YYYY-MM-DD.log`, switching files when the UTC date changes
pub struct FileLogger {
    dir: PathBuf,
    day: Mutex<DayFile>,
}

struct DayFile {
    date: String,
    file: File,
}

impl DayFile {
    fn open(dir: &Path, date: String) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(format!("{date}.log")))?;
        Ok(Self { date, file })
    }
}

impl FileLogger {
    /// Create the directory if needed and open today's file
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let day = DayFile::open(&dir, UtcTime::now().date())?;
        Ok(Self {
            dir,
            day: Mutex::new(day),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = UtcTime::now();
        let mut day = self.day.lock().unwrap_or_else(|e| e.into_inner());

        let date = now.date();
        if date != day.date {
            match DayFile::open(&self.dir, date) {
                Ok(next) => *day = next,
                // keep appending to the previous day's file
                Err(e) => eprintln!("cannot roll log file in {}: {}", self.dir.display(), e),
            }
        }

        let line = format_record(record, &now);
        if let Err(e) = writeln!(day.file, "{line}") {
            eprintln!("cannot write log file: {e}");
            eprintln!("{line}");
        }
    }

    fn flush(&self) {
        let mut day = self.day.lock().unwrap_or_else(|e| e.into_inner());
        day.file.flush().ok();
    }
}

/// Parse a level name (`off`, `error`, `warn`, `info`, `debug`, `trace`), case-insensitive.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse::<LevelFilter>().ok()
}

/// Resolve the max level: `STANCE_LOG` if set and valid, else Debug in
/// debug builds and Info in release builds.
pub fn max_level_from_env() -> LevelFilter {
    let default = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|value| parse_level(&value))
        .unwrap_or(default)
}

/// Install [`StdoutLogger`] as the global logger.
///
/// Only the first logger installed in a process takes effect; later calls do nothing.
pub fn init_stdout_logger() {
    static LOGGER: StdoutLogger = StdoutLogger;

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(max_level_from_env());
    }
}

/// Install a [`FileLogger`] writing into `dir` as the global logger.
///
/// Only the first logger installed in a process takes effect. Fails if the
/// directory or today's file cannot be created.
pub fn init_file_logger(dir: impl Into<PathBuf>) -> std::io::Result<()> {
    let logger = FileLogger::new(dir)?;

    if log::set_logger(Box::leak(Box::new(logger))).is_ok() {
        log::set_max_level(max_level_from_env());
    }

    Ok(())
}
