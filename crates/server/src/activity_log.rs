use chrono::{Local, NaiveDate};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// The server's append-only, per-day activity log
/// (`data/log/activity/{YYYY-MM-DD}.log`), surfaced verbatim by
/// `GET /get-logs`.
///
/// This is domain data the client can read back, not ambient telemetry —
/// each line is `HH:MM:SS - [TAG] message`, matching the tagged-line
/// convention the only existing client (`client.py`'s `print_server_logs`)
/// already parses (spec.md §9 SUPPLEMENTED FEATURES).
///
/// All appends and date-rollover bookkeeping go through one `tokio::sync::Mutex`
/// — the "log lock" of the concurrency model (spec.md §5). Handlers acquire
/// and release it before calling into the engine, so it is never nested
/// inside the engine's per-partition locks (`log ≺ idx ≺ memtable`).
pub struct ActivityLog {
    dir: PathBuf,
    state: Mutex<State>,
}

struct State {
    date: NaiveDate,
    file: File,
}

/// Log tags used by the handlers, matching the original source's
/// bracketed-tag vocabulary (`[GET]`, `[POST]`, `[ERROR]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Get,
    Post,
    Error,
}

impl Tag {
    fn as_str(self) -> &'static str {
        match self {
            Tag::Get => "GET",
            Tag::Post => "POST",
            Tag::Error => "ERROR",
        }
    }
}

impl ActivityLog {
    /// Opens (creating if necessary) today's log file under `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let date = Local::now().date_naive();
        let file = open_for_date(&dir, date)?;
        Ok(Self {
            dir,
            state: Mutex::new(State { date, file }),
        })
    }

    /// Appends one tagged line, rolling over to a new date file first if
    /// the day has changed since the last append.
    pub async fn append(&self, tag: Tag, message: &str) -> io::Result<()> {
        let mut state = self.state.lock().await;
        let today = Local::now().date_naive();
        if today != state.date {
            state.file = open_for_date(&self.dir, today)?;
            state.date = today;
        }
        let line = format!("{} - [{}] {}\n", Local::now().format("%H:%M:%S"), tag.as_str(), message);
        state.file.write_all(line.as_bytes())
    }

    /// Every line of the current day's log file, in file order.
    pub async fn current_lines(&self) -> io::Result<Vec<String>> {
        let today = Local::now().date_naive();
        let path = path_for_date(&self.dir, today);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut contents = String::new();
        File::open(&path)?.read_to_string(&mut contents)?;
        Ok(contents.lines().map(str::to_owned).collect())
    }
}

fn path_for_date(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}.log", date.format("%Y-%m-%d")))
}

fn open_for_date(dir: &Path, date: NaiveDate) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path_for_date(dir, date))
}
