use std::{
    fs::File,
    io::{BufWriter, Seek, SeekFrom, Write},
    path::Path,
    sync::{LazyLock, Mutex},
};

use crate::{Level, config::ALOG_CONFIG, utils::format_log};

/// Output target contract: accepts (level, tag, message) and records it.
/// No return value is relied upon; a failing target panics into the caller.
pub trait LogPrinter: Send + Sync {
    fn println(&self, level: Level, tag: &str, message: &str);
}

/// Platform log target. Prints formatted lines to stdout.
#[derive(Default, Debug)]
pub struct LogStdout;

impl LogPrinter for LogStdout {
    fn println(&self, level: Level, tag: &str, message: &str) {
        println!("{}", format_log(level, tag, message));
    }
}

pub(crate) static STDOUT: LogStdout = LogStdout;

/// File log target. The file is created if it does not exist and appended to
/// if it does. Lines are flushed as they are written; logging is synchronous.
pub struct LogFile {
    file: Mutex<BufWriter<File>>,
}

impl LogFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let mut file = File::options()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        file.seek(SeekFrom::End(0))?;
        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl LogPrinter for LogFile {
    fn println(&self, level: Level, tag: &str, message: &str) {
        let mut file = self.file.lock().unwrap();
        writeln!(file, "{}", format_log(level, tag, message)).unwrap();
        file.flush().unwrap();
    }
}

/// Shared default file target bound to the `fv..fa` level instances,
/// located by `ALOG_LOG_FILE`.
pub static LOG_FILE: LazyLock<LogFile> =
    LazyLock::new(|| LogFile::new(&ALOG_CONFIG.LOG_FILE).expect("Unable to open log file"));

#[test]
fn test_log_file() {
    colored::control::set_override(false);
    std::fs::remove_file("/tmp/alog_test_log_file.log").ok();
    let log_file = LogFile::new("/tmp/alog_test_log_file.log").unwrap();
    log_file.println(Level::Info, "TAG", "Hello, world!");
    log_file.println(Level::Error, "TAG", "rust is awesome !");
    let content = std::fs::read_to_string("/tmp/alog_test_log_file.log").unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("INFO/TAG] Hello, world!"));
    assert!(lines[1].ends_with("ERROR/TAG] rust is awesome !"));
}

#[test]
fn test_log_file_appends() {
    colored::control::set_override(false);
    std::fs::remove_file("/tmp/alog_test_log_append.log").ok();
    {
        let log_file = LogFile::new("/tmp/alog_test_log_append.log").unwrap();
        log_file.println(Level::Debug, "T", "first");
    }
    {
        let log_file = LogFile::new("/tmp/alog_test_log_append.log").unwrap();
        log_file.println(Level::Debug, "T", "second");
    }
    let content = std::fs::read_to_string("/tmp/alog_test_log_append.log").unwrap();
    assert_eq!(content.lines().count(), 2);
}
