//! # alog
//! Chained-call logging facade with per-level instances, auto-generated tags
//! and pluggable output targets.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! alog = "0.1.0"
//! ```
//!
//! Optimized calls, caller provides the tag:
//! ```rust
//! alog::d.tag_msg("TAG", "log this message");
//! alog::d.tag_join("TAG", &[&"Data ", &42]);
//! alog::d.tag_cat("TAG", " ", &[&"first", &"last"]);
//! alog::tagfmt!(alog::d, "TAG", "First:{} Last:{}", "Ada", "Lovelace");
//! ```
//!
//! Slower calls derive the tag `(file:line)` from the call site:
//! ```rust
//! alog::d.msg("log this message");
//! alog::fmt!(alog::d, "First:{} Last:{}", "Ada", "Lovelace");
//! ```
//!
//! ## Cascaded usage
//! A tag set with [`ALog::tag`] sticks to the calling thread until cleared
//! with [`ALog::auto`] or overwritten; [`TagScope`] restores the previous tag
//! at end of scope.
//! ```rust
//! alog::e.tag("MyFoo").msg("connection lost");
//! alog::e.msg("still tagged MyFoo");
//! alog::e.auto().msg("tagged (lib.rs:<line>) again");
//!
//! let _scope = alog::TagScope::new("Request42");
//! alog::i.msg("handled");
//! ```
//!
//! ## Minimum level
//! Calls below the process-wide threshold skip all tag and string work.
//! The threshold defaults to `ALOG_MIN_LEVEL` (Verbose).
//! ```rust
//! alog::set_min_level(alog::Level::Warn);
//! alog::d.msg("suppressed");
//! alog::w.msg("printed");
//! ```
//!
//! ## Logging to files
//! The `fv..fa` instances write to the shared log file (`ALOG_LOG_FILE`,
//! created if missing, appended to otherwise) instead of stdout.
//! ```no_run
//! alog::fi.tag_msg("FooBar", "written to alog.log");
//! ```
//!
//! ## `log` crate bridge
//! ```rust
//! alog::init_bridge().unwrap();
//! log::info!("routed through alog");
//! ```
#![allow(non_upper_case_globals)]

mod bridge;
mod config;
mod log_writer;
mod tag;
mod utils;

pub use bridge::init_bridge;
pub use config::ALOG_CONFIG;
pub use log_writer::{LogFile, LogPrinter, LogStdout};
pub use tag::TagScope;

use std::{
    error::Error,
    fmt::{Arguments, Display},
    panic::Location,
    path::Path,
    sync::{
        Arc, LazyLock, RwLock,
        atomic::{AtomicU8, Ordering},
    },
};

use crate::{
    log_writer::{LOG_FILE, STDOUT},
    utils::{join_args, render_error},
};

/// Log priority levels (Android-compatible ordinals 2..8).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Verbose log priority level 2.
    Verbose = 2,
    /// Debug log priority level 3.
    Debug = 3,
    /// Info log priority level 4.
    Info = 4,
    /// Warning log priority level 5.
    Warn = 5,
    /// Error log priority level 6.
    Error = 6,
    /// Assert log priority level 7.
    Assert = 7,
    /// Disabled log priority level 8. Set as minimum level to turn all
    /// logging off.
    None = 8,
}

/// Minimum priority level to log, initialized from `ALOG_MIN_LEVEL`.
static MIN_LEVEL: LazyLock<AtomicU8> = LazyLock::new(|| AtomicU8::new(ALOG_CONFIG.MIN_LEVEL));

/// Set the process-wide minimum priority level.
pub fn set_min_level(level: Level) {
    MIN_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Current process-wide minimum priority level.
pub fn min_level() -> u8 {
    MIN_LEVEL.load(Ordering::Relaxed)
}

enum Out {
    Stdout,
    File,
    Custom(Arc<dyn LogPrinter>),
}

/// One severity of the facade: a (level, output target) record constructed
/// once and shared by reference. All logging calls return `&Self` so they
/// can be cascaded, and are no-ops while the level is below the threshold.
pub struct ALog {
    level: Level,
    out: RwLock<Out>,
}

// ==== Log levels to stdout.

/// Verbose log priority level 2.
pub static v: ALog = ALog::new(Level::Verbose);
/// Debug log priority level 3.
pub static d: ALog = ALog::new(Level::Debug);
/// Info log priority level 4.
pub static i: ALog = ALog::new(Level::Info);
/// Warning log priority level 5.
pub static w: ALog = ALog::new(Level::Warn);
/// Error log priority level 6.
pub static e: ALog = ALog::new(Level::Error);
/// Assert log priority level 7.
pub static a: ALog = ALog::new(Level::Assert);

/// Disabled log priority level 8.
pub static none: ALog = ALog::new(Level::None);

// ==== Log levels to the shared log file.

/// Verbose level redirected to the shared log file.
pub static fv: ALog = ALog::to_file(Level::Verbose);
/// Debug level redirected to the shared log file.
pub static fd: ALog = ALog::to_file(Level::Debug);
/// Info level redirected to the shared log file.
pub static fi: ALog = ALog::to_file(Level::Info);
/// Warning level redirected to the shared log file.
pub static fw: ALog = ALog::to_file(Level::Warn);
/// Error level redirected to the shared log file.
pub static fe: ALog = ALog::to_file(Level::Error);
/// Assert level redirected to the shared log file.
pub static fa: ALog = ALog::to_file(Level::Assert);

impl ALog {
    /// A level record printing to stdout.
    pub const fn new(level: Level) -> Self {
        Self {
            level,
            out: RwLock::new(Out::Stdout),
        }
    }

    const fn to_file(level: Level) -> Self {
        Self {
            level,
            out: RwLock::new(Out::File),
        }
    }

    /// Replace this level's output target with a custom one.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// let path = "/tmp/alog_out_doc.log";
    /// let file = Arc::new(alog::LogFile::new(path).unwrap());
    /// alog::i.out(file).tag("FooBar").cat(" ", &[&"aaaa", &"bbbb"]);
    /// ```
    pub fn out(&self, printer: Arc<dyn LogPrinter>) -> &Self {
        *self.out.write().unwrap() = Out::Custom(printer);
        self
    }

    fn enabled(&self) -> bool {
        self.level as u8 >= min_level()
    }

    // =========================================================================
    // Optimized calls, caller provides the tag.
    // =========================================================================

    /// If valid log level, set the thread tag and print the message.
    pub fn tag_msg(&self, tag: &str, message: &str) -> &Self {
        if self.enabled() {
            self.tag(tag);
            self.println(tag, message);
        }
        self
    }

    /// If valid log level, print the message and the rendered error chain,
    /// joined by newline.
    pub fn tag_msg_tr(&self, tag: &str, message: &str, tr: &dyn Error) -> &Self {
        if self.enabled() {
            self.tag(tag);
            self.println(tag, &format!("{message}\n{}", render_error(tr)));
        }
        self
    }

    /// If valid log level, print the args joined together.
    ///
    /// ```rust
    /// alog::d.tag_join("TAG", &[&"count=", &12]);
    /// ```
    pub fn tag_join(&self, tag: &str, args: &[&dyn Display]) -> &Self {
        if self.enabled() {
            self.tag(tag);
            self.println(tag, &join_args("", args));
        }
        self
    }

    /// If valid log level, format the message and print it. Usually invoked
    /// through the [`tagfmt!`](crate::tagfmt) macro.
    pub fn tag_fmt(&self, tag: &str, args: Arguments<'_>) -> &Self {
        if self.enabled() {
            self.tag(tag);
            self.println(tag, &args.to_string());
        }
        self
    }

    /// If valid log level, concatenate the args with `separator` and print.
    ///
    /// ```rust
    /// alog::d.tag_cat("TAG", ", ", &[&"first", &"middle", &"last"]);
    /// ```
    pub fn tag_cat(&self, tag: &str, separator: &str, args: &[&dyn Display]) -> &Self {
        if self.enabled() {
            self.tag(tag);
            self.println(tag, &join_args(separator, args));
        }
        self
    }

    /// If valid log level, log the error message and its rendered source
    /// chain. Unlike the other tagged calls, the thread tag is left
    /// untouched.
    pub fn tag_tr(&self, tag: &str, tr: &dyn Error) -> &Self {
        if self.enabled() {
            self.println(tag, &render_error(tr));
        }
        self
    }

    // =========================================================================
    // Tag manipulation.
    // =========================================================================

    /// Set the log tag for the calling thread, used by the untagged calls.
    /// The tag persists for the thread until overwritten or cleared with
    /// [`auto`](Self::auto).
    pub fn tag(&self, tag: &str) -> &Self {
        if self.enabled() {
            tag::set(Some(tag.into()));
        }
        self
    }

    /// Clear the thread tag; the next untagged call derives a `(file:line)`
    /// tag from its call site.
    pub fn auto(&self) -> &Self {
        if self.enabled() {
            tag::set(None);
        }
        self
    }

    // =========================================================================
    // Slower calls which derive the tag from the call site.
    // =========================================================================

    /// If valid log level, print the message with any previously set thread
    /// tag, else a derived `(file:line)` tag.
    #[track_caller]
    pub fn msg(&self, message: &str) -> &Self {
        if self.enabled() {
            self.println(&find_tag(Location::caller()), message);
        }
        self
    }

    /// If valid log level, print the message and the rendered error chain,
    /// joined by newline.
    #[track_caller]
    pub fn msg_tr(&self, message: &str, tr: &dyn Error) -> &Self {
        if self.enabled() {
            self.println(
                &find_tag(Location::caller()),
                &format!("{message}\n{}", render_error(tr)),
            );
        }
        self
    }

    /// If valid log level, format the message and print it. Usually invoked
    /// through the [`fmt!`](crate::fmt) macro.
    #[track_caller]
    pub fn fmt(&self, args: Arguments<'_>) -> &Self {
        if self.enabled() {
            self.println(&find_tag(Location::caller()), &args.to_string());
        }
        self
    }

    /// If valid log level, concatenate the args with `separator` and print.
    #[track_caller]
    pub fn cat(&self, separator: &str, args: &[&dyn Display]) -> &Self {
        if self.enabled() {
            self.println(&find_tag(Location::caller()), &join_args(separator, args));
        }
        self
    }

    /// If valid log level, log the error message and its rendered source
    /// chain.
    #[track_caller]
    pub fn tr(&self, tr: &dyn Error) -> &Self {
        if self.enabled() {
            self.println(&find_tag(Location::caller()), &render_error(tr));
        }
        self
    }

    // =========================================================================
    // Internals.
    // =========================================================================

    /// Gate-checked print with an explicit tag, leaving the thread tag
    /// untouched. Used by the `log` crate bridge.
    pub(crate) fn emit(&self, tag: &str, message: &str) {
        if self.enabled() {
            self.println(tag, message);
        }
    }

    fn println(&self, tag: &str, message: &str) {
        match &*self.out.read().unwrap() {
            Out::Stdout => STDOUT.println(self.level, tag, message),
            Out::File => LOG_FILE.println(self.level, tag, message),
            Out::Custom(printer) => printer.println(self.level, tag, message),
        }
    }
}

/// Previously set thread tag, else a tag derived from the captured call site.
fn find_tag(location: &Location) -> String {
    tag::get().unwrap_or_else(|| make_tag(location))
}

/// Derive a `(file:line)` tag from the call site. Empty if the captured
/// location carries no file name.
fn make_tag(location: &Location) -> String {
    match Path::new(location.file()).file_name() {
        Some(file) => format!("({}:{})", file.to_string_lossy(), location.line()),
        None => String::new(),
    }
}

/// Format and print through `$log` with an explicit tag.
///
/// ```rust
/// alog::tagfmt!(alog::d, "TAG", "First:{} Last:{}", "Ada", "Lovelace");
/// ```
#[macro_export]
macro_rules! tagfmt {
    ($log:expr, $tag:expr, $($arg:tt)+) => {
        $log.tag_fmt($tag, format_args!($($arg)+))
    };
}

/// Format and print through `$log` with the thread or call-site tag.
///
/// ```rust
/// alog::fmt!(alog::d, "First:{} Last:{}", "Ada", "Lovelace");
/// ```
#[macro_export]
macro_rules! fmt {
    ($log:expr, $($arg:tt)+) => {
        $log.fmt(format_args!($($arg)+))
    };
}

/// Concatenate values with a separator and print through `$log`.
///
/// ```rust
/// alog::cat!(alog::d, " to ", "here", "there");
/// ```
#[macro_export]
macro_rules! cat {
    ($log:expr, $sep:expr $(, $arg:expr)+ $(,)?) => {
        $log.cat($sep, &[$(&$arg as &dyn ::std::fmt::Display),+])
    };
}

/// Join values with no separator and print through `$log` with an explicit
/// tag.
///
/// ```rust
/// alog::join!(alog::d, "TAG", "count=", 12);
/// ```
#[macro_export]
macro_rules! join {
    ($log:expr, $tag:expr $(, $arg:expr)+ $(,)?) => {
        $log.tag_join($tag, &[$(&$arg as &dyn ::std::fmt::Display),+])
    };
}

// =============================================================================
// Tests.
// =============================================================================

/// Capturing output target for tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct Capture(std::sync::Mutex<Vec<(Level, String, String)>>);

#[cfg(test)]
impl Capture {
    pub(crate) fn take(&self) -> Vec<(Level, String, String)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

#[cfg(test)]
impl LogPrinter for Capture {
    fn println(&self, level: Level, tag: &str, message: &str) {
        self.0
            .lock()
            .unwrap()
            .push((level, tag.into(), message.into()));
    }
}

/// Serializes tests that touch the process-wide threshold or shared statics.
#[cfg(test)]
static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
fn capture_log(level: Level) -> (ALog, Arc<Capture>) {
    let sink = Arc::new(Capture::default());
    let log = ALog::new(level);
    log.out(sink.clone());
    (log, sink)
}

#[test]
fn test_gate_blocks_below_threshold() {
    let _lock = test_lock();
    set_min_level(Level::Error);
    tag::set(None);
    let (log, sink) = capture_log(Level::Debug);
    log.tag_msg("T", "nope")
        .tag_join("T", &[&"a", &"b"])
        .tag_cat("T", ",", &[&"a", &"b"])
        .tag_fmt("T", format_args!("x={}", 1))
        .msg("nope")
        .cat(",", &[&"a"])
        .fmt(format_args!("x={}", 1))
        .tag("T");
    assert!(sink.take().is_empty());
    assert_eq!(tag::get(), None, "gated calls must not touch the thread tag");
    set_min_level(Level::Verbose);
}

#[test]
fn test_gate_passes_at_threshold() {
    let _lock = test_lock();
    set_min_level(Level::Error);
    let (log, sink) = capture_log(Level::Error);
    log.tag_msg("T", "yes");
    let records = sink.take();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], (Level::Error, "T".into(), "yes".into()));
    set_min_level(Level::Verbose);
}

#[test]
fn test_threshold_error_gates_debug_not_error() {
    let _lock = test_lock();
    set_min_level(Level::Error);
    let (debug, debug_sink) = capture_log(Level::Debug);
    let (error, error_sink) = capture_log(Level::Error);
    debug.tag_msg("T", "dropped");
    error.tag_msg("T", "kept");
    assert!(debug_sink.take().is_empty());
    assert_eq!(error_sink.take().len(), 1);
    set_min_level(Level::Verbose);
}

#[test]
fn test_tagged_calls_hit_sink_once_with_tag() {
    let _lock = test_lock();
    set_min_level(Level::Verbose);
    let (log, sink) = capture_log(Level::Info);
    log.tag_msg("T", "m");
    log.tag_join("T", &[&"a", &"b"]);
    log.tag_fmt("T", format_args!("x={}", 7));
    log.tag_cat("T", "-", &[&1, &2]);
    let records = sink.take();
    assert_eq!(records.len(), 4);
    for (level, tag, _) in &records {
        assert_eq!(*level, Level::Info);
        assert_eq!(tag, "T");
    }
    assert_eq!(records[1].2, "ab");
    assert_eq!(records[2].2, "x=7");
    assert_eq!(records[3].2, "1-2");
}

#[test]
fn test_tag_cat_separator() {
    let _lock = test_lock();
    set_min_level(Level::Verbose);
    let (log, sink) = capture_log(Level::Debug);
    log.tag_cat("T", ",", &[&"a", &"b", &"c"]);
    assert_eq!(sink.take()[0].2, "a,b,c");
}

#[test]
fn test_thread_tag_then_derived() {
    let _lock = test_lock();
    set_min_level(Level::Verbose);
    tag::set(None);
    let (log, sink) = capture_log(Level::Debug);

    log.tag("A").msg("hello");
    assert_eq!(sink.take()[0].1, "A");

    log.auto().msg("hello");
    let derived = sink.take()[0].1.clone();
    let pattern = regex::Regex::new(r"^\(lib\.rs:\d+\)$").unwrap();
    assert!(pattern.is_match(&derived), "unexpected tag: {derived}");
}

#[test]
fn test_thread_tag_persists_across_calls() {
    let _lock = test_lock();
    set_min_level(Level::Verbose);
    tag::set(None);
    let (log, sink) = capture_log(Level::Warn);
    log.tag("Sticky");
    log.msg("one");
    log.msg("two");
    let records = sink.take();
    assert_eq!(records[0].1, "Sticky");
    assert_eq!(records[1].1, "Sticky", "thread tag leaks by design");
    tag::set(None);
}

#[test]
fn test_tag_msg_sets_thread_tag() {
    let _lock = test_lock();
    set_min_level(Level::Verbose);
    tag::set(None);
    let (log, sink) = capture_log(Level::Info);
    log.tag_msg("FromTagMsg", "first");
    log.msg("second");
    let records = sink.take();
    assert_eq!(records[1].1, "FromTagMsg");
    tag::set(None);
}

#[test]
fn test_tag_tr_leaves_thread_tag_alone() {
    let _lock = test_lock();
    set_min_level(Level::Verbose);
    tag::set(None);
    let (log, sink) = capture_log(Level::Error);
    let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    log.tag_tr("T", &err);
    assert_eq!(tag::get(), None, "tag_tr must not store the tag");
    log.msg("after");
    let records = sink.take();
    assert_eq!(records[0].1, "T");
    let pattern = regex::Regex::new(r"^\(lib\.rs:\d+\)$").unwrap();
    assert!(pattern.is_match(&records[1].1), "unexpected tag: {}", records[1].1);
}

#[test]
fn test_fmt_and_macros() {
    let _lock = test_lock();
    set_min_level(Level::Verbose);
    tag::set(None);
    let (log, sink) = capture_log(Level::Debug);
    crate::tagfmt!(log, "T", "First:{} Last:{}", "Ada", "Lovelace");
    crate::fmt!(log, "n={}", 3);
    crate::cat!(log, ", ", "x", 1);
    crate::join!(log, "J", "a", "b");
    let records = sink.take();
    assert_eq!(records[0].2, "First:Ada Last:Lovelace");
    assert_eq!(records[1].2, "n=3");
    assert_eq!(records[2].2, "x, 1");
    assert_eq!(records[3], (Level::Debug, "J".into(), "ab".into()));
    tag::set(None);
}

#[test]
fn test_error_chain_rendering() {
    use std::fmt;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "save failed")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    let _lock = test_lock();
    set_min_level(Level::Verbose);
    tag::set(None);
    let (log, sink) = capture_log(Level::Error);
    let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));

    log.tag_tr("T", &err);
    log.tag_msg_tr("T", "while saving", &err);
    let records = sink.take();
    assert_eq!(records[0].2, "save failed\n  caused by: disk full");
    assert_eq!(records[1].2, "while saving\nsave failed\n  caused by: disk full");
    tag::set(None);
}

#[test]
fn test_statics_gated_when_disabled() {
    let _lock = test_lock();
    set_min_level(Level::None);
    tag::set(None);
    // Nothing reaches stdout and the thread tag stays untouched.
    v.tag_msg("T", "x");
    d.tag("T").msg("x");
    e.fmt(format_args!("x={}", 1));
    a.cat(",", &[&"x"]);
    assert_eq!(tag::get(), None);
    set_min_level(Level::Verbose);
}

#[test]
fn test_level_ordinals() {
    assert_eq!(Level::Verbose as u8, 2);
    assert_eq!(Level::Debug as u8, 3);
    assert_eq!(Level::Info as u8, 4);
    assert_eq!(Level::Warn as u8, 5);
    assert_eq!(Level::Error as u8, 6);
    assert_eq!(Level::Assert as u8, 7);
    assert_eq!(Level::None as u8, 8);
}
