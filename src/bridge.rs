use log::{Level as LogLevel, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::{ALog, Level, min_level};

/// Adapter routing `log` crate records into the matching level instance.
/// The record target becomes the tag; the thread tag is left untouched so
/// bridged records cannot leak into cascaded facade calls.
struct ALogBridge;

fn instance(level: LogLevel) -> &'static ALog {
    match level {
        LogLevel::Trace => &crate::v,
        LogLevel::Debug => &crate::d,
        LogLevel::Info => &crate::i,
        LogLevel::Warn => &crate::w,
        LogLevel::Error => &crate::e,
    }
}

fn map_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::Verbose,
        LogLevel::Debug => Level::Debug,
        LogLevel::Info => Level::Info,
        LogLevel::Warn => Level::Warn,
        LogLevel::Error => Level::Error,
    }
}

impl Log for ALogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        map_level(metadata.level()) as u8 >= min_level()
    }

    fn log(&self, record: &Record) {
        instance(record.level()).emit(record.target(), &record.args().to_string());
    }

    fn flush(&self) {}
}

static BRIDGE: ALogBridge = ALogBridge;

/// Route `log::info!` and friends through the facade. Fails if another
/// logger is already installed.
pub fn init_bridge() -> Result<(), SetLoggerError> {
    log::set_logger(&BRIDGE)?;
    log::set_max_level(LevelFilter::Trace);
    Ok(())
}

#[test]
fn test_bridge_routes_records() {
    use std::sync::Arc;

    let _lock = crate::test_lock();
    crate::set_min_level(Level::Verbose);
    init_bridge().unwrap();

    let sink = Arc::new(crate::Capture::default());
    crate::i.out(sink.clone());
    crate::w.out(sink.clone());
    log::info!("hello bridge");
    log::warn!(target: "custom", "careful");
    let records = sink.take();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], (Level::Info, module_path!().into(), "hello bridge".into()));
    assert_eq!(records[1], (Level::Warn, "custom".into(), "careful".into()));

    // Bridged records honor the threshold.
    crate::set_min_level(Level::Error);
    log::info!("dropped");
    assert!(sink.take().is_empty());
    crate::set_min_level(Level::Verbose);

    // Hand the statics back to stdout for any later test.
    crate::i.out(Arc::new(crate::LogStdout));
    crate::w.out(Arc::new(crate::LogStdout));
}
