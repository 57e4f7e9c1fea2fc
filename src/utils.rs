use std::error::Error;
use std::fmt::Display;

use chrono::Utc;
use colored::Colorize;

use crate::Level;

/// Render one log line the way the platform target prints it.
pub fn format_log(level: Level, tag: &str, message: &str) -> String {
    let time = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3f");
    let level = match level {
        Level::Verbose => "VERBOSE".purple(),
        Level::Debug => "DEBUG".blue(),
        Level::Info => "INFO".green(),
        Level::Warn => "WARN".yellow(),
        Level::Error => "ERROR".red(),
        Level::Assert => "ASSERT".bright_red(),
        Level::None => "NONE".dimmed(),
    };
    if tag.is_empty() {
        format!("[{time} {level}] {message}")
    } else {
        format!("[{time} {level}/{tag}] {message}")
    }
}

/// Concatenate stringified values with `separator` between them.
pub fn join_args(separator: &str, args: &[&dyn Display]) -> String {
    let mut out = String::new();
    for (idx, arg) in args.iter().enumerate() {
        if idx > 0 {
            out.push_str(separator);
        }
        out.push_str(&arg.to_string());
    }
    out
}

/// Render an error and its full source chain, one `caused by:` line per source.
pub fn render_error(err: &dyn Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }
    out
}

#[test]
fn test_join_args() {
    assert_eq!(join_args(",", &[&"a", &"b", &"c"]), "a,b,c");
    assert_eq!(join_args("", &[&"a", &"b"]), "ab");
    assert_eq!(join_args(" to ", &[&1, &2]), "1 to 2");
    assert_eq!(join_args(",", &[]), "");
}

#[test]
fn test_render_error() {
    use std::fmt;

    #[derive(Debug)]
    struct Wrapped(Option<Box<Wrapped>>, &'static str);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.1)
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.0.as_deref().map(|e| e as &(dyn Error + 'static))
        }
    }

    let root = Wrapped(None, "disk full");
    let mid = Wrapped(Some(Box::new(root)), "write failed");
    let top = Wrapped(Some(Box::new(mid)), "cannot save");
    assert_eq!(
        render_error(&top),
        "cannot save\n  caused by: write failed\n  caused by: disk full"
    );
}
