use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::MakeWriter, prelude::*, registry, EnvFilter};

// --- Custom "Tee" Writer ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A, B> Write for Tee<A, B>
where
    A: Write,
    B: Write,
{
    // A failing sink is skipped as long as the other one accepted the bytes;
    // losing the log file must not abort the command being logged.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write(buf);
        let res_b = self.b.write(buf);
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B, W1, W2> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a, Writer = W1>,
    B: MakeWriter<'a, Writer = W2>,
    W1: Write + 'a,
    W2: Write + 'a,
{
    type Writer = Tee<W1, W2>;
    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

/// Where formatted log lines are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    None,
}

impl LogOutput {
    fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => LogOutput::Console,
            "file" => LogOutput::File,
            "both" => LogOutput::Both,
            _ => LogOutput::None,
        }
    }
}

/// Logging configuration read from `CONF_LOG_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Explicit `RUST_LOG` directive, which wins over `level` when present.
    pub directive: Option<String>,
    pub level: String,
    pub output: LogOutput,
    pub json: bool,
    pub file_path: PathBuf,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let directive = lookup("RUST_LOG").filter(|d| !d.trim().is_empty());
        let level = lookup("CONF_LOG_LEVEL").unwrap_or_else(|| "warn".to_string());
        let output = lookup("CONF_LOG_OUTPUT")
            .map(|o| LogOutput::parse(&o))
            .unwrap_or(LogOutput::Console);
        let json = lookup("CONF_LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));
        let file_path = lookup("CONF_LOG_FILE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("conf-edit.log"));

        Self {
            directive,
            level,
            output,
            json,
            file_path,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        self.directive
            .as_deref()
            .and_then(|d| EnvFilter::try_new(d).ok())
            .unwrap_or_else(|| EnvFilter::new(&self.level))
    }
}

/// Initializes the global tracing subscriber based on environment variables.
///
/// Console output is written to stderr. Hold on to the returned guard for the
/// lifetime of the process when file output is enabled, otherwise buffered
/// lines may be lost on exit.
pub fn init_subscriber() -> Option<WorkerGuard> {
    init_with(&LogSettings::from_env())
}

pub fn init_with(settings: &LogSettings) -> Option<WorkerGuard> {
    let use_console = matches!(settings.output, LogOutput::Console | LogOutput::Both);
    let use_file = matches!(settings.output, LogOutput::File | LogOutput::Both);
    let is_json = settings.json;

    let mut guard: Option<WorkerGuard> = None;

    let subscriber = registry().with(settings.env_filter());

    let log_path = settings.file_path.as_path();
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_filename = log_path.file_name().unwrap_or("conf-edit.log".as_ref());

    if use_console && use_file {
        let file_appender = tracing_appender::rolling::daily(log_dir, log_filename);
        let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(_guard);

        let tee_writer = MakeTee {
            make_a: std::io::stderr,
            make_b: non_blocking,
        };

        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(tee_writer);
        if is_json {
            subscriber.with(fmt_layer.json()).init();
        } else {
            subscriber.with(fmt_layer).init();
        }
    } else if use_console {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        if is_json {
            subscriber.with(fmt_layer.json()).init();
        } else {
            subscriber.with(fmt_layer).init();
        }
    } else if use_file {
        let file_appender = tracing_appender::rolling::daily(log_dir, log_filename);
        let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(_guard);

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking);
        if is_json {
            subscriber.with(fmt_layer.json()).init();
        } else {
            subscriber.with(fmt_layer).init();
        }
    } else {
        subscriber.init();
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> LogSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogSettings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let s = settings(&[]);
        assert_eq!(s.directive, None);
        assert_eq!(s.level, "warn");
        assert_eq!(s.output, LogOutput::Console);
        assert!(!s.json);
        assert_eq!(s.file_path, env::temp_dir().join("conf-edit.log"));
    }

    #[test]
    fn reads_all_variables() {
        let s = settings(&[
            ("RUST_LOG", "conf_parser=trace"),
            ("CONF_LOG_LEVEL", "debug"),
            ("CONF_LOG_OUTPUT", "both"),
            ("CONF_LOG_FORMAT", "JSON"),
            ("CONF_LOG_FILE_PATH", "/var/log/conf.log"),
        ]);
        assert_eq!(s.directive.as_deref(), Some("conf_parser=trace"));
        assert_eq!(s.level, "debug");
        assert_eq!(s.output, LogOutput::Both);
        assert!(s.json);
        assert_eq!(s.file_path, PathBuf::from("/var/log/conf.log"));
    }

    #[test]
    fn blank_rust_log_is_ignored() {
        let s = settings(&[("RUST_LOG", "  ")]);
        assert_eq!(s.directive, None);
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn tee_write_survives_one_failing_sink() {
        let mut tee = Tee {
            a: Vec::new(),
            b: Broken,
        };
        assert_eq!(tee.write(b"line\n").unwrap(), 5);
        assert_eq!(tee.a, b"line\n");

        let mut tee = Tee {
            a: Broken,
            b: Vec::new(),
        };
        assert_eq!(tee.write(b"line\n").unwrap(), 5);
        assert_eq!(tee.b, b"line\n");
    }

    #[test]
    fn tee_write_fails_when_both_sinks_fail() {
        let mut tee = Tee { a: Broken, b: Broken };
        assert!(tee.write(b"line\n").is_err());
    }

    #[test]
    fn output_parsing() {
        assert_eq!(LogOutput::parse("console"), LogOutput::Console);
        assert_eq!(LogOutput::parse(" File "), LogOutput::File);
        assert_eq!(LogOutput::parse("both"), LogOutput::Both);
        assert_eq!(LogOutput::parse("none"), LogOutput::None);
        assert_eq!(LogOutput::parse("syslog"), LogOutput::None);
    }
}
