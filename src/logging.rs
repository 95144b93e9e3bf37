use std::env;
use std::io;
use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";
const DEFAULT_LOG_FILE: &str = "logs/cubehop.log";

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

pub fn init() {
    // Env filter: use RUST_LOG or default to info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Console (stderr) layer with file/line
    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .compact();

    // File logging (RUST_LOG_FILE or logs/cubehop.log), rotated daily
    let log_path = env::var("RUST_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (directory, file_name) = split_log_path(&log_path);
    let (nb_writer, guard) = tracing_appender::non_blocking(
        tracing_appender::rolling::daily(directory, file_name),
    );
    let _ = FILE_GUARD.set(guard);

    let file_layer = fmt::layer()
        .with_writer(nb_writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    // Hook panics to log with backtrace
    std::panic::set_hook(Box::new(|info| {
        let mut msg = String::new();
        if let Some(loc) = info.location() {
            msg.push_str(&format!("panic at {}:{}:{} ", loc.file(), loc.line(), loc.column()));
        }
        if let Some(s) = info.payload().downcast_ref::<&str>() { msg.push_str(s); }
        else if let Some(s) = info.payload().downcast_ref::<String>() { msg.push_str(s); }
        else { msg.push_str("<non-string panic>"); }
        let bt = std::backtrace::Backtrace::force_capture();
        tracing::error!("{}\nBacktrace:\n{:?}", msg, bt);
    }));
}

fn split_log_path(log_path: &str) -> (&Path, &str) {
    let path = Path::new(log_path);
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("cubehop.log");
    (directory, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_with_directory() {
        assert_eq!(split_log_path("logs/app.log"), (Path::new("logs"), "app.log"));
    }

    #[test]
    fn bare_file_name_logs_to_cwd() {
        assert_eq!(split_log_path("app.log"), (Path::new("."), "app.log"));
    }

    #[test]
    fn directory_only_uses_default_name() {
        assert_eq!(split_log_path("/"), (Path::new("."), "cubehop.log"));
    }
}
