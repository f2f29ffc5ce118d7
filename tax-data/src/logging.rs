use std::io::{self, IsTerminal};

use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Compact local-time event formatter for a one-shot CLI:
/// `HH:MM:SS.mmm LEVEL message fields`.
struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let level = *event.metadata().level();
        let timestamp = Local::now().format("%H:%M:%S%.3f");

        if writer.has_ansi_escapes() {
            let color = match level {
                Level::ERROR => "31",
                Level::WARN => "33",
                Level::INFO => "32",
                Level::DEBUG => "34",
                Level::TRACE => "35",
            };
            write!(writer, "\x1b[2m{timestamp}\x1b[0m \x1b[1;{color}m{level:>5}\x1b[0m ")?;
        } else {
            write!(writer, "{timestamp} {level:>5} ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Filter used when `RUST_LOG` is unset.
fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

fn subscriber<W>(
    filter: EnvFilter,
    ansi: bool,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_ansi(ansi)
        .with_env_filter(filter)
        .event_format(LocalFmt)
        .with_writer(writer)
        .finish()
}

/// Initializes logging to stderr. Call once at startup.
///
/// - Level: `RUST_LOG` when set, otherwise INFO (DEBUG with `verbose`).
/// - Colored when stderr is a terminal, plain when redirected.
///
/// Stdout is left to the command's own output.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // A second call, e.g. from tests, leaves the first subscriber in place.
    let _ = subscriber(filter, io::stderr().is_terminal(), io::stderr).try_init();
}
