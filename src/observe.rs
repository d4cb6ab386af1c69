use std::time::Duration;

use crate::error::Error;

pub(crate) fn record_ok(mode: &'static str, op: &'static str, path: &str, elapsed: Duration) {
    let _ = (mode, op, path, elapsed);

    #[cfg(feature = "metrics")]
    {
        metrics::counter!("km200_requests_total", "mode" => mode, "op" => op, "outcome" => "ok")
            .increment(1);
        metrics::histogram!("km200_request_seconds", "mode" => mode, "op" => op)
            .record(elapsed.as_secs_f64());
    }

    #[cfg(feature = "tracing")]
    {
        tracing::debug!(
            mode,
            op,
            path,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "km200 request ok"
        );
    }
}

pub(crate) fn record_err(
    mode: &'static str,
    op: &'static str,
    path: &str,
    elapsed: Duration,
    err: &Error,
) {
    let _ = (mode, op, path, elapsed, err);

    #[cfg(feature = "metrics")]
    {
        metrics::counter!("km200_requests_total", "mode" => mode, "op" => op, "outcome" => "err")
            .increment(1);
        metrics::counter!(
            "km200_request_errors_total",
            "mode" => mode,
            "op" => op,
            "kind" => error_kind(err)
        )
        .increment(1);
        metrics::histogram!("km200_request_seconds", "mode" => mode, "op" => op)
            .record(elapsed.as_secs_f64());
    }

    #[cfg(feature = "tracing")]
    {
        tracing::warn!(
            mode,
            op,
            path,
            error = %err,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "km200 request failed"
        );
    }
}

#[cfg(feature = "metrics")]
fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::Io(_) => "io",
        Error::Timeout => "timeout",
        Error::Http { .. } => "http",
        Error::Transport(_) => "transport",
        Error::Decoding(_) => "decoding",
        Error::Protocol { .. } => "protocol",
        Error::InvalidArgument(_) => "invalid_argument",
    }
}
