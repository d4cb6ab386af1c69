pub(crate) fn enabled() -> bool {
    std::env::var("KM200_DEBUG")
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}

/// Dump a wire body when `KM200_DEBUG` is set.
///
/// Bodies are base64 ASCII on the wire, so they are dumped as text rather
/// than hex.
pub(crate) fn dump_body(label: &str, bytes: &[u8]) {
    if !enabled() {
        return;
    }

    let text = String::from_utf8_lossy(bytes);
    let out = format!("{label} ({} bytes): {}", bytes.len(), text.trim_end());

    #[cfg(feature = "tracing")]
    tracing::trace!("{out}");

    #[cfg(not(feature = "tracing"))]
    eprintln!("{out}");
}
