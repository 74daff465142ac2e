use tracing::warn;

/// Locale used when the configured one has no message catalogue
pub const FALLBACK_LOCALE: &str = "en";

/// Switch the process-wide locale, falling back when the catalogue is missing
pub fn set_locale(locale: &str) {
    if is_supported(locale) {
        rust_i18n::set_locale(locale);
    } else {
        warn!(
            "No translations for locale '{}', falling back to '{}'",
            locale, FALLBACK_LOCALE
        );
        rust_i18n::set_locale(FALLBACK_LOCALE);
    }
}

/// Whether a message catalogue exists for `locale`
pub fn is_supported(locale: &str) -> bool {
    rust_i18n::available_locales!()
        .iter()
        .any(|available| *available == locale)
}
