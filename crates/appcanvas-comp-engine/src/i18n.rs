//! Translation lookup collaborator.
//!
//! The editor shell owns the actual message catalogs; the core only needs
//! a total lookup function. Implementations must never fail on unknown
//! keys — they return a fallback string instead.

/// Localized string lookup.
///
/// `params` are `(name, value)` substitution pairs, e.g.
/// `trans("form.placeholder", &[("label", "Issuer Endpoint")])`.
pub trait Translator: Send + Sync {
    /// Look up `key`, substituting `params`. Unknown keys return a
    /// fallback (typically the key itself), never an error.
    fn trans(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Fallback translator that echoes the key.
///
/// Substitution params are appended in order so tests can assert they
/// were threaded through.
pub struct KeyEcho;

impl Translator for KeyEcho {
    fn trans(&self, key: &str, params: &[(&str, &str)]) -> String {
        if params.is_empty() {
            return key.to_string();
        }
        let args: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{key}({})", args.join(","))
    }
}
