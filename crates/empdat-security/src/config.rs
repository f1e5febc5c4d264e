//! Security layer configuration.

/// Knobs for the security layer.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Resources exempt from the create check. The change-request
    /// table must stay exempt or the evaluator could not file its own
    /// requests.
    pub exempt_resources: Vec<String>,
    /// Reason recorded on a change request when the caller gives none.
    pub default_reason: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            exempt_resources: vec![crate::change_request::RESOURCE.to_owned()],
            default_reason: "No reason given".to_owned(),
        }
    }
}
