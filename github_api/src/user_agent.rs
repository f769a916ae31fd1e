/// User agent sent when the caller does not configure one.
pub(crate) fn default_user_agent() -> String {
    format!("github-api-rs/{}", env!("CARGO_PKG_VERSION"))
}
