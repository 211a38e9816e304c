//! Environment identity report.

use strongbox_config::EnvironmentIdentity;

pub fn run(name: Option<String>) -> String {
    let identity = name
        .map(EnvironmentIdentity::new)
        .unwrap_or_else(EnvironmentIdentity::from_env);
    let shown = if identity.is_empty() {
        "(none)"
    } else {
        identity.as_str()
    };
    format!("Environment: {}\nClass: {}", shown, identity.class())
}
