//! Placeholder substitution for the command template and the directory wrapper

use std::path::Path;

use crate::config_file::{Config, ConfigError};

pub const COMMAND_PLACEHOLDER: &str = "{COMMAND}";
pub const PATH_PLACEHOLDER: &str = "{PATH}";
pub const SERVICE_PLACEHOLDER: &str = "{SERVICE}";

/// Template used when the config does not set one
pub const DEFAULT_TEMPLATE: &str = COMMAND_PLACEHOLDER;

/// Runs the command inside the service directory. The `&&` chain keeps a failed `pushd`
/// from running the command in the caller's directory.
pub const DIRECTORY_WRAPPER: &str = "pushd {PATH} > /dev/null && {COMMAND} && popd > /dev/null";

/// Substitute every placeholder in a single left-to-right pass.
///
/// Values are inserted verbatim and never rescanned, so a value that itself contains a
/// placeholder is left untouched. Text without any placeholder comes back unchanged. There
/// is no escape syntax: `{{` and `}}` are copied as two braces.
#[must_use]
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while !rest.is_empty() {
        for &(placeholder, value) in values {
            if let Some(after) = rest.strip_prefix(placeholder) {
                rendered.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            rendered.push(c);
        }
        rest = chars.as_str();
    }
    rendered
}

/// Put a resolved command into the configured (or default) template.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the configured `template` is not text.
pub fn wrap(command: &str, config: &Config) -> Result<String, ConfigError> {
    let template = config.template()?;
    let template = template.as_deref().unwrap_or(DEFAULT_TEMPLATE).trim();
    Ok(render(template, &[(COMMAND_PLACEHOLDER, command)]))
}

/// Build the final shell line for one service.
///
/// `{PATH}` and `{COMMAND}` are filled in together. `{SERVICE}` is resolved afterwards
/// across the whole line, so templates and `--execute` text may reference it too.
#[must_use]
pub fn in_directory(templated: &str, path: &Path, service_dir: &str) -> String {
    let path = path.display().to_string();
    let line = render(
        DIRECTORY_WRAPPER,
        &[(PATH_PLACEHOLDER, path.as_str()), (COMMAND_PLACEHOLDER, templated)],
    );
    render(&line, &[(SERVICE_PLACEHOLDER, service_dir)])
}
