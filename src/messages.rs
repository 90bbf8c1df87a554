use anstyle::{AnsiColor, Reset, Style};

const LABEL_COLOR: Style = Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(AnsiColor::Cyan)));
const COMMAND_COLOR: Style = Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(AnsiColor::Magenta)));
const SERVICE_COLOR: Style = Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(AnsiColor::Green)));

fn paint(style: Style, text: &str, color: bool) -> String {
    if color {
        format!("{style}{text}{Reset}")
    } else {
        text.to_string()
    }
}

/// `Running <command> for: <service dir>`, printed before each service runs
#[must_use]
pub fn format_running_message(command: &str, service_dir: &str, color: bool) -> String {
    format!(
        "{} {} {} {}",
        paint(LABEL_COLOR, "Running", color),
        paint(COMMAND_COLOR, command, color),
        paint(LABEL_COLOR, "for:", color),
        paint(SERVICE_COLOR, service_dir, color)
    )
}
