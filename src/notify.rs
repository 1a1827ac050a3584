use log::{info, warn};
use std::process::Command;

// Escape a string for use inside an AppleScript string literal
fn escape_applescript_string(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .chars()
        .filter(|&c| !c.is_control())
        .collect()
}

fn notification_script(title: &str, message: &str) -> String {
    format!(
        "display notification \"{}\" with title \"{}\"",
        escape_applescript_string(message),
        escape_applescript_string(title)
    )
}

/// Show a desktop notification. Best effort: failures are only logged.
pub fn notify(title: &str, message: &str) {
    if !cfg!(target_os = "macos") {
        info!("{}: {}", title, message);
        return;
    }

    match Command::new("osascript").arg("-e").arg(notification_script(title, message)).output() {
        Ok(output) if output.status.success() => {}
        Ok(output) => warn!(
            "Failed to show notification: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        Err(e) => warn!("Failed to run osascript: {}", e),
    }
}
