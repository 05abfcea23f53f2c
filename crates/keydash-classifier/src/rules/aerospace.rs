//! Rules for AeroSpace binding commands.
//!
//! Commands arrive joined with ` && ` when a binding runs several in sequence.

use keydash_model::ActionType::{Focus, Mode, Position, Resize, System, Workspace};

use super::{Classification, RuleInput, RuleSet};
use crate::extract::{number_after, number_after_or_marker, signed_delta};

/// Rules for `[mode.main.binding]`. Fallback labels keep 15 chars of the first command.
pub fn aerospace_rules() -> RuleSet {
    RuleSet::new("aerospace", 15)
        .rule("move-node-to-workspace-follow", |i| i.contains("move-node-to-workspace") && follows(i), |i| {
            let n = number_after_or_marker(i.command, "move-node-to-workspace");
            Classification::new(format!("Go {n}"), Workspace, format!("Send window + follow to workspace {n}"))
        })
        .rule("move-node-to-workspace", |i| i.contains("move-node-to-workspace"), |i| {
            let n = number_after_or_marker(i.command, "move-node-to-workspace");
            Classification::new(format!("Send {n}"), Workspace, format!("Send window to workspace {n} (stay)"))
        })
        .rule("move-workspace-to-monitor", |i| i.contains("move-workspace-to-monitor"), |_| {
            Classification::new("Mon WS", Position, "Move workspace to next monitor")
        })
        .rule("workspace", |i| plain_workspace(i).is_some(), |i| {
            let n = plain_workspace(i).unwrap_or_else(|| keydash_model::UNKNOWN_MARKER.to_string());
            Classification::new(format!("Go {n}"), Workspace, format!("Switch to workspace {n}"))
        })
        .rule("resize", |i| i.contains("resize"), |i| {
            let delta = signed_delta(i.command);
            Classification::new(delta.clone(), Resize, format!("Resize window {delta}"))
        })
        .rule("flatten-balance", |i| i.contains_all(&["flatten-workspace-tree", "balance-sizes"]), |_| {
            Classification::new("Reset", Mode, "Flatten + h-tiles + balance")
        })
        .rule("flatten", |i| i.contains("flatten-workspace-tree"), |_| {
            Classification::new("Flatten", Mode, "Flatten workspace tree")
        })
        .rule("layout-float", |i| i.contains("layout floating tiling"), |_| {
            Classification::new("Float", Mode, "Toggle window float/tile")
        })
        .rule("layout-tiles", |i| i.contains_any(&["layout horizontal", "layout tiles"]), |_| {
            Classification::new("H-Tile", Mode, "Set horizontal tiles")
        })
        .rule("balance", |i| i.contains("balance-sizes"), |_| {
            Classification::new("Balance", Mode, "Balance window sizes")
        })
        .rule("mode-service", |i| i.contains("mode service"), |_| {
            Classification::new("Svc", Mode, "Enter service mode")
        })
        .rule("focus-monitor", |i| i.contains("focus-monitor"), |_| {
            Classification::new("Mon", Focus, "Focus next monitor")
        })
        .rule("focus-left", |i| first_command_is(i, "focus left"), |_| {
            Classification::new("Foc L", Focus, "Focus window to left")
        })
        .rule("focus-right", |i| first_command_is(i, "focus right"), |_| {
            Classification::new("Foc R", Focus, "Focus window to right")
        })
        .rule("focus-up", |i| first_command_is(i, "focus up"), |_| {
            Classification::new("Foc U", Focus, "Focus window above")
        })
        .rule("focus-down", |i| first_command_is(i, "focus down"), |_| {
            Classification::new("Foc D", Focus, "Focus window below")
        })
        .rule("move-left", |i| first_command_is(i, "move left"), |_| {
            Classification::new("Mov L", Position, "Move window left")
        })
        .rule("move-right", |i| first_command_is(i, "move right"), |_| {
            Classification::new("Mov R", Position, "Move window right")
        })
        .rule("move-up", |i| first_command_is(i, "move up"), |_| {
            Classification::new("Mov U", Position, "Move window up")
        })
        .rule("move-down", |i| first_command_is(i, "move down"), |_| {
            Classification::new("Mov D", Position, "Move window down")
        })
        .rule("fullscreen", |i| first_command_is(i, "fullscreen"), |_| {
            Classification::new("Full", Position, "Toggle fullscreen")
        })
        .rule("close", |i| first_command_is(i, "close"), |_| {
            Classification::new("Close", System, "Close window")
        })
}

/// Rules for `[mode.service.binding]`: key-specific service actions first,
/// then the main rules.
pub fn aerospace_service_rules() -> RuleSet {
    RuleSet::new("aerospace-service", 15)
        .rule("service-exit", |i| i.key_is("esc"), |_| {
            Classification::new("Exit", Mode, "Exit service mode")
        })
        .rule("service-reload", |i| i.key_is("r") && i.contains("reload-config"), |_| {
            Classification::new("Reload", System, "Reload AeroSpace config")
        })
        .rule("service-close-all", |i| i.key_is("q") && i.contains("close-all"), |_| {
            Classification::new("Close", System, "Close all windows but current")
        })
        .rule("service-enable", |i| i.key_is("d") && i.contains("enable"), |_| {
            Classification::new("Toggle", Mode, "Enable/disable AeroSpace")
        })
        .rule("service-flatten", |i| i.key_is("f") && i.contains("flatten"), |_| {
            Classification::new("Flatten", Mode, "Flatten workspace tree")
        })
        .extend(aerospace_rules())
}

fn commands<'a>(input: &'a RuleInput<'_>) -> impl Iterator<Item = &'a str> {
    input.lower().split("&&").map(str::trim)
}

fn first_command_is(input: &RuleInput<'_>, prefix: &str) -> bool {
    commands(input).next().is_some_and(|c| c.starts_with(prefix))
}

/// A later `workspace N` for the move's own target means the binding follows the moved window.
fn follows(input: &RuleInput<'_>) -> bool {
    let Some(target) = number_after(input.command, "move-node-to-workspace") else {
        return false;
    };
    commands(input).any(|c| c.starts_with("workspace ") && number_after(c, "workspace").as_deref() == Some(target.as_str()))
}

/// `N` of a standalone `workspace N` command.
fn plain_workspace(input: &RuleInput<'_>) -> Option<String> {
    commands(input)
        .filter(|c| c.starts_with("workspace "))
        .find_map(|c| number_after(c, "workspace"))
}
