//! Rules for Karabiner `shell_command` / `key_code` actions.
//!
//! Karabiner mostly shells out to AeroSpace, Rectangle and helper scripts,
//! so the rules look at the shelled command line.

use keydash_model::ActionType::{Focus, Mode, Position, Resize, System, Workspace};

use super::{Classification, RuleSet};
use crate::extract::{number_after, number_after_or_marker, signed_delta};

/// Karabiner rule set. Fallback labels keep 10 chars of the rule description.
pub fn karabiner_rules() -> RuleSet {
    RuleSet::new("karabiner", 10)
        // Workspaces
        .rule("summon-workspace", |i| i.contains("summon-workspace"), |i| {
            let n = number_after_or_marker(i.command, "summon-workspace");
            Classification::new(format!("WS {n}"), Workspace, format!("Summon workspace {n} to current monitor"))
        })
        .rule("move-node-to-workspace", |i| i.contains("move-node-to-workspace"), |i| {
            let n = number_after_or_marker(i.command, "move-node-to-workspace");
            Classification::new(format!("Send {n}"), Workspace, format!("Send window to workspace {n}"))
        })
        .rule(
            "workspace",
            |i| !i.contains("move-node") && number_after(i.command, "workspace").is_some(),
            |i| {
                let n = number_after_or_marker(i.command, "workspace");
                Classification::new(format!("Go {n}"), Workspace, format!("Switch to workspace {n}"))
            },
        )
        // Checked before focus: its `--focus-follows-window` flag mentions focus
        .rule("move-node-to-monitor", |i| i.contains("move-node-to-monitor"), |_| {
            Classification::new("Mon+Win", Position, "Move window to next monitor + follow")
        })
        // Focus: wrap scripts are more specific than the generic focus verbs
        .rule("focus-wrap-prev", |i| i.contains("aerospace-focus-wrap-prev"), |_| {
            Classification::new("Prev", Focus, "Focus previous window (wrap)")
        })
        .rule("focus-wrap-next", |i| i.contains("aerospace-focus-wrap-next"), |_| {
            Classification::new("Next", Focus, "Focus next window (wrap)")
        })
        .rule("focus-left", |i| i.contains_all(&["focus", "left"]), |_| {
            Classification::new("Foc L", Focus, "Focus window to left")
        })
        .rule("focus-right", |i| i.contains_all(&["focus", "right"]), |_| {
            Classification::new("Foc R", Focus, "Focus window to right")
        })
        .rule("focus-up", |i| i.contains_all(&["focus", "up"]), |_| {
            Classification::new("Foc U", Focus, "Focus window above")
        })
        .rule("focus-down", |i| i.contains_all(&["focus", "down"]), |_| {
            Classification::new("Foc D", Focus, "Focus window below")
        })
        .rule("focus-monitor", |i| i.contains_all(&["focus", "monitor"]), |_| {
            Classification::new("Mon", Focus, "Focus next monitor")
        })
        .rule("focus-dfs-prev", |i| i.contains_all(&["focus", "dfs-prev"]), |_| {
            Classification::new("Prev", Focus, "Focus previous window")
        })
        .rule("focus-dfs-next", |i| i.contains_all(&["focus", "dfs-next"]), |_| {
            Classification::new("Next", Focus, "Focus next window")
        })
        // Moves
        .rule("move-left", |i| i.contains_all(&["move ", "left"]), |_| {
            Classification::new("Mov L", Position, "Move window left")
        })
        .rule("move-right", |i| i.contains_all(&["move ", "right"]), |_| {
            Classification::new("Mov R", Position, "Move window right")
        })
        .rule("move-up", |i| i.contains_all(&["move ", "up"]), |_| {
            Classification::new("Mov U", Position, "Move window up")
        })
        .rule("move-down", |i| i.contains_all(&["move ", "down"]), |_| {
            Classification::new("Mov D", Position, "Move window down")
        })
        .rule("resize", |i| i.contains("resize"), |i| {
            let delta = signed_delta(i.command);
            Classification::new(delta.clone(), Resize, format!("Resize window {delta}"))
        })
        // Layouts
        .rule("layout-float", |i| i.contains_all(&["layout", "floating", "tiling"]), |_| {
            Classification::new("Float", Mode, "Toggle window float/tile")
        })
        .rule("layout-orientation", |i| i.contains_all(&["layout", "horizontal", "vertical"]), |_| {
            Classification::new("H/V", Mode, "Toggle horizontal/vertical tiles")
        })
        .rule("layout-accordion", |i| i.contains_all(&["layout", "accordion"]), |_| {
            Classification::new("Acc", Mode, "Toggle accordion mode")
        })
        .rule("mode-service", |i| i.contains("mode service"), |_| {
            Classification::new("Svc", Mode, "Enter service mode")
        })
        .rule("flatten-balance", |i| i.contains_all(&["flatten", "balance"]), |_| {
            Classification::new("Reset", Mode, "Flatten + balance layout")
        })
        .rule("flatten", |i| i.contains("flatten"), |_| {
            Classification::new("Flat", Mode, "Flatten workspace tree")
        })
        .rule("bar-toggle", |i| i.contains("bartoggle"), |_| {
            Classification::new("Bar", System, "Toggle SketchyBar")
        })
        // Rectangle / Rectangle Pro URL schemes, specific actions first
        .rule("rect-left-half", |i| is_rectangle(i.lower()) && i.contains("left-half"), |_| {
            Classification::new("Left", Position, "Left half of screen")
        })
        .rule("rect-right-half", |i| is_rectangle(i.lower()) && i.contains("right-half"), |_| {
            Classification::new("Right", Position, "Right half of screen")
        })
        .rule("rect-first-third", |i| is_rectangle(i.lower()) && i.contains("first-third"), |_| {
            Classification::new("1/3", Position, "First third of screen")
        })
        .rule("rect-last-third", |i| is_rectangle(i.lower()) && i.contains("last-third"), |_| {
            Classification::new("3/3", Position, "Last third of screen")
        })
        .rule("rect-center-third", |i| is_rectangle(i.lower()) && i.contains("center-third"), |_| {
            Classification::new("C 1/3", Position, "Center third of screen")
        })
        .rule("rect-cascade-all", |i| is_rectangle(i.lower()) && i.contains("cascade-all"), |_| {
            Classification::new("Cascade", Position, "Cascade all windows")
        })
        .rule("rect-almost-maximize", |i| is_rectangle(i.lower()) && i.contains("almost-maximize"), |_| {
            Classification::new("~Max", Position, "Almost maximize")
        })
        .rule("rect-maximize", |i| is_rectangle(i.lower()) && i.contains("maximize"), |_| {
            Classification::new("Max", Position, "Maximize window")
        })
        .rule("rect", |i| is_rectangle(i.lower()), |_| {
            Classification::new("Rect", Position, "Rectangle positioning")
        })
        // Helper scripts
        .rule("pop-out", |i| i.contains("pop-out"), |_| {
            Classification::new("Pop", Mode, "Pop window out of tile")
        })
        .rule("cycle-left", |i| i.contains("cycle-left"), |_| {
            Classification::new("◂Cyc", Position, "Cycle left positions")
        })
        .rule("cycle-right", |i| i.contains("cycle-right"), |_| {
            Classification::new("Cyc▸", Position, "Cycle right positions")
        })
        .rule("cycle-center", |i| i.contains("cycle-center"), |_| {
            Classification::new("⬚Cyc", Position, "Cycle center positions")
        })
        .rule("toggle-workspace-float", |i| i.contains("toggle-workspace-float"), |_| {
            Classification::new("Mode", Mode, "Toggle workspace tiling mode")
        })
}

fn is_rectangle(lower: &str) -> bool {
    lower.contains("rectangle://") || lower.contains("rectangle-pro://")
}
