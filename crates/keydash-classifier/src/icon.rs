//! Icon derivation from action type plus label/raw command.

use keydash_model::{ActionType, Icon, IconKind, UNKNOWN_MARKER};

use crate::extract::{direction, first_number, Direction};

/// Derive the icon descriptor for a binding.
///
/// The label is consulted first since adapters already distilled it from the
/// command; the raw command is the fallback source of data.
pub fn derive_icon(action_type: ActionType, label: &str, raw_command: Option<&str>) -> Icon {
    match action_type {
        ActionType::Workspace => {
            let number = first_number(label)
                .or_else(|| raw_command.and_then(first_number))
                .unwrap_or(UNKNOWN_MARKER);
            Icon::with_data(IconKind::Ws, number)
        }
        ActionType::Position => Icon::with_data(IconKind::Pos, "center"),
        ActionType::Focus => {
            let dir = direction(label)
                .or_else(|| raw_command.and_then(direction))
                .unwrap_or(Direction::Right);
            Icon::with_data(IconKind::Focus, dir.glyph())
        }
        ActionType::Mode => Icon::new(IconKind::Mode),
        ActionType::Resize => {
            let grows = if label.contains('+') || label.contains('-') {
                label.contains('+')
            } else {
                raw_command.is_some_and(|raw| raw.contains('+'))
            };
            Icon::with_data(IconKind::Resize, if grows { "grow" } else { "shrink" })
        }
        ActionType::System => Icon::new(IconKind::Sys),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_icon_carries_number() {
        let icon = derive_icon(ActionType::Workspace, "WS 3", Some("aerospace summon-workspace 3"));
        assert_eq!(icon, Icon::with_data(IconKind::Ws, "3"));
    }

    #[test]
    fn test_workspace_icon_falls_back_to_raw_then_marker() {
        let icon = derive_icon(ActionType::Workspace, "Go", Some("workspace 9"));
        assert_eq!(icon.data.as_deref(), Some("9"));
        let icon = derive_icon(ActionType::Workspace, "Go", None);
        assert_eq!(icon.data.as_deref(), Some("?"));
    }

    #[test]
    fn test_focus_icon_direction() {
        assert_eq!(derive_icon(ActionType::Focus, "Foc L", None).data.as_deref(), Some("◂"));
        assert_eq!(derive_icon(ActionType::Focus, "Foc U", None).data.as_deref(), Some("▴"));
        assert_eq!(derive_icon(ActionType::Focus, "Mon", None).data.as_deref(), Some("▸"));
    }

    #[test]
    fn test_resize_icon() {
        assert_eq!(derive_icon(ActionType::Resize, "+50", None).data.as_deref(), Some("grow"));
        assert_eq!(derive_icon(ActionType::Resize, "-50", None).data.as_deref(), Some("shrink"));
        assert_eq!(
            derive_icon(ActionType::Resize, "?", Some("resize smart +10")).data.as_deref(),
            Some("grow")
        );
    }

    #[test]
    fn test_plain_kinds() {
        assert_eq!(derive_icon(ActionType::Mode, "Float", None), Icon::new(IconKind::Mode));
        assert_eq!(derive_icon(ActionType::System, "Bar", None), Icon::new(IconKind::Sys));
        assert_eq!(derive_icon(ActionType::Position, "Max", None).data.as_deref(), Some("center"));
    }
}
