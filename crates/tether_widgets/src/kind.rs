//! Widget kinds and their native creation parameters
//!
//! Every widget is the same [`Widget`](crate::Widget) node; the kind tag
//! decides how the host creates its native resource and how native messages
//! are handled. Container kinds ([`WidgetKind::is_container`]) receive
//! messages directly from the window registry and route commands to their
//! children.

use crate::config::{Size, WidgetConfig};
use crate::host::{CreateParams, NativeHandle};
use crate::ChildId;

/// Native window class used by custom container windows
pub const BASE_WINDOW_CLASS: &str = "BaseWindow";

/// The kind of native control a widget wraps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Top-level window; closing the main window requests application quit
    Window { main: bool },
    /// Plain container with a static edge
    Panel,
    /// Titled container frame
    GroupBox,
    /// Static text
    Label,
    /// Push button, fires `on_click`
    Button,
    /// Single-line text input
    Edit,
    /// Multi-line text input
    Memo,
    /// List of text lines
    ListBox,
}

/// Style flags handed to the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowStyle {
    pub visible: bool,
    pub disabled: bool,
    pub child: bool,
    pub overlapped: bool,
    pub tab_stop: bool,
    pub border: bool,
    pub group: bool,
    pub multiline: bool,
    pub vertical_scroll: bool,
    pub control_parent: bool,
    pub client_edge: bool,
    pub static_edge: bool,
}

impl WidgetKind {
    /// Native class name the host registers the control under
    pub fn class_name(&self) -> &'static str {
        match self {
            WidgetKind::Window { .. } | WidgetKind::Panel => BASE_WINDOW_CLASS,
            WidgetKind::GroupBox | WidgetKind::Button => "Button",
            WidgetKind::Label => "Static",
            WidgetKind::Edit | WidgetKind::Memo => "Edit",
            WidgetKind::ListBox => "ListBox",
        }
    }

    /// Whether the kind receives native messages and routes them to children
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            WidgetKind::Window { .. } | WidgetKind::Panel | WidgetKind::GroupBox
        )
    }

    /// Title used when the configuration does not provide one
    pub fn default_title(&self) -> &'static str {
        match self {
            WidgetKind::Window { .. } => "Window",
            WidgetKind::Panel | WidgetKind::ListBox => "",
            WidgetKind::GroupBox => "Group Box",
            WidgetKind::Label => "Label",
            WidgetKind::Button => "Button",
            WidgetKind::Edit => "Edit",
            WidgetKind::Memo => "Memo",
        }
    }

    /// Size used when the configuration does not provide one
    pub fn default_size(&self) -> Size {
        match self {
            WidgetKind::Window { .. } => Size::new(640, 480),
            WidgetKind::Panel | WidgetKind::GroupBox => Size::new(200, 200),
            WidgetKind::Label => Size::new(100, 20),
            WidgetKind::Button => Size::new(75, 23),
            WidgetKind::Edit => Size::new(100, 23),
            WidgetKind::Memo => Size::new(190, 190),
            WidgetKind::ListBox => Size::new(150, 200),
        }
    }

    fn base_style(&self) -> WindowStyle {
        let mut style = WindowStyle {
            visible: true,
            ..Default::default()
        };
        match self {
            WidgetKind::Window { main } => {
                style.visible = *main;
                style.overlapped = true;
                style.control_parent = true;
            }
            WidgetKind::Panel => {
                style.static_edge = true;
                style.control_parent = true;
            }
            WidgetKind::GroupBox => {
                style.group = true;
                style.control_parent = true;
            }
            WidgetKind::Label => {}
            WidgetKind::Button => style.tab_stop = true,
            WidgetKind::Edit => {
                style.client_edge = true;
                style.border = true;
                style.tab_stop = true;
            }
            WidgetKind::Memo => {
                style.client_edge = true;
                style.border = true;
                style.tab_stop = true;
                style.multiline = true;
                style.vertical_scroll = true;
            }
            WidgetKind::ListBox => {
                style.client_edge = true;
                style.tab_stop = true;
            }
        }
        style
    }

    /// Build the parameters the host needs to create this kind of widget
    ///
    /// `parent` carries the parent's native handle and the id it minted for
    /// the new child.
    pub fn creation_params(
        &self,
        config: &WidgetConfig,
        parent: Option<(NativeHandle, ChildId)>,
    ) -> CreateParams {
        let mut style = self.base_style();
        style.child = parent.is_some();
        style.disabled = !config.enabled;
        if config.hidden {
            style.visible = false;
        }

        CreateParams {
            kind: *self,
            class_name: self.class_name(),
            title: config
                .title
                .clone()
                .unwrap_or_else(|| self.default_title().to_string()),
            position: config.position,
            size: config.size.unwrap_or_else(|| self.default_size()),
            style,
            subclass: matches!(self, WidgetKind::GroupBox),
            parent: parent.map(|(handle, _)| handle),
            child_id: parent.map(|(_, id)| id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containers() {
        assert!(WidgetKind::Window { main: true }.is_container());
        assert!(WidgetKind::Panel.is_container());
        assert!(WidgetKind::GroupBox.is_container());
        assert!(!WidgetKind::Button.is_container());
        assert!(!WidgetKind::ListBox.is_container());
    }

    #[test]
    fn test_top_level_params() {
        let params = WidgetKind::Window { main: false }.creation_params(&WidgetConfig::default(), None);
        assert_eq!(params.class_name, BASE_WINDOW_CLASS);
        assert_eq!(params.title, "Window");
        assert!(!params.style.child);
        assert!(!params.style.visible);
        assert!(params.parent.is_none());
        assert!(params.child_id.is_none());
    }

    #[test]
    fn test_child_params() {
        let parent = (NativeHandle::from_raw(7), ChildId::from_raw(3));
        let config = WidgetConfig::new("Go").at(4, 5).enabled(false);
        let params = WidgetKind::Button.creation_params(&config, Some(parent));

        assert_eq!(params.class_name, "Button");
        assert_eq!(params.title, "Go");
        assert_eq!(params.size, WidgetKind::Button.default_size());
        assert!(params.style.child);
        assert!(params.style.tab_stop);
        assert!(params.style.disabled);
        assert_eq!(params.parent, Some(NativeHandle::from_raw(7)));
        assert_eq!(params.child_id, Some(ChildId::from_raw(3)));
    }

    #[test]
    fn test_group_box_is_subclassed() {
        let params = WidgetKind::GroupBox.creation_params(&WidgetConfig::default(), None);
        assert!(params.subclass);
        assert_eq!(params.title, "Group Box");
        assert!(params.style.group);
    }

    #[test]
    fn test_memo_extends_edit() {
        let params = WidgetKind::Memo.creation_params(&WidgetConfig::new("notes").hidden(true), None);
        assert_eq!(params.class_name, "Edit");
        assert!(params.style.multiline);
        assert!(params.style.vertical_scroll);
        assert!(params.style.border);
        assert!(!params.style.visible);
    }
}
