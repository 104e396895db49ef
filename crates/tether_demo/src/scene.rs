//! Scene file handling
//!
//! A scene is a TOML file describing a widget tree, the subscriptions wired
//! between widgets, and a script of native interactions to replay:
//!
//! ```toml
//! [[widget]]
//! name = "window"
//! kind = "window"
//! main = true
//!
//! [[widget]]
//! name = "ok"
//! kind = "button"
//! parent = "window"
//!
//! [[subscription]]
//! event = "click"
//! widget = "ok"
//! owner = "window"        # optional: subscription dies with this widget
//! message = "ok pressed"
//!
//! [[step]]
//! action = "click"
//! target = "ok"
//! ```

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tether_widgets::{WidgetConfig, WidgetKind};

/// A complete scene
#[derive(Debug, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub scene: SceneMetadata,
    #[serde(default, rename = "widget")]
    pub widgets: Vec<WidgetSpec>,
    #[serde(default, rename = "subscription")]
    pub subscriptions: Vec<SubscriptionSpec>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// Scene metadata
#[derive(Debug, Deserialize)]
pub struct SceneMetadata {
    #[serde(default = "default_scene_name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for SceneMetadata {
    fn default() -> Self {
        Self {
            name: default_scene_name(),
            description: None,
        }
    }
}

fn default_scene_name() -> String {
    "untitled".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KindSpec {
    Window,
    Panel,
    GroupBox,
    Label,
    Button,
    Edit,
    Memo,
    ListBox,
}

/// One widget of the tree
#[derive(Debug, Deserialize)]
pub struct WidgetSpec {
    pub name: String,
    pub kind: KindSpec,
    /// Name of a widget declared earlier in the file
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub position: Option<[i32; 2]>,
    #[serde(default)]
    pub size: Option<[i32; 2]>,
    /// Only meaningful for windows: closing a main window quits
    #[serde(default)]
    pub main: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl WidgetSpec {
    pub fn kind(&self) -> WidgetKind {
        match self.kind {
            KindSpec::Window => WidgetKind::Window { main: self.main },
            KindSpec::Panel => WidgetKind::Panel,
            KindSpec::GroupBox => WidgetKind::GroupBox,
            KindSpec::Label => WidgetKind::Label,
            KindSpec::Button => WidgetKind::Button,
            KindSpec::Edit => WidgetKind::Edit,
            KindSpec::Memo => WidgetKind::Memo,
            KindSpec::ListBox => WidgetKind::ListBox,
        }
    }

    pub fn config(&self) -> WidgetConfig {
        let mut config = WidgetConfig::untitled()
            .enabled(self.enabled)
            .hidden(self.hidden);
        if let Some(title) = &self.title {
            config = config.title(title.clone());
        }
        if let Some([x, y]) = self.position {
            config = config.at(x, y);
        }
        if let Some([width, height]) = self.size {
            config = config.size(width, height);
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Click,
    Close,
    Resize,
}

/// A callback wired onto one of a widget's channels
#[derive(Debug, Deserialize)]
pub struct SubscriptionSpec {
    pub event: EventKind,
    /// Widget whose channel is subscribed to
    pub widget: String,
    /// Widget whose lifetime bounds the subscription
    #[serde(default)]
    pub owner: Option<String>,
    pub message: String,
}

/// One scripted interaction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    /// Press a button (delivered to its parent container as a command)
    Click { target: String },
    /// Ask a container to close
    Close { target: String },
    /// Resize a container
    Resize {
        target: String,
        width: i32,
        height: i32,
    },
    /// Destroy a widget and its subtree
    Destroy { target: String },
}

impl Step {
    pub fn target(&self) -> &str {
        match self {
            Step::Click { target }
            | Step::Close { target }
            | Step::Resize { target, .. }
            | Step::Destroy { target } => target,
        }
    }
}

impl Scene {
    /// Load a scene from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse a scene from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let scene: Scene = toml::from_str(content)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Check that every name reference resolves
    ///
    /// Parents must be declared before their children, click targets must be
    /// buttons with a parent, close and resize targets must be containers.
    pub fn validate(&self) -> Result<()> {
        let mut kinds: IndexMap<&str, &WidgetSpec> = IndexMap::new();
        for spec in &self.widgets {
            if let Some(parent) = &spec.parent {
                if !kinds.contains_key(parent.as_str()) {
                    anyhow::bail!(
                        "widget `{}` refers to parent `{}` which is not declared before it",
                        spec.name,
                        parent
                    );
                }
            }
            if kinds.insert(spec.name.as_str(), spec).is_some() {
                anyhow::bail!("widget `{}` is declared twice", spec.name);
            }
        }

        let lookup = |name: &str, context: &str| -> Result<&WidgetSpec> {
            kinds
                .get(name)
                .copied()
                .with_context(|| format!("{context} refers to unknown widget `{name}`"))
        };

        for sub in &self.subscriptions {
            let widget = lookup(&sub.widget, "subscription")?;
            if let Some(owner) = &sub.owner {
                lookup(owner, "subscription owner")?;
            }
            match sub.event {
                EventKind::Click if widget.kind != KindSpec::Button => {
                    anyhow::bail!("click subscription on `{}` which is not a button", sub.widget)
                }
                EventKind::Close | EventKind::Resize if !widget.kind().is_container() => {
                    anyhow::bail!(
                        "{:?} subscription on `{}` which is not a container",
                        sub.event,
                        sub.widget
                    )
                }
                _ => {}
            }
        }

        for step in &self.steps {
            let widget = lookup(step.target(), "step")?;
            match step {
                Step::Click { target } => {
                    if widget.kind != KindSpec::Button || widget.parent.is_none() {
                        anyhow::bail!("click target `{target}` must be a button with a parent");
                    }
                }
                Step::Close { target } | Step::Resize { target, .. } => {
                    if !widget.kind().is_container() {
                        anyhow::bail!("`{target}` is not a container");
                    }
                }
                Step::Destroy { .. } => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_scene_parses() {
        let scene = Scene::parse(include_str!("../scenes/demo.toml")).unwrap();
        assert_eq!(scene.scene.name, "demo");
        assert_eq!(scene.widgets.len(), 12);
        assert_eq!(scene.widgets[0].kind(), WidgetKind::Window { main: true });
        assert_eq!(
            scene.steps[2],
            Step::Resize {
                target: "window".into(),
                width: 1024,
                height: 600
            }
        );
    }

    #[test]
    fn test_widget_config_mapping() {
        let scene = Scene::parse(
            r#"
            [[widget]]
            name = "w"
            kind = "window"

            [[widget]]
            name = "b"
            kind = "button"
            parent = "w"
            title = "Go"
            position = [3, 4]
            enabled = false
            "#,
        )
        .unwrap();

        let config = scene.widgets[1].config();
        assert_eq!(config.title.as_deref(), Some("Go"));
        assert_eq!(config.position, tether_widgets::Point::new(3, 4));
        assert!(config.size.is_none());
        assert!(!config.enabled);
        assert_eq!(scene.scene.name, "untitled");
    }

    #[test]
    fn test_scene_table_optional() {
        let scene = Scene::parse(
            r#"
            [[widget]]
            name = "w"
            kind = "window"
            "#,
        )
        .unwrap();
        assert_eq!(scene.scene.name, "untitled");
        assert!(scene.scene.description.is_none());

        let named = Scene::parse("[scene]\ndescription = \"no name\"\n").unwrap();
        assert_eq!(named.scene.name, "untitled");
    }

    #[test]
    fn test_parent_must_come_first() {
        let err = Scene::parse(
            r#"
            [[widget]]
            name = "b"
            kind = "button"
            parent = "w"

            [[widget]]
            name = "w"
            kind = "window"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not declared before it"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Scene::parse(
            r#"
            [[widget]]
            name = "w"
            kind = "window"

            [[widget]]
            name = "w"
            kind = "panel"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_click_subscription_needs_button() {
        let err = Scene::parse(
            r#"
            [[widget]]
            name = "w"
            kind = "window"

            [[subscription]]
            event = "click"
            widget = "w"
            message = "nope"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a button"));
    }

    #[test]
    fn test_unknown_step_target() {
        let err = Scene::parse(
            r#"
            [[step]]
            action = "destroy"
            target = "ghost"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown widget `ghost`"));
    }
}
