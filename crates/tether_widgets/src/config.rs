//! Widget geometry and creation configuration

/// Position in logical pixels, relative to the parent's client area
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Size in logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Widget configuration
///
/// Fields left unset fall back to the defaults of the widget kind.
#[derive(Clone, Debug)]
pub struct WidgetConfig {
    /// Title or text content
    pub title: Option<String>,
    /// Initial position
    pub position: Point,
    /// Initial size
    pub size: Option<Size>,
    /// Whether the widget accepts input
    pub enabled: bool,
    /// Whether the widget starts hidden
    pub hidden: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            title: None,
            position: Point::default(),
            size: None,
            enabled: true,
            hidden: false,
        }
    }
}

impl WidgetConfig {
    /// Create a configuration with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Create a configuration with no title
    pub fn untitled() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the position
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = Point::new(x, y);
        self
    }

    /// Set the size
    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    /// Set whether the widget accepts input
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set whether the widget starts hidden
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = WidgetConfig::new("OK").at(10, 20).size(80, 24).enabled(false);
        assert_eq!(config.title.as_deref(), Some("OK"));
        assert_eq!(config.position, Point::new(10, 20));
        assert_eq!(config.size, Some(Size::new(80, 24)));
        assert!(!config.enabled);
        assert!(!config.hidden);
    }

    #[test]
    fn test_untitled_is_enabled() {
        let config = WidgetConfig::untitled();
        assert!(config.title.is_none());
        assert!(config.enabled);
    }
}
