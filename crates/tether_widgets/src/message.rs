//! Native messages routed into the widget tree

use crate::config::Size;
use crate::ChildId;

/// A message delivered by the host's message loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeMessage {
    /// The user asked to close the window
    Close,
    /// A child control reported activity (button press, etc.)
    Command {
        /// Identifier the receiving container minted for the child
        child: ChildId,
    },
    /// The window's client area changed size
    Resize(Size),
}
