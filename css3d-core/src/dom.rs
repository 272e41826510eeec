/// DOM abstraction the renderer writes through
use crate::error::Result;

/// A handle to a DOM element.
///
/// Handles are cheap to clone and clones refer to the same element, like JS
/// object references. Style properties use their hyphenated CSS names.
pub trait Element: Clone {
    fn set_style(&self, property: &str, value: &str) -> Result<()>;

    /// Whether the element is currently attached to any parent node.
    fn has_parent(&self) -> bool;

    /// Whether `parent` is this element's direct parent.
    fn is_child_of(&self, parent: &Self) -> bool;

    /// Append `child`, moving it out of its current parent if it has one.
    fn append_child(&self, child: &Self) -> Result<()>;

    /// Unlink the element from its parent. No-op when detached.
    fn remove_from_parent(&self) -> Result<()>;

    /// An independent copy of the element and its subtree.
    fn deep_clone(&self) -> Result<Self>;
}

/// Element factory and environment probe.
pub trait Document {
    type Element: Element;

    fn create_element(&self, tag: &str) -> Result<Self::Element>;

    fn user_agent(&self) -> Option<String>;
}
