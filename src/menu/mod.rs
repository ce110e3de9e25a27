use std::sync::Arc;
use uuid::Uuid;

mod navigator;
pub mod tree;
pub use navigator::MenuNavigator;

/// A node in the static IVR menu tree.
///
/// The tree is built once at startup and never mutated; sibling groups are
/// snapshotted onto the navigator's history stacks as `Arc` clones, so nodes
/// must stay immutable for the lifetime of the session.
#[derive(Debug)]
pub struct MenuNode {
    /// Stable identity for list rendering, never used for routing.
    pub id: Uuid,
    /// The prompt text spoken by the remote IVR at this step.
    pub title: String,
    /// DTMF digits transmitted verbatim when this option is selected.
    /// Empty means the option is informational and sends nothing.
    pub digit: String,
    /// Child options in display/selection order. Empty means a leaf:
    /// the digit is sent but no further menu appears.
    pub children: Vec<Arc<MenuNode>>,
}

/// One sibling group, displayed together as the current menu options.
pub type MenuGroup = Vec<Arc<MenuNode>>;

impl MenuNode {
    pub fn new(
        title: impl Into<String>,
        digit: impl Into<String>,
        children: MenuGroup,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            title: title.into(),
            digit: digit.into(),
            children,
        })
    }

    /// A terminal option with no submenu.
    pub fn leaf(title: impl Into<String>, digit: impl Into<String>) -> Arc<Self> {
        Self::new(title, digit, Vec::new())
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
