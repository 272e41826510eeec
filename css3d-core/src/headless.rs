/// In-memory DOM for tests and server-side hosts
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::dom::{Document, Element};
use crate::error::Result;

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    styles: BTreeMap<String, String>,
    style_writes: BTreeMap<String, usize>,
    parent: Option<Weak<RefCell<NodeData>>>,
    children: Vec<MemoryElement>,
}

/// Reference-counted element. Clones share the same node.
#[derive(Debug, Clone)]
pub struct MemoryElement(Rc<RefCell<NodeData>>);

impl MemoryElement {
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            tag: tag.to_string(),
            ..NodeData::default()
        })))
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    /// Current value of a style property, if one was written.
    pub fn style(&self, property: &str) -> Option<String> {
        self.0.borrow().styles.get(property).cloned()
    }

    /// How many times `property` has been written.
    pub fn style_writes(&self, property: &str) -> usize {
        self.0.borrow().style_writes.get(property).copied().unwrap_or(0)
    }

    /// Total style writes across all properties.
    pub fn total_style_writes(&self) -> usize {
        self.0.borrow().style_writes.values().sum()
    }

    pub fn parent(&self) -> Option<MemoryElement> {
        self.0
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(MemoryElement)
    }

    pub fn children(&self) -> Vec<MemoryElement> {
        self.0.borrow().children.clone()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Element for MemoryElement {
    fn set_style(&self, property: &str, value: &str) -> Result<()> {
        let mut data = self.0.borrow_mut();
        data.styles.insert(property.to_string(), value.to_string());
        *data.style_writes.entry(property.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    fn is_child_of(&self, parent: &Self) -> bool {
        self.parent().is_some_and(|p| p.ptr_eq(parent))
    }

    fn append_child(&self, child: &Self) -> Result<()> {
        if self.ptr_eq(child) {
            return Ok(());
        }
        child.remove_from_parent()?;
        child.0.borrow_mut().parent = Some(Rc::downgrade(&self.0));
        self.0.borrow_mut().children.push(child.clone());
        Ok(())
    }

    fn remove_from_parent(&self) -> Result<()> {
        if let Some(parent) = self.parent() {
            parent.0.borrow_mut().children.retain(|c| !c.ptr_eq(self));
        }
        self.0.borrow_mut().parent = None;
        Ok(())
    }

    fn deep_clone(&self) -> Result<Self> {
        let data = self.0.borrow();
        let copy = MemoryElement(Rc::new(RefCell::new(NodeData {
            tag: data.tag.clone(),
            styles: data.styles.clone(),
            ..NodeData::default()
        })));
        for child in &data.children {
            copy.append_child(&child.deep_clone()?)?;
        }
        Ok(copy)
    }
}

/// Document producing [`MemoryElement`]s with a fixed user agent.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    user_agent: Option<String>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(user_agent: &str) -> Self {
        Self {
            user_agent: Some(user_agent.to_string()),
        }
    }
}

impl Document for MemoryDocument {
    type Element = MemoryElement;

    fn create_element(&self, tag: &str) -> Result<MemoryElement> {
        Ok(MemoryElement::new(tag))
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }
}
