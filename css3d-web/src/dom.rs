/// Browser DOM bindings for the core renderer
use css3d_core::{Document, Element, Error, Result};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlElement, Node, Window};

fn dom_error(value: JsValue) -> Error {
    Error::Dom(format!("{:?}", value))
}

/// An `HTMLElement` handle.
#[derive(Debug, Clone)]
pub struct DomElement(HtmlElement);

impl DomElement {
    pub fn html(&self) -> &HtmlElement {
        &self.0
    }
}

impl From<HtmlElement> for DomElement {
    fn from(element: HtmlElement) -> Self {
        Self(element)
    }
}

impl Element for DomElement {
    fn set_style(&self, property: &str, value: &str) -> Result<()> {
        self.0.style().set_property(property, value).map_err(dom_error)
    }

    fn has_parent(&self) -> bool {
        self.0.parent_node().is_some()
    }

    fn is_child_of(&self, parent: &Self) -> bool {
        let parent: &Node = parent.0.as_ref();
        self.0
            .parent_node()
            .is_some_and(|node| node.is_same_node(Some(parent)))
    }

    fn append_child(&self, child: &Self) -> Result<()> {
        self.0.append_child(&child.0).map(|_| ()).map_err(dom_error)
    }

    fn remove_from_parent(&self) -> Result<()> {
        match self.0.parent_node() {
            Some(parent) => parent.remove_child(&self.0).map(|_| ()).map_err(dom_error),
            None => Ok(()),
        }
    }

    fn deep_clone(&self) -> Result<Self> {
        self.0
            .clone_node_with_deep(true)
            .map_err(dom_error)?
            .dyn_into::<HtmlElement>()
            .map(Self)
            .map_err(|node| dom_error(node.into()))
    }
}

/// The page's `window.document`.
pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
}

impl WebDocument {
    pub fn current() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| Error::Dom("no global window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| Error::Dom("window has no document".into()))?;
        Ok(Self { window, document })
    }
}

impl Document for WebDocument {
    type Element = DomElement;

    fn create_element(&self, tag: &str) -> Result<DomElement> {
        self.document
            .create_element(tag)
            .map_err(dom_error)?
            .dyn_into::<HtmlElement>()
            .map(DomElement)
            .map_err(|element| dom_error(element.into()))
    }

    fn user_agent(&self) -> Option<String> {
        self.window.navigator().user_agent().ok()
    }
}
