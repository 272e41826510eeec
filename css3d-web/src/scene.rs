/// Scene and camera handles exported to JavaScript
use css3d_core::{Camera, EulerAngles, Node, NodeId, Scene};
use nalgebra::{Point3, Vector3};
use slotmap::{Key, KeyData};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::dom::{DomElement, WebDocument};
use crate::to_js;

pub(crate) fn to_handle(id: NodeId) -> u64 {
    id.data().as_ffi()
}

pub(crate) fn from_handle(handle: u64) -> NodeId {
    KeyData::from_ffi(handle).into()
}

/// A scene graph whose renderable nodes wrap HTML elements.
///
/// Nodes are addressed by opaque `u64` handles.
#[wasm_bindgen]
pub struct Css3dScene {
    pub(crate) inner: Scene<DomElement>,
}

#[wasm_bindgen]
impl Css3dScene {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Css3dScene {
        Css3dScene {
            inner: Scene::new(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn root(&self) -> u64 {
        to_handle(self.inner.root())
    }

    #[wasm_bindgen(getter, js_name = autoUpdate)]
    pub fn auto_update(&self) -> bool {
        self.inner.auto_update
    }

    #[wasm_bindgen(setter, js_name = autoUpdate)]
    pub fn set_auto_update(&mut self, value: bool) {
        self.inner.auto_update = value;
    }

    #[wasm_bindgen(js_name = addGroup)]
    pub fn add_group(&mut self, parent: u64) -> Result<u64, JsValue> {
        self.spawn(parent, Node::group())
    }

    /// Wrap `element`, or a new `div` when omitted.
    #[wasm_bindgen(js_name = addObject)]
    pub fn add_object(&mut self, parent: u64, element: Option<HtmlElement>) -> Result<u64, JsValue> {
        let node = match element {
            Some(element) => Node::object(DomElement::from(element)),
            None => Node::object_in(&WebDocument::current().map_err(to_js)?),
        }
        .map_err(to_js)?;
        self.spawn(parent, node)
    }

    /// A billboard. `ratio` defaults to 1 (always face the camera).
    #[wasm_bindgen(js_name = addSprite)]
    pub fn add_sprite(
        &mut self,
        parent: u64,
        element: HtmlElement,
        ratio: Option<f64>,
    ) -> Result<u64, JsValue> {
        let node = match ratio {
            Some(ratio) => Node::sprite_with_ratio(DomElement::from(element), ratio),
            None => Node::sprite(DomElement::from(element)),
        }
        .map_err(to_js)?;
        self.spawn(parent, node)
    }

    pub fn add(&mut self, parent: u64, child: u64) -> Result<(), JsValue> {
        self.inner
            .add(from_handle(parent), from_handle(child))
            .map_err(to_js)
    }

    pub fn remove(&mut self, id: u64) -> Result<(), JsValue> {
        self.inner.remove(from_handle(id)).map_err(to_js)
    }

    pub fn despawn(&mut self, id: u64) -> Result<(), JsValue> {
        self.inner.despawn(from_handle(id)).map_err(to_js)
    }

    #[wasm_bindgen(js_name = cloneNode)]
    pub fn clone_node(&mut self, id: u64, recursive: bool) -> Result<u64, JsValue> {
        self.inner
            .clone_node(from_handle(id), recursive)
            .map(to_handle)
            .map_err(to_js)
    }

    pub fn element(&self, id: u64) -> Option<HtmlElement> {
        self.inner
            .node(from_handle(id))
            .and_then(Node::element)
            .map(|element| element.html().clone())
    }

    #[wasm_bindgen(js_name = setPosition)]
    pub fn set_position(&mut self, id: u64, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.node_mut(id)?.position = Vector3::new(x, y, z);
        Ok(())
    }

    /// Euler angles in radians, XYZ order.
    #[wasm_bindgen(js_name = setRotation)]
    pub fn set_rotation(&mut self, id: u64, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.node_mut(id)?.rotation = EulerAngles::new(x, y, z).to_quaternion();
        Ok(())
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&mut self, id: u64, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.node_mut(id)?.scale = Vector3::new(x, y, z);
        Ok(())
    }

    #[wasm_bindgen(js_name = setVisible)]
    pub fn set_visible(&mut self, id: u64, visible: bool) -> Result<(), JsValue> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    #[wasm_bindgen(js_name = setSpriteRatio)]
    pub fn set_sprite_ratio(&mut self, id: u64, ratio: f64) -> Result<(), JsValue> {
        let billboard = self
            .node_mut(id)?
            .renderable_mut()
            .and_then(|renderable| renderable.billboard_mut())
            .ok_or_else(|| JsValue::from_str("node is not a sprite"))?;
        billboard.set_ratio(ratio);
        Ok(())
    }
}

impl Css3dScene {
    fn spawn(&mut self, parent: u64, node: Node<DomElement>) -> Result<u64, JsValue> {
        self.inner
            .spawn_child(from_handle(parent), node)
            .map(to_handle)
            .map_err(to_js)
    }

    fn node_mut(&mut self, id: u64) -> Result<&mut Node<DomElement>, JsValue> {
        let id = from_handle(id);
        self.inner
            .node_mut(id)
            .ok_or_else(|| to_js(css3d_core::Error::UnknownNode(id)))
    }
}

impl Default for Css3dScene {
    fn default() -> Self {
        Self::new()
    }
}

/// Perspective or orthographic camera.
#[wasm_bindgen]
pub struct Css3dCamera {
    pub(crate) inner: Camera,
}

#[wasm_bindgen]
impl Css3dCamera {
    /// Perspective camera; `fov` is the vertical field of view in degrees.
    #[wasm_bindgen(constructor)]
    pub fn new(fov: f64, aspect: f64, near: f64, far: f64) -> Css3dCamera {
        Css3dCamera {
            inner: Camera::perspective(fov.to_radians(), aspect, near, far),
        }
    }

    pub fn orthographic(
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
        near: f64,
        far: f64,
    ) -> Css3dCamera {
        Css3dCamera {
            inner: Camera::orthographic(left, right, top, bottom, near, far),
        }
    }

    #[wasm_bindgen(getter, js_name = isOrthographic)]
    pub fn is_orthographic(&self) -> bool {
        self.inner.is_orthographic()
    }

    #[wasm_bindgen(js_name = setPosition)]
    pub fn set_position(&mut self, x: f64, y: f64, z: f64) {
        self.inner.position = Point3::new(x, y, z);
    }

    #[wasm_bindgen(js_name = lookAt)]
    pub fn look_at(&mut self, x: f64, y: f64, z: f64) {
        self.inner.look_at(&Point3::new(x, y, z), &Vector3::y());
    }

    #[wasm_bindgen(js_name = setAspect)]
    pub fn set_aspect(&mut self, aspect: f64) {
        self.inner.set_aspect(aspect);
    }

    /// Follow a scene node, or detach with `undefined`.
    #[wasm_bindgen(js_name = attachTo)]
    pub fn attach_to(&mut self, parent: Option<u64>) {
        self.inner.parent = parent.map(from_handle);
    }
}
