/// CSS3D Web - WASM bindings placing HTML elements in a 3D scene
///
/// Wraps the core renderer around real DOM elements. From JavaScript:
/// create a `Css3dRenderer`, insert its `domElement` into the page, build a
/// `Css3dScene`, and call `render(scene, camera)` once per animation frame.

pub mod dom;
pub mod scene;

use css3d_core::renderer::Css3dRenderer as CoreRenderer;
use css3d_core::RendererOptions;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

pub use dom::{DomElement, WebDocument};
pub use scene::{Css3dCamera, Css3dScene};

pub(crate) fn to_js(error: css3d_core::Error) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Viewport size in CSS pixels
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[wasm_bindgen]
pub struct Css3dRenderer {
    inner: CoreRenderer<DomElement>,
}

#[wasm_bindgen]
impl Css3dRenderer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Css3dRenderer, JsValue> {
        let document = WebDocument::current().map_err(to_js)?;
        let inner = CoreRenderer::new(&document).map_err(to_js)?;
        Ok(Css3dRenderer { inner })
    }

    /// Construct from a JSON options object, e.g. `{"compositing":"legacy"}`.
    #[wasm_bindgen(js_name = withOptions)]
    pub fn with_options(options: &str) -> Result<Css3dRenderer, JsValue> {
        let options = RendererOptions::from_json(options).map_err(to_js)?;
        let document = WebDocument::current().map_err(to_js)?;
        let inner = CoreRenderer::with_options(&document, &options).map_err(to_js)?;
        Ok(Css3dRenderer { inner })
    }

    /// The viewport element to insert into the page.
    #[wasm_bindgen(getter, js_name = domElement)]
    pub fn dom_element(&self) -> HtmlElement {
        self.inner.dom_element().html().clone()
    }

    #[wasm_bindgen(getter, js_name = cameraElement)]
    pub fn camera_element(&self) -> HtmlElement {
        self.inner.camera_element().html().clone()
    }

    #[wasm_bindgen(js_name = setSize)]
    pub fn set_size(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        self.inner.set_size(width, height).map_err(to_js)
    }

    #[wasm_bindgen(js_name = getSize)]
    pub fn get_size(&self) -> Size {
        let size = self.inner.size();
        Size {
            width: size.width,
            height: size.height,
        }
    }

    /// No-op, present so hosts can swap this renderer for a GPU one.
    #[wasm_bindgen(js_name = setClearColor)]
    pub fn set_clear_color(&mut self, color: u32, alpha: f64) {
        self.inner.set_clear_color(color, alpha);
    }

    /// Render a frame
    pub fn render(&mut self, scene: &mut Css3dScene, camera: &mut Css3dCamera) -> Result<(), JsValue> {
        self.inner
            .render(&mut scene.inner, &mut camera.inner)
            .map_err(to_js)
    }
}

// Export the default instance
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("logger already installed");
    }
    log::info!("CSS3D web renderer loaded");
    Ok(())
}
