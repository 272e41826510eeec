/// Frame renderer: writes camera and object transforms as CSS
use log::{debug, info, trace};

use crate::billboard::BillboardBlend;
use crate::cache::RenderCache;
use crate::config::{Compositing, RendererOptions};
use crate::css::{self, ObjectFrame};
use crate::depth;
use crate::dom::{Document, Element};
use crate::error::Result;
use crate::projection::Camera;
use crate::scene::{Node, NodeId, Renderable, Scene};
use crate::transform::Transform;

/// Viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Renders a [`Scene`] by positioning DOM elements with CSS 3D transforms.
///
/// `dom_element` is the viewport the host inserts into the page. It holds a
/// single camera frame element which all renderable elements are moved into.
pub struct Css3dRenderer<E> {
    dom_element: E,
    camera_element: E,
    size: Size,
    width_half: f64,
    height_half: f64,
    compositing: Compositing,
    cache: RenderCache,
    billboard: BillboardBlend,
}

impl<E: Element> Css3dRenderer<E> {
    /// Create a renderer, detecting the compositing mode from the user agent.
    pub fn new<D: Document<Element = E>>(document: &D) -> Result<Self> {
        Self::with_options(document, &RendererOptions::default())
    }

    pub fn with_options<D: Document<Element = E>>(
        document: &D,
        options: &RendererOptions,
    ) -> Result<Self> {
        let dom_element = document.create_element("div")?;
        dom_element.set_style("overflow", "hidden")?;

        let camera_element = document.create_element("div")?;
        camera_element.set_style("transform-style", "preserve-3d")?;
        dom_element.append_child(&camera_element)?;

        let compositing = options.resolve(document.user_agent().as_deref());
        info!("CSS3D renderer created with {:?} compositing", compositing);

        Ok(Self {
            dom_element,
            camera_element,
            size: Size::default(),
            width_half: 0.0,
            height_half: 0.0,
            compositing,
            cache: RenderCache::new(),
            billboard: BillboardBlend::new(),
        })
    }

    pub fn dom_element(&self) -> &E {
        &self.dom_element
    }

    pub fn camera_element(&self) -> &E {
        &self.camera_element
    }

    pub fn compositing(&self) -> Compositing {
        self.compositing
    }

    /// Kept for interface parity with GPU renderers. Does nothing.
    pub fn set_clear_color(&mut self, _color: u32, _alpha: f64) {}

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, width: f64, height: f64) -> Result<()> {
        self.size = Size { width, height };
        self.width_half = width / 2.0;
        self.height_half = height / 2.0;

        let width_px = format!("{}px", css::number(width));
        let height_px = format!("{}px", css::number(height));
        self.dom_element.set_style("width", &width_px)?;
        self.dom_element.set_style("height", &height_px)?;
        self.camera_element.set_style("width", &width_px)?;
        self.camera_element.set_style("height", &height_px)?;

        debug!("CSS3D renderer resized to {}x{}", width, height);
        Ok(())
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &mut Scene<E>, camera: &mut Camera) -> Result<()> {
        let fov = camera.projection_matrix()[5] * self.height_half;

        if self.cache.camera.fov != Some(fov) {
            self.dom_element
                .set_style("perspective", &format!("{}px", css::number(fov)))?;
            self.cache.camera.fov = Some(fov);
            debug!("perspective set to {}px", fov);
        }

        if scene.auto_update {
            scene.update_matrix_world();
        }
        match camera.parent.and_then(|parent| scene.world_matrix(parent)) {
            // attached cameras follow their parent's update
            Some(parent_world) if scene.auto_update => {
                camera.update_matrix_world(Some(parent_world))
            }
            Some(_) => {}
            None => camera.update_matrix_world(None),
        }

        let camera_css = css::camera_css_matrix(camera.matrix_world_inverse(), camera, fov);

        if !self.compositing.is_legacy() {
            let style = css::camera_frame_style(&camera_css, self.width_half, self.height_half);
            if self.cache.camera.style.as_deref() != Some(style.as_str()) {
                self.camera_element.set_style("transform", &style)?;
                self.cache.camera.style = Some(style);
            }
        }

        self.cache.prune(|id| scene.contains(id));
        let root = scene.root();
        self.render_node(scene, root, camera, &camera_css)?;

        if self.compositing.is_legacy() {
            // no preserve-3d: approximate depth with z-index
            self.z_order(scene)?;
        }
        Ok(())
    }

    fn object_frame<'a>(&self, camera_css: &'a str) -> ObjectFrame<'a> {
        match self.compositing {
            Compositing::Native => ObjectFrame::Native,
            Compositing::Legacy => ObjectFrame::Legacy {
                camera_css,
                width_half: self.width_half,
                height_half: self.height_half,
            },
        }
    }

    fn object_style(&mut self, node: &mut Node<E>, camera: &Camera, camera_css: &str) -> String {
        let frame = self.object_frame(camera_css);
        let world = *node.matrix_world();
        let scale = node.scale;

        match node.renderable_mut().and_then(Renderable::billboard_mut) {
            Some(billboard) => {
                let matrix = self.billboard.compute(
                    camera.matrix_world_inverse(),
                    &world,
                    &scale,
                    billboard.ratio(),
                );
                // depth sorting must see the matrix the DOM reflects
                billboard.set_matrix_world(matrix);
                css::object_css_matrix(matrix, frame)
            }
            None => css::object_css_matrix(&world, frame),
        }
    }

    fn render_node(
        &mut self,
        scene: &mut Scene<E>,
        id: NodeId,
        camera: &Camera,
        camera_css: &str,
    ) -> Result<()> {
        let Some(node) = scene.node_mut(id) else {
            return Ok(());
        };

        if node.renderable().is_some() {
            node.run_before_render(camera);
            let style = self.object_style(node, camera, camera_css);

            if let Some(element) = node.element() {
                if self.cache.is_stale(id, &style) {
                    trace!("{:?} transform {}", id, style);
                    element.set_style("transform", &style)?;
                    self.cache.store_style(id, style);
                }

                if self.compositing.is_legacy() {
                    let distance = (camera.world_position()
                        - Transform::position(node.matrix_world()))
                    .norm_squared();
                    if let Some(entry) = self.cache.objects.get_mut(id) {
                        entry.distance_to_camera_squared = Some(distance);
                    }
                }

                element.set_style("display", if node.visible { "" } else { "none" })?;

                if !element.is_child_of(&self.camera_element) {
                    self.camera_element.append_child(element)?;
                }
            }

            node.run_after_render(camera);
        }

        let count = node.children().len();
        for index in 0..count {
            let Some(child) = scene.node(id).and_then(|n| n.children().get(index).copied()) else {
                break;
            };
            self.render_node(scene, child, camera, camera_css)?;
        }
        Ok(())
    }

    fn z_order(&mut self, scene: &Scene<E>) -> Result<()> {
        let items: Vec<(NodeId, f64)> = scene
            .traverse(scene.root())
            .into_iter()
            .filter_map(|id| {
                let distance = self.cache.objects.get(id)?.distance_to_camera_squared?;
                Some((id, distance))
            })
            .collect();

        for (id, z_index) in depth::stacking_order(items) {
            let Some(entry) = self.cache.objects.get_mut(id) else {
                continue;
            };
            if entry.z_index == Some(z_index) {
                continue;
            }
            if let Some(element) = scene.node(id).and_then(Node::element) {
                element.set_style("z-index", &z_index.to_string())?;
                entry.z_index = Some(z_index);
            }
        }
        Ok(())
    }
}
