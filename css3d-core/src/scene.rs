/// Scene graph: nodes, renderable DOM wrappers and billboards
use log::{trace, warn};
use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use slotmap::SlotMap;

use crate::dom::{Document, Element};
use crate::error::{Error, Result};
use crate::projection::Camera;
use crate::transform::Transform;

slotmap::new_key_type! {
    /// Handle to a node in a [`Scene`]
    pub struct NodeId;
}

/// Callback run around a renderable's per-frame update.
pub type RenderHook<E> = Box<dyn FnMut(&mut Node<E>, &Camera)>;

/// Camera-facing state of a billboard renderable
#[derive(Debug, Clone, PartialEq)]
pub struct Billboard {
    ratio: f64,
    matrix_world: Matrix4<f64>,
}

impl Billboard {
    /// Always face the camera.
    pub const FULL: f64 = 1.0;

    pub fn new(ratio: f64) -> Self {
        Self {
            ratio: ratio.clamp(0.0, 1.0),
            matrix_world: Matrix4::identity(),
        }
    }

    /// 0 keeps the node's own orientation, 1 faces the camera.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = ratio.clamp(0.0, 1.0);
    }

    /// The blended world matrix the element was last rendered with.
    pub fn matrix_world(&self) -> &Matrix4<f64> {
        &self.matrix_world
    }

    pub(crate) fn set_matrix_world(&mut self, matrix: &Matrix4<f64>) {
        self.matrix_world.copy_from(matrix);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Plain,
    Billboard(Billboard),
}

/// A DOM element mirrored by a scene node
#[derive(Debug, Clone)]
pub struct Renderable<E> {
    element: E,
    pub variant: Variant,
}

impl<E: Element> Renderable<E> {
    pub fn new(element: E, variant: Variant) -> Result<Self> {
        element.set_style("position", "absolute")?;
        element.set_style("pointer-events", "auto")?;
        Ok(Self { element, variant })
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn billboard(&self) -> Option<&Billboard> {
        match &self.variant {
            Variant::Billboard(billboard) => Some(billboard),
            Variant::Plain => None,
        }
    }

    pub fn billboard_mut(&mut self) -> Option<&mut Billboard> {
        match &mut self.variant {
            Variant::Billboard(billboard) => Some(billboard),
            Variant::Plain => None,
        }
    }

    /// Same variant around an independent deep clone of the element.
    fn duplicate(&self) -> Result<Self> {
        Ok(Self {
            element: self.element.deep_clone()?,
            variant: self.variant.clone(),
        })
    }

    fn detach(&self) -> Result<()> {
        if self.element.has_parent() {
            self.element.remove_from_parent()?;
        }
        Ok(())
    }
}

pub enum NodeKind<E> {
    Group,
    Object(Renderable<E>),
}

/// A node in the scene graph
pub struct Node<E> {
    pub name: String,
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub scale: Vector3<f64>,
    pub visible: bool,
    pub on_before_render: Option<RenderHook<E>>,
    pub on_after_render: Option<RenderHook<E>>,
    kind: NodeKind<E>,
    matrix_world: Matrix4<f64>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl<E: Element> Node<E> {
    fn with_kind(kind: NodeKind<E>) -> Self {
        Self {
            name: String::new(),
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            visible: true,
            on_before_render: None,
            on_after_render: None,
            kind,
            matrix_world: Matrix4::identity(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// A transparent container.
    pub fn group() -> Self {
        Self::with_kind(NodeKind::Group)
    }

    pub fn object(element: E) -> Result<Self> {
        Ok(Self::with_kind(NodeKind::Object(Renderable::new(
            element,
            Variant::Plain,
        )?)))
    }

    /// An object wrapping a fresh `div`.
    pub fn object_in<D: Document<Element = E>>(document: &D) -> Result<Self> {
        Self::object(document.create_element("div")?)
    }

    /// A billboard that always faces the camera.
    pub fn sprite(element: E) -> Result<Self> {
        Self::sprite_with_ratio(element, Billboard::FULL)
    }

    pub fn sprite_with_ratio(element: E, ratio: f64) -> Result<Self> {
        Ok(Self::with_kind(NodeKind::Object(Renderable::new(
            element,
            Variant::Billboard(Billboard::new(ratio)),
        )?)))
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn kind(&self) -> &NodeKind<E> {
        &self.kind
    }

    pub fn renderable(&self) -> Option<&Renderable<E>> {
        match &self.kind {
            NodeKind::Object(renderable) => Some(renderable),
            NodeKind::Group => None,
        }
    }

    pub fn renderable_mut(&mut self) -> Option<&mut Renderable<E>> {
        match &mut self.kind {
            NodeKind::Object(renderable) => Some(renderable),
            NodeKind::Group => None,
        }
    }

    pub fn element(&self) -> Option<&E> {
        self.renderable().map(Renderable::element)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local_matrix(&self) -> Matrix4<f64> {
        Transform::compose(&self.position, &self.rotation, &self.scale)
    }

    pub fn matrix_world(&self) -> &Matrix4<f64> {
        &self.matrix_world
    }

    pub(crate) fn run_before_render(&mut self, camera: &Camera) {
        if let Some(mut hook) = self.on_before_render.take() {
            hook(self, camera);
            // keep a replacement installed by the hook itself
            if self.on_before_render.is_none() {
                self.on_before_render = Some(hook);
            }
        }
    }

    pub(crate) fn run_after_render(&mut self, camera: &Camera) {
        if let Some(mut hook) = self.on_after_render.take() {
            hook(self, camera);
            if self.on_after_render.is_none() {
                self.on_after_render = Some(hook);
            }
        }
    }
}

/// Arena-backed scene graph with a single root
pub struct Scene<E> {
    nodes: SlotMap<NodeId, Node<E>>,
    root: NodeId,
    /// Refresh world matrices at the start of every render
    pub auto_update: bool,
}

impl<E: Element> Scene<E> {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::group().with_name("scene"));
        Self {
            nodes,
            root,
            auto_update: true,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<E>> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<E>> {
        self.nodes.get_mut(id)
    }

    fn get(&self, id: NodeId) -> Result<&Node<E>> {
        self.nodes.get(id).ok_or(Error::UnknownNode(id))
    }

    pub fn world_matrix(&self, id: NodeId) -> Option<&Matrix4<f64>> {
        self.nodes.get(id).map(|node| &node.matrix_world)
    }

    /// Insert a node without attaching it.
    pub fn spawn(&mut self, node: Node<E>) -> NodeId {
        self.nodes.insert(node)
    }

    /// Insert a node as the last child of `parent`.
    pub fn spawn_child(&mut self, parent: NodeId, node: Node<E>) -> Result<NodeId> {
        self.get(parent)?;
        let id = self.nodes.insert(node);
        self.link(parent, id);
        Ok(id)
    }

    /// Attach `child` under `parent`, removing it from its previous parent first.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        self.get(child)?;
        if child == self.root {
            warn!("the scene root can't be added under another node");
            return Ok(());
        }
        if self.is_ancestor_or_self(child, parent) {
            warn!("{:?} can't be added under its own subtree", child);
            return Ok(());
        }
        if self.nodes[child].parent.is_some() {
            self.remove(child)?;
        }
        self.link(parent, child);
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.nodes.get(node).and_then(|n| n.parent);
        }
        false
    }

    /// Detach `child` from its parent and unlink the DOM elements of every
    /// renderable in its subtree. No-op when `child` has no parent.
    pub fn remove(&mut self, child: NodeId) -> Result<()> {
        let Some(parent) = self.get(child)?.parent else {
            return Ok(());
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|&id| id != child);
        }
        self.nodes[child].parent = None;

        for id in self.traverse(child) {
            if let Some(renderable) = self.nodes[id].renderable() {
                renderable.detach()?;
            }
        }
        trace!("removed {:?}", child);
        Ok(())
    }

    /// Remove `id` and free it and its descendants from the arena.
    pub fn despawn(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            warn!("the scene root can't be despawned");
            return Ok(());
        }
        self.remove(id)?;
        for node in self.traverse(id) {
            self.nodes.remove(node);
        }
        Ok(())
    }

    /// Copy a node: own transform fields, visibility, name, and a deep clone of
    /// its element. Children are copied too when `recursive`. The copy is
    /// unattached and carries no render hooks.
    pub fn clone_node(&mut self, id: NodeId, recursive: bool) -> Result<NodeId> {
        let source = self.get(id)?;
        let kind = match &source.kind {
            NodeKind::Group => NodeKind::Group,
            NodeKind::Object(renderable) => NodeKind::Object(renderable.duplicate()?),
        };
        let mut copy = Node::with_kind(kind);
        copy.name = source.name.clone();
        copy.position = source.position;
        copy.rotation = source.rotation;
        copy.scale = source.scale;
        copy.visible = source.visible;
        copy.matrix_world = source.matrix_world;
        let children = if recursive {
            source.children.clone()
        } else {
            Vec::new()
        };

        let copy_id = self.nodes.insert(copy);
        for child in children {
            let child_copy = self.clone_node(child, true)?;
            self.link(copy_id, child_copy);
        }
        Ok(copy_id)
    }

    /// Depth-first pre-order ids of `id` and its descendants.
    pub fn traverse(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            order.push(current);
            stack.extend(node.children.iter().rev());
        }
        order
    }

    /// Recompute world matrices for the whole tree under the root.
    pub fn update_matrix_world(&mut self) {
        self.update_world_from(self.root, Matrix4::identity());
    }

    fn update_world_from(&mut self, id: NodeId, parent_world: Matrix4<f64>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.matrix_world = parent_world * node.local_matrix();
        let world = node.matrix_world;
        let count = node.children.len();
        for index in 0..count {
            let child = self.nodes[id].children[index];
            self.update_world_from(child, world);
        }
    }
}

impl<E: Element> Default for Scene<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{MemoryDocument, MemoryElement};
    use approx::assert_relative_eq;

    fn object(scene: &mut Scene<MemoryElement>, parent: NodeId) -> (NodeId, MemoryElement) {
        let element = MemoryElement::new("div");
        let id = scene
            .spawn_child(parent, Node::object(element.clone()).unwrap())
            .unwrap();
        (id, element)
    }

    #[test]
    fn test_renderable_styles() {
        let node = Node::object_in(&MemoryDocument::new()).unwrap();
        let element = node.element().unwrap();
        assert_eq!(element.tag(), "div");
        assert_eq!(element.style("position").as_deref(), Some("absolute"));
        assert_eq!(element.style("pointer-events").as_deref(), Some("auto"));
    }

    #[test]
    fn test_sprite_defaults() {
        let node = Node::sprite(MemoryElement::new("div")).unwrap();
        let billboard = node.renderable().unwrap().billboard().unwrap();
        assert_eq!(billboard.ratio(), 1.0);
        assert_eq!(*billboard.matrix_world(), Matrix4::identity());

        let node = Node::sprite_with_ratio(MemoryElement::new("div"), 3.0).unwrap();
        assert_eq!(node.renderable().unwrap().billboard().unwrap().ratio(), 1.0);
    }

    #[test]
    fn test_remove_detaches_subtree_elements() {
        let mut scene = Scene::new();
        let container = MemoryElement::new("div");
        let root = scene.root();
        let group = scene.spawn_child(root, Node::group()).unwrap();
        let (a, element_a) = object(&mut scene, group);
        let (_b, element_b) = object(&mut scene, a);
        let (_c, element_c) = object(&mut scene, root);
        for element in [&element_a, &element_b, &element_c] {
            container.append_child(element).unwrap();
        }

        scene.remove(group).unwrap();
        assert!(!element_a.has_parent());
        assert!(!element_b.has_parent());
        assert!(element_c.is_child_of(&container));
        assert!(scene.node(group).unwrap().parent().is_none());
        assert_eq!(scene.node(root).unwrap().children().len(), 1);
        // the subtree itself stays linked
        assert_eq!(scene.node(a).unwrap().children().len(), 1);
    }

    #[test]
    fn test_remove_without_parent_is_noop() {
        let mut scene = Scene::new();
        let root = scene.root();
        let (id, element) = object(&mut scene, root);
        scene.remove(id).unwrap();
        assert!(!element.has_parent());

        scene.remove(id).unwrap();
        let loose = scene.spawn(Node::group());
        scene.remove(loose).unwrap();
    }

    #[test]
    fn test_reparent_detaches_element() {
        let mut scene = Scene::new();
        let container = MemoryElement::new("div");
        let root = scene.root();
        let group = scene.spawn_child(root, Node::group()).unwrap();
        let (id, element) = object(&mut scene, root);
        container.append_child(&element).unwrap();

        scene.add(group, id).unwrap();
        assert!(!element.has_parent());
        assert_eq!(scene.node(id).unwrap().parent(), Some(group));
        assert_eq!(scene.node(root).unwrap().children(), &[group]);
    }

    #[test]
    fn test_add_rejects_cycles() {
        let mut scene: Scene<MemoryElement> = Scene::new();
        let root = scene.root();
        let group = scene.spawn_child(root, Node::group()).unwrap();
        let inner = scene.spawn_child(group, Node::group()).unwrap();

        scene.add(inner, group).unwrap();
        assert_eq!(scene.node(group).unwrap().parent(), Some(root));
        scene.add(group, group).unwrap();
        assert_eq!(scene.node(group).unwrap().parent(), Some(root));

        let loose = scene.spawn(Node::group());
        scene.add(loose, root).unwrap();
        assert!(scene.node(root).unwrap().parent().is_none());
        assert!(scene.node(loose).unwrap().children().is_empty());
    }

    #[test]
    fn test_clone_node() {
        let mut scene = Scene::new();
        let root = scene.root();
        let (id, element) = object(&mut scene, root);
        let (_child, _) = object(&mut scene, id);
        {
            let node = scene.node_mut(id).unwrap();
            node.position = Vector3::new(1.0, 2.0, 3.0);
            node.visible = false;
        }

        let shallow = scene.clone_node(id, false).unwrap();
        let copy = scene.node(shallow).unwrap();
        assert_eq!(copy.position, Vector3::new(1.0, 2.0, 3.0));
        assert!(!copy.visible);
        assert!(copy.parent().is_none());
        assert!(copy.children().is_empty());
        assert!(!copy.element().unwrap().ptr_eq(&element));

        let deep = scene.clone_node(id, true).unwrap();
        assert_eq!(scene.node(deep).unwrap().children().len(), 1);
        assert_eq!(scene.traverse(deep).len(), 2);
    }

    #[test]
    fn test_despawn_frees_subtree() {
        let mut scene = Scene::new();
        let root = scene.root();
        let (id, _) = object(&mut scene, root);
        let (child, _) = object(&mut scene, id);

        scene.despawn(id).unwrap();
        assert!(!scene.contains(id));
        assert!(!scene.contains(child));
        assert_eq!(scene.len(), 1);

        scene.despawn(root).unwrap();
        assert!(scene.contains(root));
        assert!(matches!(scene.remove(id), Err(Error::UnknownNode(_))));
    }

    #[test]
    fn test_update_matrix_world() {
        let mut scene: Scene<MemoryElement> = Scene::new();
        let root = scene.root();
        let group = scene.spawn_child(root, Node::group()).unwrap();
        let inner = scene.spawn_child(group, Node::group()).unwrap();
        scene.node_mut(group).unwrap().position = Vector3::new(10.0, 0.0, 0.0);
        scene.node_mut(group).unwrap().scale = Vector3::new(2.0, 2.0, 2.0);
        scene.node_mut(inner).unwrap().position = Vector3::new(1.0, 1.0, 0.0);

        scene.update_matrix_world();
        let world = scene.world_matrix(inner).unwrap();
        assert_relative_eq!(
            Transform::position(world),
            Vector3::new(12.0, 2.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_traverse_order() {
        let mut scene: Scene<MemoryElement> = Scene::new();
        let root = scene.root();
        let a = scene.spawn_child(root, Node::group()).unwrap();
        let a1 = scene.spawn_child(a, Node::group()).unwrap();
        let b = scene.spawn_child(root, Node::group()).unwrap();
        assert_eq!(scene.traverse(root), vec![root, a, a1, b]);
    }
}
