use css3d_core::headless::{MemoryDocument, MemoryElement};
use css3d_core::{Camera, Compositing, Css3dRenderer, Element, Node, Scene, Transform};
use nalgebra::{Point3, Vector3};

const IE11: &str = "Mozilla/5.0 (Windows NT 6.3; Trident/7.0; rv:11.0) like Gecko";

fn setup(document: &MemoryDocument) -> (Css3dRenderer<MemoryElement>, Scene<MemoryElement>, Camera) {
    let mut renderer = Css3dRenderer::new(document).unwrap();
    renderer.set_size(1024.0, 768.0).unwrap();
    let mut camera = Camera::perspective(60f64.to_radians(), 1024.0 / 768.0, 1.0, 5000.0);
    camera.position = Point3::new(0.0, 200.0, 800.0);
    camera.look_at(&Point3::origin(), &Vector3::y());
    (renderer, Scene::new(), camera)
}

#[test]
fn test_native_frame_lifecycle() {
    let document = MemoryDocument::new();
    let (mut renderer, mut scene, mut camera) = setup(&document);
    assert_eq!(renderer.compositing(), Compositing::Native);

    let root = scene.root();
    let panel = scene
        .spawn_child(root, Node::object_in(&document).unwrap().with_name("panel"))
        .unwrap();
    let label_element = document.create_label();
    let label = scene
        .spawn_child(panel, Node::sprite(label_element.clone()).unwrap())
        .unwrap();
    scene.node_mut(label).unwrap().position = Vector3::new(0.0, 50.0, 0.0);

    renderer.render(&mut scene, &mut camera).unwrap();

    let panel_element = scene.node(panel).unwrap().element().unwrap().clone();
    let frame = renderer.camera_element().clone();
    assert_eq!(frame.children().len(), 2);
    assert!(panel_element.is_child_of(&frame));
    assert!(label_element.is_child_of(&frame));
    for element in [&panel_element, &label_element] {
        let transform = element.style("transform").unwrap();
        assert!(transform.starts_with("translate(-50%,-50%)matrix3d("));
        assert!(!transform.contains("e-"));
        assert!(!transform.contains("-0,"));
    }

    // the billboard matrix faces the camera and sits at the node's position
    let billboard = scene.node(label).unwrap().renderable().unwrap().billboard().unwrap();
    let effective = *billboard.matrix_world();
    assert!(Transform::rotation(&effective).angle_to(&camera.rotation) < 1e-9);
    assert!((Transform::position(&effective) - Vector3::new(0.0, 50.0, 0.0)).norm() < 1e-9);

    // moving the camera rewrites the camera frame, not the static panel
    let frame_writes = frame.style_writes("transform");
    let panel_writes = panel_element.style_writes("transform");
    camera.position = Point3::new(300.0, 200.0, 800.0);
    camera.look_at(&Point3::origin(), &Vector3::y());
    renderer.render(&mut scene, &mut camera).unwrap();
    assert_eq!(frame.style_writes("transform"), frame_writes + 1);
    assert_eq!(panel_element.style_writes("transform"), panel_writes);
    // the sprite turned to follow the camera
    assert_eq!(label_element.style_writes("transform"), 2);

    // removing the panel takes the label's element out with it
    scene.remove(panel).unwrap();
    assert!(!panel_element.has_parent());
    assert!(!label_element.has_parent());
    renderer.render(&mut scene, &mut camera).unwrap();
    assert!(frame.children().is_empty());
}

#[test]
fn test_clone_renders_independently() {
    let document = MemoryDocument::new();
    let (mut renderer, mut scene, mut camera) = setup(&document);
    let root = scene.root();
    let original = scene.spawn_child(root, Node::object_in(&document).unwrap()).unwrap();

    let copy = scene.clone_node(original, true).unwrap();
    scene.add(root, copy).unwrap();
    scene.node_mut(copy).unwrap().position.x = 100.0;
    renderer.render(&mut scene, &mut camera).unwrap();

    let a = scene.node(original).unwrap().element().unwrap();
    let b = scene.node(copy).unwrap().element().unwrap();
    assert!(!a.ptr_eq(b));
    assert_ne!(a.style("transform"), b.style("transform"));
    assert_eq!(renderer.camera_element().children().len(), 2);
}

#[test]
fn test_trident_user_agent_uses_legacy_path() {
    let document = MemoryDocument::with_user_agent(IE11);
    let (mut renderer, mut scene, mut camera) = setup(&document);
    assert_eq!(renderer.compositing(), Compositing::Legacy);

    let root = scene.root();
    let mut elements = Vec::new();
    for z in [-200.0, 100.0, -600.0] {
        let element = document.create_label();
        let mut node = Node::object(element.clone()).unwrap();
        node.position = Vector3::new(0.0, 0.0, z);
        scene.spawn_child(root, node).unwrap();
        elements.push(element);
    }

    renderer.render(&mut scene, &mut camera).unwrap();
    assert!(renderer.camera_element().style("transform").is_none());

    let z_index: Vec<String> = elements
        .iter()
        .map(|element| element.style("z-index").unwrap())
        .collect();
    assert_eq!(z_index, ["2", "3", "1"]);

    let transform = elements[0].style("transform").unwrap();
    assert!(transform.starts_with("translate(-50%,-50%)translate(512px,384px)translateZ("));
}

trait CreateLabel {
    fn create_label(&self) -> MemoryElement;
}

impl CreateLabel for MemoryDocument {
    fn create_label(&self) -> MemoryElement {
        let element = MemoryElement::new("span");
        element.set_style("white-space", "nowrap").unwrap();
        element
    }
}
