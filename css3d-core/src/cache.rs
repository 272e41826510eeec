/// Per-renderer memo of the last values written to the DOM
use slotmap::SecondaryMap;

use crate::scene::NodeId;

/// Last perspective and camera frame style
#[derive(Debug, Clone, Default)]
pub struct CameraCache {
    pub fov: Option<f64>,
    pub style: Option<String>,
}

/// Last transform written to a renderable's element
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectCache {
    pub style: String,
    /// Legacy compositing only
    pub distance_to_camera_squared: Option<f64>,
    /// Legacy compositing only
    pub z_index: Option<usize>,
}

impl ObjectCache {
    pub fn new(style: String) -> Self {
        Self {
            style,
            distance_to_camera_squared: None,
            z_index: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderCache {
    pub camera: CameraCache,
    pub objects: SecondaryMap<NodeId, ObjectCache>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `style` differs from what was last written for `id`.
    pub fn is_stale(&self, id: NodeId, style: &str) -> bool {
        self.objects.get(id).map_or(true, |entry| entry.style != style)
    }

    /// Record a written style, keeping the entry's depth bookkeeping.
    pub fn store_style(&mut self, id: NodeId, style: String) {
        match self.objects.get_mut(id) {
            Some(entry) => entry.style = style,
            None => {
                self.objects.insert(id, ObjectCache::new(style));
            }
        }
    }

    /// Drop entries whose node no longer passes `alive`.
    pub fn prune(&mut self, alive: impl Fn(NodeId) -> bool) {
        self.objects.retain(|id, _| alive(id));
    }
}
