use std::rc::Rc;

use super::{
    controller::SceneEdit,
    object::{PartSet, SceneObject},
};
use crate::gfx::backend::GpuBackend;

/// Position of an instance in the scene, matching its selector entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub usize);

impl InstanceId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered placed instances plus the current selection
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    selected: Option<InstanceId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instance, returning its id
    pub fn push(&mut self, object: SceneObject) -> InstanceId {
        self.objects.push(object);
        InstanceId(self.objects.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &SceneObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, object)| (InstanceId(i), object))
    }

    pub fn get(&self, id: InstanceId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.0)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        id.0 < self.objects.len()
    }

    /// Make `id` the target of later edits.
    ///
    /// A stale id (e.g. from before a clear) logs a warning and changes nothing.
    pub fn select(&mut self, id: InstanceId) -> bool {
        if !self.contains(id) {
            log::warn!(
                "select {} ignored: scene has {} instances",
                id,
                self.objects.len()
            );
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<InstanceId> {
        self.selected
    }

    pub fn selected_object(&self) -> Option<&SceneObject> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Apply a transform edit to the selected instance
    pub fn apply_edit(&mut self, edit: &SceneEdit) -> bool {
        match self.selected {
            Some(id) => self.apply_edit_to(id, edit),
            None => {
                log::debug!("edit {:?} with nothing selected", edit);
                false
            }
        }
    }

    /// Apply a transform edit to one instance; stale ids are a logged no-op
    pub fn apply_edit_to(&mut self, id: InstanceId, edit: &SceneEdit) -> bool {
        let Some(object) = self.objects.get_mut(id.0) else {
            log::warn!("edit for {} ignored: no such instance", id);
            return false;
        };
        object.transform = object.transform.applied(edit);
        true
    }

    /// Swap an instance's part set, returning the previous one
    pub fn replace_parts(&mut self, id: InstanceId, parts: PartSet) -> Option<Rc<PartSet>> {
        self.objects
            .get_mut(id.0)
            .map(|object| object.replace_parts(parts))
    }

    /// Release every instance's GPU resources and empty the scene
    pub fn clear<B: GpuBackend + ?Sized>(&mut self, backend: &B) {
        for object in self.objects.drain(..) {
            object.release(backend);
        }
        self.selected = None;
    }

    /// Selector labels in instance order
    pub fn labels(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.label.as_str()).collect()
    }

    pub fn statistics(&self) -> SceneStatistics {
        let total_vertices: usize = self
            .objects
            .iter()
            .map(|obj| obj.parts().vertex_count())
            .sum();

        SceneStatistics {
            object_count: self.objects.len(),
            material_count: self.objects.iter().map(SceneObject::material_count).sum(),
            total_triangles: total_vertices / 3,
            total_vertices,
        }
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub material_count: usize,
    pub total_triangles: usize,
    pub total_vertices: usize,
}
