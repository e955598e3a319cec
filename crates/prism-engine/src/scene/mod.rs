//! Scene data model.
//!
//! A `Scene` is a flat, insertion-ordered list of `RenderableObject`s addressed
//! by `ObjectHandle`, plus one perspective camera. There is no hierarchy.

mod camera;
mod geometry;
mod handle;
mod material;
mod object;
mod transform;

pub use camera::PerspectiveCamera;
pub use geometry::{Geometry, Vertex};
pub use handle::ObjectHandle;
pub use material::{Material, Program, Side};
pub use object::RenderableObject;
pub use transform::Transform;

use crate::coords::ColorRgba;

/// Scene lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("no object named `{name}` in scene")]
    NotFound { name: String },

    #[error("no object with handle {0}")]
    StaleHandle(ObjectHandle),
}

/// Objects plus the active camera.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<(ObjectHandle, RenderableObject)>,
    next_handle: u64,

    pub camera: PerspectiveCamera,

    /// Clear colour of the first render stage. `None` clears to transparent.
    pub background: Option<ColorRgba>,
}

impl Scene {
    pub fn new(camera: PerspectiveCamera) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    /// Inserts an object and returns its freshly allocated handle.
    pub fn add(&mut self, object: RenderableObject) -> ObjectHandle {
        let handle = ObjectHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        log::debug!("scene: added `{}` as {handle}", object.name);
        self.objects.push((handle, object));
        handle
    }

    /// Removes an object. Hover bookkeeping elsewhere is not notified.
    pub fn remove(&mut self, handle: ObjectHandle) -> Option<RenderableObject> {
        let idx = self.objects.iter().position(|(h, _)| *h == handle)?;
        Some(self.objects.remove(idx).1)
    }

    /// Removes every object. Handles are not recycled afterwards.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.objects.iter().any(|(h, _)| *h == handle)
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&RenderableObject> {
        self.objects.iter().find(|(h, _)| *h == handle).map(|(_, o)| o)
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut RenderableObject> {
        self.objects.iter_mut().find(|(h, _)| *h == handle).map(|(_, o)| o)
    }

    /// Like [`get_mut`](Self::get_mut) but reports a stale handle as an error.
    pub fn try_get_mut(&mut self, handle: ObjectHandle) -> Result<&mut RenderableObject, SceneError> {
        self.get_mut(handle).ok_or(SceneError::StaleHandle(handle))
    }

    /// Handle of the last-inserted object named `name`.
    pub fn handle_by_name(&self, name: &str) -> Result<ObjectHandle, SceneError> {
        self.objects
            .iter()
            .rev()
            .find(|(_, o)| o.name == name)
            .map(|(h, _)| *h)
            .ok_or_else(|| SceneError::NotFound { name: name.to_string() })
    }

    /// Last-inserted object named `name`.
    pub fn object_by_name(&self, name: &str) -> Result<&RenderableObject, SceneError> {
        self.objects
            .iter()
            .rev()
            .find(|(_, o)| o.name == name)
            .map(|(_, o)| o)
            .ok_or_else(|| SceneError::NotFound { name: name.to_string() })
    }

    pub fn object_by_name_mut(&mut self, name: &str) -> Result<&mut RenderableObject, SceneError> {
        self.objects
            .iter_mut()
            .rev()
            .find(|(_, o)| o.name == name)
            .map(|(_, o)| o)
            .ok_or_else(|| SceneError::NotFound { name: name.to_string() })
    }

    /// Iterates objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectHandle, &RenderableObject)> {
        self.objects.iter().map(|(h, o)| (*h, o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(name: &str) -> RenderableObject {
        RenderableObject::new(name, Geometry::plane(1.0, 1.0, 1, 1), Material::basic(ColorRgba::white()))
    }

    #[test]
    fn handles_are_unique_and_not_recycled() {
        let mut scene = Scene::default();
        let a = scene.add(obj("a"));
        let b = scene.add(obj("b"));
        assert_ne!(a, b);

        scene.clear();
        let c = scene.add(obj("c"));
        assert!(c != a && c != b);
        assert!(!scene.contains(a));
    }

    #[test]
    fn name_lookup_returns_last_match() {
        let mut scene = Scene::default();
        let _first = scene.add(obj("dup"));
        let second = scene.add(obj("dup"));
        assert_eq!(scene.handle_by_name("dup"), Ok(second));
    }

    #[test]
    fn name_lookup_miss_is_not_found() {
        let scene = Scene::default();
        assert_eq!(
            scene.object_by_name("plane").unwrap_err(),
            SceneError::NotFound { name: "plane".into() }
        );
    }

    #[test]
    fn remove_then_lookup_fails() {
        let mut scene = Scene::default();
        let h = scene.add(obj("donut"));
        assert!(scene.remove(h).is_some());
        assert!(scene.remove(h).is_none());
        assert_eq!(scene.try_get_mut(h).unwrap_err(), SceneError::StaleHandle(h));
    }
}
