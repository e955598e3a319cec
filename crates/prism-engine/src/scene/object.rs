use super::{Geometry, Material, Transform};

/// A mesh node in the scene.
///
/// Geometry and material are built by scene-construction code; the engine reads
/// them for drawing and hit-testing and mutates only `transform`, `visible` and
/// material uniforms.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableObject {
    pub name: String,
    pub visible: bool,
    pub transform: Transform,
    pub geometry: Geometry,
    pub material: Material,
}

impl RenderableObject {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            name: name.into(),
            visible: true,
            transform: Transform::IDENTITY,
            geometry,
            material,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}
