use glam::{Vec2, Vec3, Vec4};

use super::UniformError;

/// A single numeric uniform value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

impl UniformValue {
    /// Packs the value into one 16-byte slot (zero padded).
    #[inline]
    pub fn to_slot(self) -> [f32; 4] {
        match self {
            UniformValue::Float(v) => [v, 0.0, 0.0, 0.0],
            UniformValue::Vec2(v) => [v.x, v.y, 0.0, 0.0],
            UniformValue::Vec3(v) => [v.x, v.y, v.z, 0.0],
            UniformValue::Vec4(v) => v.to_array(),
        }
    }

    #[inline]
    pub fn as_f32(self) -> Option<f32> {
        match self {
            UniformValue::Float(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn kind(self) -> &'static str {
        match self {
            UniformValue::Float(_) => "f32",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
        }
    }

    fn same_kind(self, other: UniformValue) -> bool {
        std::mem::discriminant(&self) == std::mem::discriminant(&other)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

/// Ordered set of named uniforms backing one GPU uniform buffer.
///
/// Layout: every entry occupies one `vec4<f32>` slot in declaration order, so a
/// WGSL struct declaring one `vec4<f32>` field per entry (same order) matches
/// byte for byte. The set of names is fixed once the block is built; only
/// values change afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformBlock {
    entries: Vec<(String, UniformValue)>,
    revision: u64,
}

impl UniformBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style declaration of a uniform.
    ///
    /// Redeclaring a name overwrites the earlier value in place.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bumped on every successful write; renderers compare it to skip uploads.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(UniformValue::as_f32)
    }

    /// Writes an existing uniform. The value kind must match the declaration.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<(), UniformError> {
        let value = value.into();
        let entry = self
            .entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| UniformError::Unknown(name.to_string()))?;

        if !entry.1.same_kind(value) {
            return Err(UniformError::KindMismatch {
                name: name.to_string(),
                expected: entry.1.kind(),
                found: value.kind(),
            });
        }

        entry.1 = value;
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    /// Adds `delta` to a float uniform and returns the new value.
    pub fn add_f32(&mut self, name: &str, delta: f32) -> Result<f32, UniformError> {
        let current = self
            .get(name)
            .ok_or_else(|| UniformError::Unknown(name.to_string()))?;
        let current = current.as_f32().ok_or(UniformError::KindMismatch {
            name: name.to_string(),
            expected: current.kind(),
            found: "f32",
        })?;
        let next = current + delta;
        self.set(name, next)?;
        Ok(next)
    }

    /// Packed slots ready for `bytemuck::cast_slice`.
    ///
    /// An empty block still yields one zero slot; wgpu rejects zero-sized bindings.
    pub fn to_slots(&self) -> Vec<[f32; 4]> {
        if self.entries.is_empty() {
            return vec![[0.0; 4]];
        }
        self.entries.iter().map(|(_, v)| v.to_slot()).collect()
    }

    /// Size in bytes of the packed buffer.
    #[inline]
    pub fn byte_size(&self) -> u64 {
        (self.entries.len().max(1) * std::mem::size_of::<[f32; 4]>()) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> UniformBlock {
        UniformBlock::new()
            .with("u_time", 0.0f32)
            .with("u_mouse", Vec2::new(0.5, 0.5))
    }

    #[test]
    fn slots_follow_declaration_order() {
        let b = block();
        assert_eq!(b.to_slots(), vec![[0.0, 0.0, 0.0, 0.0], [0.5, 0.5, 0.0, 0.0]]);
        assert_eq!(b.byte_size(), 32);
    }

    #[test]
    fn empty_block_has_one_slot() {
        let b = UniformBlock::new();
        assert_eq!(b.to_slots().len(), 1);
        assert_eq!(b.byte_size(), 16);
    }

    #[test]
    fn set_rejects_unknown_and_mismatched() {
        let mut b = block();
        assert_eq!(b.set("u_nope", 1.0f32), Err(UniformError::Unknown("u_nope".into())));
        assert!(matches!(b.set("u_time", Vec2::ONE), Err(UniformError::KindMismatch { .. })));
        assert_eq!(b.revision(), 0);
    }

    #[test]
    fn add_accumulates_and_bumps_revision() {
        let mut b = block();
        b.add_f32("u_time", 0.25).unwrap();
        let v = b.add_f32("u_time", 0.5).unwrap();
        assert_eq!(v, 0.75);
        assert_eq!(b.get_f32("u_time"), Some(0.75));
        assert_eq!(b.revision(), 2);
    }

    #[test]
    fn redeclare_keeps_position() {
        let b = block().with("u_time", 3.0f32);
        assert_eq!(b.names().collect::<Vec<_>>(), ["u_time", "u_mouse"]);
        assert_eq!(b.get_f32("u_time"), Some(3.0));
    }
}
