//! Per-frame GPU object registry.
//!
//! A declared resource (`Name`) is materialized once per frame-in-flight slot
//! so that the CPU can record frame `N+1` while the GPU is still consuming
//! frame `N`'s descriptors. The lookup key folds the frame index into the
//! name's hash rather than using a `(Name, u32)` tuple key, mirroring the
//! single-`u64`-key scheme of the system this module is ported from.

use rustc_hash::FxHashMap;

use crate::name::Name;

/// Large odd multiplier folding the frame index into a resource's name hash.
///
/// Chosen so that a reasonable range of frame-in-flight indices never
/// collides with a real `Name` hash in practice; it has no other
/// significance.
const FRAME_SALT: u64 = 82_646_923;

#[inline]
fn resource_id(name: Name, frame: u32) -> u64 {
    name.raw().wrapping_add(FRAME_SALT.wrapping_mul(u64::from(frame)))
}

/// Registry of GPU objects materialized from `BuildContext` declarations,
/// keyed by `(Name, frame-in-flight index)`.
#[derive(Default)]
pub struct ResourceStorage {
    textures: FxHashMap<u64, wgpu::Texture>,
    texture_views: FxHashMap<u64, wgpu::TextureView>,
    buffers: FxHashMap<u64, wgpu::Buffer>,
}

impl ResourceStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_texture(&mut self, name: Name, frame: u32, texture: wgpu::Texture) {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let id = resource_id(name, frame);
        self.texture_views.insert(id, view);
        self.textures.insert(id, texture);
    }

    #[must_use]
    pub fn texture(&self, name: Name, frame: u32) -> Option<&wgpu::Texture> {
        self.textures.get(&resource_id(name, frame))
    }

    #[must_use]
    pub fn texture_view(&self, name: Name, frame: u32) -> Option<&wgpu::TextureView> {
        self.texture_views.get(&resource_id(name, frame))
    }

    pub fn register_buffer(&mut self, name: Name, frame: u32, buffer: wgpu::Buffer) {
        self.buffers.insert(resource_id(name, frame), buffer);
    }

    #[must_use]
    pub fn buffer(&self, name: Name, frame: u32) -> Option<&wgpu::Buffer> {
        self.buffers.get(&resource_id(name, frame))
    }

    /// Public form of the `(Name, frame)` hash, for callers (bind-group
    /// caching) that need a stable content fingerprint without reaching into
    /// a live GPU object.
    #[must_use]
    pub fn fingerprint(name: Name, frame: u32) -> u64 {
        resource_id(name, frame)
    }

    /// Drops every resource belonging to `frame`, e.g. before re-declaring it
    /// for the next pass over the frame ring.
    pub fn clear_frame(&mut self, names: &[Name], frame: u32) {
        for &name in names {
            let id = resource_id(name, frame);
            self.textures.remove(&id);
            self.texture_views.remove(&id);
            self.buffers.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_frames_of_the_same_name_do_not_collide() {
        let a = resource_id(Name::new("gbuffer.albedo"), 0);
        let b = resource_id(Name::new("gbuffer.albedo"), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_names_at_the_same_frame_do_not_collide() {
        let a = resource_id(Name::new("gbuffer.albedo"), 0);
        let b = resource_id(Name::new("gbuffer.normal"), 0);
        assert_ne!(a, b);
    }
}
