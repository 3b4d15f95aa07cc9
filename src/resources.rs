//! Ownership guards for scene drawables.
//!
//! An [`OwnedDrawable`] is the only thing in the engine that holds a
//! [`DrawableId`]. Releasing it consumes the guard, so a drawable can be freed
//! at most once; effects keep guards in `Option`s and `take()` them on
//! teardown. A guard that is dropped without being released means a GPU
//! resource leaked in the host, which is logged.

use glam::Vec3;

use crate::scene::{DrawableId, SceneGraph};

/// A drawable allocated in a [`SceneGraph`] and owned by one effect.
#[derive(Debug)]
pub struct OwnedDrawable {
    id: DrawableId,
    attached: bool,
    released: bool,
}

impl OwnedDrawable {
    /// Take ownership of `id` and attach it to the scene.
    pub fn attach(scene: &mut dyn SceneGraph, id: DrawableId) -> Self {
        scene.add(id);
        Self {
            id,
            attached: true,
            released: false,
        }
    }

    /// The underlying id.
    #[inline]
    pub fn id(&self) -> DrawableId {
        self.id
    }

    /// Whether the drawable is currently in the visible scene.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Upload a new position buffer.
    pub fn set_positions(&self, scene: &mut dyn SceneGraph, positions: &[f32]) {
        scene.set_positions(self.id, positions);
    }

    /// Move and scale the drawable.
    pub fn set_transform(&self, scene: &mut dyn SceneGraph, position: Vec3, scale: Vec3) {
        scene.set_transform(self.id, position, scale);
    }

    /// Set material opacity.
    pub fn set_opacity(&self, scene: &mut dyn SceneGraph, opacity: f32) {
        scene.set_opacity(self.id, opacity);
    }

    /// Remove from the visible scene without freeing it.
    pub fn detach(&mut self, scene: &mut dyn SceneGraph) {
        if self.attached {
            scene.remove(self.id);
            self.attached = false;
        }
    }

    /// Detach if needed and free the drawable.
    pub fn release(mut self, scene: &mut dyn SceneGraph) {
        self.detach(scene);
        scene.release(self.id);
        self.released = true;
    }
}

impl Drop for OwnedDrawable {
    fn drop(&mut self) {
        if !self.released {
            log::warn!("drawable {:?} dropped without being released", self.id);
        }
    }
}
