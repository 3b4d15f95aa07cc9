//! Scene graph abstraction.
//!
//! The engine does not render anything itself. It creates and mutates
//! drawables through the [`SceneGraph`] trait, which a host implements on top
//! of its renderer. Drawables are referred to by [`DrawableId`] so that effects
//! never hold borrows into the scene between frames.
//!
//! | Call | Meaning |
//! |------|---------|
//! | [`create_point_cloud`](SceneGraph::create_point_cloud) | Allocate a point cloud from flat xyz buffers |
//! | [`create_billboard`](SceneGraph::create_billboard) | Allocate a single camera-facing sprite |
//! | [`add`](SceneGraph::add) / [`remove`](SceneGraph::remove) | Attach to / detach from the visible scene |
//! | [`release`](SceneGraph::release) | Free the GPU resources behind the drawable |
//!
//! [`RecordingScene`] is an in-memory implementation that checks the
//! lifecycle rules. It backs the tests and the headless demo.

use std::collections::HashMap;

use glam::Vec3;

use crate::material::Material;

/// Identifier of a drawable allocated by a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableId(pub u64);

/// What kind of primitive a drawable is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawableKind {
    /// Camera-facing sprite.
    Billboard,
    /// Cloud of textured points.
    PointCloud,
}

/// Host-side scene graph and drawable factory.
///
/// Position and color buffers are flat `[x, y, z, x, y, z, ...]` slices.
pub trait SceneGraph {
    /// Allocate a point cloud. It is not visible until [`add`](Self::add)ed.
    fn create_point_cloud(
        &mut self,
        positions: &[f32],
        colors: &[f32],
        material: &Material,
    ) -> DrawableId;

    /// Allocate a billboard sprite. It is not visible until [`add`](Self::add)ed.
    fn create_billboard(&mut self, material: &Material) -> DrawableId;

    /// Attach a drawable to the visible scene.
    fn add(&mut self, id: DrawableId);

    /// Detach a drawable from the visible scene.
    fn remove(&mut self, id: DrawableId);

    /// Replace the position buffer of a point cloud.
    fn set_positions(&mut self, id: DrawableId, positions: &[f32]);

    /// Move and scale a drawable.
    fn set_transform(&mut self, id: DrawableId, position: Vec3, scale: Vec3);

    /// Set material opacity.
    fn set_opacity(&mut self, id: DrawableId, opacity: f32);

    /// Free the resources behind a drawable. The id is dead afterwards.
    fn release(&mut self, id: DrawableId);
}

/// State of one drawable inside a [`RecordingScene`].
#[derive(Debug, Clone)]
pub struct RecordedDrawable {
    /// Primitive kind.
    pub kind: DrawableKind,
    /// Whether it is currently attached.
    pub attached: bool,
    /// Last uploaded positions.
    pub positions: Vec<f32>,
    /// Colors given at creation.
    pub colors: Vec<f32>,
    /// Last transform position.
    pub position: Vec3,
    /// Last transform scale.
    pub scale: Vec3,
    /// Last opacity.
    pub opacity: f32,
    /// Point size from the material.
    pub size: f32,
}

/// In-memory [`SceneGraph`] that enforces the drawable lifecycle.
///
/// Panics on use of an unknown or released id, on double attach and on
/// releasing a drawable twice.
#[derive(Debug, Default)]
pub struct RecordingScene {
    next_id: u64,
    drawables: HashMap<DrawableId, RecordedDrawable>,
    created: usize,
    released: usize,
}

impl RecordingScene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of drawables currently attached.
    pub fn attached_count(&self) -> usize {
        self.drawables.values().filter(|d| d.attached).count()
    }

    /// Number of drawables allocated and not yet released.
    pub fn live_count(&self) -> usize {
        self.drawables.len()
    }

    /// Total drawables ever created.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Total drawables released.
    pub fn released_count(&self) -> usize {
        self.released
    }

    /// Inspect a live drawable.
    pub fn get(&self, id: DrawableId) -> Option<&RecordedDrawable> {
        self.drawables.get(&id)
    }

    /// Ids of attached drawables of the given kind.
    pub fn attached_of_kind(&self, kind: DrawableKind) -> Vec<DrawableId> {
        let mut ids: Vec<_> = self
            .drawables
            .iter()
            .filter(|(_, d)| d.attached && d.kind == kind)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    fn allocate(&mut self, drawable: RecordedDrawable) -> DrawableId {
        let id = DrawableId(self.next_id);
        self.next_id += 1;
        self.created += 1;
        self.drawables.insert(id, drawable);
        id
    }

    fn entry(&mut self, id: DrawableId) -> &mut RecordedDrawable {
        match self.drawables.get_mut(&id) {
            Some(d) => d,
            None => panic!("drawable {:?} used after release or never created", id),
        }
    }
}

impl SceneGraph for RecordingScene {
    fn create_point_cloud(
        &mut self,
        positions: &[f32],
        colors: &[f32],
        material: &Material,
    ) -> DrawableId {
        assert_eq!(
            positions.len(),
            colors.len(),
            "position and color buffers must be index aligned"
        );
        self.allocate(RecordedDrawable {
            kind: DrawableKind::PointCloud,
            attached: false,
            positions: positions.to_vec(),
            colors: colors.to_vec(),
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            opacity: material.opacity,
            size: material.size,
        })
    }

    fn create_billboard(&mut self, material: &Material) -> DrawableId {
        self.allocate(RecordedDrawable {
            kind: DrawableKind::Billboard,
            attached: false,
            positions: Vec::new(),
            colors: Vec::new(),
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            opacity: material.opacity,
            size: material.size,
        })
    }

    fn add(&mut self, id: DrawableId) {
        let d = self.entry(id);
        assert!(!d.attached, "drawable {:?} attached twice", id);
        d.attached = true;
    }

    fn remove(&mut self, id: DrawableId) {
        self.entry(id).attached = false;
    }

    fn set_positions(&mut self, id: DrawableId, positions: &[f32]) {
        let d = self.entry(id);
        d.positions.clear();
        d.positions.extend_from_slice(positions);
    }

    fn set_transform(&mut self, id: DrawableId, position: Vec3, scale: Vec3) {
        let d = self.entry(id);
        d.position = position;
        d.scale = scale;
    }

    fn set_opacity(&mut self, id: DrawableId, opacity: f32) {
        self.entry(id).opacity = opacity;
    }

    fn release(&mut self, id: DrawableId) {
        match self.drawables.remove(&id) {
            Some(_) => self.released += 1,
            None => panic!("drawable {:?} released twice", id),
        }
    }
}
