//! Instance storage.
//!
//! All raindrops live in a single [`InstanceArena`] addressed by index. The
//! scene advances them in one pass per frame instead of giving each drop its
//! own callback, so update order is always index order.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use crate::fall::{self, FallConfig, FallPhase};

/// Index of an instance inside an [`InstanceArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub usize);

/// One rendered object sharing the arena's mesh and material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub position: Vec3,
    pub scale: Vec3,
    /// Static instances are drawn but never moved.
    pub animated: bool,
    pub phase: FallPhase,
}

impl Instance {
    pub fn falling(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            scale: Vec3::splat(scale),
            animated: true,
            phase: FallPhase::Falling,
        }
    }

    pub fn fixed(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            animated: false,
            phase: FallPhase::Falling,
        }
    }

    /// Model matrix for this instance.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, Quat::IDENTITY, self.position)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.transform().to_cols_array_2d(),
        }
    }
}

/// Per-instance vertex data uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Fixed-size collection of instances created once at startup.
#[derive(Debug, Clone, Default)]
pub struct InstanceArena {
    instances: Vec<Instance>,
}

impl InstanceArena {
    pub fn new(instances: Vec<Instance>) -> Self {
        Self { instances }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances
            .iter()
            .enumerate()
            .map(|(i, inst)| (InstanceId(i), inst))
    }

    /// Advance every animated instance by one frame, in index order.
    ///
    /// Returns how many instances wrapped back to the ceiling.
    pub fn animate(&mut self, cfg: &FallConfig) -> usize {
        let mut wraps = 0;
        for inst in self.instances.iter_mut().filter(|i| i.animated) {
            let s = fall::advance(inst.position.y, cfg);
            inst.position.y = s.y;
            wraps += s.wrapped as usize;
        }
        wraps
    }

    /// Instance data ordered farthest-first from `eye`, for alpha blending.
    pub fn sorted_back_to_front(&self, eye: Vec3) -> Vec<InstanceRaw> {
        let mut order: Vec<(f32, &Instance)> = self
            .instances
            .iter()
            .map(|inst| (inst.position.distance_squared(eye), inst))
            .collect();
        order.sort_by(|a, b| b.0.total_cmp(&a.0));
        order.into_iter().map(|(_, inst)| inst.to_raw()).collect()
    }

    /// Instance data in index order.
    pub fn raw(&self) -> Vec<InstanceRaw> {
        self.instances.iter().map(Instance::to_raw).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arena() -> InstanceArena {
        InstanceArena::new(vec![
            Instance::falling(Vec3::new(0.0, 5.0, 0.0), 0.5),
            Instance::falling(Vec3::new(1.0, -9.95, 0.0), 0.5),
            Instance::fixed(Vec3::ZERO, Vec3::splat(2.0)),
        ])
    }

    #[test]
    fn test_animate_moves_only_animated_instances() {
        let mut a = arena();
        let wraps = a.animate(&FallConfig::default());

        assert_eq!(wraps, 1);
        assert_relative_eq!(a.get(InstanceId(0)).unwrap().position.y, 4.9, epsilon = 1e-6);
        assert_eq!(a.get(InstanceId(1)).unwrap().position.y, 10.0);
        assert_eq!(a.get(InstanceId(2)).unwrap().position.y, 0.0);
    }

    #[test]
    fn test_animate_keeps_x_and_z() {
        let mut a = arena();
        a.animate(&FallConfig::default());
        let p = a.get(InstanceId(1)).unwrap().position;
        assert_eq!(p.x, 1.0);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn test_transform_applies_scale_then_translation() {
        let inst = Instance::falling(Vec3::new(1.0, 2.0, 3.0), 0.5);
        let p = inst.transform().transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 2.5);
        assert_relative_eq!(p.z, 3.0);
    }

    #[test]
    fn test_sorted_back_to_front() {
        let a = InstanceArena::new(vec![
            Instance::falling(Vec3::new(0.0, 0.0, 4.0), 1.0),
            Instance::falling(Vec3::new(0.0, 0.0, -8.0), 1.0),
            Instance::falling(Vec3::new(0.0, 0.0, 0.0), 1.0),
        ]);
        let sorted = a.sorted_back_to_front(Vec3::new(0.0, 0.0, 5.0));
        let zs: Vec<f32> = sorted.iter().map(|r| r.model[3][2]).collect();
        assert_eq!(zs, vec![-8.0, 0.0, 4.0]);
    }
}
