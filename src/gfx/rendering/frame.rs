//! Per-frame description handed to the renderer
//!
//! The scene core does not draw. Each frame it produces a [`FrameDescription`]:
//! for every instance, its world matrix, the camera framed when it was
//! loaded and the shared [`PartSet`] it is currently bound to. Holding the
//! `Rc` keeps a part set alive for the whole frame even if a texture swap
//! replaces it in the scene meanwhile.

use std::rc::Rc;

use cgmath::{InnerSpace, Matrix4, Vector3};

use crate::gfx::{
    backend::{MeshHandle, TextureHandle},
    camera::FramedCamera,
    resources::{Material, MaterialUniform},
    scene::{InstanceId, PartSet, Scene},
};

/// Model matrix uniform of one instance
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub world: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn from_transform(world: Matrix4<f32>) -> Self {
        Self {
            world: world.into(),
        }
    }
}

/// Light uniform: direction towards the light, normalised, w unused
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub direction: [f32; 4],
}

/// Everything needed to draw one instance
#[derive(Debug, Clone)]
pub struct FrameInstance {
    pub id: InstanceId,
    pub world: Matrix4<f32>,
    pub camera: FramedCamera,
    pub parts: Rc<PartSet>,
}

/// One draw call: a vertex buffer, its material and the instance transform
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub instance: InstanceId,
    pub mesh: MeshHandle,
    pub vertex_count: u32,
    pub material: Rc<Material>,
    pub texture: Option<TextureHandle>,
    pub world: Matrix4<f32>,
}

impl DrawItem {
    pub fn object_uniform(&self) -> ObjectUniform {
        ObjectUniform::from_transform(self.world)
    }

    pub fn material_uniform(&self) -> MaterialUniform {
        self.material.uniform()
    }
}

#[derive(Debug, Clone)]
pub struct FrameDescription {
    pub instances: Vec<FrameInstance>,
    pub selected: Option<InstanceId>,
    pub light_direction: Vector3<f32>,
}

impl FrameDescription {
    /// Snapshot the scene for one frame
    pub fn build(
        scene: &Scene,
        field_of_view_degrees: f32,
        aspect: f32,
        light_direction: [f32; 3],
    ) -> Self {
        let instances = scene
            .iter()
            .map(|(id, object)| FrameInstance {
                id,
                world: object.world_matrix(),
                camera: FramedCamera::from_framing(&object.framing, field_of_view_degrees, aspect),
                parts: object.parts(),
            })
            .collect();

        let light = Vector3::from(light_direction);
        let light_direction = if light.magnitude2() > 0.0 {
            light.normalize()
        } else {
            Vector3::unit_z()
        };

        Self {
            instances,
            selected: scene.selected(),
            light_direction,
        }
    }

    /// Camera of the selected instance, or of the first one
    pub fn camera(&self) -> Option<&FramedCamera> {
        self.selected
            .and_then(|id| self.instances.iter().find(|i| i.id == id))
            .or_else(|| self.instances.first())
            .map(|i| &i.camera)
    }

    pub fn light_uniform(&self) -> LightUniform {
        let d = self.light_direction;
        LightUniform {
            direction: [d.x, d.y, d.z, 0.0],
        }
    }

    /// Flatten every instance into draw calls, in scene order
    pub fn draw_items(&self) -> impl Iterator<Item = DrawItem> + '_ {
        self.instances.iter().flat_map(|instance| {
            instance.parts.parts.iter().map(move |part| DrawItem {
                instance: instance.id,
                mesh: part.mesh,
                vertex_count: part.vertex_count,
                material: Rc::clone(&part.material),
                texture: instance.parts.texture_for(part),
                world: instance.world,
            })
        })
    }

    pub fn draw_count(&self) -> usize {
        self.instances.iter().map(|i| i.parts.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
