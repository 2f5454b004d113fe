//! Ordered record of engine resources acquired by one session.

use raydeck_engine::{CameraHandle, ImageHandle, ModelHandle, RenderEngine, SceneHandle};

/// One acquired engine resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Model(ModelHandle),
    Scene(SceneHandle),
    Camera(CameraHandle),
    Image(ImageHandle),
}

impl Resource {
    fn destroy(self, engine: &mut dyn RenderEngine) -> bool {
        match self {
            Resource::Model(h) => engine.unload_model(h),
            Resource::Scene(h) => engine.destroy_scene(h),
            Resource::Camera(h) => engine.destroy_camera(h),
            Resource::Image(h) => engine.destroy_image(h),
        }
    }
}

/// Acquisition list. Resources are released in reverse acquisition order.
#[derive(Debug, Default)]
pub struct ResourceList {
    acquired: Vec<Resource>,
}

impl ResourceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, resource: Resource) {
        self.acquired.push(resource);
    }

    pub fn len(&self) -> usize {
        self.acquired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acquired.is_empty()
    }

    pub fn contains(&self, resource: Resource) -> bool {
        self.acquired.contains(&resource)
    }

    /// Release a single resource early. Returns false if it was not held.
    pub fn release(&mut self, engine: &mut dyn RenderEngine, resource: Resource) -> bool {
        let Some(index) = self.acquired.iter().rposition(|r| *r == resource) else {
            return false;
        };
        self.acquired.remove(index);
        release_one(engine, resource);
        true
    }

    /// Release everything still held, newest first.
    pub fn release_all(&mut self, engine: &mut dyn RenderEngine) {
        while let Some(resource) = self.acquired.pop() {
            release_one(engine, resource);
        }
    }
}

fn release_one(engine: &mut dyn RenderEngine, resource: Resource) {
    if resource.destroy(engine) {
        log::trace!("Released {:?}", resource);
    } else {
        log::warn!("Engine refused to release {:?}", resource);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Call, RecordingEngine};

    #[test]
    fn test_release_all_in_reverse_order() {
        let mut engine = RecordingEngine::new();
        let model = engine.create_model_handle();
        let scene = engine.create_scene().unwrap();
        let image = engine.create_image(2, 2).unwrap();

        let mut list = ResourceList::new();
        list.push(Resource::Model(model));
        list.push(Resource::Scene(scene));
        list.push(Resource::Image(image));
        list.release_all(&mut engine);

        assert!(list.is_empty());
        assert_eq!(
            engine.release_calls(),
            vec![
                Call::DestroyImage(image),
                Call::DestroyScene(scene),
                Call::UnloadModel(model),
            ]
        );
    }

    #[test]
    fn test_release_single_resource() {
        let mut engine = RecordingEngine::new();
        let a = engine.create_image(1, 1).unwrap();
        let b = engine.create_image(1, 1).unwrap();

        let mut list = ResourceList::new();
        list.push(Resource::Image(a));
        list.push(Resource::Image(b));

        assert!(list.release(&mut engine, Resource::Image(a)));
        assert!(!list.release(&mut engine, Resource::Image(a)));
        assert_eq!(list.len(), 1);
        assert!(list.contains(Resource::Image(b)));
        assert_eq!(engine.release_calls(), vec![Call::DestroyImage(a)]);
    }

    #[test]
    fn test_release_all_empty_is_noop() {
        let mut engine = RecordingEngine::new();
        ResourceList::new().release_all(&mut engine);
        assert!(engine.calls().is_empty());
    }
}
