pub mod camera_utils;
pub mod framed_camera;

// Re-export main types
pub use camera_utils::{Camera, CameraUniform};
pub use framed_camera::FramedCamera;
