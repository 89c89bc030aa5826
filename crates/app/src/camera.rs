//! Camera capture seam
//!
//! The terminal build has no camera; [`NoCamera`] reports that. Tests
//! plug in a fake to drive the capture path.

use std::io;

/// Which way the camera should face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Rear camera, pointed at the vehicle
    #[default]
    Environment,
    /// Front camera
    User,
}

/// A device that can open a video stream
pub trait Camera: Send + Sync {
    fn open(&self, facing: Facing) -> io::Result<Box<dyn CameraStream>>;
}

/// An open video stream
pub trait CameraStream: Send {
    /// Grab the current frame as PNG bytes
    fn capture_png(&mut self) -> io::Result<Vec<u8>>;

    /// Stop every track on the stream
    fn stop(&mut self);
}

/// Exclusive handle on an open stream; stops it when dropped
pub struct ActiveCamera {
    stream: Box<dyn CameraStream>,
}

impl ActiveCamera {
    pub fn new(stream: Box<dyn CameraStream>) -> Self {
        Self { stream }
    }

    pub fn capture_png(&mut self) -> io::Result<Vec<u8>> {
        self.stream.capture_png()
    }
}

impl Drop for ActiveCamera {
    fn drop(&mut self) {
        self.stream.stop();
        tracing::debug!("Camera stream stopped");
    }
}

impl std::fmt::Debug for ActiveCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ActiveCamera")
    }
}

/// Camera for hosts without capture support
#[derive(Debug, Default)]
pub struct NoCamera;

impl Camera for NoCamera {
    fn open(&self, _facing: Facing) -> io::Result<Box<dyn CameraStream>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Camera not supported on this device",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct Stream(Arc<AtomicBool>);

    impl CameraStream for Stream {
        fn capture_png(&mut self) -> io::Result<Vec<u8>> {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }

        fn stop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_stream_stopped_on_drop() {
        let stopped = Arc::new(AtomicBool::new(false));
        let mut camera = ActiveCamera::new(Box::new(Stream(stopped.clone())));
        assert_eq!(camera.capture_png().unwrap().len(), 4);
        assert!(!stopped.load(Ordering::SeqCst));
        drop(camera);
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_no_camera_is_unsupported() {
        let err = NoCamera.open(Facing::default()).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}
