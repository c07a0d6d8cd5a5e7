//! Error types for the viewer.
//!
//! Frame building never fails; only opening the window and setting up the
//! debug-draw device can.

use std::fmt;

/// Why the debug-draw GPU state could not be set up.
#[derive(Debug)]
pub enum GpuError {
    /// The window gave no drawable surface.
    Surface(wgpu::CreateSurfaceError),
    /// No adapter can present to the window's surface.
    NoAdapter,
    /// The adapter refused the device request.
    Device(wgpu::RequestDeviceError),
    /// The surface lists no texture format to render into.
    NoSurfaceFormat,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::Surface(e) => write!(f, "viewer window has no drawable surface: {e}"),
            GpuError::NoAdapter => f.write_str("no GPU adapter can present to the viewer window"),
            GpuError::Device(e) => write!(f, "debug-draw device request was refused: {e}"),
            GpuError::NoSurfaceFormat => f.write_str("viewer surface lists no texture format"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::Surface(e) => Some(e),
            GpuError::Device(e) => Some(e),
            GpuError::NoAdapter | GpuError::NoSurfaceFormat => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::Surface(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::Device(e)
    }
}

/// Why [`Viewer::run`](crate::Viewer::run) stopped early.
#[derive(Debug)]
pub enum ViewerError {
    /// The winit event loop could not start or quit abnormally.
    EventLoop(winit::error::EventLoopError),
    /// The viewer window could not be opened.
    Window(winit::error::OsError),
    /// The window opened but drawing into it could not be set up.
    Gpu(GpuError),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::EventLoop(e) => write!(f, "viewer event loop failed: {e}"),
            ViewerError::Window(e) => write!(f, "cannot open viewer window: {e}"),
            ViewerError::Gpu(e) => write!(f, "cannot draw into viewer window: {e}"),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::EventLoop(e) => Some(e),
            ViewerError::Window(e) => Some(e),
            ViewerError::Gpu(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(e: winit::error::OsError) -> Self {
        ViewerError::Window(e)
    }
}

impl From<GpuError> for ViewerError {
    fn from(e: GpuError) -> Self {
        ViewerError::Gpu(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_gpu_error_wraps_into_viewer_error() {
        let err: ViewerError = GpuError::NoAdapter.into();
        assert!(matches!(err, ViewerError::Gpu(GpuError::NoAdapter)));
        assert_eq!(
            err.to_string(),
            "cannot draw into viewer window: no GPU adapter can present to the viewer window"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_leaf_errors_have_no_source() {
        assert!(GpuError::NoAdapter.source().is_none());
        assert!(GpuError::NoSurfaceFormat.source().is_none());
        assert_eq!(GpuError::NoSurfaceFormat.to_string(), "viewer surface lists no texture format");
    }
}
