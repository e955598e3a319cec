/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

/// Render-device lifecycle failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// Window, surface or GPU context could not be created or sized.
    #[error("render device construction failed: {0}")]
    Construction(String),

    /// `setup` was called on a device that already has a surface.
    #[error("render device is already attached to a surface")]
    AlreadyAttached,

    /// GPU access was requested while no surface is attached.
    #[error("render device has no GPU surface attached")]
    Detached,
}
