// External I/O operations module
#[cfg(target_os = "linux")]
pub mod dbus; // Sleep/resume and clock change monitoring
pub mod instance; // Running-instance discovery and signalling
pub mod lock; // Low-level lock file operations
pub mod signals; // Unix signal handling and the core message type
