/// Lumiere Engine - Singleton manager for engine subsystems
///
/// This module provides global singleton management for graphics devices and
/// the logging system. It uses thread-safe static storage with RwLock for safe
/// concurrent access.

use std::sync::{OnceLock, RwLock, Arc, Mutex};
use std::time::SystemTime;
use rustc_hash::FxHashMap;
use crate::graphics_device::GraphicsDevice;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    /// Named graphics devices (wrapped in Mutex for thread-safe mutable access)
    devices: RwLock<FxHashMap<String, Arc<Mutex<dyn GraphicsDevice>>>>,
}

impl EngineState {
    /// Create a new empty engine state
    fn new() -> Self {
        Self {
            devices: RwLock::new(FxHashMap::default()),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the lifecycle of engine subsystems (graphics devices, logger)
/// using a singleton pattern with thread-safe access.
///
/// # Example
///
/// ```no_run
/// use lumiere_engine::lumiere::Engine;
/// use lumiere_engine_renderer_soft::SoftDevice;
///
/// // Initialize engine
/// Engine::initialize()?;
///
/// // Create a device singleton
/// Engine::create_device("main", SoftDevice::new(Default::default())?)?;
///
/// // Access it globally
/// let device = Engine::device("main")?;
///
/// // Cleanup
/// Engine::shutdown();
/// # Ok::<(), lumiere_engine::lumiere::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    ///
    /// This ensures all Engine errors are automatically logged with proper severity
    /// and source information, enabling better debugging and monitoring.
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("lumiere::Engine", "Initialization failed: {}", msg);
            }
            Error::BackendError(msg) => {
                crate::engine_error!("lumiere::Engine", "Backend error: {}", msg);
            }
            _ => {
                crate::engine_error!("lumiere::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    /// Initialize the engine
    ///
    /// This must be called once at application startup before creating any subsystems.
    /// Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns Result for future extensibility.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the entire engine and destroy all singletons
    ///
    /// This should be called at application shutdown to properly cleanup all subsystems.
    /// Existing device references remain valid until dropped.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut devices) = state.devices.write() {
                devices.clear();
            }
        }
        crate::engine_info!("lumiere::Engine", "Engine shut down");
    }

    /// Create and register a named graphics device
    ///
    /// This is a simplified API that automatically wraps the device in
    /// `Arc<Mutex<...>>` and registers it under the given name.
    ///
    /// # Arguments
    ///
    /// * `name` - Unique name for the device (e.g., "main")
    /// * `device` - Any type implementing the GraphicsDevice trait
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A device with this name already exists
    /// - The device lock is poisoned
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lumiere_engine::lumiere::Engine;
    /// use lumiere_engine_renderer_soft::SoftDevice;
    ///
    /// Engine::initialize()?;
    /// let device = Engine::create_device("main", SoftDevice::new(Default::default())?)?;
    /// # Ok::<(), lumiere_engine::lumiere::Error>(())
    /// ```
    pub fn create_device<D: GraphicsDevice + 'static>(
        name: &str,
        device: D,
    ) -> Result<Arc<Mutex<dyn GraphicsDevice>>> {
        // Wrap in Arc<Mutex<dyn GraphicsDevice>>
        let arc_device: Arc<Mutex<dyn GraphicsDevice>> = Arc::new(Mutex::new(device));

        // Register under its name
        Self::register_device(name, arc_device.clone())?;

        // Log successful creation
        crate::engine_info!("lumiere::Engine", "Graphics device '{}' created successfully", name);

        Ok(arc_device)
    }

    /// Register a graphics device under a name (internal use)
    ///
    /// This is called internally by create_device(). Marked pub(crate) to allow
    /// access from other modules if needed.
    pub(crate) fn register_device(
        name: &str,
        device: Arc<Mutex<dyn GraphicsDevice>>,
    ) -> Result<()> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))?;

        let mut lock = state.devices.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Device registry lock poisoned".to_string())
            ))?;

        if lock.contains_key(name) {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed(format!(
                    "Device '{}' already exists. Call Engine::destroy_device() first.", name
                ))
            ));
        }

        lock.insert(name.to_string(), device);
        Ok(())
    }

    /// Get a graphics device by name
    ///
    /// This provides global access to a device after it has been created.
    ///
    /// # Returns
    ///
    /// A shared pointer to the device wrapped in a Mutex for thread-safe access
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - No device with this name has been created
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lumiere_engine::lumiere::Engine;
    ///
    /// let device = Engine::device("main")?;
    /// let device_guard = device.lock().unwrap();
    /// // Use device_guard...
    /// # Ok::<(), lumiere_engine::lumiere::Error>(())
    /// ```
    pub fn device(name: &str) -> Result<Arc<Mutex<dyn GraphicsDevice>>> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))?;

        let lock = state.devices.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Device registry lock poisoned".to_string())
            ))?;

        lock.get(name).cloned()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed(format!(
                    "Device '{}' not created. Call Engine::create_device() first.", name
                ))
            ))
    }

    /// Destroy a graphics device by name
    ///
    /// Removes the device from the registry, allowing a new one to be created
    /// under the same name. Existing references remain valid until dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or the name is unknown
    pub fn destroy_device(name: &str) -> Result<()> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized".to_string())
            ))?;

        let mut lock = state.devices.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Device registry lock poisoned".to_string())
            ))?;

        if lock.remove(name).is_none() {
            return Err(Self::log_and_return_error(
                Error::InvalidResource(format!("Device '{}' does not exist", name))
            ));
        }

        // Log successful destruction
        crate::engine_info!("lumiere::Engine", "Graphics device '{}' destroyed", name);

        Ok(())
    }

    /// Number of registered graphics devices
    pub fn device_count() -> usize {
        ENGINE_STATE.get()
            .and_then(|state| state.devices.read().ok().map(|d| d.len()))
            .unwrap_or(0)
    }

    /// Names of all registered graphics devices
    pub fn device_names() -> Vec<String> {
        ENGINE_STATE.get()
            .and_then(|state| state.devices.read().ok().map(|d| d.keys().cloned().collect()))
            .unwrap_or_default()
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut devices) = state.devices.write() {
                devices.clear();
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger, network logger, etc.)
    ///
    /// # Arguments
    ///
    /// * `logger` - Any type implementing the Logger trait
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lumiere_engine::lumiere::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lumiere_engine::lumiere::Engine;
    ///
    /// Engine::reset_logger();
    /// ```
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level
    /// * `source` - Source module (e.g., "lumiere::Engine")
    /// * `message` - Log message
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error! macro to include source location.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level (typically Error)
    /// * `source` - Source module (e.g., "lumiere::Engine")
    /// * `message` - Log message
    /// * `file` - Source file path
    /// * `line` - Source line number
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
