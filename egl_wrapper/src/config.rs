//! Runtime configuration of the wrapper.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::image::AttribFilter;

/// Environment variable overriding the path of the wrapped driver.
pub const DRIVER_PATH_ENV: &str = "LIBEGL";

/// The driver loaded when [`DRIVER_PATH_ENV`] isn't set.
pub const DEFAULT_DRIVER_PATH: &str = "libEGL-pvr.so";

/// The kernel buffer-management device opened when no buffer device was
/// captured from the display-open call.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/dri/card0";

/// Settings of a [`Shim`].
///
/// [`Shim`]: crate::Shim
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) driver_path: OsString,
    pub(crate) device_path: PathBuf,
    pub(crate) attrib_filter: Option<AttribFilter>,
}

impl Config {
    /// The configuration of the process-wide wrapper.
    ///
    /// The driver path is taken from [`DRIVER_PATH_ENV`], an unset or empty
    /// variable selects [`DEFAULT_DRIVER_PATH`].
    pub fn from_env() -> Self {
        let config = Self::default();
        match env::var_os(DRIVER_PATH_ENV) {
            Some(path) if !path.is_empty() => config.with_driver_path(path),
            _ => config,
        }
    }

    /// Path or soname of the driver to wrap.
    ///
    /// By default [`DEFAULT_DRIVER_PATH`] is used.
    #[inline]
    pub fn with_driver_path(mut self, driver_path: impl Into<OsString>) -> Self {
        self.driver_path = driver_path.into();
        self
    }

    /// The buffer device opened when binding a display server without a
    /// previously captured buffer device.
    ///
    /// By default [`DEFAULT_DEVICE_PATH`] is used.
    #[inline]
    pub fn with_device_path(mut self, device_path: impl Into<PathBuf>) -> Self {
        self.device_path = device_path.into();
        self
    }

    /// Strip attributes matching `filter` from image creation attribute lists
    /// before they reach the driver.
    ///
    /// By default attribute lists are passed unchanged.
    #[inline]
    pub fn with_attrib_filter(mut self, filter: AttribFilter) -> Self {
        self.attrib_filter = Some(filter);
        self
    }

    /// The driver that is going to be loaded.
    pub fn driver_path(&self) -> &OsStr {
        &self.driver_path
    }

    /// The buffer device used by the display-server bridge.
    pub fn device_path(&self) -> &Path {
        &self.device_path
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            driver_path: DEFAULT_DRIVER_PATH.into(),
            device_path: DEFAULT_DEVICE_PATH.into(),
            attrib_filter: None,
        }
    }
}
