//! The context every exported entry point runs against.

use std::fmt;

use egl_wrapper_sys::egl::types::{EGLDisplay, EGLNativeDisplayType};
use once_cell::sync::{Lazy, OnceCell};

use crate::config::Config;
use crate::egl::Egl;
use crate::extensions::ExtensionString;
use crate::image::AttribFilter;
use crate::lib_loading::{DriverLoader, SymbolSource};
#[cfg(wayland_platform)]
use crate::wayland::BufferBridge;

static SHIM: Lazy<Shim> = Lazy::new(|| {
    #[cfg(feature = "debug")]
    let _ = env_logger::try_init();

    let config = Config::from_env();
    log::debug!("wrapping EGL driver {:?}", config.driver_path());
    Shim::new(config)
});

/// The context of the exported entry points, created on the first call into
/// the library.
pub fn global() -> &'static Shim {
    &SHIM
}

/// Process-lifetime state of the wrapper.
///
/// Every cached value is written at most once, except for the display-server
/// binding which follows its own state machine.
pub struct Shim {
    egl: Egl,
    pub(crate) attrib_filter: Option<AttribFilter>,
    pub(crate) extensions: OnceCell<ExtensionString>,
    #[cfg(wayland_platform)]
    bridge: BufferBridge,
}

impl Shim {
    /// Wrap the driver named by `config`. The driver is loaded on first use.
    pub fn new(config: Config) -> Self {
        let loader = DriverLoader::new(config.driver_path.clone());
        Self::with_loader(loader, config)
    }

    /// Wrap an already available driver module.
    pub fn with_driver(driver: impl SymbolSource + 'static, config: Config) -> Self {
        Self::with_loader(DriverLoader::with_source(driver), config)
    }

    fn with_loader(loader: DriverLoader, config: Config) -> Self {
        Self {
            egl: Egl::new(loader),
            attrib_filter: config.attrib_filter,
            extensions: OnceCell::new(),
            #[cfg(wayland_platform)]
            bridge: BufferBridge::new(config.device_path),
        }
    }

    /// The driver entry points.
    #[inline]
    pub fn egl(&self) -> &Egl {
        &self.egl
    }

    /// The display-server buffer bridge.
    #[cfg(wayland_platform)]
    #[inline]
    pub fn bridge(&self) -> &BufferBridge {
        &self.bridge
    }

    /// `eglGetDisplay`, remembering buffer devices and display-server
    /// connections passed as the native display.
    ///
    /// # Safety
    ///
    /// `display_id` is null or points to a native display object.
    pub unsafe fn get_display(&self, display_id: EGLNativeDisplayType) -> EGLDisplay {
        #[cfg(wayland_platform)]
        unsafe { self.bridge.capture(display_id) };

        unsafe { self.egl.GetDisplay(display_id) }
    }
}

impl fmt::Debug for Shim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shim = f.debug_struct("Shim");
        shim.field("egl", &self.egl)
            .field("attrib_filter", &self.attrib_filter.is_some())
            .field("extensions", &self.extensions.get());
        #[cfg(wayland_platform)]
        shim.field("bridge", &self.bridge);
        shim.finish()
    }
}

#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn eglGetDisplay(display_id: EGLNativeDisplayType) -> EGLDisplay {
    log::trace!("eglGetDisplay");
    unsafe { global().get_display(display_id) }
}
