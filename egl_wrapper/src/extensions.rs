//! Advertising extensions the driver doesn't implement itself.

use std::ffi::{c_char, CStr, CString};
use std::fmt;

use egl_wrapper_sys::egl;
use egl_wrapper_sys::egl::types::{EGLDisplay, EGLint};

use crate::error::{ErrorKind, Result};
use crate::shim::{global, Shim};

/// The extension implemented on top of the driver.
pub const WAYLAND_BIND_EXTENSION: &str = "EGL_WL_bind_wayland_display";

/// The extension list handed out for `EGL_EXTENSIONS`.
pub(crate) enum ExtensionString {
    /// The driver's list with the local extensions appended.
    Augmented(CString),

    /// The driver's own list, used when the local extensions are already
    /// there or the augmented list couldn't be allocated.
    Driver(DriverString),
}

impl ExtensionString {
    fn new(driver: &'static CStr) -> Self {
        match augment(driver) {
            Ok(Some(augmented)) => {
                log::debug!("advertising {WAYLAND_BIND_EXTENSION}");
                Self::Augmented(augmented)
            },
            Ok(None) => Self::Driver(DriverString(driver.as_ptr())),
            Err(err) => {
                log::warn!("not advertising {WAYLAND_BIND_EXTENSION}: {err}");
                Self::Driver(DriverString(driver.as_ptr()))
            },
        }
    }

    fn as_ptr(&self) -> *const c_char {
        match self {
            Self::Augmented(string) => string.as_ptr(),
            Self::Driver(string) => string.0,
        }
    }
}

impl fmt::Debug for ExtensionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Augmented(string) => f.debug_tuple("Augmented").field(string).finish(),
            Self::Driver(string) => f.debug_tuple("Driver").field(&string.0).finish(),
        }
    }
}

/// A string owned by the driver, valid for as long as the driver is loaded.
pub(crate) struct DriverString(*const c_char);

// SAFETY: The string is immutable and the driver is never unloaded.
unsafe impl Send for DriverString {}
unsafe impl Sync for DriverString {}

/// Append [`WAYLAND_BIND_EXTENSION`] to the space separated `extensions`.
///
/// `None` when the extension is already listed.
pub(crate) fn augment(extensions: &CStr) -> Result<Option<CString>> {
    let extensions = extensions.to_bytes();
    let listed = extensions
        .split(|&byte| byte == b' ')
        .any(|token| token == WAYLAND_BIND_EXTENSION.as_bytes());
    if listed {
        return Ok(None);
    }

    let separator = !extensions.is_empty() && !extensions.ends_with(b" ");
    let mut augmented =
        buffer(extensions.len() + usize::from(separator) + WAYLAND_BIND_EXTENSION.len() + 2)?;

    augmented.extend_from_slice(extensions);
    if separator {
        augmented.push(b' ');
    }
    augmented.extend_from_slice(WAYLAND_BIND_EXTENSION.as_bytes());
    augmented.push(b' ');

    // The driver's string came from a `CStr`, so there's no interior nul.
    Ok(CString::new(augmented).ok())
}

fn buffer(capacity: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(capacity).map_err(|_| ErrorKind::OutOfMemory)?;
    Ok(buffer)
}

impl Shim {
    /// `eglQueryString`, with the local extensions appended to
    /// `EGL_EXTENSIONS`.
    ///
    /// The extension list is built from the first answer of the driver and
    /// then handed out for every display.
    ///
    /// # Safety
    ///
    /// Same as for the driver's `eglQueryString`.
    ///
    /// # Panics
    ///
    /// When the driver answers `EGL_EXTENSIONS` with null.
    pub unsafe fn query_string(&self, dpy: EGLDisplay, name: EGLint) -> *const c_char {
        if cfg!(wayland_platform) && name == egl::EXTENSIONS as EGLint {
            if let Some(extensions) = self.extensions.get() {
                return extensions.as_ptr();
            }

            let driver = unsafe { self.egl().QueryString(dpy, name) };
            assert!(!driver.is_null(), "eglQueryString(EGL_EXTENSIONS) returned null");
            // SAFETY: The driver returns a nul terminated string that lives as long
            // as the driver is loaded.
            let driver: &'static CStr = unsafe { CStr::from_ptr(driver) };
            return self.extensions.get_or_init(|| ExtensionString::new(driver)).as_ptr();
        }

        unsafe { self.egl().QueryString(dpy, name) }
    }
}

#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn eglQueryString(dpy: EGLDisplay, name: EGLint) -> *const c_char {
    log::trace!("eglQueryString");
    unsafe { global().query_string(dpy, name) }
}
