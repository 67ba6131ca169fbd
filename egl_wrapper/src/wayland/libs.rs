//! The buffer device and protocol bridge libraries.

use std::ffi::{c_char, c_int};
use std::fmt;

use egl_wrapper_sys::egl;
use egl_wrapper_sys::egl::types::EGLint;
use libloading::os::unix::{Library, RTLD_LAZY};
use wayland_sys::client::wl_display as wl_client_display;
use wayland_sys::server::{wl_display, wl_resource};

use crate::error::{Error, ErrorKind, Result};

/// The buffer allocation library.
pub(crate) const GBM_LIBRARY: &str = "libgbm.so.1";

/// The library implementing the `wl_kms` protocol.
pub(crate) const WAYLAND_KMS_LIBRARY: &str = "libwayland-kms.so.1";

/// Opaque `struct gbm_device`.
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct gbm_device {
    _private: [u8; 0],
}

/// Opaque `struct wl_kms`.
#[allow(non_camel_case_types)]
#[repr(C)]
pub struct wl_kms {
    _private: [u8; 0],
}

/// `enum wl_kms_attribute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub(crate) enum KmsAttribute {
    Width = 0,
    Height = 1,
    TextureFormat = 2,
}

impl KmsAttribute {
    /// The protocol attribute for the EGL buffer attribute `attribute`.
    pub(crate) fn from_egl(attribute: EGLint) -> Option<Self> {
        match attribute as egl::types::EGLenum {
            egl::WIDTH => Some(Self::Width),
            egl::HEIGHT => Some(Self::Height),
            egl::TEXTURE_FORMAT => Some(Self::TextureFormat),
            _ => None,
        }
    }
}

pub(crate) type GbmCreateDevice = unsafe extern "C" fn(fd: c_int) -> *mut gbm_device;
pub(crate) type GbmDeviceGetFd = unsafe extern "C" fn(gbm: *mut gbm_device) -> c_int;
pub(crate) type WaylandKmsInit = unsafe extern "C" fn(
    display: *mut wl_display,
    client: *mut wl_client_display,
    device_name: *const c_char,
    fd: c_int,
) -> *mut wl_kms;
pub(crate) type WaylandKmsUninit = unsafe extern "C" fn(kms: *mut wl_kms);
pub(crate) type WaylandKmsQueryBuffer = unsafe extern "C" fn(
    kms: *mut wl_kms,
    buffer: *mut wl_resource,
    attribute: c_int,
    value: *mut c_int,
) -> c_int;

/// The used part of `libgbm`.
pub(crate) struct Gbm {
    pub(crate) create_device: GbmCreateDevice,
    pub(crate) device_get_fd: GbmDeviceGetFd,
    _lib: Option<Library>,
}

impl Gbm {
    #[cfg(test)]
    pub(crate) fn new(create_device: GbmCreateDevice, device_get_fd: GbmDeviceGetFd) -> Self {
        Self { create_device, device_get_fd, _lib: None }
    }

    fn open() -> Result<Self> {
        let lib = open(GBM_LIBRARY)?;
        unsafe {
            Ok(Self {
                create_device: symbol(&lib, GBM_LIBRARY, b"gbm_create_device\0")?,
                device_get_fd: symbol(&lib, GBM_LIBRARY, b"gbm_device_get_fd\0")?,
                _lib: Some(lib),
            })
        }
    }
}

/// The used part of `libwayland-kms`.
pub(crate) struct WaylandKms {
    pub(crate) init: WaylandKmsInit,
    pub(crate) uninit: WaylandKmsUninit,
    pub(crate) query_buffer: WaylandKmsQueryBuffer,
    _lib: Option<Library>,
}

impl WaylandKms {
    #[cfg(test)]
    pub(crate) fn new(
        init: WaylandKmsInit,
        uninit: WaylandKmsUninit,
        query_buffer: WaylandKmsQueryBuffer,
    ) -> Self {
        Self { init, uninit, query_buffer, _lib: None }
    }

    fn open() -> Result<Self> {
        let lib = open(WAYLAND_KMS_LIBRARY)?;
        unsafe {
            Ok(Self {
                init: symbol(&lib, WAYLAND_KMS_LIBRARY, b"wayland_kms_init\0")?,
                uninit: symbol(&lib, WAYLAND_KMS_LIBRARY, b"wayland_kms_uninit\0")?,
                query_buffer: symbol(&lib, WAYLAND_KMS_LIBRARY, b"wayland_kms_query_buffer\0")?,
                _lib: Some(lib),
            })
        }
    }
}

/// The helper libraries of the bridge.
pub(crate) struct Libraries {
    pub(crate) gbm: Gbm,
    pub(crate) kms: WaylandKms,
}

impl Libraries {
    pub(crate) fn open() -> Result<Self> {
        let libraries = Self { gbm: Gbm::open()?, kms: WaylandKms::open()? };
        log::debug!("loaded {GBM_LIBRARY} and {WAYLAND_KMS_LIBRARY}");
        Ok(libraries)
    }
}

impl fmt::Debug for Libraries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Libraries")
            .field("gbm", &(self.gbm.create_device as *const ()))
            .field("kms", &(self.kms.init as *const ()))
            .finish()
    }
}

fn open(name: &str) -> Result<Library> {
    // SAFETY: Both libraries are plain C libraries without unsound
    // initializers.
    unsafe { Library::open(Some(name), RTLD_LAZY) }.map_err(|err| {
        log::warn!("failed to load {name}: {err}");
        Error::from_dl(&err, ErrorKind::NotFound)
    })
}

/// # Safety
///
/// `T` must be the type of the symbol.
unsafe fn symbol<T: Copy>(lib: &Library, lib_name: &str, name: &[u8]) -> Result<T> {
    match unsafe { lib.get::<T>(name) } {
        Ok(sym) => Ok(*sym),
        Err(err) => {
            log::warn!("{lib_name} has no {}: {err}", String::from_utf8_lossy(name));
            Err(Error::from_dl(&err, ErrorKind::NotFound))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_buffer_attributes() {
        assert_eq!(KmsAttribute::from_egl(egl::WIDTH as EGLint), Some(KmsAttribute::Width));
        assert_eq!(KmsAttribute::from_egl(egl::HEIGHT as EGLint), Some(KmsAttribute::Height));
        assert_eq!(
            KmsAttribute::from_egl(egl::TEXTURE_FORMAT as EGLint),
            Some(KmsAttribute::TextureFormat)
        );
        assert_eq!(KmsAttribute::from_egl(egl::WAYLAND_Y_INVERTED_WL as EGLint), None);
    }
}
