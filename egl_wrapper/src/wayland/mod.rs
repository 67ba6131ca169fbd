//! `EGL_WL_bind_wayland_display` for drivers that don't implement it.
//!
//! Buffers are shared with the `wl_kms` protocol from `libwayland-kms`, backed
//! by a gbm device. The device is either the one the application passed to
//! `eglGetDisplay` or a new one on the default card.
//!
//! Binding isn't meant to race with itself, compositors bind once while
//! setting up.

use std::ffi::{c_int, CString};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::ffi::OsStringExt;
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use egl_wrapper_sys::egl;
use egl_wrapper_sys::egl::types::{EGLBoolean, EGLDisplay, EGLNativeDisplayType, EGLint};
use once_cell::sync::OnceCell;
use wayland_sys::client::wl_display as wl_client_display;
use wayland_sys::server::{wl_display, wl_resource};

use crate::error::{Error, ErrorKind, Result};
use crate::shim::global;

mod libs;
mod native_display;

use libs::{gbm_device, wl_kms, KmsAttribute, Libraries};
#[cfg(test)]
use libs::{Gbm, WaylandKms};
pub use native_display::{read_head, DisplayMarkers, Marker, MarkerProbe, NativeDisplayKind};

/// The gbm device buffers are allocated from.
struct GbmDevice {
    raw: *mut gbm_device,

    /// The card, when the device was created here.
    _fd: Option<OwnedFd>,
}

// SAFETY: The device is only handed to the thread-safe gbm and wl_kms entry
// points.
unsafe impl Send for GbmDevice {}
unsafe impl Sync for GbmDevice {}

/// The client connection passed to `eglGetDisplay`.
#[derive(Clone, Copy)]
struct ClientDisplay(*mut wl_client_display);

// SAFETY: The connection is only passed on to `wayland_kms_init`.
unsafe impl Send for ClientDisplay {}
unsafe impl Sync for ClientDisplay {}

/// An established `wl_kms` binding.
struct KmsBinding {
    kms: *mut wl_kms,
    display: *mut wl_display,

    /// Kept alive for the binding in case `wl_kms` doesn't copy it.
    _device_name: CString,
}

// SAFETY: The binding is only touched with the bridge lock held.
unsafe impl Send for KmsBinding {}

/// The display-server side of `EGL_WL_bind_wayland_display`.
pub struct BufferBridge {
    device_path: PathBuf,
    libraries: OnceCell<Libraries>,
    markers: DisplayMarkers,
    device: OnceCell<GbmDevice>,
    client_display: OnceCell<ClientDisplay>,
    binding: Mutex<Option<KmsBinding>>,
}

impl BufferBridge {
    /// A bridge opening `device_path` when no gbm device was captured.
    pub fn new(device_path: impl Into<PathBuf>) -> Self {
        Self {
            device_path: device_path.into(),
            libraries: OnceCell::new(),
            markers: DisplayMarkers::loaded(),
            device: OnceCell::new(),
            client_display: OnceCell::new(),
            binding: Mutex::new(None),
        }
    }

    #[cfg(test)]
    fn with_libraries(device_path: impl Into<PathBuf>, libraries: Libraries) -> Self {
        let bridge = Self::new(device_path);
        let _ = bridge.libraries.set(libraries);
        bridge
    }

    #[cfg(test)]
    fn with_markers(mut self, markers: DisplayMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Remember `display_id` if it's a gbm device or a client connection.
    ///
    /// Each kind is remembered once, later displays of the same kind are
    /// ignored.
    ///
    /// # Safety
    ///
    /// `display_id` is null or points to a native display object.
    pub unsafe fn capture(&self, display_id: EGLNativeDisplayType) {
        let Some(head) = (unsafe { read_head(display_id) }) else {
            return;
        };
        let Some(kind) = self.markers.classify(head) else {
            log::trace!("{display_id:p} is not a display the bridge uses");
            return;
        };

        let captured = match kind {
            NativeDisplayKind::GbmDevice => {
                let device = GbmDevice { raw: display_id as *mut gbm_device, _fd: None };
                self.device.set(device).is_ok()
            },
            NativeDisplayKind::WaylandDisplay => {
                let display = ClientDisplay(display_id as *mut wl_client_display);
                self.client_display.set(display).is_ok()
            },
        };

        if captured {
            log::debug!("captured {kind:?} {display_id:p}");
        }
    }

    /// Start sharing buffers with the clients of `display`.
    ///
    /// # Safety
    ///
    /// `display` must be a valid server display.
    pub unsafe fn bind(&self, display: *mut wl_display) -> Result<()> {
        let mut binding = self.lock();
        if binding.is_some() {
            return Err(ErrorKind::AlreadyBound.into());
        }

        let libraries = self.libraries.get_or_try_init(Libraries::open)?;
        let device = self.device.get_or_try_init(|| self.open_device(libraries))?;

        let fd = unsafe { (libraries.gbm.device_get_fd)(device.raw) };
        let device_name = device_name(fd).unwrap_or_else(|| self.device_path.clone());
        let device_name = CString::new(device_name.into_os_string().into_vec())
            .map_err(|_| Error::from(ErrorKind::BadParameter))?;
        log::debug!("binding wl_kms to {device_name:?}");

        let client = self.client_display.get().map_or(ptr::null_mut(), |client| client.0);
        let kms = unsafe { (libraries.kms.init)(display, client, device_name.as_ptr(), fd) };
        if kms.is_null() {
            return Err(ErrorKind::InitializationFailed.into());
        }

        *binding = Some(KmsBinding { kms, display, _device_name: device_name });
        Ok(())
    }

    /// Stop sharing buffers, doing nothing when not bound.
    pub fn unbind(&self, display: *mut wl_display) -> Result<()> {
        let Some(binding) = self.lock().take() else {
            return Ok(());
        };

        if binding.display != display {
            log::warn!("unbinding {:p} through {display:p}", binding.display);
        }

        if let Some(libraries) = self.libraries.get() {
            unsafe { (libraries.kms.uninit)(binding.kms) };
        }

        log::debug!("unbound wl_kms");
        Ok(())
    }

    /// Query `attribute` of the client buffer `buffer`.
    ///
    /// # Safety
    ///
    /// `buffer` must be a valid buffer resource of the bound display.
    pub unsafe fn query_buffer(&self, buffer: *mut wl_resource, attribute: EGLint) -> Result<EGLint> {
        let attribute = KmsAttribute::from_egl(attribute).ok_or(ErrorKind::BadAttribute)?;

        let binding = self.lock();
        let binding = binding.as_ref().ok_or(ErrorKind::NotBound)?;
        let libraries = self.libraries.get().ok_or(ErrorKind::NotBound)?;

        let mut value: c_int = 0;
        let ret = unsafe { (libraries.kms.query_buffer)(binding.kms, buffer, attribute as c_int, &mut value) };
        if ret != 0 {
            return Err(Error::new(Some(ret.into()), None, ErrorKind::Misc));
        }

        Ok(value as EGLint)
    }

    /// Whether a display server is bound.
    pub fn is_bound(&self) -> bool {
        self.lock().is_some()
    }

    fn open_device(&self, libraries: &Libraries) -> Result<GbmDevice> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.device_path)
            .map_err(|err| Error::from_io(&err, ErrorKind::ResourceUnavailable))?;
        let fd = OwnedFd::from(file);

        let raw = unsafe { (libraries.gbm.create_device)(fd.as_raw_fd()) };
        if raw.is_null() {
            let msg = format!("no gbm device for {}", self.device_path.display());
            return Err(Error::new(None, Some(msg), ErrorKind::ResourceUnavailable));
        }

        log::debug!("created gbm device on {}", self.device_path.display());
        Ok(GbmDevice { raw, _fd: Some(fd) })
    }

    fn lock(&self) -> MutexGuard<'_, Option<KmsBinding>> {
        self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The device opened when no gbm device was captured.
    pub fn device_path(&self) -> &Path {
        &self.device_path
    }
}

impl fmt::Debug for BufferBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferBridge")
            .field("device_path", &self.device_path)
            .field("libraries", &self.libraries.get())
            .field("markers", &self.markers)
            .field("device", &self.device.get().map(|device| device.raw))
            .field("client_display", &self.client_display.get().map(|client| client.0))
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// The path of the file behind `fd`.
fn device_name(fd: c_int) -> Option<PathBuf> {
    if fd < 0 {
        return None;
    }

    fs::read_link(format!("/proc/self/fd/{fd}")).ok()
}

fn egl_bool(result: Result<()>, entry_point: &str) -> EGLBoolean {
    match result {
        Ok(()) => egl::TRUE,
        Err(err) => {
            log::warn!("{entry_point} failed: {err}");
            egl::FALSE
        },
    }
}

/// `eglBindWaylandDisplayWL`.
pub unsafe extern "system" fn bind_wayland_display(_dpy: EGLDisplay, display: *mut wl_display) -> EGLBoolean {
    log::trace!("eglBindWaylandDisplayWL");
    egl_bool(unsafe { global().bridge().bind(display) }, "eglBindWaylandDisplayWL")
}

/// `eglUnbindWaylandDisplayWL`.
pub unsafe extern "system" fn unbind_wayland_display(_dpy: EGLDisplay, display: *mut wl_display) -> EGLBoolean {
    log::trace!("eglUnbindWaylandDisplayWL");
    egl_bool(global().bridge().unbind(display), "eglUnbindWaylandDisplayWL")
}

/// `eglQueryWaylandBufferWL`.
pub unsafe extern "system" fn query_wayland_buffer(
    _dpy: EGLDisplay,
    buffer: *mut wl_resource,
    attribute: EGLint,
    value: *mut EGLint,
) -> EGLBoolean {
    log::trace!("eglQueryWaylandBufferWL");
    let result = if value.is_null() {
        Err(ErrorKind::BadParameter.into())
    } else {
        unsafe { global().bridge().query_buffer(buffer, attribute) }.map(|queried| unsafe { *value = queried })
    };

    egl_bool(result, "eglQueryWaylandBufferWL")
}
