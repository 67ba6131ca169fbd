//! `eglGetProcAddress`, handing out the locally implemented extensions.

use std::ffi::{c_char, c_void, CStr};

use egl_wrapper_sys::egl::types::__eglMustCastToProperFunctionPointerType;

use crate::dispatch::missing_entry_point;
use crate::shim::{global, Shim};

/// The local implementation of the extension function `name`, if there's one.
pub fn local_proc_address(name: &CStr) -> Option<*const c_void> {
    let addr = match name.to_bytes() {
        b"eglCreateImageKHR" => crate::image::eglCreateImageKHR as *const c_void,
        #[cfg(wayland_platform)]
        b"eglBindWaylandDisplayWL" => crate::wayland::bind_wayland_display as *const c_void,
        #[cfg(wayland_platform)]
        b"eglUnbindWaylandDisplayWL" => crate::wayland::unbind_wayland_display as *const c_void,
        #[cfg(wayland_platform)]
        b"eglQueryWaylandBufferWL" => crate::wayland::query_wayland_buffer as *const c_void,
        _ => return None,
    };

    Some(addr)
}

impl Shim {
    /// `eglGetProcAddress`, preferring the local extension functions over the
    /// driver's.
    ///
    /// # Safety
    ///
    /// `procname` is null or a nul terminated string.
    ///
    /// # Panics
    ///
    /// When a name that isn't local has to be looked up and the driver
    /// doesn't have `eglGetProcAddress`.
    pub unsafe fn get_proc_address(&self, procname: *const c_char) -> __eglMustCastToProperFunctionPointerType {
        let egl = self.egl();
        let driver_get_proc_address =
            egl.GetProcAddress.get_or_resolve(|name, _| egl.loader().lookup(name));

        if !procname.is_null() {
            let name = unsafe { CStr::from_ptr(procname) };
            if let Some(addr) = local_proc_address(name) {
                log::debug!("handing out local {name:?}");
                return addr;
            }
        }

        let driver_get_proc_address =
            driver_get_proc_address.unwrap_or_else(|| missing_entry_point(egl.GetProcAddress.name()));
        unsafe { driver_get_proc_address(procname) }
    }
}

#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn eglGetProcAddress(procname: *const c_char) -> __eglMustCastToProperFunctionPointerType {
    log::trace!("eglGetProcAddress");
    unsafe { global().get_proc_address(procname) }
}
