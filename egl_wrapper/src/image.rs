//! `eglCreateImageKHR` on top of the driver's pixmap images.

use egl_wrapper_sys::egl;
use egl_wrapper_sys::egl::types::{EGLClientBuffer, EGLContext, EGLDisplay, EGLImageKHR, EGLenum, EGLint};

use crate::shim::{global, Shim};

/// Predicate selecting image attributes the driver doesn't understand.
///
/// Attributes it returns `true` for are dropped together with their value.
pub type AttribFilter = fn(EGLint) -> bool;

/// Attributes that only make sense for display-server buffers.
pub fn is_wayland_attrib(attrib: EGLint) -> bool {
    attrib == egl::WAYLAND_PLANE_WL as EGLint
}

/// The image target the driver is asked for instead of `target`.
///
/// Display-server buffers are handed to the driver as native pixmaps.
pub fn remap_target(target: EGLenum) -> EGLenum {
    if target == egl::WAYLAND_BUFFER_WL {
        egl::NATIVE_PIXMAP_KHR
    } else {
        target
    }
}

/// The key/value pairs of an `EGL_NONE` terminated attribute list.
struct AttribList {
    next: *const EGLint,
}

impl AttribList {
    /// # Safety
    ///
    /// `attrib_list` must be non-null and `EGL_NONE` terminated.
    unsafe fn new(attrib_list: *const EGLint) -> Self {
        Self { next: attrib_list }
    }
}

impl Iterator for AttribList {
    type Item = (EGLint, EGLint);

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: The list is terminated, so reading up to `EGL_NONE` and the
        // value after each key stays in bounds.
        unsafe {
            let key = *self.next;
            if key == egl::NONE as EGLint {
                return None;
            }

            let value = *self.next.add(1);
            self.next = self.next.add(2);
            Some((key, value))
        }
    }
}

/// Copy `attrib_list` without the attributes matching `filter`.
///
/// # Safety
///
/// `attrib_list` must be non-null and `EGL_NONE` terminated.
pub(crate) unsafe fn filter_attribs(attrib_list: *const EGLint, filter: AttribFilter) -> Vec<EGLint> {
    let mut filtered: Vec<EGLint> = unsafe { AttribList::new(attrib_list) }
        .filter(|&(key, _)| {
            let skip = filter(key);
            if skip {
                log::debug!("dropping image attribute {key:#x}");
            }
            !skip
        })
        .flat_map(|(key, value)| [key, value])
        .collect();
    filtered.push(egl::NONE as EGLint);
    filtered
}

impl Shim {
    /// `eglCreateImageKHR`, creating display-server buffer images through the
    /// driver's native pixmap path.
    ///
    /// # Safety
    ///
    /// Same as for the driver's `eglCreateImageKHR`.
    ///
    /// # Panics
    ///
    /// When the driver doesn't hand out `eglCreateImageKHR`.
    pub unsafe fn create_image(
        &self,
        dpy: EGLDisplay,
        ctx: EGLContext,
        target: EGLenum,
        buffer: EGLClientBuffer,
        attrib_list: *const EGLint,
    ) -> EGLImageKHR {
        let remapped = remap_target(target);
        if remapped != target {
            log::debug!("creating display-server buffer image as native pixmap");
        }

        match self.attrib_filter {
            Some(filter) if !attrib_list.is_null() => {
                let filtered = unsafe { filter_attribs(attrib_list, filter) };
                unsafe { self.egl().CreateImageKHR(dpy, ctx, remapped, buffer, filtered.as_ptr()) }
            },
            _ => unsafe { self.egl().CreateImageKHR(dpy, ctx, remapped, buffer, attrib_list) },
        }
    }
}

#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn eglCreateImageKHR(
    dpy: EGLDisplay,
    ctx: EGLContext,
    target: EGLenum,
    buffer: EGLClientBuffer,
    attrib_list: *const EGLint,
) -> EGLImageKHR {
    log::trace!("eglCreateImageKHR");
    unsafe { global().create_image(dpy, ctx, target, buffer, attrib_list) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaps_only_display_server_buffers() {
        assert_eq!(remap_target(egl::WAYLAND_BUFFER_WL), egl::NATIVE_PIXMAP_KHR);
        assert_eq!(remap_target(egl::NATIVE_PIXMAP_KHR), egl::NATIVE_PIXMAP_KHR);
        assert_eq!(remap_target(0x30B1), 0x30B1);
    }

    #[test]
    fn drops_filtered_pairs() {
        let attribs = [
            egl::WAYLAND_PLANE_WL as EGLint,
            1,
            egl::IMAGE_PRESERVED_KHR as EGLint,
            egl::TRUE as EGLint,
            egl::NONE as EGLint,
        ];
        let filtered = unsafe { filter_attribs(attribs.as_ptr(), is_wayland_attrib) };
        assert_eq!(filtered, [egl::IMAGE_PRESERVED_KHR as EGLint, egl::TRUE as EGLint, egl::NONE as EGLint]);
    }

    #[test]
    fn empty_list_stays_terminated() {
        let attribs = [egl::NONE as EGLint];
        let filtered = unsafe { filter_attribs(attribs.as_ptr(), is_wayland_attrib) };
        assert_eq!(filtered, [egl::NONE as EGLint]);
    }
}
