//! A fake driver counting how often each symbol is looked up.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::{c_char, c_void, CStr};
use std::ptr;
use std::sync::{Arc, Mutex};

use egl_wrapper::SymbolSource;
use egl_wrapper_sys::egl;
use egl_wrapper_sys::egl::types::*;

/// What [`get_proc_address`] returns for `eglFakeSentinel`.
pub const SENTINEL: *const c_void = 0xdead_0000 as *const c_void;

/// The image handle [`create_image`] returns.
pub const IMAGE: EGLImageKHR = 0x1111_0000 as EGLImageKHR;

pub const DRIVER_EXTENSIONS: &CStr = c"EGL_KHR_image_base EGL_KHR_image_pixmap";
pub const DRIVER_VENDOR: &CStr = c"Fake Vendor";

thread_local! {
    /// The target of the last `eglCreateImageKHR` call on this thread.
    pub static IMAGE_TARGET: Cell<Option<EGLenum>> = const { Cell::new(None) };

    /// The attribute list of the last `eglCreateImageKHR` call on this thread.
    pub static IMAGE_ATTRIBS: Cell<*const EGLint> = const { Cell::new(ptr::null()) };

    /// A copy of that attribute list, including the terminating `EGL_NONE`.
    pub static IMAGE_ATTRIB_VALUES: RefCell<Vec<EGLint>> = const { RefCell::new(Vec::new()) };

    /// The number of `eglQueryString(EGL_EXTENSIONS)` calls on this thread.
    pub static EXTENSION_QUERIES: Cell<usize> = const { Cell::new(0) };
}

pub unsafe extern "system" fn get_error() -> EGLint {
    egl::SUCCESS as EGLint
}

pub unsafe extern "system" fn initialize(dpy: EGLDisplay, major: *mut EGLint, minor: *mut EGLint) -> EGLBoolean {
    if dpy.is_null() {
        return egl::FALSE;
    }

    unsafe {
        *major = 1;
        *minor = 4;
    }
    egl::TRUE
}

pub unsafe extern "system" fn get_display(display_id: EGLNativeDisplayType) -> EGLDisplay {
    if display_id.is_null() {
        0x1 as EGLDisplay
    } else {
        display_id
    }
}

pub unsafe extern "system" fn query_string(_: EGLDisplay, name: EGLint) -> *const c_char {
    match name as EGLenum {
        egl::EXTENSIONS => {
            EXTENSION_QUERIES.with(|queries| queries.set(queries.get() + 1));
            DRIVER_EXTENSIONS.as_ptr()
        },
        egl::VENDOR => DRIVER_VENDOR.as_ptr(),
        _ => ptr::null(),
    }
}

pub unsafe extern "system" fn create_image(
    _: EGLDisplay,
    _: EGLContext,
    target: EGLenum,
    _: EGLClientBuffer,
    attrib_list: *const EGLint,
) -> EGLImageKHR {
    IMAGE_TARGET.with(|last| last.set(Some(target)));
    IMAGE_ATTRIBS.with(|last| last.set(attrib_list));
    IMAGE_ATTRIB_VALUES.with(|values| {
        let mut values = values.borrow_mut();
        values.clear();
        if attrib_list.is_null() {
            return;
        }

        let mut next = attrib_list;
        loop {
            let key = unsafe { *next };
            values.push(key);
            if key == egl::NONE as EGLint {
                break;
            }
            values.push(unsafe { *next.add(1) });
            next = unsafe { next.add(2) };
        }
    });
    IMAGE
}

pub unsafe extern "system" fn destroy_image(_: EGLDisplay, image: EGLImageKHR) -> EGLBoolean {
    if image == IMAGE {
        egl::TRUE
    } else {
        egl::FALSE
    }
}

pub unsafe extern "system" fn get_proc_address(name: *const c_char) -> *const c_void {
    match unsafe { CStr::from_ptr(name) }.to_bytes() {
        b"eglCreateImageKHR" => create_image as *const c_void,
        b"eglDestroyImageKHR" => destroy_image as *const c_void,
        b"eglFakeSentinel" => SENTINEL,
        _ => ptr::null(),
    }
}

/// Every symbol the fake driver can export.
pub fn all_symbols() -> Vec<(&'static str, *const c_void)> {
    vec![
        ("eglGetError", get_error as *const c_void),
        ("eglInitialize", initialize as *const c_void),
        ("eglGetDisplay", get_display as *const c_void),
        ("eglQueryString", query_string as *const c_void),
        ("eglGetProcAddress", get_proc_address as *const c_void),
    ]
}

/// Lookups per symbol name, shared with the driver handed to the wrapper.
#[derive(Clone, Default)]
pub struct Lookups(Arc<Mutex<HashMap<String, usize>>>);

impl Lookups {
    pub fn count(&self, name: &str) -> usize {
        self.0.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    fn record(&self, name: &str) {
        *self.0.lock().unwrap().entry(name.to_owned()).or_default() += 1;
    }
}

pub struct FakeDriver {
    symbols: HashMap<&'static str, usize>,
    lookups: Lookups,
}

impl FakeDriver {
    /// A driver exporting every fake symbol.
    pub fn new() -> (Self, Lookups) {
        Self::exporting(&all_symbols().iter().map(|(name, _)| *name).collect::<Vec<_>>())
    }

    /// A driver exporting only `names`.
    pub fn exporting(names: &[&str]) -> (Self, Lookups) {
        let symbols = all_symbols()
            .into_iter()
            .filter(|(name, _)| names.contains(name))
            .map(|(name, addr)| (name, addr as usize))
            .collect();
        let lookups = Lookups::default();
        (Self { symbols, lookups: lookups.clone() }, lookups)
    }
}

impl SymbolSource for FakeDriver {
    fn lookup(&self, name: &CStr) -> *const c_void {
        let name = name.to_str().unwrap();
        self.lookups.record(name);
        self.symbols.get(name).map_or(ptr::null(), |&addr| addr as *const c_void)
    }
}
