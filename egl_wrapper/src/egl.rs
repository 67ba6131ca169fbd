//! The table of driver entry points and the plain forwarding exports.

use std::ffi::{c_char, c_void, CStr};
use std::fmt;
use std::ptr;

use egl_wrapper_sys::egl::types::{
    EGLBoolean, EGLClientBuffer, EGLConfig, EGLContext, EGLDisplay, EGLImageKHR, EGLNativeDisplayType,
    EGLNativePixmapType, EGLNativeWindowType, EGLSurface, EGLenum, EGLint,
    __eglMustCastToProperFunctionPointerType,
};

use crate::dispatch::{egl_entry_points, Resolution};

egl_entry_points! {
    passthrough {
        Symbol fn BindAPI(api: EGLenum) -> EGLBoolean = eglBindAPI;
        Symbol fn BindTexImage(dpy: EGLDisplay, surface: EGLSurface, buffer: EGLint) -> EGLBoolean = eglBindTexImage;
        Symbol fn ChooseConfig(
            dpy: EGLDisplay,
            attrib_list: *const EGLint,
            configs: *mut EGLConfig,
            config_size: EGLint,
            num_config: *mut EGLint
        ) -> EGLBoolean = eglChooseConfig;
        Symbol fn CopyBuffers(dpy: EGLDisplay, surface: EGLSurface, target: EGLNativePixmapType) -> EGLBoolean = eglCopyBuffers;
        Symbol fn CreateContext(
            dpy: EGLDisplay,
            config: EGLConfig,
            share_context: EGLContext,
            attrib_list: *const EGLint
        ) -> EGLContext = eglCreateContext;
        Symbol fn CreatePbufferFromClientBuffer(
            dpy: EGLDisplay,
            buftype: EGLenum,
            buffer: EGLClientBuffer,
            config: EGLConfig,
            attrib_list: *const EGLint
        ) -> EGLSurface = eglCreatePbufferFromClientBuffer;
        Symbol fn CreatePbufferSurface(dpy: EGLDisplay, config: EGLConfig, attrib_list: *const EGLint) -> EGLSurface = eglCreatePbufferSurface;
        Symbol fn CreatePixmapSurface(
            dpy: EGLDisplay,
            config: EGLConfig,
            pixmap: EGLNativePixmapType,
            attrib_list: *const EGLint
        ) -> EGLSurface = eglCreatePixmapSurface;
        Symbol fn CreateWindowSurface(
            dpy: EGLDisplay,
            config: EGLConfig,
            win: EGLNativeWindowType,
            attrib_list: *const EGLint
        ) -> EGLSurface = eglCreateWindowSurface;
        Symbol fn DestroyContext(dpy: EGLDisplay, ctx: EGLContext) -> EGLBoolean = eglDestroyContext;
        Symbol fn DestroySurface(dpy: EGLDisplay, surface: EGLSurface) -> EGLBoolean = eglDestroySurface;
        Symbol fn GetConfigAttrib(
            dpy: EGLDisplay,
            config: EGLConfig,
            attribute: EGLint,
            value: *mut EGLint
        ) -> EGLBoolean = eglGetConfigAttrib;
        Symbol fn GetConfigs(
            dpy: EGLDisplay,
            configs: *mut EGLConfig,
            config_size: EGLint,
            num_config: *mut EGLint
        ) -> EGLBoolean = eglGetConfigs;
        Symbol fn GetCurrentContext() -> EGLContext = eglGetCurrentContext;
        Symbol fn GetCurrentDisplay() -> EGLDisplay = eglGetCurrentDisplay;
        Symbol fn GetCurrentSurface(readdraw: EGLint) -> EGLSurface = eglGetCurrentSurface;
        Symbol fn GetError() -> EGLint = eglGetError;
        Symbol fn Initialize(dpy: EGLDisplay, major: *mut EGLint, minor: *mut EGLint) -> EGLBoolean = eglInitialize;
        Symbol fn MakeCurrent(dpy: EGLDisplay, draw: EGLSurface, read: EGLSurface, ctx: EGLContext) -> EGLBoolean = eglMakeCurrent;
        Symbol fn QueryAPI() -> EGLenum = eglQueryAPI;
        Symbol fn QueryContext(dpy: EGLDisplay, ctx: EGLContext, attribute: EGLint, value: *mut EGLint) -> EGLBoolean = eglQueryContext;
        Symbol fn QuerySurface(dpy: EGLDisplay, surface: EGLSurface, attribute: EGLint, value: *mut EGLint) -> EGLBoolean = eglQuerySurface;
        Symbol fn ReleaseTexImage(dpy: EGLDisplay, surface: EGLSurface, buffer: EGLint) -> EGLBoolean = eglReleaseTexImage;
        Symbol fn ReleaseThread() -> EGLBoolean = eglReleaseThread;
        Symbol fn SurfaceAttrib(dpy: EGLDisplay, surface: EGLSurface, attribute: EGLint, value: EGLint) -> EGLBoolean = eglSurfaceAttrib;
        Symbol fn SwapBuffers(dpy: EGLDisplay, surface: EGLSurface) -> EGLBoolean = eglSwapBuffers;
        Symbol fn SwapInterval(dpy: EGLDisplay, interval: EGLint) -> EGLBoolean = eglSwapInterval;
        Symbol fn Terminate(dpy: EGLDisplay) -> EGLBoolean = eglTerminate;
        Symbol fn WaitClient() -> EGLBoolean = eglWaitClient;
        Symbol fn WaitGL() -> EGLBoolean = eglWaitGL;
        Symbol fn WaitNative(engine: EGLint) -> EGLBoolean = eglWaitNative;

        // EGL_KHR_image_base.
        Extension fn DestroyImageKHR(dpy: EGLDisplay, image: EGLImageKHR) -> EGLBoolean = eglDestroyImageKHR;
    }
    intercepted {
        Symbol fn GetDisplay(display_id: EGLNativeDisplayType) -> EGLDisplay = eglGetDisplay;
        Symbol fn QueryString(dpy: EGLDisplay, name: EGLint) -> *const c_char = eglQueryString;
        Symbol fn GetProcAddress(procname: *const c_char) -> __eglMustCastToProperFunctionPointerType = eglGetProcAddress;

        // The driver doesn't export it, it's only handed out by `eglGetProcAddress`.
        ProcAddress fn CreateImageKHR(
            dpy: EGLDisplay,
            ctx: EGLContext,
            target: EGLenum,
            buffer: EGLClientBuffer,
            attrib_list: *const EGLint
        ) -> EGLImageKHR = eglCreateImageKHR;
    }
}

impl Egl {
    fn resolve(&self, name: &CStr, resolution: Resolution) -> *const c_void {
        match resolution {
            Resolution::Symbol => self.loader.lookup(name),
            Resolution::Extension => {
                let addr = self.loader.lookup(name);
                if addr.is_null() {
                    self.driver_proc_address(name)
                } else {
                    addr
                }
            },
            Resolution::ProcAddress => self.driver_proc_address(name),
        }
    }

    /// Ask the driver's own `eglGetProcAddress` for `name`.
    ///
    /// Null if the driver doesn't know `name` or doesn't have
    /// `eglGetProcAddress` at all.
    pub fn driver_proc_address(&self, name: &CStr) -> *const c_void {
        match self.GetProcAddress.get_or_resolve(|name, res| self.resolve(name, res)) {
            // SAFETY: `name` is a valid nul terminated string.
            Some(get_proc_address) => unsafe { get_proc_address(name.as_ptr()) },
            None => ptr::null(),
        }
    }

    /// The loader the entry points are resolved with.
    pub fn loader(&self) -> &crate::lib_loading::DriverLoader {
        &self.loader
    }
}

impl fmt::Debug for Egl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Egl").field("loader", &self.loader).finish_non_exhaustive()
    }
}
