//! EGL types and tokens.
//!
//! Only the types and enumerants are provided. No entry point is declared here,
//! since the library using these definitions exports the EGL entry points
//! itself and resolves the real ones at runtime.

#![allow(non_camel_case_types)]
#![allow(clippy::unnecessary_cast)]

pub mod egl {
    pub type khronos_utime_nanoseconds_t = super::khronos_utime_nanoseconds_t;
    pub type khronos_uint64_t = super::khronos_uint64_t;
    pub type khronos_ssize_t = super::khronos_ssize_t;
    pub type EGLNativeDisplayType = super::EGLNativeDisplayType;
    pub type EGLNativePixmapType = super::EGLNativePixmapType;
    pub type EGLNativeWindowType = super::EGLNativeWindowType;
    pub type EGLint = super::EGLint;
    pub type NativeDisplayType = super::EGLNativeDisplayType;
    pub type NativePixmapType = super::EGLNativePixmapType;
    pub type NativeWindowType = super::EGLNativeWindowType;

    pub mod types {
        use std::os::raw;

        pub type EGLint = super::EGLint;
        pub type EGLBoolean = raw::c_uint;
        pub type EGLenum = raw::c_uint;
        pub type EGLConfig = *const raw::c_void;
        pub type EGLContext = *const raw::c_void;
        pub type EGLDisplay = *const raw::c_void;
        pub type EGLSurface = *const raw::c_void;
        pub type EGLClientBuffer = *const raw::c_void;
        pub type EGLImageKHR = *const raw::c_void;
        pub type EGLNativeDisplayType = super::EGLNativeDisplayType;
        pub type EGLNativePixmapType = super::EGLNativePixmapType;
        pub type EGLNativeWindowType = super::EGLNativeWindowType;

        /// What `eglGetProcAddress` hands out. Null when the name is unknown.
        pub type __eglMustCastToProperFunctionPointerType = *const raw::c_void;
    }

    use self::types::{EGLBoolean, EGLContext, EGLDisplay, EGLImageKHR, EGLSurface, EGLenum};

    // EGL 1.4.
    pub const FALSE: EGLBoolean = 0;
    pub const TRUE: EGLBoolean = 1;
    pub const DONT_CARE: EGLint = -1;
    pub const NONE: EGLenum = 0x3038;

    pub const DEFAULT_DISPLAY: EGLNativeDisplayType = std::ptr::null();
    pub const NO_CONTEXT: EGLContext = std::ptr::null();
    pub const NO_DISPLAY: EGLDisplay = std::ptr::null();
    pub const NO_SURFACE: EGLSurface = std::ptr::null();

    pub const SUCCESS: EGLenum = 0x3000;
    pub const NOT_INITIALIZED: EGLenum = 0x3001;
    pub const BAD_ACCESS: EGLenum = 0x3002;
    pub const BAD_ALLOC: EGLenum = 0x3003;
    pub const BAD_ATTRIBUTE: EGLenum = 0x3004;
    pub const BAD_CONFIG: EGLenum = 0x3005;
    pub const BAD_CONTEXT: EGLenum = 0x3006;
    pub const BAD_CURRENT_SURFACE: EGLenum = 0x3007;
    pub const BAD_DISPLAY: EGLenum = 0x3008;
    pub const BAD_MATCH: EGLenum = 0x3009;
    pub const BAD_NATIVE_PIXMAP: EGLenum = 0x300A;
    pub const BAD_NATIVE_WINDOW: EGLenum = 0x300B;
    pub const BAD_PARAMETER: EGLenum = 0x300C;
    pub const BAD_SURFACE: EGLenum = 0x300D;
    pub const CONTEXT_LOST: EGLenum = 0x300E;

    pub const VENDOR: EGLenum = 0x3053;
    pub const VERSION: EGLenum = 0x3054;
    pub const EXTENSIONS: EGLenum = 0x3055;
    pub const CLIENT_APIS: EGLenum = 0x308D;

    pub const HEIGHT: EGLenum = 0x3056;
    pub const WIDTH: EGLenum = 0x3057;
    pub const TEXTURE_FORMAT: EGLenum = 0x3080;
    pub const TEXTURE_TARGET: EGLenum = 0x3081;
    pub const NO_TEXTURE: EGLenum = 0x305C;
    pub const TEXTURE_RGB: EGLenum = 0x305D;
    pub const TEXTURE_RGBA: EGLenum = 0x305E;
    pub const TEXTURE_2D: EGLenum = 0x305F;

    pub const OPENGL_ES_API: EGLenum = 0x30A0;
    pub const OPENVG_API: EGLenum = 0x30A1;
    pub const OPENGL_API: EGLenum = 0x30A2;

    pub const DRAW: EGLenum = 0x3059;
    pub const READ: EGLenum = 0x305A;

    // EGL_KHR_image_base and EGL_KHR_image_pixmap.
    pub const NO_IMAGE_KHR: EGLImageKHR = std::ptr::null();
    pub const NATIVE_PIXMAP_KHR: EGLenum = 0x30B0;
    pub const IMAGE_PRESERVED_KHR: EGLenum = 0x30D2;

    // EGL_WL_bind_wayland_display.
    pub const WAYLAND_BUFFER_WL: EGLenum = 0x31D5;
    pub const WAYLAND_PLANE_WL: EGLenum = 0x31D6;
    pub const TEXTURE_Y_U_V_WL: EGLenum = 0x31D7;
    pub const TEXTURE_Y_UV_WL: EGLenum = 0x31D8;
    pub const TEXTURE_Y_XUXV_WL: EGLenum = 0x31D9;
    pub const TEXTURE_EXTERNAL_WL: EGLenum = 0x31DA;
    pub const WAYLAND_Y_INVERTED_WL: EGLenum = 0x31DB;
}

pub use self::egl::types::{EGLContext, EGLDisplay};

use std::os::raw;

pub type khronos_utime_nanoseconds_t = khronos_uint64_t;
pub type khronos_uint64_t = u64;
pub type khronos_ssize_t = raw::c_long;
pub type EGLint = i32;
pub type EGLenum = raw::c_uint;
pub type EGLNativeDisplayType = *const raw::c_void;
pub type EGLNativePixmapType = *const raw::c_void;
pub type EGLNativeWindowType = *const raw::c_void;
