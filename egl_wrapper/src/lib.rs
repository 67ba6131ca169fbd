//! An EGL library wrapping a vendor driver that lacks display-server support.
//!
//! The library exports the EGL 1.4 entry points and forwards every call to
//! the driver, which is loaded on first use from the path in the `LIBEGL`
//! environment variable or [`DEFAULT_DRIVER_PATH`]. A few entry points are
//! interposed to implement `EGL_WL_bind_wayland_display` on top of the
//! driver's native pixmap images:
//!
//! - `eglGetDisplay` remembers gbm devices and client connections passed as the
//!   native display.
//! - `eglQueryString` appends the extension to `EGL_EXTENSIONS`.
//! - `eglGetProcAddress` hands out the local extension functions.
//! - `eglCreateImageKHR` creates display-server buffer images as native pixmap
//!   images.
//!
//! The same machinery is available as a library through [`Shim`], which is what
//! the exported entry points run against.
//!
//! [`DEFAULT_DRIVER_PATH`]: crate::config::DEFAULT_DRIVER_PATH

#![deny(rust_2018_idioms)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(missing_debug_implementations)]
#![cfg_attr(clippy, deny(warnings))]

#[cfg(not(unix))]
compile_error!("The EGL wrapper only supports unix systems.");

pub mod config;
mod dispatch;
pub mod egl;
pub mod error;
pub mod extensions;
pub mod image;
pub mod lib_loading;
pub mod proc_address;
pub mod shim;
#[cfg(wayland_platform)]
pub mod wayland;

pub use config::Config;
pub use dispatch::{Resolution, Slot};
pub use error::{Error, ErrorKind, Result};
pub use lib_loading::{DriverLoader, SymbolSource};
pub use shim::{global, Shim};
