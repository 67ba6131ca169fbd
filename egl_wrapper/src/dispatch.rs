//! Lazily resolved driver entry points.

use std::ffi::{c_void, CStr};
use std::fmt;
use std::mem;

use once_cell::sync::OnceCell;

/// How the address of an entry point is obtained from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The entry point is an exported symbol of the driver.
    Symbol,

    /// Try the exported symbol, then ask the driver's `eglGetProcAddress`.
    ///
    /// Extension functions were only reachable through `eglGetProcAddress`
    /// before EGL 1.5, hence this two-part dance.
    Extension,

    /// Only the driver's `eglGetProcAddress` knows the entry point.
    ProcAddress,
}

/// A named slot caching the driver's address of one entry point.
///
/// The slot is resolved at most once, a missing entry point is cached as well.
pub struct Slot<F> {
    name: &'static CStr,
    resolution: Resolution,
    addr: OnceCell<Option<F>>,
}

impl<F: Copy> Slot<F> {
    /// Create an unresolved slot.
    pub const fn new(name: &'static CStr, resolution: Resolution) -> Self {
        Self { name, resolution, addr: OnceCell::new() }
    }

    /// The entry point, resolving it with `resolve` on first use.
    pub fn get_or_resolve(&self, resolve: impl FnOnce(&CStr, Resolution) -> *const c_void) -> Option<F> {
        *self.addr.get_or_init(|| {
            let addr = resolve(self.name, self.resolution);
            if addr.is_null() {
                return None;
            }

            debug_assert_eq!(mem::size_of::<F>(), mem::size_of::<*const c_void>());
            // SAFETY: `F` is the function pointer type of the entry point this
            // slot was declared for.
            Some(unsafe { mem::transmute_copy::<*const c_void, F>(&addr) })
        })
    }

    /// The name of the entry point.
    pub fn name(&self) -> &'static CStr {
        self.name
    }

    /// Whether resolution was attempted and found the entry point.
    pub fn is_loaded(&self) -> bool {
        matches!(self.addr.get(), Some(Some(_)))
    }

    /// Whether resolution was attempted at all.
    pub fn is_resolved(&self) -> bool {
        self.addr.get().is_some()
    }
}

impl<F> fmt::Debug for Slot<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("resolution", &self.resolution)
            .field("resolved", &self.addr.get().map(Option::is_some))
            .finish()
    }
}

/// Calling an entry point the driver doesn't provide can't be recovered from.
#[cold]
#[track_caller]
pub(crate) fn missing_entry_point(name: &CStr) -> ! {
    panic!("{name:?} is not provided by the EGL driver")
}

/// Declare the driver entry points.
///
/// Generates the [`Egl`] table with one [`Slot`] field and one forwarding
/// method per entry point, named like the `gl_generator` struct bindings, and
/// an exported `extern "system"` wrapper for every entry point of the
/// `passthrough` section.
///
/// [`Egl`]: crate::egl::Egl
macro_rules! egl_entry_points {
    (
        passthrough {
            $( $p_res:ident fn $p_method:ident($($p_arg:ident: $p_ty:ty),*) -> $p_ret:ty = $p_sym:ident; )*
        }
        intercepted {
            $( $i_res:ident fn $i_method:ident($($i_arg:ident: $i_ty:ty),*) -> $i_ret:ty = $i_sym:ident; )*
        }
    ) => {
        /// The driver entry points.
        #[allow(non_snake_case)]
        pub struct Egl {
            loader: $crate::lib_loading::DriverLoader,
            $( pub $p_method: $crate::dispatch::Slot<unsafe extern "system" fn($($p_ty),*) -> $p_ret>, )*
            $( pub $i_method: $crate::dispatch::Slot<unsafe extern "system" fn($($i_ty),*) -> $i_ret>, )*
        }

        #[allow(non_snake_case, clippy::missing_safety_doc)]
        impl Egl {
            /// Table resolving entry points from `loader`.
            pub fn new(loader: $crate::lib_loading::DriverLoader) -> Self {
                Self {
                    loader,
                    $( $p_method: $crate::dispatch::Slot::new(
                        // SAFETY: The literal is nul terminated and has no interior nul.
                        unsafe { ::std::ffi::CStr::from_bytes_with_nul_unchecked(concat!(stringify!($p_sym), "\0").as_bytes()) },
                        $crate::dispatch::Resolution::$p_res,
                    ), )*
                    $( $i_method: $crate::dispatch::Slot::new(
                        // SAFETY: The literal is nul terminated and has no interior nul.
                        unsafe { ::std::ffi::CStr::from_bytes_with_nul_unchecked(concat!(stringify!($i_sym), "\0").as_bytes()) },
                        $crate::dispatch::Resolution::$i_res,
                    ), )*
                }
            }

            $(
                #[doc = concat!("Forward to the driver's `", stringify!($p_sym), "`.")]
                ///
                /// # Panics
                ///
                /// When the driver doesn't provide the entry point.
                #[inline]
                pub unsafe fn $p_method(&self, $($p_arg: $p_ty),*) -> $p_ret {
                    let f = self.$p_method
                        .get_or_resolve(|name, res| self.resolve(name, res))
                        .unwrap_or_else(|| $crate::dispatch::missing_entry_point(self.$p_method.name()));
                    unsafe { f($($p_arg),*) }
                }
            )*

            $(
                #[doc = concat!("Forward to the driver's `", stringify!($i_sym), "`.")]
                ///
                /// # Panics
                ///
                /// When the driver doesn't provide the entry point.
                #[inline]
                pub unsafe fn $i_method(&self, $($i_arg: $i_ty),*) -> $i_ret {
                    let f = self.$i_method
                        .get_or_resolve(|name, res| self.resolve(name, res))
                        .unwrap_or_else(|| $crate::dispatch::missing_entry_point(self.$i_method.name()));
                    unsafe { f($($i_arg),*) }
                }
            )*
        }

        /// The exported entry points forwarding to the driver unchanged.
        #[allow(non_snake_case, clippy::missing_safety_doc)]
        pub mod passthrough {
            #[allow(unused_imports)]
            use super::*;

            $(
                #[doc = concat!("`", stringify!($p_sym), "` forwarded to the driver.")]
                #[no_mangle]
                pub unsafe extern "system" fn $p_sym($($p_arg: $p_ty),*) -> $p_ret {
                    log::trace!("{}", stringify!($p_sym));
                    unsafe { $crate::shim::global().egl().$p_method($($p_arg),*) }
                }
            )*
        }
    };
}

pub(crate) use egl_entry_points;

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::ptr;

    use super::*;

    unsafe extern "system" fn forty_two() -> i32 {
        42
    }

    type FortyTwo = unsafe extern "system" fn() -> i32;

    #[test]
    fn resolves_once() {
        let slot = Slot::<FortyTwo>::new(c"eglFortyTwo", Resolution::Symbol);
        let calls = Cell::new(0);
        let resolve = |name: &CStr, res: Resolution| {
            assert_eq!(name, c"eglFortyTwo");
            assert_eq!(res, Resolution::Symbol);
            calls.set(calls.get() + 1);
            forty_two as *const c_void
        };

        assert!(!slot.is_resolved());
        let f = slot.get_or_resolve(resolve).unwrap();
        assert_eq!(unsafe { f() }, 42);
        let again = slot.get_or_resolve(|_, _| unreachable!()).unwrap();
        assert_eq!(again as usize, f as usize);
        assert_eq!(calls.get(), 1);
        assert!(slot.is_loaded());
    }

    #[test]
    fn missing_entry_point_is_cached() {
        let slot = Slot::<FortyTwo>::new(c"eglMissing", Resolution::Extension);
        assert!(slot.get_or_resolve(|_, _| ptr::null()).is_none());
        assert!(slot.is_resolved());
        assert!(!slot.is_loaded());
        assert!(slot.get_or_resolve(|_, _| forty_two as *const c_void).is_none());
    }

    #[test]
    #[should_panic(expected = "eglInitialize")]
    fn missing_entry_point_panics() {
        missing_entry_point(c"eglInitialize");
    }
}
