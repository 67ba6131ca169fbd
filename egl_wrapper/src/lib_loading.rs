//! Driver loading routines.

use std::ffi::{c_void, CStr, OsStr, OsString};
use std::fmt;
use std::ptr;

use libloading::os::unix::{Library, RTLD_LAZY};
use once_cell::sync::OnceCell;

use crate::error::{Error, ErrorKind, Result};

/// A module entry points are resolved from.
pub trait SymbolSource: Send + Sync {
    /// Address of the symbol `name`, null when the module doesn't have it.
    fn lookup(&self, name: &CStr) -> *const c_void;
}

/// The vendor driver opened as a shared library.
pub struct DriverLibrary {
    lib: Library,
}

impl DriverLibrary {
    /// Open the driver at `path` with lazy binding, symbols the driver itself
    /// leaves unresolved are tolerated until first use.
    ///
    /// # Safety
    ///
    /// Running the initialization routines of the library must be sound.
    pub unsafe fn open(path: &OsStr) -> Result<Self> {
        let lib = unsafe { Library::open(Some(path), RTLD_LAZY) }
            .map_err(|err| Error::from_dl(&err, ErrorKind::NotFound))?;
        Ok(Self { lib })
    }
}

impl SymbolSource for DriverLibrary {
    fn lookup(&self, name: &CStr) -> *const c_void {
        // SAFETY: The value is only used as an address, it's never called as
        // the type it's requested with.
        unsafe { self.lib.get::<*const c_void>(name.to_bytes_with_nul()) }
            .map(|sym| *sym)
            .unwrap_or(ptr::null())
    }
}

impl fmt::Debug for DriverLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverLibrary").finish_non_exhaustive()
    }
}

/// Opens the driver on first use and keeps it for the lifetime of the process.
pub struct DriverLoader {
    path: OsString,
    module: OnceCell<Option<Box<dyn SymbolSource>>>,
}

impl DriverLoader {
    /// Loader for the driver at `path`, nothing is opened yet.
    pub fn new(path: impl Into<OsString>) -> Self {
        Self { path: path.into(), module: OnceCell::new() }
    }

    /// Loader around an already available module.
    pub fn with_source(source: impl SymbolSource + 'static) -> Self {
        let module = OnceCell::with_value(Some(Box::new(source) as Box<dyn SymbolSource>));
        Self { path: OsString::from("<injected>"), module }
    }

    /// Resolve `name` in the driver, loading the driver if that didn't happen
    /// yet.
    ///
    /// If the driver failed to load null is returned, the load isn't retried.
    pub fn lookup(&self, name: &CStr) -> *const c_void {
        let addr = match self.module.get_or_init(|| self.load()) {
            Some(module) => module.lookup(name),
            None => ptr::null(),
        };

        if addr.is_null() {
            log::warn!("{name:?} is not provided by the EGL driver");
        } else {
            log::debug!("resolved {name:?} to {addr:p}");
        }

        addr
    }

    /// Whether a driver module is available.
    pub fn is_loaded(&self) -> bool {
        matches!(self.module.get(), Some(Some(_)))
    }

    /// The path of the driver.
    pub fn path(&self) -> &OsStr {
        &self.path
    }

    fn load(&self) -> Option<Box<dyn SymbolSource>> {
        // SAFETY: The driver is the EGL implementation the process asked for.
        match unsafe { DriverLibrary::open(&self.path) } {
            Ok(lib) => {
                log::debug!("loaded EGL driver {:?}", self.path);
                Some(Box::new(lib))
            },
            Err(err) => {
                log::error!("failed to load EGL driver {:?}: {err}", self.path);
                None
            },
        }
    }
}

impl fmt::Debug for DriverLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverLoader")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
