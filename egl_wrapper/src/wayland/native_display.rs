//! Telling apart the native displays passed to `eglGetDisplay`.
//!
//! Both a `struct gbm_device` and a client `struct wl_display` start with a
//! pointer identifying them: `gbm_create_device` for the former and
//! `&wl_display_interface` for the latter. The pointer at the start of the
//! native display is compared against these markers, which relies on the
//! layout of both structures staying that way.

use std::ffi::c_void;
use std::fmt;

use egl_wrapper_sys::egl::types::EGLNativeDisplayType;
use libloading::os::unix::{Library, RTLD_LAZY};
use once_cell::sync::OnceCell;

/// The kinds of native display the bridge is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeDisplayKind {
    /// A `struct gbm_device`.
    GbmDevice,

    /// A client side `struct wl_display`.
    WaylandDisplay,
}

/// Looks a marker up, given the library and symbol naming it.
pub type MarkerProbe = fn(&'static str, &'static [u8]) -> Option<Marker>;

/// The address identifying one kind of native display.
#[derive(Debug)]
pub struct Marker {
    addr: usize,

    /// Keeps the library defining the marker mapped.
    _lib: Option<Library>,
}

impl Marker {
    pub fn new(addr: *const c_void) -> Self {
        Self { addr: addr as usize, _lib: None }
    }
}

/// The values found at the start of the known native displays.
///
/// A marker is looked up until it's found. The library defining it may be
/// loaded after the first display was created.
pub struct DisplayMarkers {
    gbm: OnceCell<Marker>,
    wayland: OnceCell<Marker>,
    probe: MarkerProbe,
}

impl DisplayMarkers {
    /// Markers looked up in the libraries the process already loaded.
    ///
    /// Libraries that aren't loaded aren't loaded by this either, since the
    /// application can't have created their displays.
    pub fn loaded() -> Self {
        Self::with_probe(probe_symbol)
    }

    /// Markers looked up with `probe`.
    pub fn with_probe(probe: MarkerProbe) -> Self {
        Self { gbm: OnceCell::new(), wayland: OnceCell::new(), probe }
    }

    /// Markers with known values, markers left out are never found.
    pub fn new(gbm: Option<*const c_void>, wayland: Option<*const c_void>) -> Self {
        let markers = Self::with_probe(|_, _| None);
        if let Some(addr) = gbm {
            let _ = markers.gbm.set(Marker::new(addr));
        }
        if let Some(addr) = wayland {
            let _ = markers.wayland.set(Marker::new(addr));
        }
        markers
    }

    /// The kind of the native display starting with `head`.
    pub fn classify(&self, head: usize) -> Option<NativeDisplayKind> {
        if head == 0 {
            None
        } else if self.gbm() == Some(head) {
            Some(NativeDisplayKind::GbmDevice)
        } else if self.wayland() == Some(head) {
            Some(NativeDisplayKind::WaylandDisplay)
        } else {
            None
        }
    }

    fn gbm(&self) -> Option<usize> {
        self.marker(&self.gbm, "libgbm.so.1", b"gbm_create_device\0")
    }

    fn wayland(&self) -> Option<usize> {
        self.marker(&self.wayland, "libwayland-client.so.0", b"wl_display_interface\0")
    }

    fn marker(&self, cell: &OnceCell<Marker>, lib_name: &'static str, symbol: &'static [u8]) -> Option<usize> {
        let marker = cell
            .get_or_try_init(|| {
                let marker = (self.probe)(lib_name, symbol).ok_or(())?;
                log::debug!("found native display marker in {lib_name}: {:#x}", marker.addr);
                Ok::<_, ()>(marker)
            })
            .ok()?;
        Some(marker.addr)
    }
}

impl Default for DisplayMarkers {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl fmt::Debug for DisplayMarkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayMarkers")
            .field("gbm", &self.gbm.get().map(|marker| marker.addr as *const c_void))
            .field("wayland", &self.wayland.get().map(|marker| marker.addr as *const c_void))
            .finish()
    }
}

/// The pointer sized value at the start of `display`.
///
/// # Safety
///
/// `display` must be null or point to at least a pointer worth of readable
/// memory.
pub unsafe fn read_head(display: EGLNativeDisplayType) -> Option<usize> {
    if display.is_null() {
        return None;
    }

    Some(unsafe { (display as *const usize).read_unaligned() })
}

fn probe_symbol(lib_name: &'static str, symbol: &'static [u8]) -> Option<Marker> {
    // SAFETY: `RTLD_NOLOAD` only hands out libraries that are already loaded.
    let lib = unsafe { Library::open(Some(lib_name), RTLD_LAZY | libc::RTLD_NOLOAD) }.ok()?;
    let addr = unsafe { lib.get::<*const c_void>(symbol) }.ok().map(|sym| *sym as usize)?;
    Some(Marker { addr, _lib: Some(lib) })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::ptr;

    use super::*;

    #[repr(C)]
    struct Tagged {
        head: *const c_void,
    }

    #[test]
    fn classifies_by_head() {
        let gbm_marker = 0x1000 as *const c_void;
        let wayland_marker = 0x2000 as *const c_void;
        let markers = DisplayMarkers::new(Some(gbm_marker), Some(wayland_marker));

        let gbm = Tagged { head: gbm_marker };
        let wayland = Tagged { head: wayland_marker };
        let other = Tagged { head: 0x3000 as *const c_void };

        let classify = |display: &Tagged| {
            let head = unsafe { read_head(display as *const Tagged as EGLNativeDisplayType) };
            markers.classify(head.unwrap())
        };
        assert_eq!(classify(&gbm), Some(NativeDisplayKind::GbmDevice));
        assert_eq!(classify(&wayland), Some(NativeDisplayKind::WaylandDisplay));
        assert_eq!(classify(&other), None);
    }

    #[test]
    fn null_display_has_no_head() {
        assert!(unsafe { read_head(ptr::null()) }.is_none());
    }

    thread_local! {
        static LOADED_WAYLAND_MARKER: Cell<usize> = const { Cell::new(0) };
        static PROBES: Cell<usize> = const { Cell::new(0) };
    }

    fn probe_loaded(lib_name: &'static str, _: &'static [u8]) -> Option<Marker> {
        PROBES.with(|probes| probes.set(probes.get() + 1));
        let addr = LOADED_WAYLAND_MARKER.with(Cell::get);
        (lib_name.starts_with("libwayland-client") && addr != 0).then(|| Marker::new(addr as *const c_void))
    }

    #[test]
    fn marker_is_found_once_its_library_is_loaded() {
        let markers = DisplayMarkers::with_probe(probe_loaded);
        assert_eq!(markers.classify(0x1234), None);

        LOADED_WAYLAND_MARKER.with(|addr| addr.set(0x2000));
        assert_eq!(markers.classify(0x2000), Some(NativeDisplayKind::WaylandDisplay));

        // Found markers aren't looked up again.
        let probes = PROBES.with(Cell::get);
        LOADED_WAYLAND_MARKER.with(|addr| addr.set(0x3000));
        assert_eq!(markers.classify(0x2000), Some(NativeDisplayKind::WaylandDisplay));
        assert_eq!(markers.classify(0x3000), None);
        // Only the still missing gbm marker is looked up.
        assert_eq!(PROBES.with(Cell::get) - probes, 2);
    }

    #[test]
    fn unknown_markers_match_nothing() {
        let markers = DisplayMarkers::default();
        assert_eq!(markers.classify(0), None);
        assert_eq!(markers.classify(0x1000), None);
    }
}
