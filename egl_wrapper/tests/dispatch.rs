mod common;

use std::ptr;

use common::FakeDriver;
use egl_wrapper::{Config, Shim};
use egl_wrapper_sys::egl;
use egl_wrapper_sys::egl::types::EGLint;

#[test]
fn entry_points_are_resolved_once() {
    let (driver, lookups) = FakeDriver::new();
    let shim = Shim::with_driver(driver, Config::default());
    let entry_points = shim.egl();

    for _ in 0..5 {
        assert_eq!(unsafe { entry_points.GetError() }, egl::SUCCESS as EGLint);
    }

    let display = unsafe { shim.get_display(egl::DEFAULT_DISPLAY) };
    let (mut major, mut minor) = (0, 0);
    for _ in 0..3 {
        assert_eq!(unsafe { entry_points.Initialize(display, &mut major, &mut minor) }, egl::TRUE);
    }

    assert_eq!(lookups.count("eglGetError"), 1);
    assert_eq!(lookups.count("eglInitialize"), 1);
    assert_eq!(lookups.count("eglGetDisplay"), 1);
    assert_eq!(lookups.count("eglTerminate"), 0);
}

#[test]
fn driver_results_are_forwarded_verbatim() {
    let (driver, _) = FakeDriver::new();
    let shim = Shim::with_driver(driver, Config::default());
    let entry_points = shim.egl();

    let (mut major, mut minor) = (0, 0);
    assert_eq!(unsafe { entry_points.Initialize(egl::NO_DISPLAY, &mut major, &mut minor) }, egl::FALSE);
    assert_eq!((major, minor), (0, 0));

    let display = unsafe { shim.get_display(egl::DEFAULT_DISPLAY) };
    assert_eq!(display, 0x1 as egl::types::EGLDisplay);
    assert_eq!(unsafe { entry_points.Initialize(display, &mut major, &mut minor) }, egl::TRUE);
    assert_eq!((major, minor), (1, 4));

    let vendor = unsafe { shim.query_string(display, egl::VENDOR as EGLint) };
    assert_eq!(vendor, common::DRIVER_VENDOR.as_ptr());
    let apis = unsafe { shim.query_string(display, egl::CLIENT_APIS as EGLint) };
    assert!(apis.is_null());
}

#[test]
fn extension_entry_point_uses_driver_proc_address() {
    let (driver, lookups) = FakeDriver::new();
    let shim = Shim::with_driver(driver, Config::default());
    let entry_points = shim.egl();

    assert_eq!(unsafe { entry_points.DestroyImageKHR(egl::NO_DISPLAY, common::IMAGE) }, egl::TRUE);
    assert_eq!(unsafe { entry_points.DestroyImageKHR(egl::NO_DISPLAY, egl::NO_IMAGE_KHR) }, egl::FALSE);

    assert_eq!(lookups.count("eglDestroyImageKHR"), 1);
    assert_eq!(lookups.count("eglGetProcAddress"), 1);
}

#[test]
fn driver_with_only_get_error() {
    let (driver, lookups) = FakeDriver::exporting(&["eglGetError"]);
    let shim = Shim::with_driver(driver, Config::default());

    assert_eq!(unsafe { shim.egl().GetError() }, egl::SUCCESS as EGLint);
    assert!(shim.egl().GetError.is_loaded());
    assert_eq!(lookups.count("eglInitialize"), 0);
}

#[test]
#[should_panic(expected = "eglInitialize")]
fn missing_entry_point_is_fatal() {
    let (driver, lookups) = FakeDriver::exporting(&["eglGetError"]);
    let shim = Shim::with_driver(driver, Config::default());
    assert_eq!(unsafe { shim.egl().GetError() }, egl::SUCCESS as EGLint);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| unsafe {
        shim.egl().Initialize(egl::NO_DISPLAY, ptr::null_mut(), ptr::null_mut())
    }));
    assert!(result.is_err());
    assert_eq!(lookups.count("eglInitialize"), 1);
    assert!(shim.egl().Initialize.is_resolved());
    assert!(!shim.egl().Initialize.is_loaded());

    // Not looked up again, still fatal.
    unsafe { shim.egl().Initialize(egl::NO_DISPLAY, ptr::null_mut(), ptr::null_mut()) };
}

#[test]
fn unloadable_driver_fails_every_lookup() {
    let config = Config::default().with_driver_path("/nonexistent/libEGL-fake.so");
    let shim = Shim::new(config);

    assert!(shim.egl().driver_proc_address(c"eglCreateImageKHR").is_null());
    assert!(!shim.egl().loader().is_loaded());
    assert!(shim.egl().GetProcAddress.is_resolved());
    assert!(!shim.egl().GetProcAddress.is_loaded());
}
