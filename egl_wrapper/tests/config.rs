use std::env;
use std::path::Path;

use egl_wrapper::config::{DEFAULT_DEVICE_PATH, DEFAULT_DRIVER_PATH, DRIVER_PATH_ENV};
use egl_wrapper::{Config, Shim};

// The only test touching the environment of this binary.
#[test]
fn driver_path_from_environment() {
    env::remove_var(DRIVER_PATH_ENV);
    assert_eq!(Config::from_env().driver_path(), DEFAULT_DRIVER_PATH);

    env::set_var(DRIVER_PATH_ENV, "");
    assert_eq!(Config::from_env().driver_path(), DEFAULT_DRIVER_PATH);

    env::set_var(DRIVER_PATH_ENV, "/nonexistent/libEGL-override.so");
    let config = Config::from_env();
    assert_eq!(config.driver_path(), "/nonexistent/libEGL-override.so");
    assert_eq!(config.device_path(), Path::new(DEFAULT_DEVICE_PATH));

    let shim = Shim::new(config);
    assert_eq!(shim.egl().loader().path(), "/nonexistent/libEGL-override.so");
    assert!(!shim.egl().loader().is_loaded());

    env::remove_var(DRIVER_PATH_ENV);
}
