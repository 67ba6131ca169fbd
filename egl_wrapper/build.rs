use cfg_aliases::cfg_aliases;

fn main() {
    // Setup alias to reduce `cfg` boilerplate.
    cfg_aliases! {
        // Systems.
        free_unix: { all(unix, not(any(target_os = "macos", target_os = "ios", target_os = "android"))) },

        // Platforms.
        wayland_platform: { all(feature = "wayland", free_unix) },
    }
}
