// Build script for linking the native renderer library.
//
// Only active with `--features native`. Point RAYLIB_LIB_DIR at the folder
// containing raylib.lib / libraylib.so when it is not on the default search path.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=RAYLIB_LIB_DIR");

    if std::env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }

    println!("cargo:rustc-link-lib=raylib");

    if let Ok(lib_dir) = std::env::var("RAYLIB_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", lib_dir);
    }
}
