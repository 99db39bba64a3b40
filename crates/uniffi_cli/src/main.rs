//! Generates the Kotlin bindings for the Android app
//!
//! ```sh
//! cargo run -p uniffi_cli -- generate --library target/release/libtapread.so \
//!     --language kotlin --out-dir bindings
//! ```

fn main() {
    uniffi::uniffi_bindgen_main()
}
