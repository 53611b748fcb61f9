// build.rs — link setup for the optional foreign `mll` symbol.
//
// With the `extern-mll` feature the harness declares `extern "C" fn mll` and
// expects it in a static library named `libmll_ext.a` (or `mll_ext.lib`).
// MLL_LIB_DIR points at the directory holding it; without the feature nothing
// is emitted.
fn main() {
    println!("cargo:rerun-if-env-changed=MLL_LIB_DIR");
    println!("cargo:rerun-if-env-changed=MLL_LIB_NAME");

    if std::env::var("CARGO_FEATURE_EXTERN_MLL").is_err() {
        return;
    }

    if let Ok(dir) = std::env::var("MLL_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir);
    }
    let lib = std::env::var("MLL_LIB_NAME").unwrap_or_else(|_| "mll_ext".to_owned());
    println!("cargo:rustc-link-lib=static={}", lib);
}
