use std::path::PathBuf;

/// The header always lands in `OUT_DIR`. Set this to a directory to also get
/// a copy there; relative paths resolve against this crate, so
/// `VOYATEK_HEADER_DIR=include` writes `ffi/include/voyatek.h`.
const HEADER_DIR_ENV: &str = "VOYATEK_HEADER_DIR";

fn main() {
    let crate_dir = std::env::var("CARGO_MANIFEST_DIR");
    let out_dir = std::env::var("OUT_DIR");
    let (Ok(crate_dir), Ok(out_dir)) = (crate_dir, out_dir) else {
        println!("cargo:warning=cargo did not set CARGO_MANIFEST_DIR/OUT_DIR");
        return;
    };
    let header = PathBuf::from(out_dir).join("voyatek.h");

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
    println!("cargo:rerun-if-env-changed={HEADER_DIR_ENV}");

    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("VOYATEK_H")
        .with_documentation(true)
        .generate();

    let bindings = match bindings {
        Ok(bindings) => bindings,
        Err(e) => {
            println!("cargo:warning=C header not generated: {e}");
            return;
        }
    };
    bindings.write_to_file(&header);

    let Some(dir) = std::env::var_os(HEADER_DIR_ENV).map(PathBuf::from) else {
        return;
    };
    if let Err(e) = std::fs::create_dir_all(&dir) {
        println!("cargo:warning=cannot create {}: {e}", dir.display());
        return;
    }
    if let Err(e) = std::fs::copy(&header, dir.join("voyatek.h")) {
        println!("cargo:warning=cannot copy header to {}: {e}", dir.display());
    }
}
