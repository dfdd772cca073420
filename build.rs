use std::env;

fn main() {
    // The standard library directory is baked into the binary. Packagers
    // can point DAL_STD_DIR at an installed location; by default the
    // in-tree `std/` is used.
    let std_dir = env::var("DAL_STD_DIR").unwrap_or_else(|_| {
        let manifest = env::var("CARGO_MANIFEST_DIR").unwrap();
        format!("{manifest}/std")
    });
    println!("cargo:rustc-env=DAL_STD_DIR={std_dir}");
    println!("cargo:rerun-if-env-changed=DAL_STD_DIR");
}
