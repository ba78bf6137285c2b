use std::env;

fn main() {
    // SQLite itself is compiled in through libsqlite3-sys (bundled), so we
    // only need the system frameworks the host app expects when the static
    // library is embedded on Apple platforms.
    let target = env::var("TARGET").unwrap_or_default();
    if target.contains("apple") {
        println!("cargo:rustc-link-lib=framework=Foundation");
        println!("cargo:rustc-link-lib=framework=Security");
    }

    println!("cargo:rerun-if-changed=migrations/");
}
