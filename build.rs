use std::env;

fn main() {
    // Forward build metadata into the compile-time environment when provided
    if let Ok(time) = env::var("APKG_BUILD_TIME") {
        println!("cargo:rustc-env=BUILD_TIME={time}");
    }
    if let Ok(commit) = env::var("APKG_GIT_COMMIT") {
        println!("cargo:rustc-env=GIT_COMMIT={commit}");
    }
    println!("cargo:rerun-if-env-changed=APKG_BUILD_TIME");
    println!("cargo:rerun-if-env-changed=APKG_GIT_COMMIT");
}
