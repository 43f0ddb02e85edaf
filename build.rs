fn main() {
    println!("cargo:rerun-if-env-changed=SERVOCLOCK_CONFIG");

    // Host builds (`--no-default-features`) have no ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
