use std::env;

fn main() {
    // Only the firmware binary is linked for the target; the library builds anywhere
    if env::var_os("CARGO_FEATURE_FIRMWARE").is_none() {
        return;
    }

    // memory.x comes from embassy-stm32's `memory-x` feature
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");

    // defmt needs its section layout whenever the firmware logs
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
