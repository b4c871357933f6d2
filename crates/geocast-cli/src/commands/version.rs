//! Version command implementation.

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() {
    println!("geocast {VERSION}");
    println!();
    println!("Clusters co-located live broadcasts into shared events.");
    println!();
    println!("Build info:");
    println!("  Target: {}", std::env::consts::ARCH);
    println!("  OS:     {}", std::env::consts::OS);
}
