//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - best-of-N quantum transpilation",
        style("qtt").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qtt-ir       Circuit intermediate representation");
    println!("  qtt-hal      Backend descriptions and fake devices");
    println!("  qtt-compile  Transpiler passes and scheduling");
    println!("  qtt-remap    Noise-aware layout search");
    println!("  qtt          Transpilation pipeline");
    println!("  qtt-cli      Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
