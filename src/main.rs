fn main() {
    if let Err(e) = lil_guy::cli::main() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
