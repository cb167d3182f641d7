fn main() {
    if let Err(e) = vigil::run() {
        eprintln!("vigil error: {}", e);
        std::process::exit(1);
    }
}
