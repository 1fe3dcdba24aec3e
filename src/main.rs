fn main() {
    if let Err(error) = labelsweep::run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
