fn main() {
    if let Err(err) = substance_match::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
