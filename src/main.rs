fn main() {
    if let Err(err) = asmflow::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
