fn main() {
    if let Err(e) = sheet_compare_lib::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
