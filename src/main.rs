fn main() {
    if let Err(err) = hardclone::cli::run() {
        println!("{:#}", err);
        std::process::exit(2);
    }
}
