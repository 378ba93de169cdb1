//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = campus_eats_cli::run() {
        if let campus_eats_cli::CliError::ArgumentParsing(clap_err) = &err {
            clap_err.exit();
        }
        eprintln!("campus-eats: {err}");
        std::process::exit(1);
    }
}
