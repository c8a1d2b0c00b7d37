use aidata::core::error::AidataError;
use colored::Colorize;

fn main() {
    if let Err(e) = aidata::run() {
        match e {
            AidataError::Cancelled => eprintln!("{}", e),
            other => eprintln!("{} {}", "Error:".bright_red().bold(), other),
        }
        std::process::exit(1);
    }
}
