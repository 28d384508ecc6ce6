use std::env::args_os;
use std::process::ExitCode;

use pixel_csv::{convert_image_to_csv, run_interactive_session, CLIParser};

fn main() -> ExitCode {
    let mut cli_parser = CLIParser::default();
    let arguments = cli_parser.parse(args_os());
    if arguments.is_interactive() {
        return match run_interactive_session(&arguments) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Session failed because of: {}", e);
                ExitCode::FAILURE
            }
        };
    }
    match convert_image_to_csv(&arguments) {
        Ok(path) => {
            println!("Conversion successful: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Conversion failed because of: {}", e);
            ExitCode::FAILURE
        }
    }
}
