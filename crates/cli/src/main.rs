use std::process::ExitCode;

fn main() -> ExitCode {
    lexbook_cli::run()
}
