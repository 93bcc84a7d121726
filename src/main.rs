use std::process::ExitCode;

fn main() -> ExitCode {
    gesture_games::run_cli()
}
