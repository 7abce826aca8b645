use std::process::ExitCode;

fn main() -> ExitCode {
    owl_flattener::cli::main()
}
