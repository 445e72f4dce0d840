//! `buddy-run` entry point.

use buddy_launch_runtime::InvocationRequest;

fn main() {
    // Capture arguments before anything else can look at them
    let request = InvocationRequest::from_env();

    // Load .env first so it can set the log filter too
    dotenvy::dotenv().ok();

    buddy_launch_cli::init_tracing();

    std::process::exit(buddy_launch_cli::run(&request));
}
