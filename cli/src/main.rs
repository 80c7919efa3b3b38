//! ec2-webserver - launch a demo web server on EC2 and verify it

use std::process::ExitCode;

use clap::Parser;

use ec2_webserver::cli::Cli;
use ec2_webserver::logging;
use ec2_webserver::output::json::{error_code, format_error};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{e:#}");
            match format_error(&message, error_code(&e)) {
                Ok(obj) if json => println!("{obj}"),
                _ => eprintln!("Error: {message}"),
            }
            ExitCode::FAILURE
        }
    }
}
