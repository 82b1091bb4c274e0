use std::process::ExitCode;

use relaykit::{init_logger, load_client, run_command, Command, USAGE};
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  let logger_handle = init_logger()?;

  let args = std::env::args().skip(1).collect::<Vec<_>>();
  let Some((config_file_path, command_args)) = args.split_first() else {
    eprintln!("{}", USAGE);
    return Ok(ExitCode::FAILURE);
  };

  let command = match Command::parse(command_args) {
    Ok(command) => command,
    Err(e) => {
      eprintln!("{}\n\n{}", e, USAGE);
      return Ok(ExitCode::FAILURE);
    }
  };

  let client = load_client(config_file_path, &logger_handle)?;

  match run_command(&client, &command).await {
    Ok(output) => {
      println!("{}", serde_json::to_string_pretty(&output)?);
      Ok(ExitCode::SUCCESS)
    }
    Err(e) => {
      error!("command failed: {}", e);
      println!("{}", serde_json::to_string_pretty(&e.to_error_object())?);
      Ok(ExitCode::FAILURE)
    }
  }
}
