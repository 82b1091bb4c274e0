use relaykit_config::ClientConfig;
use schemars::schema_for;

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
  let output_path = std::env::args()
    .nth(1)
    .unwrap_or("libs/config/relaykit.schema.json".to_string());

  println!("⚙️ Generating JSON schema for relaykit config file...");
  let schema = schema_for!(ClientConfig);
  let as_string = serde_json::to_string_pretty(&schema)?;
  println!("✏️ Writing to: {}", output_path);
  std::fs::write(&output_path, as_string)?;
  println!("✅ Done");

  Ok(())
}
