use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "Fitness dashboard backend keeping upstream sessions signed in")]
pub struct Cli {
    /// Path to the settings file, without or with the `.toml` extension.
    #[arg(long)]
    pub settings: Option<String>,
}
