use anyhow::Result;
use calassist_core::Config;
use calassist_core::config::Settings;
use owo_colors::OwoColorize;

pub fn run(config: &Config) -> Result<()> {
    let config_path = Settings::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Events:     {}", config.data_file.display());
    if let Some(remote) = &config.remote {
        println!("  Provider:   {}", remote.provider.binary_name());
    }

    println!();
    println!("{}", "Settings".bold());
    for line in config.settings().to_toml()?.lines() {
        println!("  {line}");
    }

    Ok(())
}
