use anyhow::Result;

use cedros_core::AppConfig;

pub fn run(config: &AppConfig, save: bool, path: bool) -> Result<()> {
    let config_path = AppConfig::config_path();
    if path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if save {
        config.save()?;
        println!("Saved configuration to {}", config_path.display());
        return Ok(());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
