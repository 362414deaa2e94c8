use decorai::GoogleProvider;
use decorai::config::{ConfigManager, mask_key};

/// Check that the API key works and that the configured models exist.
pub async fn run_doctor(config: &ConfigManager) -> anyhow::Result<()> {
    let cfg = config.load()?;
    println!("config: {}", config.path().display());

    let Some(api_key) = cfg.resolve_api_key() else {
        println!("✗ no API key. Set GEMINI_API_KEY or run `decorai-proxy config --api-key <KEY>`.");
        return Ok(());
    };
    println!("✓ API key {}", mask_key(&api_key));

    let provider = GoogleProvider::new(api_key, cfg.base_url());
    let models = match provider.list_models().await {
        Ok(m) => m,
        Err(e) => {
            println!("✗ {}: {}", provider.base_url(), e);
            return Ok(());
        }
    };
    println!("✓ {} reachable, {} models", provider.base_url(), models.len());

    let designer = cfg.designer_config();
    for (role, model) in [("text", &designer.text_model), ("image", &designer.image_model)] {
        if models.iter().any(|m| &m.name == model) {
            println!("✓ {} model {}", role, model);
        } else {
            println!("✗ {} model {} is not offered for this key", role, model);
        }
    }

    Ok(())
}
