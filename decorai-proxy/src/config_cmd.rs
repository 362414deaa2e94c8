use clap::Args;
use decorai::config::{AppConfig, ConfigManager, mask_key};

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Gemini API key to store
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model used for design plans and palettes
    #[arg(long)]
    pub text_model: Option<String>,

    /// Model used for redesigned images
    #[arg(long)]
    pub image_model: Option<String>,

    /// Gemini API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Print the resulting config (API key masked)
    #[arg(long)]
    pub show: bool,
}

impl ConfigArgs {
    fn has_updates(&self) -> bool {
        self.api_key.is_some()
            || self.text_model.is_some()
            || self.image_model.is_some()
            || self.base_url.is_some()
    }

    fn apply(self, cfg: &mut AppConfig) {
        if let Some(v) = self.api_key {
            cfg.api_key = Some(v.trim().to_string());
        }
        if let Some(v) = self.text_model {
            cfg.text_model = Some(v);
        }
        if let Some(v) = self.image_model {
            cfg.image_model = Some(v);
        }
        if let Some(v) = self.base_url {
            cfg.base_url = Some(v.trim_end_matches('/').to_string());
        }
    }
}

pub fn run_config(config: &ConfigManager, args: ConfigArgs) -> anyhow::Result<()> {
    let show = args.show || !args.has_updates();

    let cfg = if args.has_updates() {
        let cfg = config.update(|cfg| args.apply(cfg))?;
        println!("Saved {}", config.path().display());
        cfg
    } else {
        config.load()?
    };

    if show {
        print!("{}", render(&cfg));
    }

    Ok(())
}

fn render(cfg: &AppConfig) -> String {
    let designer = cfg.designer_config();
    let key = match cfg.resolve_api_key() {
        Some(k) => mask_key(&k),
        None => "(not set)".to_string(),
    };
    format!(
        "api key:     {}\ntext model:  {}\nimage model: {}\nbase url:    {}\n",
        key,
        designer.text_model,
        designer.image_model,
        cfg.base_url()
    )
}
