use anyhow::{Context, Result};
use clanker_core::config::{Config, DEFAULT_MODEL};
use console::style;
use dialoguer::{Input, Password, Select};

const PROVIDERS: &[(&str, &str)] = &[("gemini", "Google Gemini"), ("openai", "OpenAI-compatible")];

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn default_models(provider: &str) -> &'static [&'static str] {
    match provider {
        "openai" => &["gpt-4o", "gpt-4o-mini", "gpt-5-mini"],
        _ => &[DEFAULT_MODEL, "gemini-2.5-flash", "gemini-2.5-pro"],
    }
}

fn setup_provider() -> Result<String> {
    let labels: Vec<&str> = PROVIDERS.iter().map(|(_, label)| *label).collect();

    let selection = Select::new()
        .with_prompt("Select your provider")
        .items(&labels)
        .default(0)
        .interact()
        .context("Failed to select provider")?;

    Ok(PROVIDERS[selection].0.to_string())
}

fn setup_api_key(provider: &str) -> Result<String> {
    let api_key: String = Password::new()
        .with_prompt(format!(
            "Enter your {} API key (leave empty to use the environment)",
            provider
        ))
        .allow_empty_password(true)
        .interact()
        .context("Failed to read API key")?;

    Ok(api_key.trim().to_string())
}

fn setup_model(provider: &str) -> Result<String> {
    let models = default_models(provider);

    let selection = Select::new()
        .with_prompt("Select your model")
        .items(models)
        .default(0)
        .interact()
        .context("Failed to select model")?;

    Ok(models[selection].to_string())
}

fn setup_base_url() -> Result<Option<String>> {
    let base_url: String = Input::new()
        .with_prompt("Custom API base URL (optional)")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read base URL")?;

    let base_url = base_url.trim();
    Ok((!base_url.is_empty()).then(|| base_url.to_string()))
}

pub fn run_onboard() -> Result<Config> {
    println!();
    println!("  {}", style("Welcome to clanker!").white().bold());
    println!(
        "  {}",
        style("This wizard writes the connection settings for your chat agent.").dim()
    );

    print_step(1, 4, "Provider");
    let provider = setup_provider()?;

    print_step(2, 4, "API Key");
    let api_key = setup_api_key(&provider)?;

    print_step(3, 4, "Model");
    let model = setup_model(&provider)?;

    print_step(4, 4, "Endpoint");
    let base_url = setup_base_url()?;

    let config = Config {
        provider: Some(provider),
        api_key,
        base_url,
        model,
        ..Default::default()
    };

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(clanker_core::config::get_config_path().display()).cyan()
    );
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("clanker chat").cyan().bold()
    );
    println!();

    Ok(config)
}
