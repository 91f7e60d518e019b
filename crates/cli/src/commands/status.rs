//! `mythos status`: Show the active configuration.

use mythos_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let generation = &config.generation;

    println!("Mythos Status");
    println!("=============");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!("  Model:          {}", config.model);
    println!("  Temperature:    {}", generation.temperature);
    println!("  Top K / Top P:  {} / {}", generation.top_k, generation.top_p);
    println!("  Max output:     {} tokens", generation.max_output_tokens);
    println!("  Thinking:       {:?}", generation.thinking_level);
    println!("  History window: {} messages", config.session.history_limit);
    if config.proxy.is_enabled() {
        println!("  Transport:      proxy `{}` ({})", config.proxy.name, config.proxy.url);
    } else {
        println!("  Transport:      direct Gemini API");
    }
    println!(
        "  Credentials:    {}",
        if config.has_credentials() { "configured" } else { "missing" }
    );

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `mythos onboard` first");
    }

    Ok(())
}
