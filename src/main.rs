use clap::Parser;
use std::sync::Arc;
use text_memory_plugin::utils::{logger, validation::Validate};
use text_memory_plugin::{
    CliConfig, KernelContext, KernelFunctionProvider, MemoryPluginError, TextMemoryPlugin,
    TomlConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 載入配置
    let file_config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    // 初始化日誌
    let json_logs = cli.json_logs || file_config.as_ref().is_some_and(|c| c.json_logs());
    if json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Some(config) = &file_config {
        if let Err(e) = config.validate() {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }

    let plugin = TextMemoryPlugin::new();

    let Some(function_name) = cli.function_name() else {
        println!("{}", serde_json::to_string_pretty(&plugin.functions())?);
        return Ok(());
    };

    let store = match cli.memory_store(file_config.as_ref()) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Could not create memory store client: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::info!("Using memory service at {}", store.base_url());

    let variables = cli.context_variables(file_config.as_ref());
    let context = KernelContext::new(variables, Arc::new(store));

    match plugin.invoke(function_name, &context).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            tracing::error!("memory.{} failed: {}", function_name, e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code(&e));
        }
    }

    Ok(())
}

fn exit_code(error: &MemoryPluginError) -> i32 {
    if error.is_user_error() {
        1
    } else {
        2
    }
}
