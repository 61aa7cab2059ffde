use anyhow::Result;
use clap::Parser;
use pageindex_txt::cli::Cli;
use pageindex_txt::utils::logging;
use pageindex_txt::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    let cli = Cli::parse();

    // 加载配置：默认值 → TOML → 环境变量 → 命令行
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    // 初始化并运行应用
    let app = App::initialize(config)?;
    app.run(&cli.txt_path).await?;

    Ok(())
}
