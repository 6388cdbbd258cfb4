use anyhow::Result;

use ai_media_pipeline::app::{App, Command};
use ai_media_pipeline::config::Config;
use ai_media_pipeline::logger;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 解析命令
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = Command::parse(&args) else {
        eprintln!("{}", Command::usage());
        std::process::exit(2);
    };

    // 初始化并运行应用
    App::initialize(config).await?.run(command).await
}
