//! NetGraph CLI 工具
//!
//! 交互式构建有向带权图并运行最短路、最大流算法

use anyhow::Context;
use clap::Parser;
use netgraph::cli::{CommandResult, Session};
use netgraph::config::SessionConfig;
use netgraph::logging::init_tracing;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "netgraph")]
#[command(about = "NetGraph 最短路与最大流算法命令行工具")]
struct Args {
    /// 配置文件（JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 启动时导入的邻接矩阵 CSV
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// 执行命令后退出，多条命令用 ';' 分隔
    #[arg(short = 'e', long)]
    execute: Option<String>,

    /// 以 JSON 输出结果
    #[arg(long)]
    json: bool,

    /// 写运行记录到该目录
    #[arg(long)]
    transcript_dir: Option<PathBuf>,

    /// 日志过滤器（RUST_LOG 优先）
    #[arg(long)]
    log: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if args.json {
        config.json = true;
    }
    if let Some(dir) = args.transcript_dir {
        config.transcript_dir = dir;
        config.transcript_enabled = true;
    }
    if let Some(filter) = args.log {
        config.log_filter = filter;
    }

    init_tracing(&config.log_filter)?;

    let mut session = Session::new(config);

    if let Some(path) = &args.input {
        let line = format!("import {}", path.display());
        if !report(session.execute(&line)) {
            anyhow::bail!("导入失败: {}", path.display());
        }
    }

    // 单次执行模式
    if let Some(script) = args.execute {
        for line in script.split(';') {
            match session.execute(line) {
                CommandResult::Exit => break,
                result => {
                    if !report(result) {
                        std::process::exit(1);
                    }
                }
            }
        }
        return Ok(());
    }

    // 交互模式
    println!("NetGraph - 最短路与最大流算法");
    println!("输入 'help' 查看命令列表，'quit' 退出\n");

    let stdin = io::stdin();
    loop {
        print!("netgraph> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match session.execute(&line) {
            CommandResult::Exit => break,
            result => {
                report(result);
            }
        }
    }

    println!("再见！");
    Ok(())
}

/// 打印结果，返回是否成功
fn report(result: CommandResult) -> bool {
    match result {
        CommandResult::Continue | CommandResult::Exit => true,
        CommandResult::Message(message) => {
            println!("{}", message);
            true
        }
        CommandResult::Error(message) => {
            eprintln!("错误: {}", message);
            false
        }
    }
}
