//! pos-client 命令行入口

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pos_client::{
    config::AppConfig, models::order::OrderStatus, models::report::ReportRange, telemetry,
    ClientError, PosClient, RequestOptions,
};
use secrecy::Secret;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "pos-client", version, about = "POS backend client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 登录并保存会话
    Login {
        username: String,
        #[arg(long, env = "POS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// 清除本地会话
    Logout,
    /// 显示当前用户
    Whoami,
    /// 对任意接口发出认证 GET 请求并打印原始响应
    Get { target: String },
    /// 商品列表
    Products,
    /// 库存列表
    Stock {
        /// 只显示低于补货线的条目
        #[arg(long)]
        low: bool,
    },
    /// 订单列表
    Orders {
        #[arg(long, value_parser = parse_status)]
        status: Option<OrderStatus>,
    },
    /// 后厨看板
    Kitchen,
    /// 销售报表
    Report {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
}

fn parse_status(s: &str) -> Result<OrderStatus, String> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
        .map_err(|_| format!("unknown order status: {}", s))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 加载 .env 文件（开发环境）
fn load_env_files() {
    if let Ok(path) = std::env::var("POS_ENV") {
        dotenv::from_filename(format!(".env.{}", path)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 必须在解析参数前加载，POS_PASSWORD 才能从 .env 生效
    load_env_files();
    let cli = Cli::parse();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    telemetry::init_telemetry(&config.logging);

    let client = PosClient::from_config(config).await?;

    match run(&client, cli.command).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some(client_err) = e.downcast_ref::<ClientError>() {
                eprintln!("error: {}", client_err.user_message());
                if client_err.is_auth_error() {
                    eprintln!("hint: run `pos-client login <username>`");
                }
                std::process::exit(1);
            }
            Err(e)
        }
    }
}

async fn run(client: &PosClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let user = client.auth().login(&username, &Secret::new(password)).await?;
            println!("Signed in as {} ({})", user.username, user.role);
        }
        Command::Logout => {
            client.auth().logout().await?;
            println!("Signed out");
        }
        Command::Whoami => match client.auth().current_user().await? {
            Some(user) => print_json(&user)?,
            None => println!("Not signed in"),
        },
        Command::Get { target } => {
            let response = client.gateway().send(&target, RequestOptions::get()).await?;
            let status = response.status();
            let body = response.text().await.map_err(ClientError::from)?;
            println!("{}", status);
            println!("{}", body);
        }
        Command::Products => print_json(&client.products().list().await?)?,
        Command::Stock { low } => {
            let items = if low {
                client.stock().low_stock().await?
            } else {
                client.stock().list().await?
            };
            print_json(&items)?;
        }
        Command::Orders { status } => print_json(&client.orders().list(status).await?)?,
        Command::Kitchen => print_json(&client.orders().kitchen_board().await?)?,
        Command::Report { from, to } => {
            let range = ReportRange::new(from, to)
                .ok_or_else(|| ClientError::Validation("--from must not be after --to".to_string()))?;
            let report = client.reports().sales(range).await?;
            print_json(&report)?;
            println!("Average order value: {:.2}", report.average_order_value());
        }
    }
    Ok(())
}
