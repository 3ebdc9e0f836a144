//! POS 客户端库
//! 认证请求网关、会话凭据管理以及收银、商品、库存、后厨、报表接口的类型化封装

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod models;
pub mod services;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use client::PosClient;
pub use error::{ClientError, Result};
pub use gateway::{ApiGateway, RequestOptions};
