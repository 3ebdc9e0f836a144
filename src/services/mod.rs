//! Typed resource services layer
//!
//! Each screen talks to the backend through one of these services; all of
//! them go through [`ApiGateway`](crate::gateway::ApiGateway).

pub mod order_service;
pub mod product_service;
pub mod report_service;
pub mod stock_service;
pub mod user_service;

pub use order_service::OrderService;
pub use product_service::ProductService;
pub use report_service::ReportService;
pub use stock_service::StockService;
pub use user_service::UserService;
