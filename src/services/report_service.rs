//! 销售报表服务

use std::sync::Arc;

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::report::{ReportRange, SalesReport};

pub struct ReportService {
    gateway: Arc<ApiGateway>,
}

impl ReportService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub async fn sales(&self, range: ReportRange) -> Result<SalesReport> {
        let target = format!(
            "/reports/sales/?start={}&end={}",
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d")
        );
        self.gateway.get_json(&target).await
    }
}
