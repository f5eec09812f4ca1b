use super::api_error;
use crate::api::*;
use async_trait::async_trait;
use aws_sdk_ec2::Client;

pub struct SdkEc2 {
    client: Client,
}

impl SdkEc2 {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl Ec2Api for SdkEc2 {
    async fn delete_security_group(&self, group_id: &str) -> ApiResult<()> {
        self.client
            .delete_security_group()
            .group_id(group_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_vpc_peering_connection(&self, connection_id: &str) -> ApiResult<()> {
        self.client
            .delete_vpc_peering_connection()
            .vpc_peering_connection_id(connection_id)
            .send()
            .await
            .map_err(api_error)?;
        Ok(())
    }
}
