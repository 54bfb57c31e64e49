use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct HostPortRequest {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    pub timeout: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ElasticsearchRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub timeout: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MqttRequest {
    #[serde(default)]
    pub host: String,
    pub port: Option<u16>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub timeout: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub export_type: String,
}
