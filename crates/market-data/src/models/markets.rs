use serde::{Deserialize, Serialize};

/// A market ranked by traded volume
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopMarket {
    pub symbol: String,
    pub price: f64,
    pub quote_asset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_asset: Option<String>,
}

/// Markets for one quote asset, highest volume first
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopMarketsResponse {
    pub exchange: String,
    pub markets: Vec<TopMarket>,
}
