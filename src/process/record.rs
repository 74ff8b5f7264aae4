/// One whitelisted product after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    /// Trimmed, uppercased product code.
    pub sku: String,
    pub name: String,
    /// Unparseable quantities become 0.
    pub qty: i64,
    /// Unparseable prices stay missing.
    pub price: Option<f64>,
}
