/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("metric value {value} not representable: exponent {exponent} exceeds the 3-bit field")]
    MetricRange { value: f64, exponent: u32 },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("truncated advertisement: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("advertisement decode error: {0}")]
    Decode(String),

    #[error("invalid link type: {0}")]
    InvalidLinkType(u8),

    #[error("invalid QoS metric kind: {0}")]
    InvalidQosKind(u8),

    #[error("queue number {0} does not fit the 3-bit queue field")]
    InvalidQueueNumber(u8),
}
