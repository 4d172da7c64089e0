use tracing::warn;

/// Environment variable overriding [`DecoderConfig::max_operand_len`].
pub const MAX_OPERAND_LEN_ENV: &str = "OPSTREAM_MAX_OPERAND_LEN";

/// Decoder limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest operand length accepted. Applies to prefix-derived lengths and
    /// to the table's fixed sizes alike: a longer declaration is reported as
    /// [`Error::TruncatedOperand`](opstream_core::Error::TruncatedOperand)
    /// even when the script holds enough bytes.
    pub max_operand_len: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            // 4-byte prefixes with the high bit set never describe a real operand
            max_operand_len: i32::MAX as u32,
        }
    }
}

impl DecoderConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_var(std::env::var(MAX_OPERAND_LEN_ENV).ok().as_deref())
    }

    fn from_var(value: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = value {
            match raw.trim().parse::<u32>() {
                Ok(limit) => config.max_operand_len = limit,
                Err(err) => warn!(
                    var = MAX_OPERAND_LEN_ENV,
                    value = raw,
                    error = %err,
                    "ignoring invalid operand length limit"
                ),
            }
        }
        config
    }
}
