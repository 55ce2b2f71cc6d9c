//! Generator configuration.

/// Default module path of the TLV library used by generated code.
pub const DEFAULT_TLV_PATH: &str = "crate::tlv";

/// Default module path of the hex serialization helpers.
pub const DEFAULT_HELPERS_PATH: &str = "crate::clusters::helpers";

/// Default number of positional command parameters before a params struct
/// is generated.
pub const DEFAULT_MAX_POSITIONAL_PARAMS: usize = 7;

/// Options controlling the shape of generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenConfig {
    /// Module path of the TLV library.
    pub tlv_path: String,
    /// Module path of the hex serialization helpers.
    pub helpers_path: String,
    /// Decode non-nullable single-value attributes as required values.
    pub strict_attributes: bool,
    /// Parameter count above which commands take a params struct.
    pub max_positional_params: usize,
    /// Write a `mod.rs` declaring every generated module.
    pub mod_file: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            tlv_path: DEFAULT_TLV_PATH.to_string(),
            helpers_path: DEFAULT_HELPERS_PATH.to_string(),
            strict_attributes: false,
            max_positional_params: DEFAULT_MAX_POSITIONAL_PARAMS,
            mod_file: true,
        }
    }
}

impl CodegenConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the TLV library path.
    #[must_use]
    pub fn tlv_path(mut self, path: impl Into<String>) -> Self {
        self.tlv_path = path.into();
        self
    }

    /// Sets the helpers module path.
    #[must_use]
    pub fn helpers_path(mut self, path: impl Into<String>) -> Self {
        self.helpers_path = path.into();
        self
    }

    /// Enables or disables strict attribute decoding.
    #[must_use]
    pub fn strict_attributes(mut self, strict: bool) -> Self {
        self.strict_attributes = strict;
        self
    }

    /// Sets the positional parameter limit.
    #[must_use]
    pub fn max_positional_params(mut self, max: usize) -> Self {
        self.max_positional_params = max;
        self
    }

    /// Enables or disables `mod.rs` output.
    #[must_use]
    pub fn mod_file(mut self, enabled: bool) -> Self {
        self.mod_file = enabled;
        self
    }

    /// `use` line bringing the TLV library into scope as `tlv`.
    #[must_use]
    pub fn tlv_import(&self) -> String {
        let path = self.tlv_path.trim_end_matches("::");
        if path == "tlv" || path.ends_with("::tlv") {
            format!("use {path};")
        } else {
            format!("use {path} as tlv;")
        }
    }
}
