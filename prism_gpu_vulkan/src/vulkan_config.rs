/// Vulkan backend configuration

/// Validation message severity to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Validation message categories to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMessageFilter {
    pub show_general: bool,
    pub show_validation: bool,
    pub show_performance: bool,
}

impl Default for DebugMessageFilter {
    fn default() -> Self {
        Self {
            show_general: true,
            show_validation: true,
            show_performance: false,
        }
    }
}

/// Counters of validation messages received since the backend was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

#[derive(Debug, Clone)]
pub struct VulkanConfig {
    /// Application name reported to the driver
    pub app_name: String,

    /// Enable VK_LAYER_KHRONOS_validation (needs the `vulkan-validation` feature)
    pub enable_validation: bool,

    pub debug_severity: DebugSeverity,

    pub debug_message_filter: DebugMessageFilter,

    /// Count validation messages (see `get_validation_stats`)
    pub enable_validation_stats: bool,

    /// Panic on the first validation error
    pub panic_on_error: bool,
}

impl Default for VulkanConfig {
    fn default() -> Self {
        Self {
            app_name: "Prism Application".to_string(),
            enable_validation: cfg!(debug_assertions),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            debug_message_filter: DebugMessageFilter::default(),
            enable_validation_stats: false,
            panic_on_error: false,
        }
    }
}
