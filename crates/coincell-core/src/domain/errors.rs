use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoincResult<T> = Result<T, CoincError>;
pub type IngestResult<T> = CoincResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoincErrorCategory {
    Success,
    ConfigurationError,
    IngestionError,
    IoSystemError,
    ResourceError,
    InternalError,
}

impl CoincErrorCategory {
    pub const fn exit_mapping(self) -> ExitMapping {
        match self {
            Self::Success => ExitMapping {
                exit_code: 0,
                rust_category: "Success",
                diagnostic_class: "OK",
            },
            Self::ConfigurationError => ExitMapping {
                exit_code: 2,
                rust_category: "ConfigurationError",
                diagnostic_class: "CONFIG_FATAL",
            },
            Self::IngestionError => ExitMapping {
                exit_code: 3,
                rust_category: "IngestionError",
                diagnostic_class: "INPUT_FATAL",
            },
            Self::IoSystemError => ExitMapping {
                exit_code: 3,
                rust_category: "IoSystemError",
                diagnostic_class: "IO_FATAL",
            },
            Self::ResourceError => ExitMapping {
                exit_code: 4,
                rust_category: "ResourceError",
                diagnostic_class: "RESOURCE_FATAL",
            },
            Self::InternalError => ExitMapping {
                exit_code: 5,
                rust_category: "InternalError",
                diagnostic_class: "INVARIANT_FATAL",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_mapping().exit_code
    }

    pub const fn rust_category(self) -> &'static str {
        self.exit_mapping().rust_category
    }

    pub const fn diagnostic_class(self) -> &'static str {
        self.exit_mapping().diagnostic_class
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitMapping {
    pub exit_code: i32,
    pub rust_category: &'static str,
    pub diagnostic_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoincError {
    category: CoincErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl CoincError {
    pub fn new(
        category: CoincErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn configuration(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(CoincErrorCategory::ConfigurationError, placeholder, message)
    }

    pub fn ingestion(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(CoincErrorCategory::IngestionError, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(CoincErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn resource(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(CoincErrorCategory::ResourceError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(CoincErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> CoincErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for CoincError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.rust_category(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for CoincError {}

#[cfg(test)]
mod tests {
    use super::{CoincError, CoincErrorCategory};

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (CoincErrorCategory::Success, 0, "Success", "OK"),
            (
                CoincErrorCategory::ConfigurationError,
                2,
                "ConfigurationError",
                "CONFIG_FATAL",
            ),
            (
                CoincErrorCategory::IngestionError,
                3,
                "IngestionError",
                "INPUT_FATAL",
            ),
            (
                CoincErrorCategory::IoSystemError,
                3,
                "IoSystemError",
                "IO_FATAL",
            ),
            (
                CoincErrorCategory::ResourceError,
                4,
                "ResourceError",
                "RESOURCE_FATAL",
            ),
            (
                CoincErrorCategory::InternalError,
                5,
                "InternalError",
                "INVARIANT_FATAL",
            ),
        ];

        for (category, exit_code, rust_category, diagnostic_class) in cases {
            let mapping = category.exit_mapping();
            assert_eq!(mapping.exit_code, exit_code);
            assert_eq!(mapping.rust_category, rust_category);
            assert_eq!(mapping.diagnostic_class, diagnostic_class);
        }
    }

    #[test]
    fn fatal_error_renders_diagnostic_lines() {
        let error = CoincError::ingestion(
            "INPUT.MALFORMED_RECORD",
            "line 3 of 'run.txt' has 5 fields, expected 6",
        );

        assert_eq!(error.exit_code(), 3);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [INPUT.MALFORMED_RECORD] line 3 of 'run.txt' has 5 fields, expected 6"
        );
        assert_eq!(
            error.fatal_exit_line().as_deref(),
            Some("FATAL EXIT CODE: 3")
        );
    }
}
