use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinktallyError {
    InvalidUrlFormat(String),
    InvalidAliasFormat(String),
    AliasInUse(String),
    CodeSpaceExhausted(String),
    NotFound(String),
    Expired(String),
    CacheUnavailable(String),
    StoreUnavailable(String),
    DuplicateCode(String),
    Validation(String),
    DatabaseConfig(String),
    Serialization(String),
    Config(String),
}

impl LinktallyError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinktallyError::InvalidUrlFormat(_) => "E001",
            LinktallyError::InvalidAliasFormat(_) => "E002",
            LinktallyError::AliasInUse(_) => "E003",
            LinktallyError::CodeSpaceExhausted(_) => "E004",
            LinktallyError::NotFound(_) => "E005",
            LinktallyError::Expired(_) => "E006",
            LinktallyError::CacheUnavailable(_) => "E007",
            LinktallyError::StoreUnavailable(_) => "E008",
            LinktallyError::DuplicateCode(_) => "E009",
            LinktallyError::Validation(_) => "E010",
            LinktallyError::DatabaseConfig(_) => "E011",
            LinktallyError::Serialization(_) => "E012",
            LinktallyError::Config(_) => "E013",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinktallyError::InvalidUrlFormat(_) => "Invalid URL Format",
            LinktallyError::InvalidAliasFormat(_) => "Invalid Alias Format",
            LinktallyError::AliasInUse(_) => "Alias In Use",
            LinktallyError::CodeSpaceExhausted(_) => "Code Space Exhausted",
            LinktallyError::NotFound(_) => "Resource Not Found",
            LinktallyError::Expired(_) => "Link Expired",
            LinktallyError::CacheUnavailable(_) => "Cache Unavailable",
            LinktallyError::StoreUnavailable(_) => "Store Unavailable",
            LinktallyError::DuplicateCode(_) => "Duplicate Code",
            LinktallyError::Validation(_) => "Validation Error",
            LinktallyError::DatabaseConfig(_) => "Database Configuration Error",
            LinktallyError::Serialization(_) => "Serialization Error",
            LinktallyError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinktallyError::InvalidUrlFormat(msg)
            | LinktallyError::InvalidAliasFormat(msg)
            | LinktallyError::AliasInUse(msg)
            | LinktallyError::CodeSpaceExhausted(msg)
            | LinktallyError::NotFound(msg)
            | LinktallyError::Expired(msg)
            | LinktallyError::CacheUnavailable(msg)
            | LinktallyError::StoreUnavailable(msg)
            | LinktallyError::DuplicateCode(msg)
            | LinktallyError::Validation(msg)
            | LinktallyError::DatabaseConfig(msg)
            | LinktallyError::Serialization(msg)
            | LinktallyError::Config(msg) => msg,
        }
    }

    /// Caller mistakes: retrying the same request will fail the same way.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LinktallyError::InvalidUrlFormat(_)
                | LinktallyError::InvalidAliasFormat(_)
                | LinktallyError::AliasInUse(_)
                | LinktallyError::NotFound(_)
                | LinktallyError::Expired(_)
                | LinktallyError::Validation(_)
        )
    }

    /// Server-side conditions where the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LinktallyError::CodeSpaceExhausted(_)
                | LinktallyError::StoreUnavailable(_)
                | LinktallyError::CacheUnavailable(_)
        )
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinktallyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinktallyError {}

// 便捷的构造函数
impl LinktallyError {
    pub fn invalid_url_format<T: Into<String>>(msg: T) -> Self {
        LinktallyError::InvalidUrlFormat(msg.into())
    }

    pub fn invalid_alias_format<T: Into<String>>(msg: T) -> Self {
        LinktallyError::InvalidAliasFormat(msg.into())
    }

    pub fn alias_in_use<T: Into<String>>(msg: T) -> Self {
        LinktallyError::AliasInUse(msg.into())
    }

    pub fn code_space_exhausted<T: Into<String>>(msg: T) -> Self {
        LinktallyError::CodeSpaceExhausted(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinktallyError::NotFound(msg.into())
    }

    pub fn expired<T: Into<String>>(msg: T) -> Self {
        LinktallyError::Expired(msg.into())
    }

    pub fn cache_unavailable<T: Into<String>>(msg: T) -> Self {
        LinktallyError::CacheUnavailable(msg.into())
    }

    pub fn store_unavailable<T: Into<String>>(msg: T) -> Self {
        LinktallyError::StoreUnavailable(msg.into())
    }

    pub fn duplicate_code<T: Into<String>>(msg: T) -> Self {
        LinktallyError::DuplicateCode(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinktallyError::Validation(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinktallyError::DatabaseConfig(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinktallyError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinktallyError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinktallyError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinktallyError::StoreUnavailable(err.to_string())
    }
}

impl From<redis::RedisError> for LinktallyError {
    fn from(err: redis::RedisError) -> Self {
        LinktallyError::CacheUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for LinktallyError {
    fn from(err: std::io::Error) -> Self {
        LinktallyError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for LinktallyError {
    fn from(err: serde_json::Error) -> Self {
        LinktallyError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinktallyError>;
