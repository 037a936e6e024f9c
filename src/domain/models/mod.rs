pub mod config;
pub mod envelope;
pub mod zone;

pub use config::{
    ApiConfig, Config, CredentialsConfig, LoggingConfig, RateLimitConfig, RetryConfig,
};
pub use envelope::{
    ApiResponse, PaginatedResponse, Response, ResponseInfo, ResultInfo, ResultInfoCursors,
};
pub use zone::{
    is_valid_zone_identifier, Account, AccountSettings, Owner, Zone, ZoneHost, ZoneId, ZoneMeta,
    ZoneParams, ZonePlan, ZonePlanCommon,
};
