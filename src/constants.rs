// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DATABASE_FILE: &str = "ggfm.db";

// Routing
pub const APP_PREFIX: &str = "/ggfm";
pub const LOGIN_PATH: &str = "/ggfm/login/";
pub const DASHBOARD_PATH: &str = "/ggfm/dashboard/";
pub const HOME_PATH: &str = "/";

// Session configuration
pub const SESSION_NAME: &str = "ggfm_session";
pub const SESSION_EXPIRY_DAYS: i64 = 14;
pub const MIN_SESSION_SECRET_LENGTH: usize = 64;
pub const SESSION_USER_ID: &str = "user_id";
pub const SESSION_USERNAME: &str = "username";
pub const SESSION_MESSAGES: &str = "_messages";

// Dashboard
pub const DASHBOARD_ITEMS: u32 = 5;

// Field limits
pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_LOCATION_LENGTH: usize = 255;
pub const MAX_HOST_LENGTH: usize = 100;
pub const MAX_TASK_LENGTH: usize = 255;
pub const MAX_ADVERTISER_LENGTH: usize = 100;
pub const MONEY_MAX_DIGITS: u32 = 10;
pub const MONEY_DECIMAL_PLACES: u32 = 2;

// Error messages
pub const ERR_REQUIRED: &str = "This field is required.";
pub const ERR_INVALID_DATE: &str = "Enter a valid date.";
pub const ERR_INVALID_DATETIME: &str = "Enter a valid date/time.";
pub const ERR_INVALID_NUMBER: &str = "Enter a number.";
pub const ERR_INVALID_INTEGER: &str = "Enter a whole number.";
pub const ERR_INVALID_EMAIL: &str = "Enter a valid email address.";
pub const ERR_INVALID_LOGIN: &str = "Invalid username or password.";
pub const ERR_USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const ERR_PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
