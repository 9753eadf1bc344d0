pub mod error;
pub mod models;
pub mod registration;
pub mod responder;
pub mod restrictions;
pub mod sentiment;

pub use error::ValidationError;
pub use models::*;
pub use registration::{
    age_in_years, validate_login, validate_registration, DEMO_LOGIN_AGE, MAX_REGISTRATION_AGE,
    MIN_PASSWORD_LEN, MIN_REGISTRATION_AGE,
};
pub use responder::{candidates, select_reply, IndexSource, GREETING};
pub use restrictions::{access_policy, dashboard_view, recent_blocks, restrictions_for_age};
pub use sentiment::{classify, normalize_text};
