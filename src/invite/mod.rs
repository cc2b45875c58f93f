//! The invite flow: validate a token, carry it across sign-in in a cookie,
//! then link the signed-in member to the inviting company.

pub mod cookie;
pub mod error;
pub mod finalizer;
pub mod redirect;
pub mod validator;

pub use cookie::{
    encode, is_valid_value, to_header, CookieError, CookieOptions, InviteCookie, SameSitePolicy,
};
pub use error::{InviteError, InviteResult};
pub use finalizer::{FinalizeOutcome, InviteFinalizer};
pub use redirect::RedirectPolicy;
pub use validator::{evaluate, InviteValidator, ValidInvite};
