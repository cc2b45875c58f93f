//! # Domain Types
//!
//! Plain data for the invite flow: invite links, members and their ids.

pub mod id;
pub mod invite_link;
pub mod member;

pub use id::{AuthId, CompanyId, InviteLinkId};
pub use invite_link::{AudienceParseError, InviteAudience, InviteLink};
pub use member::Member;
