//! Repository traits and their SQLx / in-process implementations.

pub mod invite_link;
pub mod member;
pub mod memory;

pub use invite_link::{InviteLinkRepository, SqlxInviteLinkRepository};
pub use member::{MemberRepository, SqlxMemberRepository};
pub use memory::{InMemoryInviteLinkRepository, InMemoryMemberRepository};
