pub mod models;
pub mod post_draft;

pub use models::{
    Follow, Identity, NewPost, PostRecord, PostView, ProfileCounts, ProfileView, UserSummary,
};
pub use post_draft::{parse_ref, PostDraft, RawPostInput};
