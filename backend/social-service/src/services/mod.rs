//! Business logic layer for social-service

pub mod follow;
pub mod markup;
pub mod posts;
pub mod profile;
pub mod view_composer;

pub use follow::FollowService;
pub use markup::strip_markup;
pub use posts::{PostService, UpdateOutcome};
pub use profile::ProfileService;
pub use view_composer::{PostQuery, ViewComposer, ViewStage};
