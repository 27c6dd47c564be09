//! Typed client for the Instagram v1 REST API.
//!
//! ```no_run
//! use instagram_client::{Config, Instagram, RecentMediaParams};
//!
//! # async fn run() -> Result<(), instagram_client::InstagramError> {
//! let mut instagram = Instagram::new(Config::builder().access_token("TOKEN").build())?;
//!
//! let request = instagram.endpoints().user_recent_media(&RecentMediaParams::default());
//! let posts = instagram.fetch(request).await?;
//! for post in posts.data {
//!     println!("{} {}", post.id, post.caption.text);
//! }
//!
//! let meta = instagram.last_error();
//! if meta.is_error() {
//!     eprintln!("{}", meta);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod dispatch;
mod endpoint;
mod error;
pub mod parse;
mod transport;
mod types;

pub use client::Instagram;
pub use config::Config;
pub use dispatch::RequestId;
pub use endpoint::{
    ApiRequest, Endpoint, Endpoints, FeedParams, LikedMediaParams, LocationMediaParams,
    LocationSearchParams, MediaSearchParams, RecentMediaParams, RelationshipAction,
    TagMediaParams, DEFAULT_API_ROOT, DEFAULT_COUNT, DEFAULT_DISTANCE,
};
pub use error::InstagramError;
pub use transport::{HttpMethod, HttpRequest, HttpTransport, Transport};
pub use types::{
    Caption, Comment, Location, Meta, Pagination, Position, PostData, PostMedia, Posts,
    Relationship, TagInfo, UserInPhoto, UserInfo,
};
