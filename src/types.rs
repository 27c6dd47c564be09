use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserInfo {
    pub bio: String,
    pub full_name: String,
    pub id: String,
    pub profile_picture: String,
    pub username: String,
    pub website: String,
    pub follower_count: u32,
    pub following_count: u32,
    pub media_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Caption {
    pub created_time: String,
    pub id: String,
    pub text: String,
    pub from: UserInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comment {
    pub created_time: String,
    pub id: String,
    pub text: String,
    pub from: UserInfo,
}

/// One resolution variant of an image or video.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostMedia {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Position of a tagged user, relative to the image (0.0 to 1.0 on both axes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserInPhoto {
    pub position: Position,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostData {
    pub caption: Caption,
    pub attribution: String,
    pub created_time: String,
    pub filter: String,
    pub link: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub location: Location,

    // Only filled when `kind == "image"`
    pub image_low_resolution: PostMedia,
    pub image_standard_resolution: PostMedia,
    pub image_thumbnail: PostMedia,

    // Only filled when `kind == "video"`
    pub video_low_bandwidth: PostMedia,
    pub video_low_resolution: PostMedia,
    pub video_standard_resolution: PostMedia,

    pub user: UserInfo,
    pub user_has_liked: bool,
    pub like_count: u32,
    pub comment_count: u32,
    pub comments: Vec<Comment>,
    pub tags: Vec<String>,
    pub users_in_photo: Vec<UserInPhoto>,
    pub likes: Vec<UserInfo>,
}

impl PostData {
    /// `created_time` (unix seconds) formatted as RFC 3339.
    pub fn created_at(&self) -> Option<String> {
        let secs: i64 = self.created_time.parse().ok()?;
        let time = OffsetDateTime::from_unix_timestamp(secs).ok()?;
        time.format(&Rfc3339).ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub outgoing_status: String,
    pub incoming_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagInfo {
    pub name: String,
    pub media_count: u32,
}

/// Opaque paging cursors. An empty field means there are no more results for
/// that cursor type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub min_tag_id: String,
    pub next_max_id: String,
    pub next_max_tag_id: String,
    pub next_min_id: String,
    pub next_url: String,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        !self.next_url.is_empty()
    }
}

/// API-level status, independent of the HTTP status of the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub code: String,
    pub error_type: String,
    pub error_message: String,
}

impl Meta {
    pub fn is_error(&self) -> bool {
        !self.error_type.is_empty() || (!self.code.is_empty() && self.code != "200")
    }
}

impl std::fmt::Display for Meta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "code={} error_type={} error_message={}",
            self.code, self.error_type, self.error_message
        )
    }
}

/// One page of posts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Posts {
    pub data: Vec<PostData>,
    pub pagination: Pagination,
}
