//! URL construction for every API endpoint.
//!
//! Builders never fail. Optional query parameters are appended only when
//! non-empty; the access token is always the first query parameter.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use typed_builder::TypedBuilder;

use crate::parse;
use crate::transport::{HttpMethod, HttpRequest};
use crate::types::{
    Comment, Location, Pagination, PostData, Posts, Relationship, TagInfo, UserInfo,
};

pub const DEFAULT_API_ROOT: &str = "https://api.instagram.com/v1/";
pub const DEFAULT_COUNT: u32 = 20;
pub const DEFAULT_DISTANCE: u32 = 1000;

/// Escapes path segments and query values alike. RFC 3986 unreserved
/// characters stay as they are.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    UserInfo,
    UserFeed,
    UserRecentMedia,
    UserLikedMedia,
    UserSearch,
    RelationshipFollowing,
    RelationshipFollowers,
    RelationshipFollowRequests,
    RelationshipStatus,
    RelationshipChange,
    MediaInformation,
    MediaSearch,
    MediaPopular,
    CommentsForMedia,
    LikesForMedia,
    TagInfo,
    TagPostList,
    TagSearch,
    LocationInfo,
    LocationRecentMedia,
    LocationSearch,
}

impl Endpoint {
    pub fn name(self) -> &'static str {
        match self {
            Self::UserInfo => "request_user_info",
            Self::UserFeed => "request_user_feed",
            Self::UserRecentMedia => "request_user_recent_media",
            Self::UserLikedMedia => "request_user_liked_media",
            Self::UserSearch => "request_user_search",
            Self::RelationshipFollowing => "request_relationship_following",
            Self::RelationshipFollowers => "request_relationship_followers",
            Self::RelationshipFollowRequests => "request_relationship_follow_requests",
            Self::RelationshipStatus => "request_relationship_user_rel",
            Self::RelationshipChange => "request_relationship_change",
            Self::MediaInformation => "request_media_information",
            Self::MediaSearch => "request_media_search",
            Self::MediaPopular => "request_media_popular",
            Self::CommentsForMedia => "request_comment_for_media",
            Self::LikesForMedia => "request_list_of_users_who_liked_media",
            Self::TagInfo => "request_tag_info",
            Self::TagPostList => "request_tag_post_list",
            Self::TagSearch => "request_tag_search",
            Self::LocationInfo => "request_location_info",
            Self::LocationRecentMedia => "request_location_recent_media",
            Self::LocationSearch => "request_location_search",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully built request together with the mapper for its response envelope.
pub struct ApiRequest<T> {
    endpoint: Endpoint,
    request: HttpRequest,
    map: fn(&Value) -> T,
}

impl<T> ApiRequest<T> {
    fn new(endpoint: Endpoint, request: HttpRequest, map: fn(&Value) -> T) -> Self {
        Self {
            endpoint,
            request,
            map,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn url(&self) -> &str {
        &self.request.url
    }

    pub fn http_request(&self) -> &HttpRequest {
        &self.request
    }

    /// Maps a parsed response envelope into the result type.
    pub fn map(&self, envelope: &Value) -> T {
        (self.map)(envelope)
    }

    pub(crate) fn into_parts(self) -> (Endpoint, HttpRequest, fn(&Value) -> T) {
        (self.endpoint, self.request, self.map)
    }
}

impl ApiRequest<Posts> {
    /// The request for the page after `pagination`, if there is one.
    pub fn next_page(&self, pagination: &Pagination) -> Option<Self> {
        if !pagination.has_next() {
            return None;
        }
        Some(Self::new(
            self.endpoint,
            HttpRequest::get(pagination.next_url.clone()),
            self.map,
        ))
    }
}

impl<T> Clone for ApiRequest<T> {
    fn clone(&self) -> Self {
        Self::new(self.endpoint, self.request.clone(), self.map)
    }
}

impl<T> fmt::Debug for ApiRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("endpoint", &self.endpoint)
            .field("request", &self.request)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipAction {
    Follow,
    Unfollow,
    Block,
    Unblock,
    Approve,
    Ignore,
}

impl RelationshipAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Unfollow => "unfollow",
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Approve => "approve",
            Self::Ignore => "ignore",
        }
    }
}

impl FromStr for RelationshipAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow" => Ok(Self::Follow),
            "unfollow" => Ok(Self::Unfollow),
            "block" => Ok(Self::Block),
            "unblock" => Ok(Self::Unblock),
            "approve" => Ok(Self::Approve),
            "ignore" => Ok(Self::Ignore),
            _ => Err(format!("unknown relationship action: {}", s)),
        }
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct FeedParams {
    #[builder(default = String::from("self"), setter(into))]
    pub who: String,
    #[builder(default = DEFAULT_COUNT)]
    pub count: u32,
    #[builder(default, setter(into))]
    pub min_id: String,
    #[builder(default, setter(into))]
    pub max_id: String,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct RecentMediaParams {
    #[builder(default = String::from("self"), setter(into))]
    pub who: String,
    #[builder(default = DEFAULT_COUNT)]
    pub count: u32,
    #[builder(default, setter(into))]
    pub max_timestamp: String,
    #[builder(default, setter(into))]
    pub min_timestamp: String,
    #[builder(default, setter(into))]
    pub min_id: String,
    #[builder(default, setter(into))]
    pub max_id: String,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct LikedMediaParams {
    #[builder(default = String::from("self"), setter(into))]
    pub who: String,
    #[builder(default = DEFAULT_COUNT)]
    pub count: u32,
    #[builder(default, setter(into))]
    pub max_like_id: String,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct MediaSearchParams {
    #[builder(default, setter(into))]
    pub lat: String,
    #[builder(default, setter(into))]
    pub lng: String,
    #[builder(default, setter(into))]
    pub min_timestamp: String,
    #[builder(default, setter(into))]
    pub max_timestamp: String,
    #[builder(default = DEFAULT_DISTANCE)]
    pub distance: u32,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct TagMediaParams {
    #[builder(default = DEFAULT_COUNT)]
    pub count: u32,
    #[builder(default, setter(into))]
    pub min_tag_id: String,
    #[builder(default, setter(into))]
    pub max_tag_id: String,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct LocationMediaParams {
    #[builder(default, setter(into))]
    pub min_timestamp: String,
    #[builder(default, setter(into))]
    pub max_timestamp: String,
    #[builder(default, setter(into))]
    pub min_id: String,
    #[builder(default, setter(into))]
    pub max_id: String,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct LocationSearchParams {
    #[builder(default, setter(into))]
    pub lat: String,
    #[builder(default, setter(into))]
    pub lng: String,
    #[builder(default, setter(into))]
    pub facebook_places_id: String,
    #[builder(default, setter(into))]
    pub foursquare_id: String,
    #[builder(default = DEFAULT_DISTANCE)]
    pub distance: u32,
}

macro_rules! impl_default_from_builder {
    ($($params:ty),*) => {
        $(impl Default for $params {
            fn default() -> Self {
                Self::builder().build()
            }
        })*
    };
}

impl_default_from_builder!(
    FeedParams,
    RecentMediaParams,
    LikedMediaParams,
    MediaSearchParams,
    TagMediaParams,
    LocationMediaParams,
    LocationSearchParams
);

/// Builds `ApiRequest`s against one API root with one access token.
#[derive(Debug, Clone)]
pub struct Endpoints {
    root: String,
    access_token: String,
}

impl Endpoints {
    pub fn new(root: &str, access_token: &str) -> Self {
        let mut root = root.to_owned();
        if !root.ends_with('/') {
            root.push('/');
        }
        Self {
            root,
            access_token: access_token.to_owned(),
        }
    }

    fn query(&self, family: &str, path: &str) -> Query {
        Query::new(&format!("{}{}/{}", self.root, family, path), &self.access_token)
    }

    fn users(&self, path: &str) -> Query {
        self.query("users", path)
    }

    fn media(&self, path: &str) -> Query {
        self.query("media", path)
    }

    fn tags(&self, path: &str) -> Query {
        self.query("tags", path)
    }

    fn locations(&self, path: &str) -> Query {
        self.query("locations", path)
    }

    // Users

    pub fn user_info(&self, who: &str) -> ApiRequest<UserInfo> {
        let url = self.users(&format!("{}/", segment(who))).finish();
        ApiRequest::new(Endpoint::UserInfo, HttpRequest::get(url), |json| {
            parse::parse_user_info(&json["data"])
        })
    }

    pub fn user_feed(&self, params: &FeedParams) -> ApiRequest<Posts> {
        let url = self
            .users(&format!("{}/feed", segment(&params.who)))
            .param("count", &params.count.to_string())
            .param("min_id", &params.min_id)
            .param("max_id", &params.max_id)
            .finish();
        ApiRequest::new(Endpoint::UserFeed, HttpRequest::get(url), parse::parse_posts)
    }

    pub fn user_recent_media(&self, params: &RecentMediaParams) -> ApiRequest<Posts> {
        let url = self
            .users(&format!("{}/media/recent", segment(&params.who)))
            .param("count", &params.count.to_string())
            .param("min_id", &params.min_id)
            .param("max_id", &params.max_id)
            .param("min_timestamp", &params.min_timestamp)
            .param("max_timestamp", &params.max_timestamp)
            .finish();
        ApiRequest::new(
            Endpoint::UserRecentMedia,
            HttpRequest::get(url),
            parse::parse_posts,
        )
    }

    pub fn user_liked_media(&self, params: &LikedMediaParams) -> ApiRequest<Posts> {
        let url = self
            .users(&format!("{}/media/liked", segment(&params.who)))
            .param("count", &params.count.to_string())
            .param("max_like_id", &params.max_like_id)
            .finish();
        ApiRequest::new(
            Endpoint::UserLikedMedia,
            HttpRequest::get(url),
            parse::parse_posts,
        )
    }

    pub fn search_users(&self, query: &str, count: u32) -> ApiRequest<Vec<UserInfo>> {
        let url = self
            .users("search")
            .param("count", &count.to_string())
            .param("q", query)
            .finish();
        ApiRequest::new(
            Endpoint::UserSearch,
            HttpRequest::get(url),
            parse::parse_user_infos,
        )
    }

    // Relationships

    pub fn follows(&self, who: &str) -> ApiRequest<Vec<UserInfo>> {
        let url = self.users(&format!("{}/follows", segment(who))).finish();
        ApiRequest::new(
            Endpoint::RelationshipFollowing,
            HttpRequest::get(url),
            parse::parse_user_infos,
        )
    }

    pub fn followed_by(&self, who: &str) -> ApiRequest<Vec<UserInfo>> {
        let url = self.users(&format!("{}/followed-by", segment(who))).finish();
        ApiRequest::new(
            Endpoint::RelationshipFollowers,
            HttpRequest::get(url),
            parse::parse_user_infos,
        )
    }

    pub fn requested_by(&self, who: &str) -> ApiRequest<Vec<UserInfo>> {
        let url = self.users(&format!("{}/requested-by", segment(who))).finish();
        ApiRequest::new(
            Endpoint::RelationshipFollowRequests,
            HttpRequest::get(url),
            parse::parse_user_infos,
        )
    }

    pub fn relationship(&self, who: &str) -> ApiRequest<Relationship> {
        let url = self.users(&format!("{}/relationship", segment(who))).finish();
        ApiRequest::new(Endpoint::RelationshipStatus, HttpRequest::get(url), |json| {
            parse::parse_relationship(&json["data"])
        })
    }

    pub fn change_relationship(
        &self,
        who: &str,
        action: RelationshipAction,
    ) -> ApiRequest<Relationship> {
        let url = self.users(&format!("{}/relationship", segment(who))).finish();
        let request = HttpRequest::post(url, vec![("action".to_owned(), action.as_str().to_owned())]);
        ApiRequest::new(Endpoint::RelationshipChange, request, |json| {
            parse::parse_relationship(&json["data"])
        })
    }

    // Media

    pub fn media_info(&self, media_id: &str) -> ApiRequest<PostData> {
        let url = self.media(&segment(media_id)).finish();
        ApiRequest::new(Endpoint::MediaInformation, HttpRequest::get(url), |json| {
            parse::parse_post_data(&json["data"])
        })
    }

    pub fn media_by_shortcode(&self, shortcode: &str) -> ApiRequest<PostData> {
        let url = self.media(&format!("shortcode/{}", segment(shortcode))).finish();
        ApiRequest::new(Endpoint::MediaInformation, HttpRequest::get(url), |json| {
            parse::parse_post_data(&json["data"])
        })
    }

    pub fn search_media(&self, params: &MediaSearchParams) -> ApiRequest<Posts> {
        let url = self
            .media("search")
            .param("lat", &params.lat)
            .param("lng", &params.lng)
            .param("min_timestamp", &params.min_timestamp)
            .param("max_timestamp", &params.max_timestamp)
            .param("distance", &params.distance.to_string())
            .finish();
        ApiRequest::new(Endpoint::MediaSearch, HttpRequest::get(url), parse::parse_posts)
    }

    pub fn popular_media(&self) -> ApiRequest<Posts> {
        let url = self.media("popular").finish();
        ApiRequest::new(Endpoint::MediaPopular, HttpRequest::get(url), parse::parse_posts)
    }

    // Comments and likes

    pub fn media_comments(&self, media_id: &str) -> ApiRequest<Vec<Comment>> {
        let url = self.media(&format!("{}/comments", segment(media_id))).finish();
        ApiRequest::new(Endpoint::CommentsForMedia, HttpRequest::get(url), |json| {
            parse::parse_comments(&json["data"])
        })
    }

    pub fn media_likes(&self, media_id: &str) -> ApiRequest<Vec<UserInfo>> {
        let url = self.media(&format!("{}/likes", segment(media_id))).finish();
        ApiRequest::new(
            Endpoint::LikesForMedia,
            HttpRequest::get(url),
            parse::parse_user_infos,
        )
    }

    // Tags

    pub fn tag_info(&self, tag_name: &str) -> ApiRequest<TagInfo> {
        let url = self.tags(&segment(tag_name)).finish();
        ApiRequest::new(Endpoint::TagInfo, HttpRequest::get(url), |json| {
            parse::parse_tag_info(&json["data"])
        })
    }

    pub fn tag_recent_media(&self, tag_name: &str, params: &TagMediaParams) -> ApiRequest<Posts> {
        let url = self
            .tags(&format!("{}/media/recent", segment(tag_name)))
            .param("min_tag_id", &params.min_tag_id)
            .param("max_tag_id", &params.max_tag_id)
            .param("count", &params.count.to_string())
            .finish();
        ApiRequest::new(Endpoint::TagPostList, HttpRequest::get(url), parse::parse_posts)
    }

    pub fn search_tags(&self, query: &str) -> ApiRequest<Vec<TagInfo>> {
        let url = self.tags("search").param("q", query).finish();
        ApiRequest::new(
            Endpoint::TagSearch,
            HttpRequest::get(url),
            parse::parse_tag_infos,
        )
    }

    // Locations

    pub fn location_info(&self, location_id: &str) -> ApiRequest<Location> {
        let url = self.locations(&segment(location_id)).finish();
        ApiRequest::new(Endpoint::LocationInfo, HttpRequest::get(url), |json| {
            parse::parse_location(&json["data"])
        })
    }

    pub fn location_recent_media(
        &self,
        location_id: &str,
        params: &LocationMediaParams,
    ) -> ApiRequest<Posts> {
        let url = self
            .locations(&format!("{}/media/recent", segment(location_id)))
            .param("min_id", &params.min_id)
            .param("max_id", &params.max_id)
            .param("min_timestamp", &params.min_timestamp)
            .param("max_timestamp", &params.max_timestamp)
            .finish();
        ApiRequest::new(
            Endpoint::LocationRecentMedia,
            HttpRequest::get(url),
            parse::parse_posts,
        )
    }

    pub fn search_locations(&self, params: &LocationSearchParams) -> ApiRequest<Vec<Location>> {
        let url = self
            .locations("search")
            .param("lat", &params.lat)
            .param("lng", &params.lng)
            .param("facebook_places_id", &params.facebook_places_id)
            .param("foursquare_id", &params.foursquare_id)
            .param("distance", &params.distance.to_string())
            .finish();
        ApiRequest::new(
            Endpoint::LocationSearch,
            HttpRequest::get(url),
            parse::parse_locations,
        )
    }
}

fn segment(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

struct Query {
    url: String,
}

impl Query {
    fn new(base: &str, access_token: &str) -> Self {
        let url = format!(
            "{}?access_token={}",
            base,
            utf8_percent_encode(access_token, COMPONENT)
        );
        Self { url }
    }

    fn param(mut self, key: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.url.push('&');
            self.url.push_str(key);
            self.url.push('=');
            self.url.extend(utf8_percent_encode(value, COMPONENT));
        }
        self
    }

    fn finish(self) -> String {
        self.url
    }
}
