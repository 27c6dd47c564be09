//! Conversion of API JSON into domain records.
//!
//! Every function is total: missing keys and mistyped values map to the
//! zero value of the field instead of failing.

use serde_json::Value;

use crate::types::{
    Caption, Comment, Location, Meta, Pagination, Position, PostData, PostMedia, Posts,
    Relationship, TagInfo, UserInPhoto, UserInfo,
};

pub fn parse_user_info(json: &Value) -> UserInfo {
    UserInfo {
        bio: string(&json["bio"]),
        full_name: string(&json["full_name"]),
        id: string(&json["id"]),
        profile_picture: string(&json["profile_picture"]),
        username: string(&json["username"]),
        website: string(&json["website"]),
        follower_count: uint(&json["counts"]["followed_by"]),
        following_count: uint(&json["counts"]["follows"]),
        media_count: uint(&json["counts"]["media"]),
    }
}

/// Maps the `data` array of a list envelope into users.
pub fn parse_user_infos(envelope: &Value) -> Vec<UserInfo> {
    array(&envelope["data"]).iter().map(parse_user_info).collect()
}

pub fn parse_caption(json: &Value) -> Caption {
    Caption {
        created_time: string(&json["created_time"]),
        id: string(&json["id"]),
        text: string(&json["text"]),
        from: parse_user_info(&json["from"]),
    }
}

pub fn parse_comment(json: &Value) -> Comment {
    Comment {
        created_time: string(&json["created_time"]),
        id: string(&json["id"]),
        text: string(&json["text"]),
        from: parse_user_info(&json["from"]),
    }
}

/// Maps a bare array of comments.
pub fn parse_comments(json: &Value) -> Vec<Comment> {
    array(json).iter().map(parse_comment).collect()
}

pub fn parse_post_media(json: &Value) -> PostMedia {
    PostMedia {
        url: string(&json["url"]),
        width: uint(&json["width"]),
        height: uint(&json["height"]),
    }
}

pub fn parse_location(json: &Value) -> Location {
    Location {
        id: string(&json["id"]),
        name: string(&json["name"]),
        latitude: float(&json["latitude"]),
        longitude: float(&json["longitude"]),
    }
}

/// Maps the `data` array of a list envelope into locations.
pub fn parse_locations(envelope: &Value) -> Vec<Location> {
    array(&envelope["data"]).iter().map(parse_location).collect()
}

pub fn parse_post_data(json: &Value) -> PostData {
    let mut post = PostData {
        caption: parse_caption(&json["caption"]),
        attribution: string(&json["attribution"]),
        created_time: string(&json["created_time"]),
        filter: string(&json["filter"]),
        link: string(&json["link"]),
        kind: string(&json["type"]),
        id: string(&json["id"]),
        location: parse_location(&json["location"]),
        user: parse_user_info(&json["user"]),
        user_has_liked: boolean(&json["user_has_liked"]),
        like_count: uint(&json["likes"]["count"]),
        comment_count: uint(&json["comments"]["count"]),
        comments: parse_comments(&json["comments"]["data"]),
        tags: array(&json["tags"]).iter().map(string).collect(),
        users_in_photo: array(&json["users_in_photo"])
            .iter()
            .map(parse_user_in_photo)
            .collect(),
        likes: array(&json["likes"]["data"])
            .iter()
            .map(parse_user_info)
            .collect(),
        ..Default::default()
    };

    match post.kind.as_str() {
        "image" => {
            let images = &json["images"];
            post.image_low_resolution = parse_post_media(&images["low_resolution"]);
            post.image_standard_resolution = parse_post_media(&images["standard_resolution"]);
            post.image_thumbnail = parse_post_media(&images["thumbnail"]);
        }
        "video" => {
            let videos = &json["videos"];
            post.video_low_bandwidth = parse_post_media(&videos["low_bandwidth"]);
            post.video_low_resolution = parse_post_media(&videos["low_resolution"]);
            post.video_standard_resolution = parse_post_media(&videos["standard_resolution"]);
        }
        _ => {}
    }

    post
}

fn parse_user_in_photo(json: &Value) -> UserInPhoto {
    UserInPhoto {
        position: Position {
            x: float(&json["position"]["x"]) as f32,
            y: float(&json["position"]["y"]) as f32,
        },
        user: parse_user_info(&json["user"]),
    }
}

/// Maps a list envelope into a page of posts.
pub fn parse_posts(envelope: &Value) -> Posts {
    Posts {
        data: array(&envelope["data"]).iter().map(parse_post_data).collect(),
        pagination: parse_pagination(&envelope["pagination"]),
    }
}

pub fn parse_relationship(json: &Value) -> Relationship {
    Relationship {
        outgoing_status: string(&json["outgoing_status"]),
        incoming_status: string(&json["incoming_status"]),
    }
}

pub fn parse_tag_info(json: &Value) -> TagInfo {
    TagInfo {
        name: string(&json["name"]),
        media_count: uint(&json["media_count"]),
    }
}

/// Maps the `data` array of a list envelope into tags.
pub fn parse_tag_infos(envelope: &Value) -> Vec<TagInfo> {
    array(&envelope["data"]).iter().map(parse_tag_info).collect()
}

pub fn parse_pagination(json: &Value) -> Pagination {
    Pagination {
        min_tag_id: string(&json["min_tag_id"]),
        next_max_id: string(&json["next_max_id"]),
        next_max_tag_id: string(&json["next_max_tag_id"]),
        next_min_id: string(&json["next_min_id"]),
        next_url: string(&json["next_url"]),
    }
}

pub fn parse_meta(json: &Value) -> Meta {
    Meta {
        code: string(&json["code"]),
        error_type: string(&json["error_type"]),
        error_message: string(&json["error_message"]),
    }
}

fn string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn uint(value: &Value) -> u32 {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
            None => n.as_f64().map(|f| f.max(0.0) as u32).unwrap_or(0),
        },
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Bool(b) => u32::from(*b),
        _ => 0,
    }
}

fn float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn boolean(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => s == "true",
        _ => false,
    }
}

fn array(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or(&[])
}
