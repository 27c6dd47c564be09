use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use instagram_client::{
    ApiRequest, Config, FeedParams, Instagram, LikedMediaParams, LocationMediaParams,
    LocationSearchParams, MediaSearchParams, Posts, RecentMediaParams, RelationshipAction,
    TagMediaParams, DEFAULT_API_ROOT, DEFAULT_COUNT, DEFAULT_DISTANCE,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    /// OAuth access token
    #[arg(long, env = "INSTAGRAM_ACCESS_TOKEN")]
    token: String,

    /// Client ID of the registered application
    #[arg(long, default_value_t)]
    client_id: String,

    /// PEM certificate to trust in addition to the system roots
    #[arg(long)]
    cert: Option<PathBuf>,

    /// API root URL
    #[arg(long, default_value = DEFAULT_API_ROOT)]
    api_root: String,

    /// Max number of pages to fetch for paginated endpoints
    #[arg(short, long, default_value_t = 1)]
    pages: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Profile of a user
    User {
        #[arg(default_value = "self")]
        who: String,
    },
    /// Feed of a user
    Feed {
        #[arg(default_value = "self")]
        who: String,
        #[arg(long, default_value_t = DEFAULT_COUNT)]
        count: u32,
        #[arg(long, default_value_t)]
        min_id: String,
        #[arg(long, default_value_t)]
        max_id: String,
    },
    /// Most recent media published by a user
    RecentMedia {
        #[arg(default_value = "self")]
        who: String,
        #[arg(long, default_value_t = DEFAULT_COUNT)]
        count: u32,
        #[arg(long, default_value_t)]
        min_id: String,
        #[arg(long, default_value_t)]
        max_id: String,
        #[arg(long, default_value_t)]
        min_timestamp: String,
        #[arg(long, default_value_t)]
        max_timestamp: String,
    },
    /// Media liked by a user
    LikedMedia {
        #[arg(default_value = "self")]
        who: String,
        #[arg(long, default_value_t = DEFAULT_COUNT)]
        count: u32,
        #[arg(long, default_value_t)]
        max_like_id: String,
    },
    /// Search users by name
    SearchUsers {
        query: String,
        #[arg(long, default_value_t = DEFAULT_COUNT)]
        count: u32,
    },
    /// Users a user follows
    Follows {
        #[arg(default_value = "self")]
        who: String,
    },
    /// Users following a user
    FollowedBy {
        #[arg(default_value = "self")]
        who: String,
    },
    /// Users who requested to follow a user
    RequestedBy {
        #[arg(default_value = "self")]
        who: String,
    },
    /// Relationship between the authenticated user and another user
    Relationship { who: String },
    /// Follow, unfollow, block, unblock, approve or ignore a user
    ChangeRelationship {
        who: String,
        action: RelationshipAction,
    },
    /// A single media object by id
    Media { id: String },
    /// A single media object by shortcode
    Shortcode { code: String },
    /// Media around a location
    SearchMedia {
        #[arg(long, default_value_t)]
        lat: String,
        #[arg(long, default_value_t)]
        lng: String,
        #[arg(long, default_value_t)]
        min_timestamp: String,
        #[arg(long, default_value_t)]
        max_timestamp: String,
        #[arg(long, default_value_t = DEFAULT_DISTANCE)]
        distance: u32,
    },
    /// Currently popular media
    Popular,
    /// Comments on a media object
    Comments { id: String },
    /// Users who liked a media object
    Likes { id: String },
    /// Information about a tag
    Tag { name: String },
    /// Recently tagged media
    TagMedia {
        name: String,
        #[arg(long, default_value_t = DEFAULT_COUNT)]
        count: u32,
        #[arg(long, default_value_t)]
        min_tag_id: String,
        #[arg(long, default_value_t)]
        max_tag_id: String,
    },
    /// Search tags by name
    SearchTags { query: String },
    /// Information about a location
    Location { id: String },
    /// Recent media from a location
    LocationMedia {
        id: String,
        #[arg(long, default_value_t)]
        min_id: String,
        #[arg(long, default_value_t)]
        max_id: String,
        #[arg(long, default_value_t)]
        min_timestamp: String,
        #[arg(long, default_value_t)]
        max_timestamp: String,
    },
    /// Search locations by coordinates or place id
    SearchLocations {
        #[arg(long, default_value_t)]
        lat: String,
        #[arg(long, default_value_t)]
        lng: String,
        #[arg(long, default_value_t)]
        facebook_places_id: String,
        #[arg(long, default_value_t)]
        foursquare_id: String,
        #[arg(long, default_value_t = DEFAULT_DISTANCE)]
        distance: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::builder()
        .access_token(args.token)
        .client_id(args.client_id)
        .api_root(args.api_root)
        .build();
    config.cert_path = args.cert;

    let mut instagram = match Instagram::new(config) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&mut instagram, args.command, args.pages).await;

    let meta = instagram.last_error();
    if meta.is_error() {
        eprintln!("API error: {}", meta);
        return ExitCode::from(10);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    instagram: &mut Instagram,
    command: Command,
    pages: usize,
) -> Result<(), Box<dyn Error>> {
    let e = instagram.endpoints().clone();
    match command {
        Command::User { who } => print_one(instagram, e.user_info(&who)).await,
        Command::Feed {
            who,
            count,
            min_id,
            max_id,
        } => {
            let params = FeedParams::builder()
                .who(who)
                .count(count)
                .min_id(min_id)
                .max_id(max_id)
                .build();
            print_pages(instagram, e.user_feed(&params), pages).await
        }
        Command::RecentMedia {
            who,
            count,
            min_id,
            max_id,
            min_timestamp,
            max_timestamp,
        } => {
            let params = RecentMediaParams::builder()
                .who(who)
                .count(count)
                .min_id(min_id)
                .max_id(max_id)
                .min_timestamp(min_timestamp)
                .max_timestamp(max_timestamp)
                .build();
            print_pages(instagram, e.user_recent_media(&params), pages).await
        }
        Command::LikedMedia {
            who,
            count,
            max_like_id,
        } => {
            let params = LikedMediaParams::builder()
                .who(who)
                .count(count)
                .max_like_id(max_like_id)
                .build();
            print_pages(instagram, e.user_liked_media(&params), pages).await
        }
        Command::SearchUsers { query, count } => {
            print_one(instagram, e.search_users(&query, count)).await
        }
        Command::Follows { who } => print_one(instagram, e.follows(&who)).await,
        Command::FollowedBy { who } => print_one(instagram, e.followed_by(&who)).await,
        Command::RequestedBy { who } => print_one(instagram, e.requested_by(&who)).await,
        Command::Relationship { who } => print_one(instagram, e.relationship(&who)).await,
        Command::ChangeRelationship { who, action } => {
            print_one(instagram, e.change_relationship(&who, action)).await
        }
        Command::Media { id } => print_one(instagram, e.media_info(&id)).await,
        Command::Shortcode { code } => print_one(instagram, e.media_by_shortcode(&code)).await,
        Command::SearchMedia {
            lat,
            lng,
            min_timestamp,
            max_timestamp,
            distance,
        } => {
            let params = MediaSearchParams::builder()
                .lat(lat)
                .lng(lng)
                .min_timestamp(min_timestamp)
                .max_timestamp(max_timestamp)
                .distance(distance)
                .build();
            print_pages(instagram, e.search_media(&params), pages).await
        }
        Command::Popular => print_pages(instagram, e.popular_media(), pages).await,
        Command::Comments { id } => print_one(instagram, e.media_comments(&id)).await,
        Command::Likes { id } => print_one(instagram, e.media_likes(&id)).await,
        Command::Tag { name } => print_one(instagram, e.tag_info(&name)).await,
        Command::TagMedia {
            name,
            count,
            min_tag_id,
            max_tag_id,
        } => {
            let params = TagMediaParams::builder()
                .count(count)
                .min_tag_id(min_tag_id)
                .max_tag_id(max_tag_id)
                .build();
            print_pages(instagram, e.tag_recent_media(&name, &params), pages).await
        }
        Command::SearchTags { query } => print_one(instagram, e.search_tags(&query)).await,
        Command::Location { id } => print_one(instagram, e.location_info(&id)).await,
        Command::LocationMedia {
            id,
            min_id,
            max_id,
            min_timestamp,
            max_timestamp,
        } => {
            let params = LocationMediaParams::builder()
                .min_id(min_id)
                .max_id(max_id)
                .min_timestamp(min_timestamp)
                .max_timestamp(max_timestamp)
                .build();
            print_pages(instagram, e.location_recent_media(&id, &params), pages).await
        }
        Command::SearchLocations {
            lat,
            lng,
            facebook_places_id,
            foursquare_id,
            distance,
        } => {
            let params = LocationSearchParams::builder()
                .lat(lat)
                .lng(lng)
                .facebook_places_id(facebook_places_id)
                .foursquare_id(foursquare_id)
                .distance(distance)
                .build();
            print_one(instagram, e.search_locations(&params)).await
        }
    }
}

async fn print_one<R: Serialize>(
    instagram: &mut Instagram,
    request: ApiRequest<R>,
) -> Result<(), Box<dyn Error>> {
    let value = instagram.fetch(request).await?;
    emit(&value)?;
    Ok(())
}

/// Prints every post of up to `pages` pages, one JSON object per line.
async fn print_pages(
    instagram: &mut Instagram,
    request: ApiRequest<Posts>,
    pages: usize,
) -> Result<(), Box<dyn Error>> {
    let stream = instagram.pages(request, Some(pages));
    futures_util::pin_mut!(stream);

    while let Some(page) = stream.next().await {
        for post in page?.data {
            if !emit(&post)? {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Writes `value` as a JSON line. Returns `false` once stdout is closed.
fn emit<V: Serialize>(value: &V) -> Result<bool, Box<dyn Error>> {
    let line = serde_json::to_string(value)?;
    match writeln!(std::io::stdout(), "{}", line) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(false),
        Err(e) => Err(e.into()),
    }
}
