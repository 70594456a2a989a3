pub mod youtube;

pub use youtube::YouTubeCommentAdapter;
