pub mod post;
pub mod sentiment;
