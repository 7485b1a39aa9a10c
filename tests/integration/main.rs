mod bridge;
mod helpers;
mod patterns;
mod replay;
mod scroll_follow;
mod splice;
mod theme_events;
