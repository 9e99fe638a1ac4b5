pub mod add;
pub mod config;
pub mod conflicts;
pub mod edit;
pub mod list;
pub mod pull;
pub mod push;
pub mod rm;
pub mod show;
pub mod tool;
pub mod upcoming;
