mod click;
mod link;

pub use click::{ClickEvent, NewClickEvent};
pub use link::{CreateLinkRequest, Link, LinkWithClicks, NewLink};
