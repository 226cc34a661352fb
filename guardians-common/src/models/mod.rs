pub mod galaxy;
pub mod guardian;
