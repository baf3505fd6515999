pub(crate) mod auth_controller;
pub(crate) mod caption_controller;
pub(crate) mod caption_vote_controller;
pub(crate) mod generate_captions_controller;
pub(crate) mod health_check_controller;
pub(crate) mod page_controller;
