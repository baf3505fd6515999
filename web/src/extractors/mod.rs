pub(crate) mod session_cookies;
