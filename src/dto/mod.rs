//! Response bodies shared by the JSON API and its HTTP client.

pub mod application;
