#![allow(non_snake_case)]

pub mod api;
pub mod autocomplete;
pub mod cache;
pub mod cards;
pub mod filters;
pub mod logging;
pub mod page;
pub mod palette;
pub mod session;
pub mod settings;
pub mod tag_colors;
pub mod ui;
