//! hackshell: a simulated Unix shell that runs in the browser.
//!
//! The [`core`] module is the shell itself and has no browser dependency.
//! [`app`] and [`components`] render it with Leptos; [`utils`] holds the
//! browser-side glue (localStorage, console logging).

pub mod app;
pub mod components;
pub mod config;
pub mod core;
pub mod models;
pub mod utils;
