pub(crate) mod bootstrap;
mod config;
mod entities;
mod scenes;
