//! Writes minimal fake packages and project configs for build-tool tests.

mod app;
mod sources;

pub use app::{
    create_app, create_compiled_app, create_config, create_empty_app, create_eunit_app,
    create_plugin, AppSpec,
};
