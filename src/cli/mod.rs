//! Command-line arguments and launch profile resolution.
pub mod args;
pub mod profile;

pub use args::LaunchProfileArgs;
pub use profile::{
    build_launch_args, resolve_transport, LaunchProfile, TransportMode, USE_STREAMABLE_HTTP_ENV,
};
