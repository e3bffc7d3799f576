//! # CLI Module
//!
//! Command-line entry point. Two modes share one binary:
//!
//! - **Serve** (default): bind the configured host and serve HTTP until
//!   SIGINT/SIGTERM.
//! - **Synthetic dispatch** (`--route`): construct one in-memory request,
//!   drive it through the exact same dispatch core as the network path, print
//!   the response body, and exit non-zero when the status is >= 300.
//!
//! ```bash
//! # Serve on the default host
//! spur -H localhost:5000 -n 8
//!
//! # One-shot: sign up and print the issued token
//! spur -r /user/signup -j -d '{"username":"ferris","password":"crab"}'
//!
//! # One-shot with a credential
//! spur -r /todos -T "$TOKEN"
//! ```

mod commands;

pub use commands::{run, Cli};
