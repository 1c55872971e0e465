//! # HostHub Test Suite
//!
//! Unified test crate for flows no single crate can cover alone: admission
//! decisions taken by the live portal router, swap mutations driven the way
//! the front-end drives them, and bus events arriving on open streams.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── admission.rs     # Gate decisions through the portal router
//!     ├── swap_flows.rs    # Swap lifecycle over HTTP
//!     └── live_updates.rs  # Mutations reaching open streams and bridges
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p hosthub-tests
//!
//! # By category
//! cargo test -p hosthub-tests integration::admission::
//! cargo test -p hosthub-tests integration::swap_flows::
//! ```

pub mod integration;
