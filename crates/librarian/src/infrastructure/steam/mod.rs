//! Steam-facing infrastructure.
//!
//! - **`locate`** – finds the Steam root and the user's `config` directory.
//! - **`artwork`** – copies catalogue images into the user's grid directory.

pub mod artwork;
pub mod locate;
