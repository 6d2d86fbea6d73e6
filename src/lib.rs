//! Compose transactional emails and submit them to the Mandrill
//! (Mailchimp Transactional) API.
//!
//! # Quick Start
//!
//! ```ignore
//! let mailer = Mailer::from_env()?;
//!
//! let mut message = mailer.message();
//! message
//!     .set_to(("user@example.com", "User"))
//!     .set_subject("Welcome!")
//!     .set_text_body("Thanks for signing up.")
//!     .add_tag("signup");
//!
//! if !mailer.send(&message).await {
//!     eprintln!("send failed: {:?}", mailer.last_transaction());
//! }
//! ```
//!
//! Invalid input (malformed addresses, reserved tags, missing files, non-image
//! embeds) is dropped by the message setters rather than reported as an error.
//! Sending never returns an error either: the outcome is a boolean, and the raw
//! reply stays available from [`Mailer::last_transaction`].

pub mod address;
pub mod attachment;
pub mod config;
pub mod error;
pub mod import;
pub mod mailer;
pub mod message;
pub mod response;
pub mod schema;
pub mod transport;

pub use address::{AddressBook, AddressEntry, IntoAddressEntries};
pub use attachment::{AttachOptions, Attachment, MagicSniffer, MimeSniffer};
pub use config::MailerConfig;
pub use error::{ConfigError, MailError};
pub use mailer::{Mailer, RenderedView, ViewRenderer};
pub use message::{Message, SenderDefaults};
pub use response::{classify, RecipientStatus, SendStatus, Transaction};
pub use schema::{MergeLanguage, MergeVar, WireMessage};
pub use transport::{Delivery, HttpTransport, Transport};
