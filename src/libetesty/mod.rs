//! Converts the driving-theory question bank into an Anki import deck.
//!
//! Data flows `fetch` → `media/question_<id>/question.json` → [`export`],
//! which normalizes each [`record::QuestionRecord`] into an 11-column
//! tab-separated row. [`migrate`] fixes up decks exported in the older
//! three-boolean layout and [`anki`] copies media into a profile.

pub mod anki;
pub mod error;
pub mod export;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod media;
pub mod migrate;
pub mod record;
pub mod sanitize;

pub use error::{Error, Result};
pub use media::{resolve, MediaDescriptor, MediaKind};
pub use record::{normalize, AnswerOption, NormalizedRow, QuestionRecord};
pub use sanitize::sanitize;
