//! # sqlgate-translate
//!
//! Natural-language-to-SQL translation for the sqlgate gateway.
//!
//! The rest of the workspace only sees the [`Translator`] trait. The shipped
//! implementation, [`LlmTranslator`], pairs one chat backend chosen by
//! configuration ([`LlmProvider`]) with an in-memory [`TrainingStore`] whose
//! examples are folded into every prompt.
//!
//! ```ignore
//! use sqlgate_translate::{LlmTranslator, Translator};
//!
//! let translator = LlmTranslator::from_backend(&config.llm.backend()?, config.llm.timeout())?;
//! let sql = translator.translate("how many rows are in inventory?").await?;
//! ```

pub mod error;
pub mod prompt;
pub mod provider;
pub mod training;
pub mod translator;

pub use error::TranslationError;
pub use prompt::{ChatMessage, Prompt, build_prompt, extract_sql};
pub use provider::LlmProvider;
pub use training::{TrainingContext, TrainingExample, TrainingKind, TrainingStore};
pub use translator::{LlmTranslator, Translator};
