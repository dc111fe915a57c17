//! Natural-language control of a live widget panel. User text goes to an
//! OpenAI-compatible LLM, the reply comes back as a JSON command envelope,
//! and the dispatcher applies it to the registered widgets. The rendering
//! toolkit stays outside the crate, behind the Widget Surface in
//! [`surface`].

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod llm;
pub mod model;
pub mod mutator;
pub mod registry;
pub mod selection;
pub mod session;
pub mod state;
pub mod style;
pub mod surface;
pub mod transcript;
